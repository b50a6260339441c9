//! In-memory object store for tests.

use std::sync::Mutex;

use crate::prelude::*;

use super::{ObjectWriter, PutRequest};

/// Records every object written to it. Writes to keys containing any of the
/// `fail_on` substrings fail instead.
#[derive(Default)]
pub struct MemoryObjectWriter {
    objects: Mutex<Vec<PutRequest>>,
    fail_on: Vec<String>,
}

impl MemoryObjectWriter {
    /// Create a store where writes to matching keys fail.
    pub fn failing_on(patterns: &[&str]) -> Self {
        Self {
            objects: Mutex::default(),
            fail_on: patterns.iter().map(|p| (*p).to_owned()).collect(),
        }
    }

    /// Everything written so far.
    pub fn objects(&self) -> Vec<PutRequest> {
        self.objects.lock().expect("lock poisoned").clone()
    }

    /// Look up an object by key.
    pub fn get(&self, key: &str) -> Option<PutRequest> {
        self.objects().into_iter().find(|obj| obj.key == key)
    }
}

#[async_trait]
impl ObjectWriter for MemoryObjectWriter {
    async fn put_object(&self, request: PutRequest) -> Result<()> {
        if self.fail_on.iter().any(|p| request.key.contains(p.as_str())) {
            return Err(anyhow!("simulated write failure for {}", request.key));
        }
        self.objects.lock().expect("lock poisoned").push(request);
        Ok(())
    }
}
