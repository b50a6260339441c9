//! Object storage.
//!
//! Artifacts are written through [`ObjectWriter`], so the pipeline doesn't
//! need to know whether it's talking to S3, a local directory or a test
//! fake.

use crate::prelude::*;

pub mod local;
#[cfg(test)]
pub mod memory;
pub mod s3;

/// The storage class we write artifacts with. Our outputs are written once
/// and rarely read.
pub const DEFAULT_STORAGE_CLASS: &str = "GLACIER_IR";

/// An object to store.
#[derive(Clone, Debug)]
pub struct PutRequest {
    pub bucket: String,
    pub key: String,
    pub body: Vec<u8>,
    pub content_type: &'static str,
    /// S3 storage class name, like `GLACIER_IR`. Ignored by local stores.
    pub storage_class: String,
}

/// Interface for writing objects.
#[async_trait]
pub trait ObjectWriter: Send + Sync + 'static {
    /// Write a single object, replacing any existing object with that key.
    async fn put_object(&self, request: PutRequest) -> Result<()>;
}
