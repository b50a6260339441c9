//! Writing the three per-page artifacts.
//!
//! There's no transaction across the three writes. If one fails, the others
//! may still have been stored, and [`PageError::StorageWrite`] lists the ones
//! that were.

use std::sync::Arc;

use futures::future::join_all;

use crate::{
    errors::{PageError, PageResult},
    keys::{ArtifactKeys, ArtifactKind},
    ocr::OcrResponse,
    prelude::*,
    stats::StatsArtifact,
    store::{DEFAULT_STORAGE_CLASS, ObjectWriter, PutRequest},
};

/// How to schedule artifact writes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// Start all three writes at once.
    #[default]
    Concurrent,
    /// Write one at a time, stopping at the first failure.
    Sequential,
}

/// The contents of a page's artifacts.
pub struct PageArtifacts<'a> {
    /// The full OCR response.
    pub response: &'a OcrResponse,
    /// The extracted text.
    pub text: String,
    /// Page statistics.
    pub stats: StatsArtifact,
}

/// Writes page artifacts to an [`ObjectWriter`].
#[derive(Clone)]
pub struct ArtifactWriter {
    store: Arc<dyn ObjectWriter>,
    mode: WriteMode,
    /// Every artifact goes to the same storage class.
    storage_class: String,
}

impl ArtifactWriter {
    /// Create a new artifact writer using [`DEFAULT_STORAGE_CLASS`].
    pub fn new(store: Arc<dyn ObjectWriter>, mode: WriteMode) -> Self {
        Self {
            store,
            mode,
            storage_class: DEFAULT_STORAGE_CLASS.to_owned(),
        }
    }

    /// Use a different storage class.
    pub fn with_storage_class(mut self, storage_class: impl Into<String>) -> Self {
        self.storage_class = storage_class.into();
        self
    }

    /// Write all three artifacts to `bucket`.
    #[instrument(level = "debug", skip(self, keys, artifacts))]
    pub async fn write(
        &self,
        bucket: &str,
        keys: &ArtifactKeys,
        artifacts: PageArtifacts<'_>,
    ) -> PageResult<()> {
        let requests = build_requests(bucket, &self.storage_class, keys, artifacts)?;

        let results = match self.mode {
            WriteMode::Concurrent => {
                join_all(requests.into_iter().map(|(kind, request)| {
                    let store = self.store.clone();
                    async move { (kind, store.put_object(request).await) }
                }))
                .await
            }
            WriteMode::Sequential => {
                let mut results = Vec::with_capacity(requests.len());
                for (kind, request) in requests {
                    let result = self.store.put_object(request).await;
                    let failed = result.is_err();
                    results.push((kind, result));
                    if failed {
                        break;
                    }
                }
                results
            }
        };

        let mut written = vec![];
        let mut first_failure = None;
        for (kind, result) in results {
            match result {
                Ok(()) => written.push(kind),
                Err(err) => {
                    error!(
                        artifact = %kind,
                        bucket,
                        key = keys.get(kind),
                        "Failed to write artifact: {err:?}"
                    );
                    first_failure.get_or_insert((kind, err));
                }
            }
        }

        match first_failure {
            None => {
                debug!("Wrote all artifacts");
                Ok(())
            }
            Some((artifact, err)) => Err(PageError::StorageWrite {
                artifact,
                key: keys.get(artifact).to_owned(),
                written,
                source: err.into(),
            }),
        }
    }
}

/// Serialize each artifact into a [`PutRequest`].
fn build_requests(
    bucket: &str,
    storage_class: &str,
    keys: &ArtifactKeys,
    artifacts: PageArtifacts<'_>,
) -> PageResult<Vec<(ArtifactKind, PutRequest)>> {
    let serialization_failed = |artifact: ArtifactKind, err: serde_json::Error| {
        PageError::StorageWrite {
            artifact,
            key: keys.get(artifact).to_owned(),
            written: vec![],
            source: err.into(),
        }
    };
    let json = serde_json::to_vec(artifacts.response)
        .map_err(|err| serialization_failed(ArtifactKind::Json, err))?;
    let stats = serde_json::to_vec(&artifacts.stats)
        .map_err(|err| serialization_failed(ArtifactKind::Stats, err))?;

    let bodies = [
        (ArtifactKind::Json, json),
        (ArtifactKind::Text, artifacts.text.into_bytes()),
        (ArtifactKind::Stats, stats),
    ];
    Ok(bodies
        .into_iter()
        .map(|(kind, body)| {
            let request = PutRequest {
                bucket: bucket.to_owned(),
                key: keys.get(kind).to_owned(),
                body,
                content_type: kind.content_type(),
                storage_class: storage_class.to_owned(),
            };
            (kind, request)
        })
        .collect())
}
