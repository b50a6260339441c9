//! Writing objects to a local directory, for offline runs.

use crate::prelude::*;

use super::{ObjectWriter, PutRequest};

/// Writes each object to `{root}/{bucket}/{key}`. Content types and storage
/// classes are ignored.
pub struct LocalObjectWriter {
    root: PathBuf,
}

impl LocalObjectWriter {
    /// Create a new writer rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Where an object is stored on disk.
    fn path_for(&self, bucket: &str, key: &str) -> Result<PathBuf> {
        // Keys come from event payloads, so don't let them escape `root`.
        if bucket.is_empty()
            || bucket == ".."
            || bucket.contains(['/', '\\'])
            || key.starts_with('/')
            || key.split('/').any(|segment| segment == "..")
        {
            return Err(anyhow!(
                "refusing to write object outside output directory: {bucket}/{key}"
            ));
        }
        Ok(self.root.join(bucket).join(key))
    }
}

#[async_trait]
impl ObjectWriter for LocalObjectWriter {
    #[instrument(level = "debug", skip_all, fields(bucket = %request.bucket, key = %request.key))]
    async fn put_object(&self, request: PutRequest) -> Result<()> {
        let path = self.path_for(&request.bucket, &request.key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }
        tokio::fs::write(&path, &request.body)
            .await
            .with_context(|| format!("Failed to write {:?}", path))?;
        debug!(path = %path.display(), "Stored object locally");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::store::DEFAULT_STORAGE_CLASS;

    use super::*;

    #[tokio::test]
    async fn test_writes_under_bucket_directory() {
        let dir = tempfile::tempdir().unwrap();
        let writer = LocalObjectWriter::new(dir.path());
        writer
            .put_object(PutRequest {
                bucket: "covenants".to_owned(),
                key: "ocr/txt/test-county/Deeds/0001.txt".to_owned(),
                body: b"WARRANTY DEED".to_vec(),
                content_type: "text/plain",
                storage_class: DEFAULT_STORAGE_CLASS.to_owned(),
            })
            .await
            .unwrap();
        let written =
            std::fs::read_to_string(dir.path().join("covenants/ocr/txt/test-county/Deeds/0001.txt"))
                .unwrap();
        assert_eq!(written, "WARRANTY DEED");
    }

    #[tokio::test]
    async fn test_rejects_escaping_keys() {
        let dir = tempfile::tempdir().unwrap();
        let writer = LocalObjectWriter::new(dir.path());
        for (bucket, key) in [("b", "../x.txt"), ("b", "/etc/x"), ("../b", "x.txt")] {
            let result = writer
                .put_object(PutRequest {
                    bucket: bucket.to_owned(),
                    key: key.to_owned(),
                    body: vec![],
                    content_type: "text/plain",
                    storage_class: DEFAULT_STORAGE_CLASS.to_owned(),
                })
                .await;
            assert!(result.is_err(), "{bucket}/{key} should be rejected");
        }
    }
}
