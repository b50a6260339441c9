//! Replay a saved OCR response instead of calling Textract.
//!
//! The input is the same JSON we store under `ocr/json/...`, so a page can be
//! reprocessed from its stored response without paying for OCR again.

use crate::prelude::*;

use super::{OcrResponse, TextDetector};

/// A "detector" that returns a response loaded from disk.
pub struct ReplayDetector {
    /// Where to read the response from.
    path: PathBuf,
}

impl ReplayDetector {
    /// Create a new replay detector.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TextDetector for ReplayDetector {
    #[instrument(level = "debug", skip(self), fields(path = %self.path.display()))]
    async fn detect_text(&self, bucket: &str, key: &str) -> Result<OcrResponse> {
        let data = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read OCR response from {:?}", self.path))?;
        let response = serde_json::from_str::<OcrResponse>(&data).with_context(|| {
            format!("Failed to parse OCR response from {:?}", self.path)
        })?;
        debug!(blocks = response.blocks.len(), "Replaying saved OCR response");
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use crate::ocr::BlockType;

    use super::*;

    #[tokio::test]
    async fn test_replay_reads_saved_response() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("response.json");
        std::fs::write(
            &path,
            r#"{"Blocks": [{"BlockType": "LINE", "Text": "Lot 7"}]}"#,
        )
        .unwrap();

        let detector = ReplayDetector::new(&path);
        let response = detector.detect_text("bucket", "raw/a/b.tif").await.unwrap();
        assert_eq!(response.blocks.len(), 1);
        assert_eq!(response.blocks[0].block_type, BlockType::Line);
    }

    #[tokio::test]
    async fn test_replay_missing_file_fails() {
        let detector = ReplayDetector::new("/nonexistent/response.json");
        assert!(detector.detect_text("bucket", "raw/a/b.tif").await.is_err());
    }
}
