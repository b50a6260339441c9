//! Errors that end a page invocation.
//!
//! Every variant is fatal. We log context before returning one of these, and
//! the caller (normally an orchestrating workflow) decides whether to re-run
//! the whole page.

use std::fmt;

use thiserror::Error;

use crate::keys::ArtifactKind;

/// A boxed error we can carry as a `#[source]`.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for the page pipeline.
pub type PageResult<T> = std::result::Result<T, PageError>;

/// Why processing a page failed.
#[derive(Debug, Error)]
pub enum PageError {
    /// The trigger payload didn't match any event shape we know about.
    #[error("unrecognized trigger event: {reason}")]
    InvalidEventShape { reason: String },

    /// The text detection call failed.
    #[error("OCR failed for s3://{bucket}/{key}")]
    OcrInvocation {
        bucket: String,
        key: String,
        #[source]
        source: BoxError,
    },

    /// The object key isn't shaped like `status/workflow/remainder.extension`.
    #[error("malformed object key {key:?}: {reason}")]
    KeyFormat { key: String, reason: String },

    /// Writing one of our artifacts failed. Other artifacts may have been
    /// written anyway, and are listed in `written`.
    #[error("failed to write {artifact} artifact to {key:?} (written: {})", WrittenList(.written))]
    StorageWrite {
        artifact: ArtifactKind,
        key: String,
        written: Vec<ArtifactKind>,
        #[source]
        source: BoxError,
    },
}

impl PageError {
    /// Build an [`PageError::InvalidEventShape`].
    pub fn invalid_event(reason: impl Into<String>) -> Self {
        PageError::InvalidEventShape {
            reason: reason.into(),
        }
    }

    /// Build a [`PageError::KeyFormat`].
    pub fn key_format(key: &str, reason: impl Into<String>) -> Self {
        PageError::KeyFormat {
            key: key.to_owned(),
            reason: reason.into(),
        }
    }
}

/// Helper for displaying the artifacts that made it to storage.
struct WrittenList<'a>(&'a [ArtifactKind]);

impl fmt::Display for WrittenList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "none");
        }
        for (idx, kind) in self.0.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{kind}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_write_message_lists_written_artifacts() {
        let err = PageError::StorageWrite {
            artifact: ArtifactKind::Stats,
            key: "ocr/stats/x/y__abc.json".to_owned(),
            written: vec![ArtifactKind::Json, ArtifactKind::Text],
            source: "disk full".into(),
        };
        assert_eq!(
            err.to_string(),
            "failed to write stats artifact to \"ocr/stats/x/y__abc.json\" (written: json, txt)"
        );
    }

    #[test]
    fn test_storage_write_message_with_nothing_written() {
        let err = PageError::StorageWrite {
            artifact: ArtifactKind::Json,
            key: "ocr/json/x/y.json".to_owned(),
            written: vec![],
            source: "denied".into(),
        };
        assert!(err.to_string().ends_with("(written: none)"));
        assert_eq!(
            std::error::Error::source(&err).map(|e| e.to_string()),
            Some("denied".to_owned())
        );
    }
}
