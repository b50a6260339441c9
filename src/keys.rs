//! Object key parsing and artifact naming.
//!
//! Source images live at `{status}/{workflow}/{remainder}.{extension}`, for
//! example `raw/wi-milwaukee-county/Deeds/0001.tif`. Everything we write is
//! named from the `workflow` and `remainder` parts, and downstream stages
//! look our artifacts up using the same scheme, so the templates here must
//! stay in sync with them.

use std::{fmt, sync::LazyLock};

use regex::Regex;
use schemars::JsonSchema;
use uuid::Uuid;

use crate::{
    errors::{PageError, PageResult},
    prelude::*,
};

/// Pattern for source object keys.
///
/// - `status`: lowercase ASCII letters.
/// - `workflow`: ASCII letters and hyphens, starting with a letter.
/// - `remainder`: anything non-empty, including slashes. It extends to the
///   final `.` in the key.
/// - `extension`: ASCII letters and digits, so `.001` style TIFF
///   extensions are accepted.
static DOCUMENT_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<status>[a-z]+)/(?P<workflow>[A-Za-z][A-Za-z-]*)/(?P<remainder>[^/].*)\.(?P<extension>[A-Za-z0-9]+)$",
    )
    .expect("failed to compile document key regex")
});

/// The parsed identity of a source object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DocumentKey {
    /// Processing status of the source object, usually `raw`.
    pub status: String,
    /// The jurisdiction or dataset this page belongs to.
    pub workflow: String,
    /// The rest of the path, without the extension.
    pub remainder: String,
    /// The file extension, without the leading dot.
    pub extension: String,
}

impl DocumentKey {
    /// Parse an object key.
    pub fn parse(key: &str) -> PageResult<Self> {
        let caps = DOCUMENT_KEY_RE.captures(key).ok_or_else(|| {
            let reason = if key.matches('/').count() < 2 {
                "expected at least three path segments (status/workflow/remainder)"
            } else if !key.contains('.') {
                "missing file extension"
            } else {
                "expected status/workflow/remainder.extension"
            };
            PageError::key_format(key, reason)
        })?;
        Ok(Self {
            status: caps["status"].to_owned(),
            workflow: caps["workflow"].to_owned(),
            remainder: caps["remainder"].to_owned(),
            extension: caps["extension"].to_owned(),
        })
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}.{}",
            self.status, self.workflow, self.remainder, self.extension
        )
    }
}

/// A random public identifier for one processed page.
///
/// This is appended to the stats key so that per-page outputs can't be
/// enumerated, and returned to the caller for correlation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct PageUuid(String);

impl PageUuid {
    /// Generate a fresh identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Get the identifier as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PageUuid {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PageUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The artifacts we write for each page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// The full OCR response.
    Json,
    /// The extracted text.
    Text,
    /// Page statistics.
    Stats,
}

impl ArtifactKind {
    /// The MIME type we store this artifact with.
    pub fn content_type(self) -> &'static str {
        match self {
            ArtifactKind::Json | ArtifactKind::Stats => "application/json",
            ArtifactKind::Text => "text/plain",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Json => write!(f, "json"),
            ArtifactKind::Text => write!(f, "txt"),
            ArtifactKind::Stats => write!(f, "stats"),
        }
    }
}

/// Where each artifact for a page is stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ArtifactKeys {
    pub json: String,
    pub txt: String,
    pub stats: String,
}

impl ArtifactKeys {
    /// Derive artifact keys for a document.
    pub fn new(doc: &DocumentKey, uuid: &PageUuid) -> Self {
        let DocumentKey {
            workflow,
            remainder,
            ..
        } = doc;
        Self {
            json: format!("ocr/json/{workflow}/{remainder}.json"),
            txt: format!("ocr/txt/{workflow}/{remainder}.txt"),
            stats: format!("ocr/stats/{workflow}/{remainder}__{uuid}.json"),
        }
    }

    /// Get the key for a specific artifact.
    pub fn get(&self, kind: ArtifactKind) -> &str {
        match kind {
            ArtifactKind::Json => &self.json,
            ArtifactKind::Text => &self.txt,
            ArtifactKind::Stats => &self.stats,
        }
    }
}
