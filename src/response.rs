//! The result we hand back to the orchestrator.
//!
//! The search and web-rendering stages find our artifacts using the keys in
//! this response, so field names here are part of our public contract.

use schemars::JsonSchema;

use crate::{
    event::PageRef,
    keys::{ArtifactKeys, PageUuid},
    prelude::*,
    stats::PageStats,
};

/// Message returned on success.
pub const SUCCESS_MESSAGE: &str = "page OCR complete";

/// A successful page response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PageResponse {
    /// Always 200. Failures are reported as errors instead.
    #[serde(rename = "statusCode")]
    pub status_code: u16,

    /// Details of what we did.
    pub body: PageResponseBody,
}

/// The body of a [`PageResponse`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PageResponseBody {
    /// A human-readable status message.
    pub message: String,
    /// The bucket holding the source image.
    pub bucket: String,
    /// The source image key.
    pub orig: String,
    /// Key of the stored OCR response.
    pub json: String,
    /// Key of the extracted text.
    pub txt: String,
    /// Key of the page statistics.
    pub stats: String,
    /// Public identifier for this page.
    pub uuid: PageUuid,
    /// Fraction of handwritten words.
    pub handwriting_pct: f64,
}

impl PageResponse {
    /// Build a success response.
    pub fn success(page: &PageRef, keys: ArtifactKeys, uuid: PageUuid, stats: &PageStats) -> Self {
        let ArtifactKeys { json, txt, stats: stats_key } = keys;
        Self {
            status_code: 200,
            body: PageResponseBody {
                message: SUCCESS_MESSAGE.to_owned(),
                bucket: page.bucket.clone(),
                orig: page.key.clone(),
                json,
                txt,
                stats: stats_key,
                uuid,
                handwriting_pct: stats.handwriting_pct,
            },
        }
    }
}
