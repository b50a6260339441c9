//! Processing a single page, from trigger event to stored artifacts.
//!
//! The steps run in a fixed order: decode the event, parse the key, throttle,
//! OCR, compute stats, write artifacts. The key is parsed before anything
//! touches the network, so a bad key never costs us an OCR call.

use std::sync::Arc;

use crate::{
    artifacts::{ArtifactWriter, PageArtifacts},
    blocks::ClassifiedBlocks,
    errors::{PageError, PageResult},
    event::{PageRef, page_ref_from_event},
    keys::{ArtifactKeys, DocumentKey, PageUuid},
    ocr::TextDetector,
    prelude::*,
    response::PageResponse,
    stats::{PageStats, StatsArtifact},
    throttle::{ThrottlePolicy, throttle},
};

/// Everything needed to process pages.
#[derive(Clone)]
pub struct PageProcessor {
    detector: Arc<dyn TextDetector>,
    throttle: Arc<dyn ThrottlePolicy>,
    writer: ArtifactWriter,
}

impl PageProcessor {
    /// Create a new page processor.
    pub fn new(
        detector: Arc<dyn TextDetector>,
        throttle: Arc<dyn ThrottlePolicy>,
        writer: ArtifactWriter,
    ) -> Self {
        Self {
            detector,
            throttle,
            writer,
        }
    }

    /// Process the page described by a trigger payload.
    pub async fn process_event(&self, event: &Value) -> PageResult<PageResponse> {
        let page = page_ref_from_event(event).inspect_err(|err| {
            error!("Could not decode trigger event: {err}");
            debug!(%event, "Rejected event");
        })?;
        self.process_page(&page).await
    }

    /// Process a single page.
    #[instrument(level = "info", skip_all, fields(bucket = %page.bucket, key = %page.key))]
    pub async fn process_page(&self, page: &PageRef) -> PageResult<PageResponse> {
        if page.in_bucket.is_some() || page.page_index.is_some() {
            debug!(in_bucket = ?page.in_bucket, page_index = ?page.page_index, "Split page metadata");
        }

        let doc = DocumentKey::parse(&page.key).inspect_err(log_failure)?;
        let uuid = PageUuid::new();

        throttle(self.throttle.as_ref(), &page.key).await;

        let response = self
            .detector
            .detect_text(&page.bucket, &page.key)
            .await
            .map_err(|err| PageError::OcrInvocation {
                bucket: page.bucket.clone(),
                key: page.key.clone(),
                source: err.into(),
            })
            .inspect_err(|err| {
                log_failure(err);
                error!(
                    "Make sure s3://{}/{} exists and is in the same region as Textract",
                    page.bucket, page.key
                );
            })?;

        let blocks = ClassifiedBlocks::classify(&response.blocks);
        let stats = PageStats::compute(&blocks.lines, &blocks.words);
        info!(
            uuid = uuid.as_str(),
            pages = blocks.pages.len(),
            lines = stats.num_lines,
            words = blocks.words.len(),
            chars = stats.num_chars,
            handwriting_pct = stats.handwriting_pct,
            "OCRed page"
        );

        let keys = ArtifactKeys::new(&doc, &uuid);
        let artifacts = PageArtifacts {
            response: &response,
            text: blocks.text(),
            stats: StatsArtifact::new(&doc, &uuid, &stats),
        };
        self.writer
            .write(page.output_bucket(), &keys, artifacts)
            .await
            .inspect_err(log_failure)?;

        Ok(PageResponse::success(page, keys, uuid, &stats))
    }
}

/// Log a failure with its full error chain. We're inside the page span, so
/// bucket and key are recorded too.
fn log_failure(err: &PageError) {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    error!("Page processing failed: {message}");
}
