//! Client-side throttling ahead of the OCR call.
//!
//! When a multi-page document is split, every page is submitted at about the
//! same time, which can burst past Textract's rate limit. Split pages carry
//! their index in the key (`..._SPLITPAGE_7.tif`), so we wait longer for
//! later pages. This doesn't coordinate with other invocations at all.

use std::{sync::LazyLock, time::Duration};

use regex::Regex;

use crate::prelude::*;

/// Matches the split-page marker added by the page-splitting step.
static SPLIT_PAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"_SPLITPAGE_(?P<page>\d+)\.").expect("failed to compile split page regex")
});

/// Default delay per split page.
pub const DEFAULT_DELAY_PER_PAGE: Duration = Duration::from_millis(300);

/// Find the split-page index in an object key, if any.
///
/// Indices too large for a `u32` are treated as absent.
pub fn split_page_index(key: &str) -> Option<u32> {
    SPLIT_PAGE_RE
        .captures(key)
        .and_then(|caps| caps["page"].parse::<u32>().ok())
}

/// How long to wait before OCRing a given split page.
pub trait ThrottlePolicy: Send + Sync + 'static {
    /// The delay before OCRing split page `page_index`.
    fn delay_for(&self, page_index: u32) -> Duration;
}

/// Wait a fixed amount of time per page index.
#[derive(Clone, Copy, Debug)]
pub struct LinearThrottle {
    per_page: Duration,
}

impl LinearThrottle {
    /// Create a new [`LinearThrottle`].
    pub fn new(per_page: Duration) -> Self {
        Self { per_page }
    }
}

impl Default for LinearThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_DELAY_PER_PAGE)
    }
}

impl ThrottlePolicy for LinearThrottle {
    fn delay_for(&self, page_index: u32) -> Duration {
        self.per_page.saturating_mul(page_index)
    }
}

/// The delay to apply for an object key. Zero unless the key has a
/// split-page marker.
pub fn delay_for_key(policy: &dyn ThrottlePolicy, key: &str) -> Duration {
    split_page_index(key)
        .map(|page_index| policy.delay_for(page_index))
        .unwrap_or(Duration::ZERO)
}

/// Sleep for the delay appropriate to `key`.
#[instrument(level = "debug", skip(policy))]
pub async fn throttle(policy: &dyn ThrottlePolicy, key: &str) -> Duration {
    let delay = delay_for_key(policy, key);
    if !delay.is_zero() {
        debug!(?delay, "Throttling split page before OCR");
        tokio::time::sleep(delay).await;
    }
    delay
}
