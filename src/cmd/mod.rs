//! Command-line entry points.

use std::time::Duration;

use clap::Args;

use crate::throttle::LinearThrottle;

pub mod keys;
pub mod process;
pub mod schema;

/// Options shared by subcommands that apply the split-page throttle.
#[derive(Debug, Clone, Args)]
pub struct ThrottleOpts {
    /// Milliseconds to wait per split-page index before calling OCR.
    #[clap(
        long,
        env = "OCR_PAGE_THROTTLE_MS_PER_PAGE",
        default_value = "300",
        value_name = "MS"
    )]
    pub throttle_ms_per_page: u64,
}

impl ThrottleOpts {
    /// Build the throttle policy these options describe.
    pub fn policy(&self) -> LinearThrottle {
        LinearThrottle::new(Duration::from_millis(self.throttle_ms_per_page))
    }
}
