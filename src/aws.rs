//! AWS-related code shared by the Textract and S3 clients.

use aws_config::BehaviorVersion;

use crate::prelude::*;

/// Load the user's AWS configuration using standard conventions.
pub async fn load_aws_config() -> Result<aws_config::SdkConfig> {
    let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    debug!(region = ?config.region(), "Loaded AWS configuration");
    Ok(config)
}
