//! Writing objects to S3.

use aws_sdk_s3::{primitives::ByteStream, types::StorageClass};
use aws_smithy_types::error::display::DisplayErrorContext;

use crate::{aws::load_aws_config, prelude::*};

use super::{ObjectWriter, PutRequest};

/// Writes objects to S3, using the storage class named in each request.
pub struct S3ObjectWriter {
    /// AWS S3 client.
    client: aws_sdk_s3::Client,
}

impl S3ObjectWriter {
    /// Create a new writer using the standard AWS configuration.
    pub async fn new() -> Result<Self> {
        let config = load_aws_config().await?;
        Ok(Self {
            client: aws_sdk_s3::Client::new(&config),
        })
    }
}

/// Parse a storage class name, rejecting anything S3 doesn't know about.
pub fn parse_storage_class(name: &str) -> Result<StorageClass> {
    if StorageClass::values().iter().any(|known| *known == name) {
        Ok(StorageClass::from(name))
    } else {
        Err(anyhow!(
            "unknown S3 storage class {name:?} (expected one of {})",
            StorageClass::values().join(", ")
        ))
    }
}

/// Check a storage class name from the command line.
pub fn storage_class_name(name: &str) -> Result<String> {
    parse_storage_class(name).map(|class| class.as_str().to_owned())
}

#[async_trait]
impl ObjectWriter for S3ObjectWriter {
    #[instrument(level = "debug", skip_all, fields(bucket = %request.bucket, key = %request.key))]
    async fn put_object(&self, request: PutRequest) -> Result<()> {
        let PutRequest {
            bucket,
            key,
            body,
            content_type,
            storage_class,
        } = request;
        let storage_class = parse_storage_class(&storage_class)?;
        self.client
            .put_object()
            .bucket(&bucket)
            .key(&key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .storage_class(storage_class)
            .send()
            .await
            .map_err(|err| {
                anyhow!(
                    "S3 PutObject to s3://{bucket}/{key} failed: {}",
                    DisplayErrorContext(&err)
                )
            })?;
        debug!("Stored object");
        Ok(())
    }
}
