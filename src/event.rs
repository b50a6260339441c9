//! Trigger events.
//!
//! This stage can be started by three different kinds of trigger: an S3
//! "object created" notification, a map state in the page-splitting step
//! function, or an EventBridge rule. We decode each of them into a
//! [`PageRef`].

use percent_encoding::percent_decode_str;
use schemars::JsonSchema;

use crate::{
    errors::{PageError, PageResult},
    prelude::*,
};

/// The page this invocation should process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageRef {
    /// Bucket holding the source image.
    pub bucket: String,
    /// Key of the source image.
    pub key: String,
    /// Page number, if the splitting step told us.
    pub page_index: Option<u32>,
    /// The bucket the splitting step read from.
    pub in_bucket: Option<String>,
    /// Where to write our artifacts, if not `bucket`.
    pub out_bucket: Option<String>,
}

impl PageRef {
    /// The bucket our artifacts go to.
    pub fn output_bucket(&self) -> &str {
        self.out_bucket.as_deref().unwrap_or(&self.bucket)
    }
}

/// A trigger payload.
#[derive(Clone, Debug, PartialEq, Serialize, JsonSchema)]
#[serde(untagged)]
pub enum IncomingEvent {
    /// S3 "new object" notification.
    Put(PutEvent),
    /// Output of the page-splitting step.
    MapStep(MapStepEvent),
    /// EventBridge notification.
    Bridge(BridgeEvent),
}

/// An S3 event notification.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct PutEvent {
    #[serde(rename = "Records")]
    pub records: Vec<S3EventRecord>,
}

/// A single record in an S3 notification.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct S3EventRecord {
    pub s3: S3Entity,
}

/// The S3 part of a notification record.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct S3Entity {
    pub bucket: BucketRef,
    pub object: ObjectRef,
}

/// A bucket, as it appears in S3 and EventBridge events.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct BucketRef {
    pub name: String,
}

/// An object, as it appears in S3 and EventBridge events.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct ObjectRef {
    /// The object key. URL-encoded in S3 notifications, plain in EventBridge.
    pub key: String,

    /// Page number, sometimes added by the splitting step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_num: Option<u32>,
}

/// The page-splitting step's output, passed through a map state.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct MapStepEvent {
    pub bucket: String,
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_num: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_bucket: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_bucket: Option<String>,
}

/// An EventBridge event.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct BridgeEvent {
    pub detail: BridgeDetail,
}

/// The `detail` of an EventBridge event.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct BridgeDetail {
    pub bucket: BucketRef,
    pub object: ObjectRef,
}

impl IncomingEvent {
    /// Decode a trigger payload.
    ///
    /// We check for `Records`, then a top-level `key`, then `detail`, and
    /// decode using the first shape that's present. If that shape is
    /// malformed, we fail rather than trying the next one.
    pub fn from_json(event: &Value) -> PageResult<Self> {
        let Some(obj) = event.as_object() else {
            return Err(PageError::invalid_event("event is not a JSON object"));
        };
        if obj.contains_key("Records") {
            decode::<PutEvent>(event, "S3 notification").map(IncomingEvent::Put)
        } else if obj.contains_key("key") {
            decode::<MapStepEvent>(event, "map step").map(IncomingEvent::MapStep)
        } else if obj.contains_key("detail") {
            decode::<BridgeEvent>(event, "EventBridge").map(IncomingEvent::Bridge)
        } else {
            Err(PageError::invalid_event(
                "expected one of `Records`, `key` or `detail`",
            ))
        }
    }

    /// Convert to a [`PageRef`].
    pub fn into_page_ref(self) -> PageResult<PageRef> {
        let page = match self {
            IncomingEvent::Put(put) => {
                let Some(record) = put.records.into_iter().next() else {
                    return Err(PageError::invalid_event("S3 notification has no records"));
                };
                PageRef {
                    bucket: record.s3.bucket.name,
                    key: unquote_plus(&record.s3.object.key)?,
                    page_index: record.s3.object.page_num,
                    in_bucket: None,
                    out_bucket: None,
                }
            }
            IncomingEvent::MapStep(step) => PageRef {
                bucket: step.bucket,
                key: step.key,
                page_index: step.page_num,
                in_bucket: step.in_bucket,
                out_bucket: step.out_bucket,
            },
            IncomingEvent::Bridge(bridge) => PageRef {
                bucket: bridge.detail.bucket.name,
                key: bridge.detail.object.key,
                page_index: bridge.detail.object.page_num,
                in_bucket: None,
                out_bucket: None,
            },
        };
        if page.bucket.is_empty() {
            return Err(PageError::invalid_event("empty bucket name"));
        }
        if page.key.is_empty() {
            return Err(PageError::invalid_event("empty object key"));
        }
        Ok(page)
    }
}

/// Decode an event as a specific shape.
fn decode<T>(event: &Value, shape: &str) -> PageResult<T>
where
    T: serde::de::DeserializeOwned,
{
    T::deserialize(event)
        .map_err(|err| PageError::invalid_event(format!("malformed {shape} event: {err}")))
}

/// Decode an S3 notification key, where spaces are sent as `+`.
fn unquote_plus(key: &str) -> PageResult<String> {
    let key = key.replace('+', " ");
    let decoded = percent_decode_str(&key)
        .decode_utf8()
        .map_err(|err| PageError::invalid_event(format!("object key is not UTF-8: {err}")))?;
    Ok(decoded.into_owned())
}

/// Parse and normalize a trigger payload in one step.
pub fn page_ref_from_event(event: &Value) -> PageResult<PageRef> {
    IncomingEvent::from_json(event)?.into_page_ref()
}
