//! Text detection.
//!
//! We keep our own copy of the OCR response, shaped like Textract's
//! `DetectDocumentText` JSON. Only the fields we look at are typed; everything
//! else is carried along untouched so we can store the full response.

use std::fmt;

use serde_json::Map;

use crate::prelude::*;

pub mod replay;
pub mod textract;

/// Interface to a synchronous text detection service.
#[async_trait]
pub trait TextDetector: Send + Sync + 'static {
    /// Detect text in the image stored at `bucket`/`key`.
    async fn detect_text(&self, bucket: &str, key: &str) -> Result<OcrResponse>;
}

/// A text detection response.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct OcrResponse {
    /// Every detected block, in the order the service returned them.
    #[serde(default)]
    pub blocks: Vec<OcrBlock>,

    /// Other top-level fields (`DocumentMetadata`, model version, etc.).
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// A single detected block.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct OcrBlock {
    /// What kind of block this is.
    pub block_type: BlockType,

    /// Block ID, used by relationships.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Detected text. Present on `LINE` and `WORD` blocks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Printed or handwritten. Present on `WORD` blocks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_type: Option<TextType>,

    /// Geometry, confidence, relationships and anything else.
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl OcrBlock {
    /// Create a block with no extra fields.
    pub fn new(block_type: BlockType) -> Self {
        Self {
            block_type,
            id: None,
            text: None,
            text_type: None,
            other: Map::new(),
        }
    }

    /// The block's text, or `""` if it has none.
    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }
}

/// Block types. We only care about a few, but keep the rest by name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum BlockType {
    Page,
    Line,
    Word,
    Other(String),
}

impl From<String> for BlockType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "PAGE" => BlockType::Page,
            "LINE" => BlockType::Line,
            "WORD" => BlockType::Word,
            _ => BlockType::Other(s),
        }
    }
}

impl From<BlockType> for String {
    fn from(block_type: BlockType) -> Self {
        block_type.to_string()
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockType::Page => write!(f, "PAGE"),
            BlockType::Line => write!(f, "LINE"),
            BlockType::Word => write!(f, "WORD"),
            BlockType::Other(s) => write!(f, "{s}"),
        }
    }
}

/// Whether a word was printed or handwritten.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum TextType {
    Printed,
    Handwriting,
    Other(String),
}

impl From<String> for TextType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "PRINTED" => TextType::Printed,
            "HANDWRITING" => TextType::Handwriting,
            _ => TextType::Other(s),
        }
    }
}

impl From<TextType> for String {
    fn from(text_type: TextType) -> Self {
        match text_type {
            TextType::Printed => "PRINTED".to_owned(),
            TextType::Handwriting => "HANDWRITING".to_owned(),
            TextType::Other(s) => s,
        }
    }
}
