//! Text detection using AWS Textract.

use aws_sdk_textract::{
    operation::detect_document_text::DetectDocumentTextOutput,
    types::{Block, Document, Geometry, S3Object},
};
use aws_smithy_types::error::display::DisplayErrorContext;
use serde_json::Map;

use crate::{aws::load_aws_config, prelude::*};

use super::{BlockType, OcrBlock, OcrResponse, TextDetector, TextType};

/// Text detector wrapping Textract's synchronous `DetectDocumentText` API.
pub struct TextractDetector {
    /// AWS Textract client.
    client: aws_sdk_textract::Client,
}

impl TextractDetector {
    /// Create a new detector using the standard AWS configuration.
    pub async fn new() -> Result<Self> {
        let config = load_aws_config().await?;
        Ok(Self {
            client: aws_sdk_textract::Client::new(&config),
        })
    }
}

#[async_trait]
impl TextDetector for TextractDetector {
    #[instrument(level = "debug", skip(self))]
    async fn detect_text(&self, bucket: &str, key: &str) -> Result<OcrResponse> {
        let document = Document::builder()
            .s3_object(S3Object::builder().bucket(bucket).name(key).build())
            .build();

        // No retries here. Anything that goes wrong is the orchestrator's
        // problem.
        let output = self
            .client
            .detect_document_text()
            .document(document)
            .send()
            .await
            .map_err(|err| anyhow!("AWS Textract error: {}", DisplayErrorContext(&err)))?;
        trace!("Textract response: {output:#?}");
        Ok(response_from_output(&output))
    }
}

/// Convert Textract's output to our own response type.
fn response_from_output(output: &DetectDocumentTextOutput) -> OcrResponse {
    let mut other = Map::new();
    if let Some(pages) = output.document_metadata().and_then(|meta| meta.pages()) {
        other.insert("DocumentMetadata".to_owned(), json!({ "Pages": pages }));
    }
    if let Some(version) = output.detect_document_text_model_version() {
        other.insert(
            "DetectDocumentTextModelVersion".to_owned(),
            Value::String(version.to_owned()),
        );
    }
    OcrResponse {
        blocks: output.blocks().iter().map(block_from_sdk).collect(),
        other,
    }
}

/// Convert a single Textract block.
fn block_from_sdk(block: &Block) -> OcrBlock {
    let block_type = block
        .block_type()
        .map(|block_type| BlockType::from(block_type.as_str().to_owned()))
        .unwrap_or_else(|| BlockType::Other("UNKNOWN".to_owned()));

    let mut other = Map::new();
    if let Some(confidence) = block.confidence() {
        other.insert("Confidence".to_owned(), json!(confidence));
    }
    if let Some(geometry) = block.geometry() {
        other.insert("Geometry".to_owned(), geometry_to_json(geometry));
    }
    let relationships = block
        .relationships()
        .iter()
        .map(|rel| {
            json!({
                "Type": rel.r#type().map(|t| t.as_str()),
                "Ids": rel.ids(),
            })
        })
        .collect::<Vec<_>>();
    if !relationships.is_empty() {
        other.insert("Relationships".to_owned(), Value::Array(relationships));
    }
    if let Some(page) = block.page() {
        other.insert("Page".to_owned(), json!(page));
    }

    let mut out = OcrBlock::new(block_type);
    out.id = block.id().map(str::to_owned);
    out.text = block.text().map(str::to_owned);
    out.text_type = block
        .text_type()
        .map(|text_type| TextType::from(text_type.as_str().to_owned()));
    out.other = other;
    out
}

/// Convert block geometry to Textract's JSON layout.
fn geometry_to_json(geometry: &Geometry) -> Value {
    let mut out = Map::new();
    if let Some(bbox) = geometry.bounding_box() {
        out.insert(
            "BoundingBox".to_owned(),
            json!({
                "Width": bbox.width(),
                "Height": bbox.height(),
                "Left": bbox.left(),
                "Top": bbox.top(),
            }),
        );
    }
    let polygon = geometry
        .polygon()
        .iter()
        .map(|point| json!({ "X": point.x(), "Y": point.y() }))
        .collect::<Vec<_>>();
    if !polygon.is_empty() {
        out.insert("Polygon".to_owned(), Value::Array(polygon));
    }
    Value::Object(out)
}

#[cfg(test)]
mod tests {
    use aws_sdk_textract::types::{
        BlockType as SdkBlockType, BoundingBox, DocumentMetadata, Point, Relationship,
        RelationshipType, TextType as SdkTextType,
    };

    use super::*;

    #[test]
    fn test_convert_textract_output() {
        let word = Block::builder()
            .block_type(SdkBlockType::Word)
            .id("w1")
            .text("Grantor")
            .text_type(SdkTextType::Handwriting)
            .confidence(87.5)
            .geometry(
                Geometry::builder()
                    .bounding_box(
                        BoundingBox::builder()
                            .width(0.5)
                            .height(0.25)
                            .left(0.0)
                            .top(0.125)
                            .build(),
                    )
                    .polygon(Point::builder().x(0.0).y(0.125).build())
                    .build(),
            )
            .build();
        let line = Block::builder()
            .block_type(SdkBlockType::Line)
            .id("l1")
            .text("Grantor")
            .relationships(
                Relationship::builder()
                    .r#type(RelationshipType::Child)
                    .ids("w1")
                    .build(),
            )
            .build();
        let output = DetectDocumentTextOutput::builder()
            .document_metadata(DocumentMetadata::builder().pages(1).build())
            .blocks(line)
            .blocks(word)
            .build();

        let response = response_from_output(&output);
        assert_eq!(response.other["DocumentMetadata"], json!({ "Pages": 1 }));
        assert_eq!(response.blocks.len(), 2);

        let line = &response.blocks[0];
        assert_eq!(line.block_type, BlockType::Line);
        assert_eq!(
            line.other["Relationships"],
            json!([{ "Type": "CHILD", "Ids": ["w1"] }])
        );

        let word = &response.blocks[1];
        assert_eq!(word.block_type, BlockType::Word);
        assert_eq!(word.text_type, Some(TextType::Handwriting));
        assert_eq!(word.other["Confidence"], json!(87.5));
        assert_eq!(
            word.other["Geometry"]["BoundingBox"],
            json!({ "Width": 0.5, "Height": 0.25, "Left": 0.0, "Top": 0.125 })
        );
        assert_eq!(word.other["Geometry"]["Polygon"], json!([{ "X": 0.0, "Y": 0.125 }]));
    }
}
