//! Sorting OCR blocks by type.

use crate::ocr::{BlockType, OcrBlock};

/// OCR blocks split up by type. Each list keeps the order the blocks had in
/// the response.
#[derive(Debug, Default)]
pub struct ClassifiedBlocks<'a> {
    pub pages: Vec<&'a OcrBlock>,
    pub lines: Vec<&'a OcrBlock>,
    pub words: Vec<&'a OcrBlock>,
}

impl<'a> ClassifiedBlocks<'a> {
    /// Classify blocks. Blocks of other types are ignored.
    pub fn classify(blocks: &'a [OcrBlock]) -> Self {
        let mut classified = Self::default();
        for block in blocks {
            match block.block_type {
                BlockType::Page => classified.pages.push(block),
                BlockType::Line => classified.lines.push(block),
                BlockType::Word => classified.words.push(block),
                BlockType::Other(_) => {}
            }
        }
        classified
    }

    /// The page text, one line per line block.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.text_or_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
