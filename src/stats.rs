//! Per-page statistics.

use schemars::JsonSchema;

use crate::{
    keys::{DocumentKey, PageUuid},
    ocr::{OcrBlock, TextType},
    prelude::*,
};

/// Simple quality statistics for one page.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageStats {
    /// How many lines were detected.
    pub num_lines: usize,
    /// Total characters across all lines (Unicode scalar values, not bytes).
    pub num_chars: usize,
    /// Fraction of words that are handwritten, rounded to two decimal places.
    pub handwriting_pct: f64,
}

impl PageStats {
    /// Compute stats from classified line and word blocks.
    pub fn compute(lines: &[&OcrBlock], words: &[&OcrBlock]) -> Self {
        let num_chars = lines
            .iter()
            .map(|line| line.text_or_empty().chars().count())
            .sum();
        let handwritten = words
            .iter()
            .filter(|word| word.text_type == Some(TextType::Handwriting))
            .count();
        Self {
            num_lines: lines.len(),
            num_chars,
            handwriting_pct: handwriting_fraction(handwritten, words.len()),
        }
    }
}

/// `handwritten / total`, rounded to two places. Zero when there are no
/// words.
///
/// Rounding is half away from zero (so 0.125 becomes 0.13). We round in
/// integer hundredths, because ties like 57/200 aren't exact in binary
/// floating point.
fn handwriting_fraction(handwritten: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let hundredths = (handwritten * 200 + total) / (2 * total);
    hundredths as f64 / 100.0
}

/// The stats artifact, as written to `ocr/stats/...`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StatsArtifact {
    pub workflow: String,
    pub remainder: String,
    pub public_uuid: PageUuid,
    pub num_lines: usize,
    pub num_chars: usize,
    pub handwriting_pct: f64,
}

impl StatsArtifact {
    /// Build the stats artifact for a page.
    pub fn new(doc: &DocumentKey, uuid: &PageUuid, stats: &PageStats) -> Self {
        Self {
            workflow: doc.workflow.clone(),
            remainder: doc.remainder.clone(),
            public_uuid: uuid.clone(),
            num_lines: stats.num_lines,
            num_chars: stats.num_chars,
            handwriting_pct: stats.handwriting_pct,
        }
    }
}
