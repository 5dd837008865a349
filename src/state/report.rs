/// Displayable view of a finished analysis
///
/// Wraps a raw [`AnalysisResult`] without reinterpreting it: statistics are
/// kept at full precision and only formatted (3 decimal places) at display
/// time; index entries keep the order of the response body.

use crate::api::model::{AnalysisResult, IndexStats};

/// Index codes the backend can compute, in the order they are offered.
pub const KNOWN_INDEX_CODES: [&str; 5] = ["NDVI", "EVI", "NDWI", "SAVI", "NBR"];

/// Resolve a short index code to its human-readable full name.
///
/// Unknown codes pass through unchanged; the backend may grow indices the
/// client has no name for yet.
pub fn index_full_name(code: &str) -> &str {
    match code {
        "NDVI" => "NDVI - Normalized Difference Vegetation Index",
        "EVI" => "EVI - Enhanced Vegetation Index",
        "NDWI" => "NDWI - Normalized Difference Water Index",
        "SAVI" => "SAVI - Soil-Adjusted Vegetation Index",
        "NBR" => "NBR - Normalized Burn Ratio",
        other => other,
    }
}

/// One index entry of the result, ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexSummary {
    pub code: String,
    pub stats: IndexStats,
}

impl IndexSummary {
    pub fn full_name(&self) -> &str {
        index_full_name(&self.code)
    }

    /// The bounded range as `[min, max]`.
    pub fn range_display(&self) -> String {
        format!("[{:.3}, {:.3}]", self.stats.min, self.stats.max)
    }

    pub fn mean_display(&self) -> String {
        format!("{:.3}", self.stats.mean)
    }

    pub fn std_dev_display(&self) -> String {
        format!("{:.3}", self.stats.std_dev)
    }
}

/// Scene metadata plus per-index summaries for the results pane.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneReport {
    pub tile_id: String,
    pub date: Option<String>,
    pub width: u32,
    pub height: u32,
    pub summaries: Vec<IndexSummary>,
}

impl SceneReport {
    pub fn from_result(result: AnalysisResult) -> Self {
        let summaries = result
            .indices
            .into_iter()
            .map(|(code, stats)| IndexSummary { code, stats })
            .collect();

        SceneReport {
            tile_id: result.tile_id,
            date: result.date,
            width: result.width,
            height: result.height,
            summaries,
        }
    }

    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Pixel count with thousands separators, e.g. `1,048,576`.
    pub fn pixel_count_display(&self) -> String {
        group_thousands(self.pixel_count())
    }

    pub fn index_count(&self) -> usize {
        self.summaries.len()
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
