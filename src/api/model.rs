/// Wire-format data structures for the analysis backend
///
/// These structs mirror the backend's JSON shapes exactly; the camelCase
/// field names on the wire are mapped to Rust naming with serde renames.

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A geographic catalog entry, as returned by `GET /api/tiles`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Tile {
    /// Stable unique identifier (e.g., a Sentinel-2 tile code)
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub country: String,
    pub region: String,
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}, {}", self.id, self.name, self.country)
    }
}

/// One acquisition product for a tile, as listed by `GET /api/available-dates`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DateProduct {
    /// ISO-8601 calendar date of the acquisition
    pub date: String,
    pub size_mb: f64,
    /// Whether the product is immediately retrievable or archived
    pub online: bool,
}

/// Response envelope of `GET /api/available-dates`.
///
/// The backend reports failures in-band: either `products` or `error` is
/// present, never both.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductListing {
    #[serde(default)]
    pub products: Option<Vec<DateProduct>>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Payload of `POST /api/analyze` (real satellite acquisition).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RealAnalysisRequest {
    #[serde(rename = "tileId")]
    pub tile_id: String,
    pub date: String,
    pub indices: Vec<String>,
}

/// Payload of `POST /api/analyze-synthetic` (procedurally generated raster).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyntheticAnalysisRequest {
    pub width: u32,
    pub height: u32,
    pub indices: Vec<String>,
}

/// A validated analysis request, discriminated by acquisition mode.
///
/// Each mode carries its own payload shape; the client picks the endpoint
/// by matching on the variant.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisRequest {
    Real(RealAnalysisRequest),
    Synthetic(SyntheticAnalysisRequest),
}

/// Per-index statistics over the computed raster.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IndexStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    #[serde(rename = "stdDev")]
    pub std_dev: f64,
    /// Reference to the rendered preview image; opaque to the client core
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

/// Successful response of either analysis endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnalysisResult {
    #[serde(rename = "tileId")]
    pub tile_id: String,
    #[serde(default)]
    pub date: Option<String>,
    pub width: u32,
    pub height: u32,
    /// Index code -> stats, in the order the backend emitted the keys
    #[serde(deserialize_with = "ordered_indices")]
    pub indices: Vec<(String, IndexStats)>,
}

/// Deserializes a JSON object into key/value pairs preserving key order.
/// A plain `HashMap` would scramble the backend's ordering; `BTreeMap`
/// would re-sort it.
fn ordered_indices<'de, D>(deserializer: D) -> Result<Vec<(String, IndexStats)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct OrderedVisitor;

    impl<'de> Visitor<'de> for OrderedVisitor {
        type Value = Vec<(String, IndexStats)>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a map of index codes to statistics")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry::<String, IndexStats>()? {
                entries.push(entry);
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(OrderedVisitor)
}
