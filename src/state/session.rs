/// Acquisition session state
///
/// Tracks everything the user has picked toward an analysis run: the
/// acquisition mode, the selected tile and date, synthetic raster
/// dimensions, the chosen spectral indices, and the in-flight gate that
/// keeps submissions from overlapping.

use std::collections::BTreeSet;

use chrono::{Local, NaiveDate};
use thiserror::Error;

use crate::api::error::ApiError;
use crate::api::model::{
    AnalysisRequest, DateProduct, RealAnalysisRequest, SyntheticAnalysisRequest, Tile,
};

/// Inclusive bounds for synthetic raster dimensions, in pixels.
pub const MIN_DIMENSION: u32 = 64;
pub const MAX_DIMENSION: u32 = 4096;

/// Known good Sentinel-2 acquisition date, used as the starting value.
pub const DEFAULT_DATE: &str = "2024-10-15";

/// How many acquisition products are surfaced to the user at most.
const VISIBLE_DATE_LIMIT: usize = 10;

/// Where the analysis raster comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// A real satellite acquisition, identified by tile + date
    #[default]
    Real,
    /// A procedurally generated raster of user-chosen dimensions
    Synthetic,
}

/// Local checks that must pass before any network request is issued.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no indices selected")]
    NoIndices,
    #[error("missing tile or date")]
    MissingTileOrDate,
    #[error("date is not a valid calendar date")]
    InvalidDate,
    #[error("date is in the future")]
    FutureDate,
    #[error("dimensions out of range")]
    DimensionsOutOfRange,
}

/// Lifecycle of the available-dates listing for the selected tile.
///
/// Not cached across tiles: switching tiles resets this to `Idle` and a
/// fresh fetch replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DateListing {
    #[default]
    Idle,
    Loading,
    Loaded(Vec<DateProduct>),
    /// Backend-reported message, rendered verbatim in place of the list
    Failed(String),
}

/// What a catalog refresh did to the tile selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionChange {
    /// The previous selection is still present, or there was nothing to do
    Unchanged,
    /// No tile was selected, so the first returned tile was auto-selected
    Selected(String),
    /// The previously selected tile vanished from the new list
    Cleared,
}

#[derive(Debug, Default)]
pub struct Session {
    mode: Mode,
    tiles: Vec<Tile>,
    selected: Option<String>,
    dates: DateListing,
    date: String,
    width_text: String,
    height_text: String,
    indices: BTreeSet<String>,
    analysis_running: bool,
}

impl Session {
    pub fn new() -> Self {
        Session {
            date: DEFAULT_DATE.to_string(),
            width_text: "512".to_string(),
            height_text: "512".to_string(),
            ..Session::default()
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Switch acquisition mode. Returns true when the switch entered Real
    /// mode with a tile already selected, meaning available dates should be
    /// re-checked for it.
    pub fn set_mode(&mut self, mode: Mode) -> bool {
        let entered_real = mode == Mode::Real && self.mode != Mode::Real;
        self.mode = mode;
        entered_real && self.selected.is_some()
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn selected_tile_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected_tile(&self) -> Option<&Tile> {
        let id = self.selected.as_deref()?;
        self.tiles.iter().find(|tile| tile.id == id)
    }

    /// Replace the tile list with a fresh catalog response and reconcile the
    /// selection against it: a still-present selection is kept untouched, a
    /// vanished one is cleared, and if nothing was selected the first tile
    /// is picked in catalog order.
    pub fn adopt_tiles(&mut self, tiles: Vec<Tile>) -> SelectionChange {
        let change = match &self.selected {
            Some(id) if tiles.iter().any(|tile| &tile.id == id) => SelectionChange::Unchanged,
            Some(_) => {
                self.selected = None;
                self.dates = DateListing::Idle;
                SelectionChange::Cleared
            }
            None => match tiles.first() {
                Some(first) => {
                    self.selected = Some(first.id.clone());
                    SelectionChange::Selected(first.id.clone())
                }
                None => SelectionChange::Unchanged,
            },
        };

        self.tiles = tiles;
        change
    }

    /// User picked a tile. Returns true when this is a new, non-empty
    /// selection (the caller re-checks available dates in Real mode).
    pub fn select_tile(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if id.is_empty() || self.selected.as_deref() == Some(id.as_str()) {
            return false;
        }

        self.selected = Some(id);
        // The old tile's dates are stale the moment the selection moves
        self.dates = DateListing::Idle;
        true
    }

    pub fn date_listing(&self) -> &DateListing {
        &self.dates
    }

    pub fn begin_date_discovery(&mut self) {
        self.dates = DateListing::Loading;
    }

    pub fn finish_date_discovery(&mut self, outcome: Result<Vec<DateProduct>, ApiError>) {
        self.dates = match outcome {
            Ok(products) => DateListing::Loaded(products),
            Err(err) => DateListing::Failed(err.to_string()),
        };
    }

    /// The acquisition products shown to the user: the first ten of the
    /// fetched list, in the order the backend returned them.
    pub fn visible_dates(&self) -> &[DateProduct] {
        match &self.dates {
            DateListing::Loaded(products) => &products[..products.len().min(VISIBLE_DATE_LIMIT)],
            _ => &[],
        }
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn set_date(&mut self, date: impl Into<String>) {
        self.date = date.into();
    }

    pub fn width_text(&self) -> &str {
        &self.width_text
    }

    pub fn set_width_text(&mut self, text: impl Into<String>) {
        self.width_text = text.into();
    }

    pub fn height_text(&self) -> &str {
        &self.height_text
    }

    pub fn set_height_text(&mut self, text: impl Into<String>) {
        self.height_text = text.into();
    }

    pub fn toggle_index(&mut self, code: &str, selected: bool) {
        if selected {
            self.indices.insert(code.to_string());
        } else {
            self.indices.remove(code);
        }
    }

    pub fn index_selected(&self, code: &str) -> bool {
        self.indices.contains(code)
    }

    /// Validate the current selections and build the request for the active
    /// mode. Checks run in a fixed order and the first violation wins; no
    /// network traffic happens until all of them pass.
    pub fn build_request(&self) -> Result<AnalysisRequest, ValidationError> {
        if self.indices.is_empty() {
            return Err(ValidationError::NoIndices);
        }

        let indices: Vec<String> = self.indices.iter().cloned().collect();

        match self.mode {
            Mode::Real => {
                let tile_id = self.selected.clone().unwrap_or_default();
                if tile_id.is_empty() || self.date.is_empty() {
                    return Err(ValidationError::MissingTileOrDate);
                }
                let parsed = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d")
                    .map_err(|_| ValidationError::InvalidDate)?;
                // No acquisition can exist past today
                if parsed > Local::now().date_naive() {
                    return Err(ValidationError::FutureDate);
                }

                Ok(AnalysisRequest::Real(RealAnalysisRequest {
                    tile_id,
                    date: self.date.clone(),
                    indices,
                }))
            }
            Mode::Synthetic => {
                let width = parse_dimension(&self.width_text)?;
                let height = parse_dimension(&self.height_text)?;

                Ok(AnalysisRequest::Synthetic(SyntheticAnalysisRequest {
                    width,
                    height,
                    indices,
                }))
            }
        }
    }

    pub fn analysis_running(&self) -> bool {
        self.analysis_running
    }

    /// Claim the submission gate. Returns false while an earlier request is
    /// still in flight; nothing is queued for later.
    pub fn begin_analysis(&mut self) -> bool {
        if self.analysis_running {
            return false;
        }
        self.analysis_running = true;
        true
    }

    /// Release the gate once the in-flight request settled, success or not.
    pub fn finish_analysis(&mut self) {
        self.analysis_running = false;
    }
}

fn parse_dimension(text: &str) -> Result<u32, ValidationError> {
    text.trim()
        .parse::<u32>()
        .ok()
        .filter(|value| (MIN_DIMENSION..=MAX_DIMENSION).contains(value))
        .ok_or(ValidationError::DimensionsOutOfRange)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(id: &str) -> Tile {
        Tile {
            id: id.to_string(),
            name: format!("Tile {}", id),
            description: String::new(),
            category: "Coast".to_string(),
            country: "Italy".to_string(),
            region: "Europe".to_string(),
        }
    }

    fn product(date: &str) -> DateProduct {
        DateProduct {
            date: date.to_string(),
            size_mb: 700.0,
            online: true,
        }
    }

    fn session_with_selection() -> Session {
        let mut session = Session::new();
        session.adopt_tiles(vec![tile("T1"), tile("T2")]);
        session.toggle_index("NDVI", true);
        session
    }

    #[test]
    fn test_auto_select_first_in_catalog_order() {
        let mut session = Session::new();
        let change = session.adopt_tiles(vec![tile("T2"), tile("T1")]);
        assert_eq!(change, SelectionChange::Selected("T2".to_string()));
        assert_eq!(session.selected_tile_id(), Some("T2"));
    }

    #[test]
    fn test_selection_survives_refetch_when_still_present() {
        let mut session = Session::new();
        session.adopt_tiles(vec![tile("T1"), tile("T2")]);
        assert_eq!(session.selected_tile_id(), Some("T1"));

        // A bigger list that still contains T1 must not move the selection
        let change = session.adopt_tiles(vec![tile("T1"), tile("T2"), tile("T3")]);
        assert_eq!(change, SelectionChange::Unchanged);
        assert_eq!(session.selected_tile_id(), Some("T1"));
    }

    #[test]
    fn test_selection_cleared_when_tile_vanishes() {
        let mut session = Session::new();
        session.adopt_tiles(vec![tile("T1"), tile("T2")]);

        let change = session.adopt_tiles(vec![tile("T2"), tile("T3")]);
        assert_eq!(change, SelectionChange::Cleared);
        assert_eq!(session.selected_tile_id(), None);
    }

    #[test]
    fn test_select_tile_invalidates_old_dates() {
        let mut session = Session::new();
        session.adopt_tiles(vec![tile("T1"), tile("T2")]);
        session.finish_date_discovery(Ok(vec![product("2024-10-15")]));
        assert_eq!(session.visible_dates().len(), 1);

        assert!(session.select_tile("T2"));
        assert_eq!(session.date_listing(), &DateListing::Idle);
        assert!(session.visible_dates().is_empty());

        // Re-picking the same tile is not a new selection
        assert!(!session.select_tile("T2"));
    }

    #[test]
    fn test_entering_real_mode_rechecks_dates() {
        let mut session = session_with_selection();
        assert!(!session.set_mode(Mode::Synthetic));
        assert!(session.set_mode(Mode::Real));

        // Without a selection there is nothing to re-check
        let mut empty = Session::new();
        empty.set_mode(Mode::Synthetic);
        assert!(!empty.set_mode(Mode::Real));
    }

    #[test]
    fn test_visible_dates_truncated_to_ten() {
        let mut session = Session::new();
        let products: Vec<DateProduct> = (1..=15)
            .map(|day| product(&format!("2024-10-{:02}", day)))
            .collect();
        session.finish_date_discovery(Ok(products.clone()));

        let visible = session.visible_dates();
        assert_eq!(visible.len(), 10);
        assert_eq!(visible, &products[..10]);
    }

    #[test]
    fn test_no_indices_is_checked_first() {
        let mut session = Session::new();
        // No tile, no indices: the indices check must win
        assert_eq!(session.build_request(), Err(ValidationError::NoIndices));

        session.set_mode(Mode::Synthetic);
        session.set_width_text("0");
        assert_eq!(session.build_request(), Err(ValidationError::NoIndices));
    }

    #[test]
    fn test_real_requires_tile_and_date() {
        let mut session = Session::new();
        session.toggle_index("NDVI", true);
        assert_eq!(
            session.build_request(),
            Err(ValidationError::MissingTileOrDate)
        );

        session.adopt_tiles(vec![tile("T1")]);
        session.set_date("");
        assert_eq!(
            session.build_request(),
            Err(ValidationError::MissingTileOrDate)
        );

        session.set_date("not-a-date");
        assert_eq!(session.build_request(), Err(ValidationError::InvalidDate));

        session.set_date("2024-10-15");
        let request = session.build_request().unwrap();
        assert_eq!(
            request,
            AnalysisRequest::Real(RealAnalysisRequest {
                tile_id: "T1".to_string(),
                date: "2024-10-15".to_string(),
                indices: vec!["NDVI".to_string()],
            })
        );
    }

    #[test]
    fn test_real_rejects_future_dates() {
        let mut session = Session::new();
        session.toggle_index("NDVI", true);
        session.adopt_tiles(vec![tile("T1")]);

        // Today is the newest acquisition that can exist
        let today = Local::now().date_naive();
        session.set_date(today.format("%Y-%m-%d").to_string());
        assert!(session.build_request().is_ok());

        let tomorrow = today.succ_opt().unwrap();
        session.set_date(tomorrow.format("%Y-%m-%d").to_string());
        assert_eq!(session.build_request(), Err(ValidationError::FutureDate));
    }

    #[test]
    fn test_synthetic_dimension_boundaries() {
        let mut session = session_with_selection();
        session.set_mode(Mode::Synthetic);

        for (width, ok) in [("63", false), ("64", true), ("4096", true), ("4097", false)] {
            session.set_width_text(width);
            session.set_height_text("128");
            assert_eq!(session.build_request().is_ok(), ok, "width {}", width);
        }

        for (height, ok) in [("63", false), ("64", true), ("4096", true), ("4097", false)] {
            session.set_width_text("128");
            session.set_height_text(height);
            assert_eq!(session.build_request().is_ok(), ok, "height {}", height);
        }

        session.set_width_text("not a number");
        assert_eq!(
            session.build_request(),
            Err(ValidationError::DimensionsOutOfRange)
        );
    }

    #[test]
    fn test_submission_gate_rejects_overlap() {
        let mut session = session_with_selection();

        assert!(session.begin_analysis());
        // Second trigger while the first is unresolved is rejected
        assert!(!session.begin_analysis());

        // The gate reopens once the request settles, success or failure
        session.finish_analysis();
        assert!(session.begin_analysis());
        session.finish_analysis();
    }
}
