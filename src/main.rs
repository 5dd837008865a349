use std::collections::HashMap;
use std::env;

use iced::widget::image::Handle;
use iced::widget::row;
use iced::{Element, Task, Theme};

mod api;
mod state;
mod ui;

use api::model::{AnalysisResult, DateProduct, Tile};
use api::{ApiClient, ApiError};
use state::filter::{SearchDebouncer, TileFilter, SEARCH_QUIET_INTERVAL};
use state::report::SceneReport;
use state::session::{Mode, SelectionChange, Session};
use ui::controls::{ALL_CATEGORIES, ALL_COUNTRIES, ALL_REGIONS};

/// Backend base URL when `SATSCOPE_API` is not set.
const DEFAULT_API_URL: &str = "http://127.0.0.1:8080";

/// Option lists for the three discovery filters, loaded once at startup.
/// A failed load leaves its list empty; the rest of the UI keeps working.
#[derive(Debug, Default)]
pub struct FilterOptions {
    pub regions: Vec<String>,
    pub categories: Vec<String>,
    pub countries: Vec<String>,
}

/// Main application state
pub struct Satscope {
    /// Backend client, cloned into every background task
    pub api: ApiClient,
    /// The single active catalog predicate
    pub filter: TileFilter,
    /// Search-as-you-type coalescing
    pub debouncer: SearchDebouncer,
    pub options: FilterOptions,
    /// Everything the user has picked toward an analysis run
    pub session: Session,
    /// The last successful analysis, ready for display
    pub report: Option<SceneReport>,
    /// Downloaded preview images, keyed by index code
    pub previews: HashMap<String, Handle>,
    /// User-visible failure message, if any
    pub error: Option<String>,
    /// Status line at the bottom of the controls pane
    pub status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    RegionsLoaded(Result<Vec<String>, ApiError>),
    CategoriesLoaded(Result<Vec<String>, ApiError>),
    CountriesLoaded(Result<Vec<String>, ApiError>),
    TilesLoaded(Result<Vec<Tile>, ApiError>),
    /// A keystroke in the search input
    SearchInput(String),
    /// The debounce timer for a given keystroke generation fired
    SearchElapsed(u64),
    RegionPicked(String),
    CategoryPicked(String),
    CountryPicked(String),
    TilePicked(Tile),
    ModePicked(Mode),
    DatesLoaded(Result<Vec<DateProduct>, ApiError>),
    /// User clicked one of the listed acquisition dates
    DatePicked(String),
    DateInput(String),
    WidthInput(String),
    HeightInput(String),
    IndexToggled(&'static str, bool),
    RunAnalysis,
    AnalysisDone(Result<AnalysisResult, ApiError>),
    PreviewFetched(String, Result<Vec<u8>, ApiError>),
}

impl Satscope {
    fn new() -> (Self, Task<Message>) {
        let base_url = env::var("SATSCOPE_API").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        println!("🛰️  Satscope connecting to {}", base_url);

        let app = Satscope {
            api: ApiClient::new(base_url),
            filter: TileFilter::default(),
            debouncer: SearchDebouncer::default(),
            options: FilterOptions::default(),
            session: Session::new(),
            report: None,
            previews: HashMap::new(),
            error: None,
            status: "Loading catalog...".to_string(),
        };

        let api = app.api.clone();
        let startup = Task::batch([
            Task::perform(
                {
                    let api = api.clone();
                    async move { api.regions().await }
                },
                Message::RegionsLoaded,
            ),
            Task::perform(
                {
                    let api = api.clone();
                    async move { api.categories().await }
                },
                Message::CategoriesLoaded,
            ),
            Task::perform(async move { api.countries().await }, Message::CountriesLoaded),
            app.fetch_tiles(),
        ]);

        (app, startup)
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::RegionsLoaded(outcome) => {
                self.options.regions = unwrap_options("regions", outcome);
                Task::none()
            }
            Message::CategoriesLoaded(outcome) => {
                self.options.categories = unwrap_options("categories", outcome);
                Task::none()
            }
            Message::CountriesLoaded(outcome) => {
                self.options.countries = unwrap_options("countries", outcome);
                Task::none()
            }
            Message::TilesLoaded(Ok(tiles)) => {
                self.status = format!("{} tiles in catalog", tiles.len());
                match self.session.adopt_tiles(tiles) {
                    SelectionChange::Selected(id) if self.session.mode() == Mode::Real => {
                        self.fetch_dates(id)
                    }
                    _ => Task::none(),
                }
            }
            Message::TilesLoaded(Err(err)) => {
                eprintln!("⚠️  Failed to load tiles: {}", err);
                self.status = "Error loading tiles".to_string();
                self.session.adopt_tiles(Vec::new());
                Task::none()
            }
            Message::SearchInput(value) => {
                let generation = self.debouncer.keystroke(value);
                Task::perform(tokio::time::sleep(SEARCH_QUIET_INTERVAL), move |_| {
                    Message::SearchElapsed(generation)
                })
            }
            Message::SearchElapsed(generation) => {
                match self.debouncer.elapsed(generation).map(str::to_string) {
                    Some(query) => {
                        self.filter.set_query(query);
                        self.fetch_tiles()
                    }
                    // A later keystroke superseded this timer
                    None => Task::none(),
                }
            }
            Message::RegionPicked(value) => {
                self.filter.set_region(normalize_pick(value, ALL_REGIONS));
                self.fetch_tiles()
            }
            Message::CategoryPicked(value) => {
                self.filter.set_category(normalize_pick(value, ALL_CATEGORIES));
                self.fetch_tiles()
            }
            Message::CountryPicked(value) => {
                self.filter.set_country(normalize_pick(value, ALL_COUNTRIES));
                self.fetch_tiles()
            }
            Message::TilePicked(tile) => {
                if self.session.select_tile(tile.id.clone())
                    && self.session.mode() == Mode::Real
                {
                    self.fetch_dates(tile.id)
                } else {
                    Task::none()
                }
            }
            Message::ModePicked(mode) => {
                if self.session.set_mode(mode) {
                    let id = self
                        .session
                        .selected_tile_id()
                        .unwrap_or_default()
                        .to_string();
                    self.fetch_dates(id)
                } else {
                    Task::none()
                }
            }
            Message::DatesLoaded(outcome) => {
                self.session.finish_date_discovery(outcome);
                Task::none()
            }
            Message::DatePicked(date) | Message::DateInput(date) => {
                self.session.set_date(date);
                Task::none()
            }
            Message::WidthInput(value) => {
                self.session.set_width_text(value);
                Task::none()
            }
            Message::HeightInput(value) => {
                self.session.set_height_text(value);
                Task::none()
            }
            Message::IndexToggled(code, selected) => {
                self.session.toggle_index(code, selected);
                Task::none()
            }
            Message::RunAnalysis => {
                // Strict mutual exclusion: one analysis in flight at a time,
                // nothing queued for later
                if !self.session.begin_analysis() {
                    return Task::none();
                }

                self.error = None;
                self.report = None;
                self.previews.clear();

                match self.session.build_request() {
                    Err(err) => {
                        // No request was issued; reopen the gate right away
                        self.session.finish_analysis();
                        self.error = Some(err.to_string());
                        Task::none()
                    }
                    Ok(request) => {
                        self.status = "Running analysis...".to_string();
                        let api = self.api.clone();
                        Task::perform(
                            async move { api.analyze(request).await },
                            Message::AnalysisDone,
                        )
                    }
                }
            }
            Message::AnalysisDone(Ok(result)) => {
                self.session.finish_analysis();
                self.status = format!("✅ Analysis complete: {} indices", result.indices.len());

                // Pull each index's rendered preview in the background
                let api = self.api.clone();
                let fetches: Vec<Task<Message>> = result
                    .indices
                    .iter()
                    .map(|(code, stats)| {
                        let api = api.clone();
                        let code = code.clone();
                        let reference = stats.image_url.clone();
                        Task::perform(
                            async move { (code, api.preview_bytes(&reference).await) },
                            |(code, outcome)| Message::PreviewFetched(code, outcome),
                        )
                    })
                    .collect();

                self.report = Some(SceneReport::from_result(result));
                Task::batch(fetches)
            }
            Message::AnalysisDone(Err(err)) => {
                self.session.finish_analysis();
                self.report = None;
                self.error = Some(err.to_string());
                self.status = "Analysis failed".to_string();
                eprintln!("⚠️  Analysis failed: {}", err);
                Task::none()
            }
            Message::PreviewFetched(code, Ok(bytes)) => {
                self.previews.insert(code, Handle::from_bytes(bytes));
                Task::none()
            }
            Message::PreviewFetched(code, Err(err)) => {
                // The statistics are still shown without the image
                eprintln!("⚠️  Preview for {} failed: {}", code, err);
                Task::none()
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        row![ui::controls::pane(self), ui::report::pane(self)].into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }

    /// Re-query the catalog with the active filter. Later responses simply
    /// replace earlier ones; superseded queries are not cancelled.
    fn fetch_tiles(&self) -> Task<Message> {
        let api = self.api.clone();
        let filter = self.filter.clone();
        Task::perform(async move { api.tiles(&filter).await }, Message::TilesLoaded)
    }

    /// Check available acquisition dates for a tile. No-op without a tile.
    fn fetch_dates(&mut self, tile_id: String) -> Task<Message> {
        if tile_id.is_empty() {
            return Task::none();
        }

        self.session.begin_date_discovery();
        let api = self.api.clone();
        Task::perform(
            async move { api.available_dates(&tile_id).await },
            Message::DatesLoaded,
        )
    }
}

/// A pick of the "All ..." entry clears the predicate.
fn normalize_pick(value: String, all: &str) -> String {
    if value == all {
        String::new()
    } else {
        value
    }
}

fn unwrap_options(what: &str, outcome: Result<Vec<String>, ApiError>) -> Vec<String> {
    match outcome {
        Ok(values) => values,
        Err(err) => {
            // Degrade to an empty option list, don't abort initialization
            eprintln!("⚠️  Failed to load {}: {}", what, err);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> Satscope {
        let (mut app, _startup) = Satscope::new();
        app.session.adopt_tiles(vec![Tile {
            id: "T1".to_string(),
            name: "Tile T1".to_string(),
            description: String::new(),
            category: "Coast".to_string(),
            country: "Italy".to_string(),
            region: "Europe".to_string(),
        }]);
        app
    }

    #[test]
    fn test_run_analysis_gate_claims_and_reopens() {
        let mut app = app();
        app.session.toggle_index("NDVI", true);

        let _ = app.update(Message::RunAnalysis);
        assert!(app.session.analysis_running());
        assert!(app.error.is_none());

        // A second trigger while in flight changes nothing
        let _ = app.update(Message::RunAnalysis);
        assert!(app.session.analysis_running());
        assert!(app.error.is_none());

        // Settling the request reopens the gate for the next submission
        let _ = app.update(Message::AnalysisDone(Err(ApiError::Backend("boom".to_string()))));
        assert!(!app.session.analysis_running());
        assert_eq!(app.error.as_deref(), Some("boom"));

        let _ = app.update(Message::RunAnalysis);
        assert!(app.session.analysis_running());
    }

    #[test]
    fn test_validation_failure_releases_gate() {
        // No indices selected: validation fails locally, no request issued
        let mut app = app();

        let _ = app.update(Message::RunAnalysis);
        assert!(!app.session.analysis_running());
        assert_eq!(app.error.as_deref(), Some("no indices selected"));
    }
}

fn main() -> iced::Result {
    iced::application("Satscope", Satscope::update, Satscope::view)
        .theme(Satscope::theme)
        .centered()
        .run_with(Satscope::new)
}
