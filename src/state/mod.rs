/// State management module
///
/// This module holds all application state, independent of any widget:
/// - The active catalog filter and the search debouncer (filter.rs)
/// - Acquisition mode, tile/date/index selection, submission gate (session.rs)
/// - The displayable view of a finished analysis (report.rs)

pub mod filter;
pub mod report;
pub mod session;
