/// UI views
///
/// Pure presentation: these functions read application state and emit
/// messages, they never mutate anything themselves.

pub mod controls;
pub mod report;
