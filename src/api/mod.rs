/// Backend collaborator client
///
/// This module handles all traffic to the analysis backend:
/// - Wire-format data structures (model.rs)
/// - The HTTP client and its endpoints (client.rs)
/// - The error taxonomy for failed requests (error.rs)

pub mod client;
pub mod error;
pub mod model;

pub use client::ApiClient;
pub use error::ApiError;
