use reqwest::Client;
use serde::de::DeserializeOwned;

use super::error::ApiError;
use super::model::{AnalysisRequest, AnalysisResult, DateProduct, ProductListing, Tile};
use crate::state::filter::TileFilter;

/// HTTP client for the analysis backend.
///
/// Cheap to clone (the inner `reqwest::Client` is reference-counted), so each
/// background task gets its own handle.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        ApiClient {
            http: Client::new(),
            base_url,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.http.get(self.url(path)).send().await?;
        Ok(response.json().await?)
    }

    /// All known region names, for the region filter list.
    pub async fn regions(&self) -> Result<Vec<String>, ApiError> {
        self.get_json("/api/regions").await
    }

    /// All known category names, for the category filter list.
    pub async fn categories(&self) -> Result<Vec<String>, ApiError> {
        self.get_json("/api/categories").await
    }

    /// All known country names, for the country filter list.
    pub async fn countries(&self) -> Result<Vec<String>, ApiError> {
        self.get_json("/api/countries").await
    }

    /// List catalog tiles matching the active filter.
    ///
    /// An empty filter sends no query parameter and lets the catalog decide
    /// default ordering and limit.
    pub async fn tiles(&self, filter: &TileFilter) -> Result<Vec<Tile>, ApiError> {
        let mut request = self.http.get(self.url("/api/tiles"));
        if let Some((key, value)) = filter.query_param() {
            request = request.query(&[(key, value)]);
        }

        let response = request.send().await?;
        Ok(response.json().await?)
    }

    /// List acquisition products available for a tile, most recent first.
    ///
    /// The backend reports failures in-band as `{error}`; those surface as
    /// [`ApiError::Backend`] with the server's message untouched.
    pub async fn available_dates(&self, tile_id: &str) -> Result<Vec<DateProduct>, ApiError> {
        let response = self
            .http
            .get(self.url("/api/available-dates"))
            .query(&[("tile", tile_id)])
            .send()
            .await?;

        let listing: ProductListing = response.json().await?;
        if let Some(message) = listing.error {
            return Err(ApiError::Backend(message));
        }

        Ok(listing.products.unwrap_or_default())
    }

    /// Submit one analysis request to the endpoint matching its mode.
    ///
    /// On a non-success status the backend's `{error}` message is surfaced
    /// when present, with a generic fallback otherwise. No retry.
    pub async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisResult, ApiError> {
        let response = match &request {
            AnalysisRequest::Real(payload) => {
                self.http
                    .post(self.url("/api/analyze"))
                    .json(payload)
                    .send()
                    .await?
            }
            AnalysisRequest::Synthetic(payload) => {
                self.http
                    .post(self.url("/api/analyze-synthetic"))
                    .json(payload)
                    .send()
                    .await?
            }
        };

        if !response.status().is_success() {
            let message = response
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|body| {
                    body.get("error")
                        .and_then(|e| e.as_str())
                        .map(String::from)
                })
                .unwrap_or_else(|| "analysis failed".to_string());
            return Err(ApiError::Backend(message));
        }

        Ok(response.json().await?)
    }

    /// Download a rendered index preview image.
    ///
    /// References arrive either absolute or relative to the backend root.
    pub async fn preview_bytes(&self, reference: &str) -> Result<Vec<u8>, ApiError> {
        let url = if reference.starts_with("http://") || reference.starts_with("https://") {
            reference.to_string()
        } else {
            self.url(reference)
        };

        let response = self.http.get(url).send().await?;
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_normalization() {
        let client = ApiClient::new("http://localhost:8080/");
        assert_eq!(client.url("/api/tiles"), "http://localhost:8080/api/tiles");

        let client = ApiClient::new("http://localhost:8080");
        assert_eq!(client.url("/api/tiles"), "http://localhost:8080/api/tiles");
    }
}
