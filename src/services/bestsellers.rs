//! Best-seller suggestions from the New York Times Books API

use std::time::Duration;

use serde::Deserialize;

use crate::{
    config::BestsellersConfig,
    error::{AppError, AppResult},
    models::report::BestsellerBook,
};

#[derive(Debug, Deserialize)]
struct OverviewResponse {
    results: OverviewResults,
}

#[derive(Debug, Deserialize)]
struct OverviewResults {
    #[serde(default)]
    lists: Vec<BestsellerList>,
}

#[derive(Debug, Deserialize)]
struct BestsellerList {
    #[serde(default)]
    books: Vec<BestsellerBook>,
}

/// Books of the first list in an overview response
pub fn parse_overview(body: &[u8]) -> AppResult<Vec<BestsellerBook>> {
    let overview: OverviewResponse = serde_json::from_slice(body)
        .map_err(|e| AppError::Upstream(format!("Unexpected best-seller response: {}", e)))?;

    Ok(overview
        .results
        .lists
        .into_iter()
        .next()
        .map(|list| list.books)
        .unwrap_or_default())
}

#[derive(Clone)]
pub struct BestsellersService {
    client: reqwest::Client,
    config: BestsellersConfig,
}

impl BestsellersService {
    pub fn new(config: BestsellersConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Current best-seller overview
    pub async fn overview(&self) -> AppResult<Vec<BestsellerBook>> {
        if self.config.api_key.is_empty() {
            return Err(AppError::Upstream(
                "Best-seller API key is not configured".to_string(),
            ));
        }

        let url = format!(
            "{}/lists/overview.json",
            self.config.api_url.trim_end_matches('/')
        );

        let response = self
            .client
            .get(&url)
            .query(&[("api-key", self.config.api_key.as_str())])
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Best-seller request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| AppError::Upstream(format!("Best-seller request failed: {}", e)))?;

        let body = response
            .bytes()
            .await
            .map_err(|e| AppError::Upstream(format!("Best-seller request failed: {}", e)))?;

        let books = parse_overview(&body)?;
        tracing::debug!("Fetched {} best-sellers", books.len());
        Ok(books)
    }
}
