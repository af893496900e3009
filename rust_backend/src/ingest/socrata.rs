//! Socrata open-data resource API as a [`PageSource`].

use async_trait::async_trait;
use std::time::Duration;

use super::download::{FetchError, PageSource};
use crate::db::Row;

pub const DEFAULT_DOMAIN: &str = "data.ny.gov";
/// Subway hourly ridership resource.
pub const HOURLY_RIDERSHIP_DATASET: &str = "wujg-7c2s";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

pub struct SocrataSource {
    client: reqwest::Client,
    domain: String,
    dataset: String,
}

impl SocrataSource {
    pub fn new(domain: impl Into<String>, dataset: impl Into<String>) -> Result<Self, FetchError> {
        Self::with_timeout(domain, dataset, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        domain: impl Into<String>,
        dataset: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Other(e.to_string()))?;
        Ok(Self {
            client,
            domain: domain.into(),
            dataset: dataset.into(),
        })
    }

    /// The hourly subway ridership resource on the default domain.
    pub fn hourly_ridership() -> Result<Self, FetchError> {
        Self::new(DEFAULT_DOMAIN, HOURLY_RIDERSHIP_DATASET)
    }

    pub fn resource_url(&self) -> String {
        format!("https://{}/resource/{}.json", self.domain, self.dataset)
    }
}

fn classify(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Other(err.to_string())
    }
}

#[async_trait]
impl PageSource for SocrataSource {
    async fn fetch(&self, limit: usize, offset: usize) -> Result<Vec<Row>, FetchError> {
        let response = self
            .client
            .get(self.resource_url())
            .query(&[("$limit", limit), ("$offset", offset)])
            .send()
            .await
            .map_err(classify)?
            .error_for_status()
            .map_err(classify)?;
        response.json::<Vec<Row>>().await.map_err(classify)
    }
}
