//! HTTP client for the fitness API.

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::http::handlers::HealthStatus;
use crate::records::FitnessRecord;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Status { status: StatusCode, body: String },
}

pub struct FitnessClient {
    client: Client,
    base_url: String,
}

impl FitnessClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Every stored record.
    pub async fn all(&self) -> Result<Vec<FitnessRecord>, ClientError> {
        self.get_json("/api/fitness/all").await
    }

    /// The record for a date, or `None` on 404.
    pub async fn by_date(&self, date: &str) -> Result<Option<FitnessRecord>, ClientError> {
        let response = self.client.get(self.url(&format!("/api/fitness/{}", date))).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(decode(response).await?))
    }

    pub async fn by_year(&self, year: &str) -> Result<Vec<FitnessRecord>, ClientError> {
        self.get_json(&format!("/api/fitness/year/{}", year)).await
    }

    pub async fn by_month(&self, year: &str, month: &str) -> Result<Vec<FitnessRecord>, ClientError> {
        self.get_json(&format!("/api/fitness/year/{}/month/{}", year, month)).await
    }

    /// POST a record. Returns the stored record and whether it was new.
    pub async fn upsert(&self, record: &FitnessRecord) -> Result<(FitnessRecord, bool), ClientError> {
        let response = self
            .client
            .post(self.url("/api/fitness"))
            .json(record)
            .send()
            .await?;
        let created = response.status() == StatusCode::CREATED;
        Ok((decode(response).await?, created))
    }

    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        self.get_json("/health").await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.client.get(self.url(path)).send().await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ClientError::Status { status, body });
    }
    Ok(response.json().await?)
}
