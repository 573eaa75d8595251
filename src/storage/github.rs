//! GitHub repository as a record store.
//!
//! # Responsibilities
//! - Read and write JSON partition files through the GitHub Contents API
//! - Guard overwrites with the object's current blob SHA
//! - Walk the data prefix to load every partition
//!
//! # Protocol
//! ```text
//! read:   GET /repos/{owner}/{repo}/contents/{path}?ref={branch}
//!         → { "sha": "...", "content": "<base64>", "type": "file" }
//!         404 → object absent
//! write:  GET (current sha, if any)
//!         PUT /repos/{owner}/{repo}/contents/{path}
//!             { "message", "content": "<base64>", "branch", "sha"? }
//!         200/201 → done
//!         409/422 → sha went stale, re-read and retry
//! ```
//!
//! # Design Decisions
//! - `sha` is omitted on first write; GitHub rejects it for a new file
//! - The token is marked sensitive and never logged

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::config::schema::GithubConfig;
use crate::records::date::PartitionLayout;
use crate::records::FitnessRecord;
use crate::resilience::backoff::calculate_backoff;
use crate::resilience::retries::{self, RetryPolicy};
use crate::storage::{encode_records, partition_slice, RecordBackend, StorageError, StorageResult};

/// Directory or file entry as returned by the Contents API.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentEntry {
    pub name: String,
    pub path: String,
    pub sha: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub content: Option<String>,
}

/// A file fetched from the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub sha: String,
    pub content: Vec<u8>,
}

#[derive(Debug, Serialize)]
struct PutContent<'a> {
    message: String,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<String>,
}

/// Thin client over the Contents API for a single repository.
#[derive(Clone)]
pub struct GithubClient {
    http: Client,
    base_url: String,
    branch: Option<String>,
    commit_message: String,
    retry: RetryPolicy,
}

impl GithubClient {
    pub fn new(config: &GithubConfig, token: &str) -> StorageResult<Self> {
        let mut auth = HeaderValue::from_str(&format!("token {}", token))
            .map_err(|_| StorageError::InvalidToken)?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("fitness-tracker/", env!("CARGO_PKG_VERSION"))),
        );

        let http = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: format!(
                "{}/repos/{}/{}/contents",
                config.api_base.trim_end_matches('/'),
                config.owner,
                config.repo
            ),
            branch: Some(config.branch.clone()).filter(|b| !b.is_empty()),
            commit_message: config.commit_message.clone(),
            retry: RetryPolicy::from_config(config),
        })
    }

    /// Build a client with the token taken from `config.token_env`.
    pub fn from_env(config: &GithubConfig) -> StorageResult<Self> {
        let token = std::env::var(&config.token_env)
            .ok()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| StorageError::MissingToken(config.token_env.clone()))?;
        Self::new(config, &token)
    }

    fn contents_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        let request = self.http.get(self.contents_url(path));
        match &self.branch {
            Some(branch) => request.query(&[("ref", branch.as_str())]),
            None => request,
        }
    }

    /// Fetch a file. `None` if it does not exist.
    pub async fn get_file(&self, path: &str) -> StorageResult<Option<RemoteFile>> {
        let response = self.get(path).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(StorageError::Remote {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }

        let entry: ContentEntry = response.json().await?;
        let content = decode_content(path, entry.content.as_deref().unwrap_or_default())?;
        Ok(Some(RemoteFile {
            sha: entry.sha,
            content,
        }))
    }

    /// Current blob SHA of a file, if it exists.
    pub async fn file_sha(&self, path: &str) -> StorageResult<Option<String>> {
        Ok(self.get_file(path).await?.map(|f| f.sha))
    }

    /// List a directory. A missing directory lists as empty.
    pub async fn list_dir(&self, path: &str) -> StorageResult<Vec<ContentEntry>> {
        let response = self.get(path).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(StorageError::Remote {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }
        Ok(response.json().await?)
    }

    /// Create or overwrite a file, retrying on stale SHA and transient
    /// failures.
    pub async fn put_file(&self, path: &str, content: &[u8]) -> StorageResult<()> {
        let encoded = STANDARD.encode(content);
        let mut attempts = 0;

        loop {
            attempts += 1;

            let sha = match self.file_sha(path).await {
                Ok(sha) => sha,
                Err(e) if self.retry.allows_retry(attempts) && retries::is_retryable_storage_error(&e) => {
                    let delay = calculate_backoff(attempts, &self.retry);
                    tracing::info!(path = %path, attempt = attempts, error = %e, delay = ?delay, "Retrying GitHub SHA lookup");
                    tokio::time::sleep(delay).await;
                    continue;
                }
                Err(e) => return Err(e),
            };
            let body = PutContent {
                message: self.commit_message.replace("{path}", path),
                content: encoded.clone(),
                branch: self.branch.as_deref(),
                sha,
            };

            tracing::debug!(path = %path, attempt = attempts, has_sha = body.sha.is_some(), "GitHub PUT");

            match self.http.put(self.contents_url(path)).json(&body).send().await {
                Ok(response) if response.status().is_success() => {
                    tracing::info!(path = %path, status = %response.status(), "Updated GitHub");
                    return Ok(());
                }
                Ok(response) => {
                    let status = response.status();
                    if self.retry.allows_retry(attempts) && retries::is_retryable_status(status) {
                        let delay = calculate_backoff(attempts, &self.retry);
                        tracing::info!(path = %path, attempt = attempts, status = %status, delay = ?delay, "Retrying GitHub write");
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    if retries::is_conflict(status) {
                        return Err(StorageError::Conflict {
                            path: path.to_string(),
                            attempts,
                        });
                    }
                    return Err(StorageError::Remote {
                        status: status.as_u16(),
                        path: path.to_string(),
                    });
                }
                Err(e) => {
                    if self.retry.allows_retry(attempts) && retries::is_retryable_error(&e) {
                        let delay = calculate_backoff(attempts, &self.retry);
                        tracing::info!(path = %path, attempt = attempts, error = %e, delay = ?delay, "Retrying GitHub write after network error");
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }
    }
}

/// Decode Contents API base64, which GitHub wraps with newlines.
fn decode_content(path: &str, raw: &str) -> StorageResult<Vec<u8>> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD.decode(compact).map_err(|source| StorageError::Decode {
        path: path.to_string(),
        source,
    })
}

/// Partitioned records under a path prefix of a GitHub repository.
pub struct GithubBackend {
    client: GithubClient,
    prefix: String,
    layout: PartitionLayout,
}

impl GithubBackend {
    pub fn new(client: GithubClient, config: &GithubConfig, layout: PartitionLayout) -> Self {
        Self {
            client,
            prefix: config.prefix.trim_matches('/').to_string(),
            layout,
        }
    }

    fn remote_path(&self, relative: &str) -> String {
        if self.prefix.is_empty() {
            relative.to_string()
        } else {
            format!("{}/{}", self.prefix, relative)
        }
    }

    async fn partition_paths(&self) -> StorageResult<Vec<String>> {
        let mut files = Vec::new();
        let mut pending = vec![self.prefix.clone()];

        while let Some(dir) = pending.pop() {
            for entry in self.client.list_dir(&dir).await? {
                match entry.kind.as_str() {
                    "dir" => pending.push(entry.path),
                    "file" if entry.name.ends_with(".json") => files.push(entry.path),
                    _ => {}
                }
            }
        }

        files.sort();
        Ok(files)
    }
}

#[async_trait]
impl RecordBackend for GithubBackend {
    fn name(&self) -> &'static str {
        "github"
    }

    async fn load(&self) -> StorageResult<Vec<FitnessRecord>> {
        let mut records = Vec::new();

        for path in self.partition_paths().await? {
            let Some(file) = self.client.get_file(&path).await? else {
                continue;
            };
            match serde_json::from_slice::<Vec<FitnessRecord>>(&file.content) {
                Ok(mut partition) => records.append(&mut partition),
                Err(e) => tracing::warn!(path = %path, error = %e, "Skipping malformed remote partition"),
            }
        }

        Ok(records)
    }

    async fn persist(&self, records: &[FitnessRecord], changed: &str) -> StorageResult<()> {
        let (partition, members) = partition_slice(records, changed, self.layout)?;
        let path = self.remote_path(&partition.relative_path());

        tracing::info!(path = %path, records = members.len(), "GitHub API request");
        self.client.put_file(&path, &encode_records(&members)?).await
    }
}
