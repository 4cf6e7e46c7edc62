//! OpenSearch SQL client
//!
//! Queries go to `POST /_plugins/_sql` as `{"query": "..."}`. The response
//! carries rows under `datarows`, each row ordered like the SELECT list.
//! Single request per query, no retries.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::settings::Settings;

/// Anything that can run a SQL string and hand back ordered rows.
pub trait SqlBackend {
    fn execute(&self, query: &str) -> Result<Vec<Vec<Value>>>;
}

#[derive(Serialize)]
struct SqlRequest<'a> {
    query: &'a str,
}

#[derive(Deserialize)]
struct SqlResponse {
    datarows: Option<Vec<Vec<Value>>>,
}

pub struct OpenSearchClient {
    client: Client,
    endpoint: String,
    username: String,
    password: String,
}

impl OpenSearchClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .danger_accept_invalid_certs(settings.use_ssl && !settings.verify_certs)
            .build()?;

        Ok(Self {
            client,
            endpoint: settings.endpoint(),
            username: settings.username.clone(),
            password: settings.password.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl SqlBackend for OpenSearchClient {
    fn execute(&self, query: &str) -> Result<Vec<Vec<Value>>> {
        debug!(endpoint = %self.endpoint, %query, "running sql");

        let response = self
            .client
            .post(&self.endpoint)
            .basic_auth(&self.username, Some(&self.password))
            .json(&SqlRequest { query })
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::Status { status: status.as_u16(), body });
        }

        let body = response.text()?;
        let parsed: SqlResponse = serde_json::from_str(&body)
            .map_err(|e| Error::MalformedResponse(format!("invalid JSON body: {}", e)))?;
        let rows = parsed
            .datarows
            .ok_or_else(|| Error::MalformedResponse("missing 'datarows'".to_string()))?;

        debug!(rows = rows.len(), "sql returned");
        Ok(rows)
    }
}
