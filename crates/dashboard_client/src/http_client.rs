//! HTTP client implementation for the dashboard's upstream API.
//!
//! This module provides a reqwest-based implementation of the [`UpstreamClient`](crate::UpstreamClient) trait.

use async_trait::async_trait;

use crate::config::ClientConfig;
use crate::{DashboardError, Source, UpstreamClient};

/// Client for the upstream dashboard API using reqwest.
#[derive(Clone, Debug)]
pub struct ReqwestUpstreamClient {
    base_url: String,
    client: reqwest::Client,
}

impl ReqwestUpstreamClient {
    /// Create a new client instance.
    ///
    /// # Arguments
    /// * `config` - Base URL and per-request timeout
    pub fn new(config: &ClientConfig) -> Result<Self, DashboardError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn source_url(&self, source: Source) -> String {
        format!("{}{}", self.base_url, source.path())
    }

    /// Execute a request and expect a JSON response.
    async fn execute_json<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, DashboardError> {
        let resp = request.send().await?;
        self.handle_response(resp).await
    }

    /// Handle a response, converting status codes to appropriate errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, DashboardError> {
        if !resp.status().is_success() {
            return Err(self.error_from_response(resp).await);
        }
        Ok(resp.json::<T>().await?)
    }

    /// Extract error information from a failed response.
    async fn error_from_response(&self, resp: reqwest::Response) -> DashboardError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        let body_snippet: String = body.chars().take(256).collect();

        match status {
            404 => DashboardError::NotFound(body_snippet),
            401 | 403 => DashboardError::Auth(body_snippet),
            _ => DashboardError::Status {
                status,
                body: body_snippet,
            },
        }
    }
}

#[async_trait]
impl UpstreamClient for ReqwestUpstreamClient {
    async fn fetch_source(&self, source: Source) -> Result<serde_json::Value, DashboardError> {
        let url = self.source_url(source);
        tracing::debug!(source = %source, %url, "fetching upstream source");
        self.execute_json(self.client.get(&url)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_trims_trailing_slash() {
        let cfg = ClientConfig {
            base_url: "http://localhost:4000/".into(),
            ..ClientConfig::default()
        };
        let client = ReqwestUpstreamClient::new(&cfg).expect("client");
        assert_eq!(client.base_url(), "http://localhost:4000");
        assert_eq!(
            client.source_url(Source::Projects),
            "http://localhost:4000/api/projects"
        );
    }
}
