//! HTTP backend for the analysis service, modeled on its REST surface:
//! a POST of the raw document bytes starts an analysis, the
//! `Operation-Location` response header is the handle, and a GET of that
//! handle returns the current status body.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;

use super::AnalysisBackend;
use crate::domain::Operation;

/// Header carrying the service credential.
const API_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Header carrying the operation handle on a submit response.
const OPERATION_LOCATION_HEADER: &str = "Operation-Location";

/// Analysis service client over reqwest.
pub struct HttpAnalysisBackend {
    /// Service base URL, without a trailing slash.
    endpoint: String,
    /// Credential sent with every request.
    api_key: String,
    /// API version query parameter.
    api_version: String,
    /// HTTP client
    client: reqwest::Client,
}

impl HttpAnalysisBackend {
    /// Create a backend for the given service endpoint and credential.
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        Self {
            endpoint,
            api_key: api_key.into(),
            api_version: "2024-11-30".to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Override the API version sent with requests.
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Build the submit URL for a processing profile.
    fn analyze_url(&self, profile: &str) -> String {
        format!(
            "{}/analyzers/{}:analyze?api-version={}",
            self.endpoint, profile, self.api_version
        )
    }
}

#[async_trait]
impl AnalysisBackend for HttpAnalysisBackend {
    fn name(&self) -> &str {
        "http"
    }

    async fn submit(&self, bytes: &[u8], content_type: &str, profile: &str) -> Result<String> {
        let url = self.analyze_url(profile);

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes.to_vec())
            .send()
            .await
            .with_context(|| format!("failed to submit document to {url}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "analysis service rejected submission ({}): {}",
                status,
                body.trim()
            );
        }

        let handle = response
            .headers()
            .get(OPERATION_LOCATION_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(String::from)
            .context("submit response carried no Operation-Location header")?;

        Ok(handle)
    }

    async fn fetch_status(&self, handle: &str) -> Result<Operation> {
        let response = self
            .client
            .get(handle)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .with_context(|| format!("failed to fetch status from {handle}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "status fetch for {} returned {}: {}",
                handle,
                status,
                body.trim()
            );
        }

        let body: Value = response
            .json()
            .await
            .context("failed to decode status response body")?;

        Ok(Operation::from_wire(handle, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_url() {
        let backend = HttpAnalysisBackend::new("https://svc.example.com/", "KEY");
        assert_eq!(
            backend.analyze_url("products"),
            "https://svc.example.com/analyzers/products:analyze?api-version=2024-11-30"
        );
    }

    #[test]
    fn test_api_version_override() {
        let backend =
            HttpAnalysisBackend::new("https://svc", "KEY").with_api_version("2025-05-01");
        assert!(backend.analyze_url("p").ends_with("api-version=2025-05-01"));
    }
}
