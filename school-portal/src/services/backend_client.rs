use crate::config::BackendSettings;
use anyhow::Result;
use reqwest::Client;
use std::time::Duration;

/// HTTP client for the school API.
pub struct BackendClient {
    client: Client,
    settings: BackendSettings,
}

impl BackendClient {
    pub fn new(settings: BackendSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(Self { client, settings })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.settings.url.trim_end_matches('/'), path)
    }

    /// GET a path. Non-2xx responses are returned, not turned into errors.
    pub async fn get_json(&self, path: &str) -> Result<reqwest::Response> {
        let url = self.url(path);

        let response = self.client.get(&url).send().await.map_err(|e| {
            tracing::error!(url = %url, error = %e, "Failed to send GET request");
            anyhow::anyhow!("HTTP request failed: {}", e)
        })?;

        Ok(response)
    }

    /// POST a JSON body. Non-2xx responses are returned, not turned into errors.
    pub async fn post_json(&self, path: &str, body: serde_json::Value) -> Result<reqwest::Response> {
        let url = self.url(path);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(url = %url, error = %e, "Failed to send POST request");
                anyhow::anyhow!("HTTP request failed: {}", e)
            })?;

        Ok(response)
    }
}
