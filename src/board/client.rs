use std::time::Duration;

use futures::future::BoxFuture;
use log::debug;
use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::error::{BoardError, Result};

/// Where the poller gets its snapshots from.
pub trait SnapshotSource: Send + Sync {
    fn fetch(&self) -> BoxFuture<'_, Result<Value>>;
}

/// Fetches `GET <page-path>?data=all` from the board backend.
pub struct HttpSource {
    client: Client,
    endpoint: Url,
}

impl HttpSource {
    pub fn new(page_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("pipeboard/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| BoardError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: data_endpoint(page_url)?,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn fetch_snapshot(&self) -> Result<Value> {
        debug!("GET {}", self.endpoint);

        let response = self.client.get(self.endpoint.clone()).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(BoardError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

impl SnapshotSource for HttpSource {
    fn fetch(&self) -> BoxFuture<'_, Result<Value>> {
        Box::pin(self.fetch_snapshot())
    }
}

/// The data endpoint sits on the page's own path, with the page query
/// replaced by `data=all`.
pub fn data_endpoint(page_url: &str) -> Result<Url> {
    let mut url = Url::parse(page_url)?;
    url.set_query(Some("data=all"));
    url.set_fragment(None);
    Ok(url)
}
