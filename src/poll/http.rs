//! HTTP fetcher for the `/pull` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::{Fetch, FetchError};
use crate::source::{parse_snapshot, Snapshot};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Issues `GET <endpoint>` and parses the body as a snapshot.
///
/// No body, query parameters or authentication are sent.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    endpoint: String,
}

impl HttpFetcher {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self) -> Result<Snapshot, FetchError> {
        let response = self.client.get(&self.endpoint).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        let body = response.bytes().await?;
        parse_snapshot(&body).map_err(|e| FetchError::Parse(e.to_string()))
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}
