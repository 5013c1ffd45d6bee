//! MRMon HTTP Client
//!
//! Reads job and task status from MapReduce cluster REST endpoints.
//!
//! The crate is split into three small pieces:
//! - [`endpoints`]: URL templates for both cluster API generations
//! - [`document`]: normalization of a raw body into a JSON object document
//! - [`StatusSource`]: the fetch seam, implemented over HTTP by [`ClusterClient`]
//!
//! Fetching performs no retries; fallback between endpoints is the caller's decision.
//!
//! # Example
//!
//! ```no_run
//! use mrmon_client::{ClusterClient, StatusSource, endpoints};
//! use mrmon_core::domain::job::{Generation, JobTarget};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = ClusterClient::new(Duration::from_secs(10))?;
//!     let target = JobTarget {
//!         job_id: "1400000000000_0001".to_string(),
//!         app_id: "1400000000000_0001".to_string(),
//!         generation: Generation::Current,
//!         host: "localhost".to_string(),
//!         rm_port: 8088,
//!         history_port: 19888,
//!     };
//!
//!     if let Some(doc) = client.fetch_document(&endpoints::proxy_job_url(&target)).await {
//!         println!("{}", doc);
//!     }
//!     Ok(())
//! }
//! ```

pub mod document;
pub mod endpoints;
pub mod error;

// Re-export commonly used types
pub use document::normalize;
pub use error::{ClientError, Result};

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Source of raw status payloads
///
/// Implemented over HTTP by [`ClusterClient`]. Tests substitute scripted
/// sources so fetch strategies can run without a cluster.
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Fetches the raw body served at `url`
    async fn fetch_text(&self, url: &str) -> Result<String>;

    /// Fetches `url` and normalizes the body into a document
    ///
    /// Transport failures and unparseable bodies both yield `None`; the
    /// caller cannot tell them apart and does not need to.
    async fn fetch_document(&self, url: &str) -> Option<Value> {
        match self.fetch_text(url).await {
            Ok(body) => {
                let document = normalize(&body);
                if document.is_none() {
                    debug!("Unparseable response from {}", url);
                }
                document
            }
            Err(e) if e.is_not_found() => {
                debug!("Nothing served at {}", url);
                None
            }
            Err(e) => {
                debug!("Fetch failed for {}: {}", url, e);
                None
            }
        }
    }
}

/// HTTP client for cluster status endpoints
#[derive(Debug, Clone)]
pub struct ClusterClient {
    /// HTTP client instance
    client: Client,
}

impl ClusterClient {
    /// Create a new cluster client with a per-request timeout
    ///
    /// A hung endpoint would otherwise stall every later poll, since polls
    /// are serialized on one task.
    ///
    /// # Example
    /// ```
    /// use mrmon_client::ClusterClient;
    /// use std::time::Duration;
    ///
    /// let client = ClusterClient::new(Duration::from_secs(10)).unwrap();
    /// ```
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Create a new cluster client with a custom HTTP client
    ///
    /// This allows you to configure proxies, TLS settings, etc.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StatusSource for ClusterClient {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct FixedSource(std::result::Result<&'static str, u16>);

    #[async_trait]
    impl StatusSource for FixedSource {
        async fn fetch_text(&self, _url: &str) -> Result<String> {
            match self.0 {
                Ok(body) => Ok(body.to_string()),
                Err(status) => Err(ClientError::api_error(status, "")),
            }
        }
    }

    #[tokio::test]
    async fn test_fetch_document_normalizes_body() {
        let source = FixedSource(Ok(r#"{"job":{"state":"RUNNING"}}"#));
        assert_eq!(
            source.fetch_document("http://h/").await,
            Some(json!({"job": {"state": "RUNNING"}}))
        );
    }

    #[tokio::test]
    async fn test_fetch_document_swallows_failures() {
        assert_eq!(FixedSource(Ok("not json")).fetch_document("http://h/").await, None);
        assert_eq!(FixedSource(Err(404)).fetch_document("http://h/").await, None);
        assert_eq!(FixedSource(Err(500)).fetch_document("http://h/").await, None);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_yields_none() {
        let client = ClusterClient::new(Duration::from_secs(2)).unwrap();
        // Port 1 is reserved and never listening in test environments.
        assert_eq!(client.fetch_document("http://127.0.0.1:1/ws/v1").await, None);
    }

    #[test]
    fn test_client_with_custom_client() {
        let http_client = Client::new();
        let _client = ClusterClient::with_client(http_client);
    }
}
