//! HTTP transport for tile fetching.
//!
//! The [`HttpClient`] trait exists for dependency injection: tests use a
//! mock, production uses [`ReqwestClient`]. [`HttpTileFetcher`] adapts a
//! client into a [`TileFetcher`] by delegating URL construction to the
//! caller (per-provider URL templating and authentication live outside
//! the core) and by screening responses for embedded error payloads that
//! arrive inside nominally successful replies.

use std::sync::Arc;

use bytes::Bytes;

use super::{BoxFuture, FetchError, FetchRequest, TileFetcher};

/// Blocking HTTP GET, abstracted for testability.
pub trait HttpClient: Send + Sync {
    fn get(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Real HTTP client backed by reqwest.
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(std::time::Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: std::time::Duration) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transient(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| FetchError::Transient(format!("request failed: {e}")))?;

        let status = response.status();
        if status.is_server_error() {
            // 5xx is usually load or upstream trouble; worth retrying.
            return Err(FetchError::Transient(format!("HTTP {status} from {url}")));
        }
        if !status.is_success() {
            return Err(FetchError::Server(format!("HTTP {status} from {url}")));
        }

        response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| FetchError::Transient(format!("failed to read response: {e}")))
    }
}

/// Builds the request URL for a tile. Supplied by the caller; the core
/// never templates provider URLs itself.
pub type UrlBuilder = dyn Fn(&FetchRequest) -> String + Send + Sync;

/// Inspects a response body for a server-reported error disguised as a
/// success (some services embed an error document in a 200 reply).
/// Returns the error message when one is found.
pub type ResponseValidator = dyn Fn(&[u8]) -> Option<String> + Send + Sync;

/// A [`TileFetcher`] over any [`HttpClient`].
pub struct HttpTileFetcher<C: HttpClient + 'static> {
    client: Arc<C>,
    url_builder: Arc<UrlBuilder>,
    validator: Option<Arc<ResponseValidator>>,
}

impl<C: HttpClient + 'static> HttpTileFetcher<C> {
    pub fn new(
        client: Arc<C>,
        url_builder: impl Fn(&FetchRequest) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            client,
            url_builder: Arc::new(url_builder),
            validator: None,
        }
    }

    /// Installs an embedded-error detector run over every response body.
    pub fn with_validator(
        mut self,
        validator: impl Fn(&[u8]) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }
}

impl<C: HttpClient + 'static> TileFetcher for HttpTileFetcher<C> {
    fn fetch(&self, request: FetchRequest) -> BoxFuture<'_, Result<Bytes, FetchError>> {
        let url = (self.url_builder)(&request);
        let client = Arc::clone(&self.client);
        let validator = self.validator.clone();
        Box::pin(async move {
            let body = tokio::task::spawn_blocking(move || client.get(&url))
                .await
                .map_err(|e| FetchError::Transient(format!("fetch task failed: {e}")))??;

            if body.is_empty() {
                return Err(FetchError::Server("no data received".into()));
            }
            if let Some(validator) = &validator {
                if let Some(message) = validator(&body) {
                    return Err(FetchError::Server(message));
                }
            }
            Ok(Bytes::from(body))
        })
    }
}
