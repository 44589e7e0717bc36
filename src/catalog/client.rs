//! HTTP client for the collection API.
//!
//! This module provides [`CatalogClient`], which fetches one record per
//! request and maps every failure mode (status, transport, timeout, body
//! parse) into a [`FetchError`] for that record.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use super::error::FetchError;
use super::record::{RawRecord, RecordId, SearchResponse};
use crate::download::constants::{CONNECT_TIMEOUT_SECS, FETCH_TIMEOUT_SECS};
use crate::user_agent;

/// Default object endpoint of the collection API.
pub const DEFAULT_BASE_URL: &str =
    "https://collectionapi.metmuseum.org/public/collection/v1/objects";

/// Default search endpoint of the collection API.
pub const DEFAULT_SEARCH_URL: &str =
    "https://collectionapi.metmuseum.org/public/collection/v1/search";

/// Default search query: public-domain highlights.
pub const DEFAULT_SEARCH_QUERY: &str = "isHighlight=true&isPublicDomain=true&q=*";

/// A source of catalog records keyed by ID.
///
/// The pipeline depends on this trait rather than on [`CatalogClient`]
/// directly so runs can be driven from an in-memory source in tests.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetches the record with the given ID.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when the record cannot be retrieved or parsed.
    async fn fetch(&self, id: RecordId) -> Result<RawRecord, FetchError>;
}

/// Collection API client.
///
/// Created once and reused for every record so connections are pooled.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: Client,
    base_url: String,
}

impl CatalogClient {
    /// Creates a client for `base_url` with default timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidUrl`] if `base_url` is not an absolute URL.
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        Self::with_timeout(base_url, Duration::from_secs(FETCH_TIMEOUT_SECS))
    }

    /// Creates a client for `base_url` with an explicit total request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidUrl`] if `base_url` is not an absolute URL.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails with the static configuration.
    /// This should never happen in practice.
    #[allow(clippy::expect_used)]
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        Url::parse(base_url).map_err(|_| FetchError::invalid_url(base_url))?;

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(timeout)
            .gzip(true)
            .user_agent(user_agent::default_user_agent())
            .build()
            .expect("failed to build HTTP client with static configuration");

        debug!(base_url, timeout_secs = timeout.as_secs(), "created catalog client");

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Returns the object endpoint this client fetches from.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the URL a record is fetched from.
    #[must_use]
    pub fn record_url(&self, id: RecordId) -> String {
        format!("{}/{id}", self.base_url)
    }

    /// Fetches the IDs matched by a search query.
    ///
    /// `query` is appended verbatim as the query string of `search_url`. A
    /// response without an `objectIDs` array (the API sends `null` for no
    /// matches) yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Search`] for transport, status, or body failures.
    #[instrument(skip(self))]
    pub async fn search_ids(
        &self,
        search_url: &str,
        query: &str,
    ) -> Result<Vec<RecordId>, FetchError> {
        let url = if query.is_empty() {
            search_url.to_string()
        } else {
            format!("{search_url}?{query}")
        };

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::search(&url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::search(&url, format!("HTTP {}", status.as_u16())));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::search(&url, e.to_string()))?;
        let parsed: SearchResponse = serde_json::from_slice(&body)
            .map_err(|e| FetchError::search(&url, format!("malformed body: {e}")))?;

        let ids = parsed.object_ids.unwrap_or_default();
        debug!(count = ids.len(), total = ?parsed.total, "search returned ids");
        Ok(ids)
    }
}

#[async_trait]
impl RecordSource for CatalogClient {
    #[instrument(skip(self))]
    async fn fetch(&self, id: RecordId) -> Result<RawRecord, FetchError> {
        let url = self.record_url(id);
        debug!(url = %url, "fetching record");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::from_transport(id, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::http_status(id, status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_transport(id, e))?;

        serde_json::from_slice::<RawRecord>(&body).map_err(|e| FetchError::malformed(id, e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_catalog_client_rejects_relative_base_url() {
        let result = CatalogClient::new("objects/v1");
        assert!(matches!(result, Err(FetchError::InvalidUrl { .. })));
    }

    #[test]
    fn test_record_url_trims_trailing_slash() {
        let client = CatalogClient::new("https://api.example.org/objects/").unwrap();
        assert_eq!(client.record_url(12), "https://api.example.org/objects/12");
    }

    #[tokio::test]
    async fn test_fetch_parses_record() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/objects/11"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"objectID": 11, "title": "Vase", "isPublicDomain": true}"#,
            ))
            .mount(&server)
            .await;

        let client = CatalogClient::new(&format!("{}/objects", server.uri())).unwrap();
        let raw = client.fetch(11).await.unwrap();
        assert_eq!(raw.object_id, Some(11));
        assert_eq!(raw.title.as_deref(), Some("Vase"));
        assert_eq!(raw.is_public_domain, Some(true));
    }

    #[tokio::test]
    async fn test_fetch_maps_404_to_http_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/objects/404"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = CatalogClient::new(&format!("{}/objects", server.uri())).unwrap();
        match client.fetch(404).await {
            Err(FetchError::HttpStatus { id: 404, status: 404 }) => {}
            other => panic!("Expected HttpStatus 404, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_maps_html_body_to_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/objects/5"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Type", "text/html")
                    .set_body_string("<html>502 Bad Gateway</html>"),
            )
            .mount(&server)
            .await;

        let client = CatalogClient::new(&format!("{}/objects", server.uri())).unwrap();
        match client.fetch(5).await {
            Err(FetchError::MalformedBody { id: 5, .. }) => {}
            other => panic!("Expected MalformedBody, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/objects/9"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("{}")
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let client = CatalogClient::with_timeout(
            &format!("{}/objects", server.uri()),
            Duration::from_millis(200),
        )
        .unwrap();
        match client.fetch(9).await {
            Err(FetchError::Timeout { id: 9 }) => {}
            other => panic!("Expected Timeout, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_search_ids_returns_ids_and_handles_null() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"total": 3, "objectIDs": [3, 1, 2]}"#),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/empty-search"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"total": 0, "objectIDs": null}"#),
            )
            .mount(&server)
            .await;

        let client = CatalogClient::new(&format!("{}/objects", server.uri())).unwrap();
        let ids = client
            .search_ids(&format!("{}/search", server.uri()), DEFAULT_SEARCH_QUERY)
            .await
            .unwrap();
        assert_eq!(ids, vec![3, 1, 2]);

        let empty = client
            .search_ids(&format!("{}/empty-search", server.uri()), "q=nothing")
            .await
            .unwrap();
        assert!(empty.is_empty());
    }

    #[tokio::test]
    async fn test_search_ids_fails_on_bad_gateway() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad</html>"))
            .mount(&server)
            .await;

        let client = CatalogClient::new(&format!("{}/objects", server.uri())).unwrap();
        let result = client
            .search_ids(&format!("{}/search", server.uri()), "")
            .await;
        assert!(matches!(result, Err(FetchError::Search { .. })));
    }
}
