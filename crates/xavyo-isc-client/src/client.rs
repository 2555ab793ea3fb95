//! ISC REST client with token injection, retry handling and offset pagination.

use reqwest::header::{HeaderMap, ACCEPT, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::filter::Filter;
use crate::models::JsonPatchOperation;
use crate::{IscCredentials, IscError, IscResult, RetryPolicy, TokenCache};

/// Page size used for every collection endpoint of this API.
pub const PAGE_SIZE: u32 = 250;

/// Response header carrying the total number of matching records.
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

const PUBLIC_IDENTITIES_CONFIG_PATH: &str = "/beta/public-identities-config";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const JSON: &str = "application/json";
const JSON_PATCH: &str = "application/json-patch+json";

/// Query string parameters.
pub(crate) type Query<'a> = &'a [(&'a str, String)];

/// Serialized request body with its content type.
type Body = (&'static str, Vec<u8>);

/// Identity Security Cloud API client.
///
/// Cheap to share behind an `Arc`; the only mutable state is the cached
/// access token.
#[derive(Debug)]
pub struct IscClient {
    base_url: Url,
    http_client: reqwest::Client,
    token_cache: Arc<TokenCache>,
    retry_policy: RetryPolicy,
}

impl IscClient {
    /// Creates a client for the API at `base_url`
    /// (e.g. `https://acme.api.identitynow.com`).
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not an absolute http(s) URL or the HTTP
    /// client cannot be created.
    pub fn new(base_url: &str, credentials: IscCredentials) -> IscResult<Self> {
        let base_url = Url::parse(base_url)?;
        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            return Err(IscError::Config(format!(
                "Base URL must be an absolute http(s) URL: {base_url}"
            )));
        }

        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("xavyo-isc-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| IscError::Config(format!("Failed to create HTTP client: {e}")))?;

        let token_cache = TokenCache::new(credentials, &base_url, http_client.clone())?;

        Ok(Self {
            base_url,
            http_client,
            token_cache: Arc::new(token_cache),
            retry_policy: RetryPolicy::default(),
        })
    }

    /// Replaces the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// API base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Token cache used for every request.
    #[must_use]
    pub fn token_cache(&self) -> &Arc<TokenCache> {
        &self.token_cache
    }

    /// Retry policy applied to every request.
    #[must_use]
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Probes connectivity and credentials against `/beta/public-identities-config`.
    #[instrument(skip(self))]
    pub async fn test_connection(&self) -> IscResult<()> {
        let url = self.path_url(PUBLIC_IDENTITIES_CONFIG_PATH)?;
        let _: serde_json::Value = self.get_json("test_connection", &url, &[]).await?;
        info!("ISC connection verified");
        Ok(())
    }

    /// Fetches every record of a collection endpoint matching `filters`.
    ///
    /// Pages are requested sequentially with `count=true`; the loop continues
    /// while `offset + page_size < total`, where `total` comes from the
    /// `X-Total-Count` header of each response.
    ///
    /// # Errors
    ///
    /// Returns [`IscError::Parse`] if a response lacks a numeric
    /// `X-Total-Count` header, and any request error once retries are spent.
    #[instrument(skip(self, filters))]
    pub async fn fetch_all<T: DeserializeOwned>(
        &self,
        path: &str,
        filters: Option<&Filter>,
        page_size: u32,
    ) -> IscResult<Vec<T>> {
        if page_size == 0 {
            return Err(IscError::Config("page size must be positive".into()));
        }

        let url = self.path_url(path)?;
        let filters = filters.map(ToString::to_string);
        let page_size = u64::from(page_size);
        let mut offset: u64 = 0;
        let mut records = Vec::new();

        loop {
            let mut query = vec![
                ("count", "true".to_string()),
                ("limit", page_size.to_string()),
                ("offset", offset.to_string()),
            ];
            if let Some(ref filters) = filters {
                query.push(("filters", filters.clone()));
            }

            let response = self
                .send("fetch_page", Method::GET, &url, &query, None)
                .await?;
            let total_count = parse_total_count(response.headers())?;
            let page: Vec<T> = decode_json(response).await?;

            debug!(offset, records = page.len(), total_count, "Fetched page");
            records.extend(page);

            if offset + page_size < total_count {
                offset += page_size;
            } else {
                break;
            }
        }

        Ok(records)
    }

    /// Builds an API URL from raw path segments (each segment is percent-encoded).
    pub(crate) fn url(&self, segments: &[&str]) -> IscResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                IscError::Config(format!("Base URL cannot carry a path: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Builds an API URL from a static path such as `/beta/accounts`.
    pub(crate) fn path_url(&self, path: &str) -> IscResult<Url> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        self.url(&segments)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        url: &Url,
        query: Query<'_>,
    ) -> IscResult<T> {
        let response = self.send(operation, Method::GET, url, query, None).await?;
        decode_json(response).await
    }

    pub(crate) async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        operation: &str,
        url: &Url,
        query: Query<'_>,
        body: &B,
    ) -> IscResult<T> {
        let body = (JSON, serde_json::to_vec(body)?);
        let response = self
            .send(operation, Method::POST, url, query, Some(body))
            .await?;
        decode_json(response).await
    }

    /// POSTs `body` and discards the response body.
    pub(crate) async fn post<B: Serialize>(
        &self,
        operation: &str,
        url: &Url,
        body: &B,
    ) -> IscResult<()> {
        let body = (JSON, serde_json::to_vec(body)?);
        self.send(operation, Method::POST, url, &[], Some(body))
            .await?;
        Ok(())
    }

    /// Applies a JSON-patch document and discards the response body.
    pub(crate) async fn patch(
        &self,
        operation: &str,
        url: &Url,
        operations: &[JsonPatchOperation],
    ) -> IscResult<()> {
        let body = (JSON_PATCH, serde_json::to_vec(operations)?);
        self.send(operation, Method::PATCH, url, &[], Some(body))
            .await?;
        Ok(())
    }

    /// Sends a request through the retry policy and returns the successful response.
    async fn send(
        &self,
        operation: &str,
        method: Method,
        url: &Url,
        query: Query<'_>,
        body: Option<Body>,
    ) -> IscResult<Response> {
        let method = &method;
        let body = body.as_ref();
        self.retry_policy
            .execute(operation, move || self.send_once(method, url, query, body))
            .await
    }

    async fn send_once(
        &self,
        method: &Method,
        url: &Url,
        query: Query<'_>,
        body: Option<&Body>,
    ) -> IscResult<Response> {
        let token = self.token_cache.get_token().await?;

        let mut request = self
            .http_client
            .request(method.clone(), url.clone())
            .bearer_auth(token)
            .header(ACCEPT, JSON);

        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some((content_type, bytes)) = body {
            request = request.header(CONTENT_TYPE, *content_type).body(bytes.clone());
        }

        debug!(%method, url = %url, "Sending ISC request");
        let response = request.send().await.map_err(IscError::Network)?;
        self.check_status(url, response).await
    }

    async fn check_status(&self, url: &Url, response: Response) -> IscResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let body = response.text().await.unwrap_or_default();

        match status {
            StatusCode::UNAUTHORIZED => {
                self.token_cache.invalidate().await;
                Err(IscError::Auth(format!(
                    "API rejected access token (401): {body}"
                )))
            }
            StatusCode::NOT_FOUND => Err(IscError::NotFound(url.path().to_string())),
            StatusCode::TOO_MANY_REQUESTS => {
                warn!(url = %url, ?retry_after, "ISC API rate limited");
                Err(IscError::RateLimited {
                    retry_after_secs: retry_after,
                })
            }
            _ => Err(IscError::Api {
                status: status.as_u16(),
                message: if body.is_empty() {
                    status.to_string()
                } else {
                    body
                },
            }),
        }
    }
}

/// Reads the total record count from the pagination header.
fn parse_total_count(headers: &HeaderMap) -> IscResult<u64> {
    let value = headers
        .get(TOTAL_COUNT_HEADER)
        .ok_or_else(|| IscError::Parse("Response is missing the X-Total-Count header".into()))?;

    let value = value
        .to_str()
        .map_err(|e| IscError::Parse(format!("Unreadable X-Total-Count header: {e}")))?;

    value
        .trim()
        .parse::<u64>()
        .map_err(|e| IscError::Parse(format!("Invalid X-Total-Count header {value:?}: {e}")))
}

async fn decode_json<T: DeserializeOwned>(response: Response) -> IscResult<T> {
    let body = response.text().await.map_err(IscError::Network)?;
    serde_json::from_str(&body)
        .map_err(|e| IscError::Parse(format!("Failed to parse response body: {e}")))
}
