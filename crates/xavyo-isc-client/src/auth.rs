//! `OAuth2` client-credentials authentication against the ISC token endpoint.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, instrument};
use url::Url;

use crate::{IscError, IscResult};

/// Path of the token endpoint, resolved against the origin of the API base URL.
pub const TOKEN_URL_PATH: &str = "/oauth/token";

/// Client credentials for the ISC API (personal access token or API client).
#[derive(Debug, Clone)]
pub struct IscCredentials {
    /// `OAuth2` client id.
    pub client_id: String,
    /// `OAuth2` client secret.
    pub client_secret: SecretString,
}

impl IscCredentials {
    /// Creates credentials from a client id and secret.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::new(client_secret.into()),
        }
    }
}

/// Token grant response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
    #[serde(default)]
    #[allow(dead_code)]
    token_type: Option<String>,
}

/// Cached access token.
#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Token cache for the ISC API.
///
/// The cached token is replaced as a whole under a write lock, so concurrent
/// callers observe either the previous token or the new one. Two callers
/// racing an expired token may both refresh; the last write wins.
#[derive(Debug)]
pub struct TokenCache {
    credentials: IscCredentials,
    token_url: Url,
    http_client: reqwest::Client,
    cached_token: RwLock<Option<CachedToken>>,
}

impl TokenCache {
    /// Creates a token cache for the API rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the token endpoint cannot be derived from `base_url`.
    pub fn new(
        credentials: IscCredentials,
        base_url: &Url,
        http_client: reqwest::Client,
    ) -> IscResult<Self> {
        Ok(Self {
            credentials,
            token_url: token_endpoint(base_url)?,
            http_client,
            cached_token: RwLock::new(None),
        })
    }

    /// Token endpoint this cache grants against.
    #[must_use]
    pub fn token_url(&self) -> &Url {
        &self.token_url
    }

    /// Returns a valid access token, performing a grant if none is cached or
    /// the cached one has expired.
    #[instrument(skip(self), fields(client_id = %self.credentials.client_id))]
    pub async fn get_token(&self) -> IscResult<String> {
        {
            let cache = self.cached_token.read().await;
            if let Some(ref token) = *cache {
                if !token.is_expired(Instant::now()) {
                    return Ok(token.access_token.clone());
                }
            }
        }

        debug!("Refreshing access token");
        let token = self.acquire_token().await?;
        let access_token = token.access_token.clone();

        {
            let mut cache = self.cached_token.write().await;
            *cache = Some(token);
        }

        Ok(access_token)
    }

    /// Drops the cached token, forcing a grant on next use.
    pub async fn invalidate(&self) {
        let mut cache = self.cached_token.write().await;
        *cache = None;
    }

    async fn acquire_token(&self) -> IscResult<CachedToken> {
        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            (
                "client_secret",
                self.credentials.client_secret.expose_secret().as_str(),
            ),
            ("grant_type", "client_credentials"),
        ];

        let response = self
            .http_client
            .post(self.token_url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&params)
            .send()
            .await
            .map_err(|e| IscError::Auth(format!("Token request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(IscError::Auth(format!(
                "Token request failed with status {status}: {body}"
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| IscError::Auth(format!("Failed to parse token response: {e}")))?;

        debug!(
            expires_in = token_response.expires_in,
            "Acquired new access token"
        );

        let expires_at = Instant::now()
            .checked_add(Duration::from_secs(token_response.expires_in))
            .ok_or_else(|| {
                IscError::Auth(format!(
                    "Token expires_in out of range: {}",
                    token_response.expires_in
                ))
            })?;

        Ok(CachedToken {
            access_token: token_response.access_token,
            expires_at,
        })
    }
}

/// Derives `<origin>/oauth/token` from the API base URL.
fn token_endpoint(base_url: &Url) -> IscResult<Url> {
    let origin = base_url.origin();
    if !origin.is_tuple() {
        return Err(IscError::Config(format!(
            "Base URL has no usable origin: {base_url}"
        )));
    }
    Ok(Url::parse(&origin.ascii_serialization())?.join(TOKEN_URL_PATH)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cached_token_expiry() {
        let now = Instant::now();
        let token = CachedToken {
            access_token: "test".to_string(),
            expires_at: now + Duration::from_secs(600),
        };

        assert!(!token.is_expired(now));
        assert!(token.is_expired(now + Duration::from_secs(600)));
        assert!(token.is_expired(now + Duration::from_secs(601)));
    }

    #[test]
    fn test_token_endpoint_uses_origin() {
        let base = Url::parse("https://acme.api.identitynow.com/some/prefix").unwrap();
        assert_eq!(
            token_endpoint(&base).unwrap().as_str(),
            "https://acme.api.identitynow.com/oauth/token"
        );

        let base = Url::parse("http://127.0.0.1:8080").unwrap();
        assert_eq!(
            token_endpoint(&base).unwrap().as_str(),
            "http://127.0.0.1:8080/oauth/token"
        );
    }

    #[test]
    fn test_token_endpoint_rejects_opaque_origin() {
        let base = Url::parse("data:text/plain,hello").unwrap();
        assert!(matches!(token_endpoint(&base), Err(IscError::Config(_))));
    }

    #[test]
    fn test_credentials_debug_redacts_secret() {
        let credentials = IscCredentials::new("client-1", "super-secret");
        let debug = format!("{credentials:?}");
        assert!(debug.contains("client-1"));
        assert!(!debug.contains("super-secret"));
    }
}
