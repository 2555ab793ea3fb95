//! Common test utilities for xavyo-connector-orphan integration tests.

#![allow(dead_code)]

use secrecy::SecretString;
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use xavyo_connector_orphan::{IdentityKeyStrategy, OrphanConnector, OrphanConnectorConfig};
use xavyo_isc_client::{IscClient, RetryPolicy, TOTAL_COUNT_HEADER};

pub const SOURCE_NAME: &str = "Active Directory";
pub const SOURCE_ID: &str = "src-ad";

/// Test data factory for orphan accounts.
pub fn create_account(id: &str, name: Option<&str>, disabled: bool) -> Value {
    json!({
        "id": id,
        "name": name,
        "sourceId": SOURCE_ID,
        "sourceName": SOURCE_NAME,
        "disabled": disabled,
        "locked": false,
        "identityId": null,
        "uncorrelated": true
    })
}

/// Collection response with the pagination header set.
pub fn paged(body: Value) -> ResponseTemplate {
    let total = body.as_array().map_or(0, Vec::len);
    ResponseTemplate::new(200)
        .insert_header(TOTAL_COUNT_HEADER, total.to_string())
        .set_body_json(body)
}

/// Mock server wrapper with common setup helpers.
pub struct MockIscServer {
    pub server: MockServer,
}

impl MockIscServer {
    /// Creates a new mock server with the token endpoint mounted.
    pub async fn new() -> Self {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "mock-access-token",
                "token_type": "bearer",
                "expires_in": 3600
            })))
            .mount(&server)
            .await;

        Self { server }
    }

    /// Configuration pointing at this server.
    pub fn config(&self) -> OrphanConnectorConfig {
        OrphanConnectorConfig {
            base_url: self.server.uri(),
            client_id: "client".to_string(),
            client_secret: SecretString::new("secret".to_string()),
            sources: vec![SOURCE_NAME.to_string()],
            only_enabled: false,
            make_entitlements_requestable: false,
            identity_key_strategy: IdentityKeyStrategy::Fixed,
            connector_source_id: None,
        }
    }

    /// Connector with zero-delay retries.
    pub fn connector(&self) -> OrphanConnector {
        self.connector_with(self.config())
    }

    /// Connector with zero-delay retries and a custom configuration.
    pub fn connector_with(&self, config: OrphanConnectorConfig) -> OrphanConnector {
        let client = IscClient::new(&config.base_url, config.credentials())
            .expect("client should build")
            .with_retry_policy(RetryPolicy::new(1, Duration::ZERO));
        OrphanConnector::with_client(config, client)
    }

    /// Serves the configured source from `/v3/sources`.
    pub async fn mock_sources(&self) {
        Mock::given(method("GET"))
            .and(path("/v3/sources"))
            .respond_with(paged(json!([{ "id": SOURCE_ID, "name": SOURCE_NAME }])))
            .mount(&self.server)
            .await;
    }

    /// Serves `accounts` as the orphan accounts of the configured source.
    pub async fn mock_orphan_accounts(&self, accounts: Vec<Value>) {
        Mock::given(method("GET"))
            .and(path("/beta/accounts"))
            .and(query_param(
                "filters",
                format!(r#"sourceId in ("{SOURCE_ID}") and uncorrelated eq true"#).as_str(),
            ))
            .respond_with(paged(Value::Array(accounts)))
            .mount(&self.server)
            .await;
    }

    /// Serves a single account.
    pub async fn mock_account(&self, account: Value) {
        let id = account["id"].as_str().unwrap_or_default().to_string();
        Mock::given(method("GET"))
            .and(path(format!("/beta/accounts/{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(account))
            .mount(&self.server)
            .await;
    }

    /// Expects `count` disable calls for account `id`.
    pub async fn expect_disable(&self, id: &str, count: u64) {
        Mock::given(method("POST"))
            .and(path(format!("/beta/accounts/{id}/disable")))
            .respond_with(ResponseTemplate::new(202).set_body_json(json!({"id": "task"})))
            .expect(count)
            .mount(&self.server)
            .await;
    }

    /// Expects `count` enable calls for account `id`.
    pub async fn expect_enable(&self, id: &str, count: u64) {
        Mock::given(method("POST"))
            .and(path(format!("/beta/accounts/{id}/enable")))
            .respond_with(ResponseTemplate::new(202).set_body_json(json!({"id": "task"})))
            .expect(count)
            .mount(&self.server)
            .await;
    }
}
