//! Common test utilities for xavyo-isc-client integration tests.

#![allow(dead_code)]

use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use xavyo_isc_client::{IscClient, IscCredentials, RetryPolicy, TOTAL_COUNT_HEADER};

pub const CLIENT_ID: &str = "test-client-id";
pub const CLIENT_SECRET: &str = "test-client-secret";
pub const ACCESS_TOKEN: &str = "mock-access-token";

/// Test data factory for ISC accounts.
pub fn create_account(id: &str, name: Option<&str>, source_id: &str, source_name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "sourceId": source_id,
        "sourceName": source_name,
        "disabled": false,
        "locked": false,
        "identityId": null,
        "uncorrelated": true
    })
}

/// Test data factory for disabled ISC accounts.
pub fn create_disabled_account(id: &str, source_id: &str, source_name: &str) -> Value {
    let mut account = create_account(id, Some(id), source_id, source_name);
    account["disabled"] = json!(true);
    account
}

/// Test data factory for sources.
pub fn create_source(id: &str, name: &str) -> Value {
    json!({ "id": id, "name": name })
}

/// Generates `count` orphan accounts on one source.
pub fn generate_accounts(count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| {
            create_account(
                &format!("acc-{i}"),
                Some(&format!("user{i}")),
                "src-1",
                "Active Directory",
            )
        })
        .collect()
}

/// Creates a mock OAuth token response.
pub fn create_token_response(access_token: &str, expires_in: u64) -> Value {
    json!({
        "access_token": access_token,
        "token_type": "bearer",
        "expires_in": expires_in
    })
}

/// Mock server wrapper with common setup helpers.
pub struct MockIscServer {
    pub server: MockServer,
}

impl MockIscServer {
    /// Creates a new mock ISC API server.
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Returns the mock server's base URL.
    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Client pointed at this server with zero-delay retries.
    pub fn client(&self) -> IscClient {
        self.client_with_retries(5)
    }

    /// Client pointed at this server with `max_retries` zero-delay retries.
    pub fn client_with_retries(&self, max_retries: u32) -> IscClient {
        IscClient::new(&self.url(), IscCredentials::new(CLIENT_ID, CLIENT_SECRET))
            .expect("client should build")
            .with_retry_policy(RetryPolicy::new(max_retries, Duration::ZERO))
    }

    /// Sets up the token endpoint with a one-hour token.
    pub async fn mock_token_endpoint(&self) {
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(create_token_response(ACCESS_TOKEN, 3600)),
            )
            .mount(&self.server)
            .await;
    }

    /// Serves `records` from `endpoint` in pages of `page_size`, one mock per
    /// offset, each expected exactly once.
    pub async fn mock_paged(&self, endpoint: &str, records: Vec<Value>, page_size: usize) {
        let total = records.len();
        let mut pages: Vec<Vec<Value>> = records.chunks(page_size).map(<[Value]>::to_vec).collect();
        if pages.is_empty() {
            pages.push(Vec::new());
        }

        for (i, page) in pages.into_iter().enumerate() {
            Mock::given(method("GET"))
                .and(path(endpoint))
                .and(query_param("count", "true"))
                .and(query_param("limit", page_size.to_string()))
                .and(query_param("offset", (i * page_size).to_string()))
                .respond_with(
                    ResponseTemplate::new(200)
                        .insert_header(TOTAL_COUNT_HEADER, total.to_string())
                        .set_body_json(page),
                )
                .expect(1)
                .mount(&self.server)
                .await;
        }
    }

    /// Number of GET requests received so far.
    pub async fn get_request_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.method.as_str() == "GET")
            .count()
    }
}
