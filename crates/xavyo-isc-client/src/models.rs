//! ISC resource representations.

use serde::{Deserialize, Serialize};

/// Source (connected system) definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub id: String,
    pub name: String,
}

/// Account on a source.
///
/// An account with no `identity_id` is uncorrelated ("orphan").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub source_id: Option<String>,
    #[serde(default)]
    pub source_name: Option<String>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub identity_id: Option<String>,
    #[serde(default)]
    pub uncorrelated: Option<bool>,
    #[serde(default)]
    pub native_identity: Option<String>,
}

impl Account {
    /// Whether the account has no owning identity.
    #[must_use]
    pub fn is_orphan(&self) -> bool {
        self.identity_id.as_deref().map_or(true, str::is_empty)
    }
}

/// Entitlement as listed by `/beta/entitlements`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementRecord {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub requestable: bool,
}

/// Identity hit from the search index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityDocument {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Single JSON-patch (RFC 6902) operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonPatchOperation {
    pub op: &'static str,
    pub path: String,
    pub value: serde_json::Value,
}

impl JsonPatchOperation {
    /// `replace` operation on `path`.
    pub fn replace(path: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            op: "replace",
            path: path.into(),
            value: value.into(),
        }
    }
}

/// Body of `/beta/accounts/{id}/enable` and `/disable`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AccountToggleRequest {
    pub force_provisioning: bool,
}

/// Body of `/v3/search`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchRequest {
    pub indices: Vec<&'static str>,
    pub query: SearchQuery,
    pub include_nested: bool,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct SearchQuery {
    pub query: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_parsing() {
        let json = serde_json::json!({
            "id": "2c9180835d2e5168015d32f890ca1581",
            "name": "john.doe",
            "sourceId": "2c9180855d191c59015d28583727245a",
            "sourceName": "Active Directory",
            "disabled": true,
            "locked": false,
            "identityId": null,
            "uncorrelated": true,
            "nativeIdentity": "CN=John Doe,OU=Users"
        });

        let account: Account = serde_json::from_value(json).unwrap();
        assert_eq!(account.name.as_deref(), Some("john.doe"));
        assert_eq!(account.source_name.as_deref(), Some("Active Directory"));
        assert!(account.disabled);
        assert!(account.is_orphan());
    }

    #[test]
    fn test_account_minimal_and_correlated() {
        let json = serde_json::json!({ "id": "acc-1", "identityId": "id-9" });
        let account: Account = serde_json::from_value(json).unwrap();
        assert!(account.name.is_none());
        assert!(!account.disabled);
        assert!(!account.is_orphan());
    }

    #[test]
    fn test_json_patch_serialization() {
        let op = JsonPatchOperation::replace("/identityId", "id-1");
        let json = serde_json::to_value(vec![op]).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{ "op": "replace", "path": "/identityId", "value": "id-1" }])
        );
    }

    #[test]
    fn test_search_request_serialization() {
        let request = SearchRequest {
            indices: vec!["identities"],
            query: SearchQuery {
                query: "name.exact:\"jdoe\"".into(),
            },
            include_nested: false,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["indices"][0], "identities");
        assert_eq!(json["query"]["query"], "name.exact:\"jdoe\"");
        assert_eq!(json["includeNested"], false);
    }
}
