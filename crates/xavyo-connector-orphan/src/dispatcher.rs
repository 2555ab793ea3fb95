//! Lifecycle callbacks exposed to the connector host.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ConnectorResult;
use crate::projection::{AccountSchema, ProjectedAccount, ProjectedEntitlement};

/// Attribute change operation requested by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ChangeOp {
    Add,
    Remove,
    /// Any other operation (e.g. `Set`); rejected by the connector.
    Other(String),
}

impl From<String> for ChangeOp {
    fn from(op: String) -> Self {
        match op.as_str() {
            "Add" | "add" => Self::Add,
            "Remove" | "remove" => Self::Remove,
            _ => Self::Other(op),
        }
    }
}

impl From<ChangeOp> for String {
    fn from(op: ChangeOp) -> Self {
        match op {
            ChangeOp::Add => "Add".to_string(),
            ChangeOp::Remove => "Remove".to_string(),
            ChangeOp::Other(op) => op,
        }
    }
}

/// Single attribute change of an account update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeChange {
    pub op: ChangeOp,
    #[serde(default)]
    pub attribute: String,
    /// A single value or an array of values.
    #[serde(default)]
    pub value: serde_json::Value,
}

impl AttributeChange {
    pub fn new(op: ChangeOp, attribute: impl Into<String>, values: &[&str]) -> Self {
        Self {
            op,
            attribute: attribute.into(),
            value: serde_json::Value::from(values.to_vec()),
        }
    }

    /// Values of the change, flattened to strings.
    pub fn values(&self) -> Vec<String> {
        match &self.value {
            serde_json::Value::Null => Vec::new(),
            serde_json::Value::Array(items) => items.iter().filter_map(value_to_string).collect(),
            other => value_to_string(other).into_iter().collect(),
        }
    }
}

fn value_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Host lifecycle callbacks.
///
/// `schema` is the account schema the host passes with each account callback;
/// it is only consulted by the schema identity-key strategy.
#[async_trait]
pub trait LifecycleDispatcher: Send + Sync {
    /// Verify connectivity and credentials.
    async fn test_connection(&self) -> ConnectorResult<()>;

    /// List orphan accounts of the configured sources.
    async fn list_accounts(
        &self,
        schema: Option<&AccountSchema>,
    ) -> ConnectorResult<Vec<ProjectedAccount>>;

    /// Read a single account.
    async fn read_account(
        &self,
        id: &str,
        schema: Option<&AccountSchema>,
    ) -> ConnectorResult<ProjectedAccount>;

    /// Correlate the account to the identity whose `uid` is `identity_name`.
    async fn create_account(
        &self,
        identity_name: &str,
        account_id: &str,
        schema: Option<&AccountSchema>,
    ) -> ConnectorResult<ProjectedAccount>;

    /// Apply attribute changes, then return the refreshed account.
    async fn update_account(
        &self,
        id: &str,
        changes: &[AttributeChange],
        schema: Option<&AccountSchema>,
    ) -> ConnectorResult<ProjectedAccount>;

    /// Enable the account.
    async fn enable_account(
        &self,
        id: &str,
        schema: Option<&AccountSchema>,
    ) -> ConnectorResult<ProjectedAccount>;

    /// Disable the account.
    async fn disable_account(
        &self,
        id: &str,
        schema: Option<&AccountSchema>,
    ) -> ConnectorResult<ProjectedAccount>;

    /// List orphan accounts as group entitlements.
    async fn list_entitlements(&self) -> ConnectorResult<Vec<ProjectedEntitlement>>;

    /// Read a single entitlement.
    async fn read_entitlement(&self, id: &str) -> ConnectorResult<ProjectedEntitlement>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_change_op_from_str() {
        assert_eq!(ChangeOp::from("Add".to_string()), ChangeOp::Add);
        assert_eq!(ChangeOp::from("remove".to_string()), ChangeOp::Remove);
        assert_eq!(
            ChangeOp::from("Set".to_string()),
            ChangeOp::Other("Set".to_string())
        );
    }

    #[test]
    fn test_change_deserialize_scalar_and_array() {
        let change: AttributeChange =
            serde_json::from_value(json!({"op": "Remove", "attribute": "groups", "value": "a1"}))
                .unwrap();
        assert_eq!(change.op, ChangeOp::Remove);
        assert_eq!(change.values(), vec!["a1"]);

        let change: AttributeChange = serde_json::from_value(
            json!({"op": "Add", "attribute": "groups", "value": ["a1", "a2"]}),
        )
        .unwrap();
        assert_eq!(change.op, ChangeOp::Add);
        assert_eq!(change.values(), vec!["a1", "a2"]);
    }

    #[test]
    fn test_change_without_value() {
        let change: AttributeChange =
            serde_json::from_value(json!({"op": "Set", "attribute": "groups"})).unwrap();
        assert!(change.values().is_empty());
        assert_eq!(change.op, ChangeOp::Other("Set".to_string()));
    }

    #[test]
    fn test_change_op_serializes_as_string() {
        let change = AttributeChange::new(ChangeOp::Remove, "groups", &["a1"]);
        let json = serde_json::to_value(&change).unwrap();
        assert_eq!(json["op"], "Remove");
        assert_eq!(json["value"], json!(["a1"]));
    }
}
