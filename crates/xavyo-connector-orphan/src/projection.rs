//! Account projection
//!
//! Shapes ISC accounts into the attribute bags the connector host reads.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use xavyo_isc_client::Account;

use crate::error::{ConnectorError, ConnectorResult};

/// Tag carried by every projected record.
pub const ORPHAN_TAG: &str = "Orphan account";

/// Entitlement type of projected entitlements.
pub const ENTITLEMENT_TYPE: &str = "group";

const PLACEHOLDER: &str = "-";

/// How identity and display keys of a projected account are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityKeyStrategy {
    /// Keys come from the host-supplied account schema.
    Schema,
    /// Identity is the account id, display key is the synthesized display name.
    #[default]
    Fixed,
}

impl FromStr for IdentityKeyStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "schema" => Ok(Self::Schema),
            "fixed" => Ok(Self::Fixed),
            other => Err(format!("unknown identity key strategy '{other}'")),
        }
    }
}

impl fmt::Display for IdentityKeyStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schema => f.write_str("schema"),
            Self::Fixed => f.write_str("fixed"),
        }
    }
}

/// Host account schema: names the attributes used as identity and display keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSchema {
    pub identity_attribute: String,
    pub display_attribute: String,
}

/// Attribute bag of a projected record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrphanAttributes {
    pub tag: &'static str,
    pub name: String,
    pub display_name: String,
    pub id: String,
    pub description: String,
    pub enabled: bool,
    pub locked: bool,
    pub source: Option<String>,
}

impl OrphanAttributes {
    fn from_account(account: &Account, with_source_suffix: bool) -> Self {
        let name = account
            .name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(PLACEHOLDER)
            .to_string();
        let source = account.source_name.as_deref().unwrap_or(PLACEHOLDER);

        let display_name = if with_source_suffix {
            format!("{ORPHAN_TAG}: {name} ({source})")
        } else {
            format!("{ORPHAN_TAG}: {name}")
        };

        Self {
            tag: ORPHAN_TAG,
            description: format!("Source: {source}"),
            name,
            display_name,
            id: account.id.clone(),
            enabled: !account.disabled,
            locked: account.locked,
            source: account.source_name.clone(),
        }
    }

    /// Value of the attribute named `key`, as the host sees it.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "tag" => Some(self.tag.to_string()),
            "name" => Some(self.name.clone()),
            "displayName" => Some(self.display_name.clone()),
            "id" => Some(self.id.clone()),
            "description" => Some(self.description.clone()),
            "enabled" => Some(self.enabled.to_string()),
            "locked" => Some(self.locked.to_string()),
            "source" => self.source.clone(),
            _ => None,
        }
    }
}

/// Account as returned to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectedAccount {
    pub identity: String,
    pub uuid: String,
    pub attributes: OrphanAttributes,
    pub disabled: bool,
    pub locked: bool,
}

/// Entitlement (one per orphan account) as returned to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectedEntitlement {
    pub identity: String,
    pub uuid: String,
    #[serde(rename = "type")]
    pub entitlement_type: &'static str,
    pub attributes: OrphanAttributes,
}

/// Projects an account using the given key strategy.
///
/// # Errors
///
/// [`IdentityKeyStrategy::Schema`] fails with `InvalidInput` when no schema is
/// supplied or a schema attribute is not part of the bag.
pub fn project_account(
    account: &Account,
    strategy: IdentityKeyStrategy,
    schema: Option<&AccountSchema>,
) -> ConnectorResult<ProjectedAccount> {
    let attributes = OrphanAttributes::from_account(account, true);

    let (identity, uuid) = match strategy {
        IdentityKeyStrategy::Fixed => (attributes.id.clone(), attributes.display_name.clone()),
        IdentityKeyStrategy::Schema => {
            let schema = schema.ok_or_else(|| {
                ConnectorError::invalid_input("identity key strategy 'schema' requires an account schema")
            })?;
            (
                schema_value(&attributes, &schema.identity_attribute)?,
                schema_value(&attributes, &schema.display_attribute)?,
            )
        }
    };

    Ok(ProjectedAccount {
        identity,
        uuid,
        disabled: account.disabled,
        locked: account.locked,
        attributes,
    })
}

/// Projects an account as a group entitlement.
pub fn project_entitlement(account: &Account) -> ProjectedEntitlement {
    let attributes = OrphanAttributes::from_account(account, false);
    ProjectedEntitlement {
        identity: attributes.id.clone(),
        uuid: attributes.display_name.clone(),
        entitlement_type: ENTITLEMENT_TYPE,
        attributes,
    }
}

fn schema_value(attributes: &OrphanAttributes, key: &str) -> ConnectorResult<String> {
    attributes.get(key).ok_or_else(|| {
        ConnectorError::invalid_input(format!("schema attribute '{key}' has no value"))
    })
}
