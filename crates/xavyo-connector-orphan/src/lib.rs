//! Orphan account connector for xavyo
//!
//! Surfaces accounts that no identity owns in Identity Security Cloud so they
//! can be reviewed, correlated to an owner or disabled.
//!
//! # Features
//!
//! - Lists uncorrelated accounts of the configured sources
//! - Projects each one as an account and as a `group` entitlement
//! - Correlates an account to an identity resolved by `uid`
//! - Disables accounts through entitlement removal or directly
//! - Optionally marks the connector's own entitlements requestable
//!
//! # Example
//!
//! ```no_run
//! use xavyo_connector_orphan::{LifecycleDispatcher, OrphanConnector, OrphanConnectorConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = OrphanConnectorConfig::from_json(r#"{
//!     "baseurl": "https://acme.api.identitynow.com",
//!     "clientId": "client-id",
//!     "clientSecret": "client-secret",
//!     "sources": ["Active Directory"],
//!     "onlyEnabled": true
//! }"#)?;
//!
//! let connector = OrphanConnector::new(config)?;
//! connector.test_connection().await?;
//!
//! for account in connector.list_accounts(None).await? {
//!     println!("{}", account.uuid);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod connector;
pub mod dispatcher;
pub mod error;
pub mod projection;

// Re-exports
pub use config::{ConfigError, OrphanConnectorConfig};
pub use connector::OrphanConnector;
pub use dispatcher::{AttributeChange, ChangeOp, LifecycleDispatcher};
pub use error::{ConnectorError, ConnectorResult};
pub use projection::{
    project_account, project_entitlement, AccountSchema, IdentityKeyStrategy, OrphanAttributes,
    ProjectedAccount, ProjectedEntitlement, ORPHAN_TAG,
};
