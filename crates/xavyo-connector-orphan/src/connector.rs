//! Orphan account connector.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use xavyo_isc_client::{Account, Filter, IscClient};

use crate::config::OrphanConnectorConfig;
use crate::dispatcher::{AttributeChange, ChangeOp, LifecycleDispatcher};
use crate::error::{ConnectorError, ConnectorResult};
use crate::projection::{
    project_account, project_entitlement, AccountSchema, ProjectedAccount, ProjectedEntitlement,
};

/// Exposes uncorrelated accounts of the configured sources as accounts and
/// group entitlements.
#[derive(Debug, Clone)]
pub struct OrphanConnector {
    config: OrphanConnectorConfig,
    client: Arc<IscClient>,
}

impl OrphanConnector {
    /// Validates `config` and builds the API client.
    pub fn new(config: OrphanConnectorConfig) -> ConnectorResult<Self> {
        config.validate()?;
        let client = IscClient::new(&config.base_url, config.credentials())?;
        Ok(Self::with_client(config, client))
    }

    /// Builds a connector around an existing client.
    pub fn with_client(config: OrphanConnectorConfig, client: IscClient) -> Self {
        Self {
            config,
            client: Arc::new(client),
        }
    }

    /// Connector configuration.
    pub fn config(&self) -> &OrphanConnectorConfig {
        &self.config
    }

    /// Underlying API client.
    pub fn client(&self) -> &Arc<IscClient> {
        &self.client
    }

    /// Orphan accounts of every configured source.
    async fn orphan_accounts(&self) -> ConnectorResult<Vec<Account>> {
        let source_ids = self.client.resolve_source_ids(&self.config.sources).await?;
        debug!(sources = source_ids.len(), "Resolved configured sources");

        Ok(self
            .client
            .list_orphan_accounts(&source_ids, self.config.only_enabled)
            .await?)
    }

    /// Fresh account snapshot, failing when it cannot be read.
    async fn fetch_account(&self, id: &str) -> ConnectorResult<Account> {
        self.client
            .get_account(id)
            .await
            .ok_or_else(|| ConnectorError::AccountNotFound {
                account_id: id.to_string(),
            })
    }

    async fn fetch_projected(
        &self,
        id: &str,
        schema: Option<&AccountSchema>,
    ) -> ConnectorResult<ProjectedAccount> {
        let account = self.fetch_account(id).await?;
        project_account(&account, self.config.identity_key_strategy, schema)
    }

    /// Marks the connector's own entitlements requestable.
    async fn make_own_entitlements_requestable(&self) -> ConnectorResult<()> {
        let Some(source_id) = self.config.connector_source_id.as_deref() else {
            warn!("makeEntitlementsRequestable is set but connectorSourceId is missing, skipping");
            return Ok(());
        };

        let filter = Filter::eq("source.id", source_id);
        let entitlements = self.client.list_entitlements(Some(&filter)).await?;

        let mut updated = 0usize;
        for entitlement in entitlements.iter().filter(|e| !e.requestable) {
            self.client
                .make_entitlement_requestable(&entitlement.id)
                .await?;
            updated += 1;
        }

        info!(
            source_id,
            total = entitlements.len(),
            updated,
            "Entitlements marked requestable"
        );
        Ok(())
    }
}

#[async_trait]
impl LifecycleDispatcher for OrphanConnector {
    #[instrument(skip(self))]
    async fn test_connection(&self) -> ConnectorResult<()> {
        self.client
            .test_connection()
            .await
            .map_err(|source| ConnectorError::UnableToConnect { source })
    }

    #[instrument(skip(self, schema))]
    async fn list_accounts(
        &self,
        schema: Option<&AccountSchema>,
    ) -> ConnectorResult<Vec<ProjectedAccount>> {
        info!("Account list");
        self.orphan_accounts()
            .await?
            .iter()
            .map(|account| project_account(account, self.config.identity_key_strategy, schema))
            .collect()
    }

    #[instrument(skip(self, schema))]
    async fn read_account(
        &self,
        id: &str,
        schema: Option<&AccountSchema>,
    ) -> ConnectorResult<ProjectedAccount> {
        self.fetch_projected(id, schema).await
    }

    #[instrument(skip(self, schema))]
    async fn create_account(
        &self,
        identity_name: &str,
        account_id: &str,
        schema: Option<&AccountSchema>,
    ) -> ConnectorResult<ProjectedAccount> {
        let identity = self
            .client
            .resolve_identity_by_uid(identity_name)
            .await?
            .ok_or_else(|| ConnectorError::IdentityNotFound {
                name: identity_name.to_string(),
            })?;

        self.client
            .correlate_account(&identity.id, account_id)
            .await?;

        let account = self.fetch_projected(account_id, schema).await?;
        info!(account_id, identity_id = %identity.id, "Orphan account correlated");
        Ok(account)
    }

    #[instrument(skip(self, changes, schema), fields(changes = changes.len()))]
    async fn update_account(
        &self,
        id: &str,
        changes: &[AttributeChange],
        schema: Option<&AccountSchema>,
    ) -> ConnectorResult<ProjectedAccount> {
        for change in changes {
            match &change.op {
                ChangeOp::Add => {
                    for value in change.values() {
                        info!(value = %value, "Skipping entitlement add request for orphan account");
                    }
                }
                ChangeOp::Remove => {
                    for value in change.values() {
                        self.client.disable_account(&value).await?;
                    }
                }
                ChangeOp::Other(op) => {
                    return Err(ConnectorError::UnsupportedOperation {
                        operation: op.clone(),
                    });
                }
            }
        }

        self.fetch_projected(id, schema).await
    }

    #[instrument(skip(self, schema))]
    async fn enable_account(
        &self,
        id: &str,
        schema: Option<&AccountSchema>,
    ) -> ConnectorResult<ProjectedAccount> {
        self.client.enable_account(id).await?;
        self.fetch_projected(id, schema).await
    }

    #[instrument(skip(self, schema))]
    async fn disable_account(
        &self,
        id: &str,
        schema: Option<&AccountSchema>,
    ) -> ConnectorResult<ProjectedAccount> {
        self.client.disable_account(id).await?;
        self.fetch_projected(id, schema).await
    }

    #[instrument(skip(self))]
    async fn list_entitlements(&self) -> ConnectorResult<Vec<ProjectedEntitlement>> {
        if self.config.make_entitlements_requestable {
            self.make_own_entitlements_requestable().await?;
        }

        let entitlements: Vec<ProjectedEntitlement> = self
            .orphan_accounts()
            .await?
            .iter()
            .map(project_entitlement)
            .collect();

        info!(count = entitlements.len(), "Entitlement list");
        Ok(entitlements)
    }

    #[instrument(skip(self))]
    async fn read_entitlement(&self, id: &str) -> ConnectorResult<ProjectedEntitlement> {
        let account = self.fetch_account(id).await?;
        Ok(project_entitlement(&account))
    }
}
