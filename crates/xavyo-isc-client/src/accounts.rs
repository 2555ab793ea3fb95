//! Account operations: orphan listing, lookup, enable/disable and correlation.

use tracing::{debug, info, instrument, warn};

use crate::client::PAGE_SIZE;
use crate::filter::Filter;
use crate::models::{Account, AccountToggleRequest, JsonPatchOperation};
use crate::{IscClient, IscResult};

const ACCOUNTS_PATH: &str = "/beta/accounts";

impl IscClient {
    /// Lists uncorrelated accounts on the given sources.
    ///
    /// The upstream filter cannot express `disabled eq false`, so
    /// `only_enabled` is applied to the fetched records. Records that already
    /// carry an identity are dropped even if the index still flags them.
    #[instrument(skip(self))]
    pub async fn list_orphan_accounts(
        &self,
        source_ids: &[String],
        only_enabled: bool,
    ) -> IscResult<Vec<Account>> {
        if source_ids.is_empty() {
            debug!("No sources selected, skipping account query");
            return Ok(Vec::new());
        }

        let filter = Filter::is_in("sourceId", source_ids.iter().cloned())
            .and(Filter::eq_bool("uncorrelated", true));

        let mut accounts: Vec<Account> = self
            .fetch_all(ACCOUNTS_PATH, Some(&filter), PAGE_SIZE)
            .await?;

        accounts.retain(|account| account.is_orphan() && !(only_enabled && account.disabled));

        info!(count = accounts.len(), "Listed orphan accounts");
        Ok(accounts)
    }

    /// Fetches an account, treating any failure as absence.
    #[instrument(skip(self))]
    pub async fn get_account(&self, id: &str) -> Option<Account> {
        let result = match self.url(&["beta", "accounts", id]) {
            Ok(url) => self.get_json::<Account>("get_account", &url, &[]).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(account) => Some(account),
            Err(e) => {
                warn!(account_id = %id, status = ?e.status(), error = %e, "Account lookup failed");
                None
            }
        }
    }

    /// Enables an account on its source. Re-fetch to observe the new state.
    #[instrument(skip(self))]
    pub async fn enable_account(&self, id: &str) -> IscResult<()> {
        self.toggle_account(id, "enable").await
    }

    /// Disables an account on its source. Re-fetch to observe the new state.
    #[instrument(skip(self))]
    pub async fn disable_account(&self, id: &str) -> IscResult<()> {
        self.toggle_account(id, "disable").await
    }

    async fn toggle_account(&self, id: &str, action: &str) -> IscResult<()> {
        info!(account_id = %id, action, "Toggling account");

        let url = self.url(&["beta", "accounts", id, action])?;
        let body = AccountToggleRequest {
            force_provisioning: true,
        };
        self.post(action, &url, &body).await
    }

    /// Assigns the account to an identity (`replace /identityId`).
    #[instrument(skip(self))]
    pub async fn correlate_account(&self, identity_id: &str, account_id: &str) -> IscResult<()> {
        info!(account_id, identity_id, "Correlating account");

        let url = self.url(&["beta", "accounts", account_id])?;
        let operations = [JsonPatchOperation::replace("/identityId", identity_id)];
        self.patch("correlate_account", &url, &operations).await
    }
}
