//! Entitlement listing and requestability.

use tracing::{info, instrument};

use crate::client::PAGE_SIZE;
use crate::filter::Filter;
use crate::models::{EntitlementRecord, JsonPatchOperation};
use crate::{IscClient, IscResult};

const ENTITLEMENTS_PATH: &str = "/beta/entitlements";

impl IscClient {
    /// Lists entitlements matching `filters`.
    #[instrument(skip(self, filters))]
    pub async fn list_entitlements(
        &self,
        filters: Option<&Filter>,
    ) -> IscResult<Vec<EntitlementRecord>> {
        self.fetch_all(ENTITLEMENTS_PATH, filters, PAGE_SIZE).await
    }

    /// Marks an entitlement requestable (`replace /requestable`).
    #[instrument(skip(self))]
    pub async fn make_entitlement_requestable(&self, id: &str) -> IscResult<()> {
        info!(entitlement_id = %id, "Making entitlement requestable");

        let url = self.url(&["beta", "entitlements", id])?;
        let operations = [JsonPatchOperation::replace("/requestable", true)];
        self.patch("make_entitlement_requestable", &url, &operations)
            .await
    }
}
