//! Identity lookup through the search index.

use tracing::{debug, instrument};

use crate::filter::escape_filter_value;
use crate::models::{IdentityDocument, SearchQuery, SearchRequest};
use crate::{IscClient, IscResult};

const SEARCH_PATH: &str = "/v3/search";
const IDENTITIES_INDEX: &str = "identities";

impl IscClient {
    /// Finds an identity by exact name.
    #[instrument(skip(self))]
    pub async fn resolve_identity_by_name(&self, name: &str) -> IscResult<Option<IdentityDocument>> {
        self.search_identity(format!("name.exact:\"{}\"", escape_filter_value(name)))
            .await
    }

    /// Finds an identity by exact `uid` attribute.
    #[instrument(skip(self))]
    pub async fn resolve_identity_by_uid(&self, uid: &str) -> IscResult<Option<IdentityDocument>> {
        self.search_identity(format!(
            "attributes.uid.exact:\"{}\"",
            escape_filter_value(uid)
        ))
        .await
    }

    async fn search_identity(&self, query: String) -> IscResult<Option<IdentityDocument>> {
        let url = self.path_url(SEARCH_PATH)?;
        let request = SearchRequest {
            indices: vec![IDENTITIES_INDEX],
            query: SearchQuery { query },
            include_nested: false,
        };

        let hits: Vec<IdentityDocument> = self
            .post_json("search_identity", &url, &[("limit", "1".to_string())], &request)
            .await?;

        debug!(hits = hits.len(), "Identity search completed");
        Ok(hits.into_iter().next())
    }
}
