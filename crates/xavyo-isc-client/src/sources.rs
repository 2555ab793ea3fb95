//! Source listing and name-to-id resolution.

use tracing::{debug, instrument, warn};

use crate::client::PAGE_SIZE;
use crate::filter::Filter;
use crate::models::Source;
use crate::{IscClient, IscResult};

const SOURCES_PATH: &str = "/v3/sources";

impl IscClient {
    /// Lists every source definition.
    #[instrument(skip(self))]
    pub async fn list_sources(&self) -> IscResult<Vec<Source>> {
        self.fetch_all(SOURCES_PATH, None, PAGE_SIZE).await
    }

    /// Translates source names into source ids.
    ///
    /// Only exact name matches are returned, in the order the API lists them.
    /// Names with no matching source are logged and skipped.
    #[instrument(skip(self))]
    pub async fn resolve_source_ids(&self, names: &[String]) -> IscResult<Vec<String>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let filter = Filter::any_eq("name", names.iter().cloned());
        let sources: Vec<Source> = self.fetch_all(SOURCES_PATH, Some(&filter), PAGE_SIZE).await?;

        for name in names {
            if !sources.iter().any(|s| &s.name == name) {
                warn!(source = %name, "Configured source not found");
            }
        }

        let ids: Vec<String> = sources
            .into_iter()
            .filter(|s| names.contains(&s.name))
            .map(|s| s.id)
            .collect();

        debug!(count = ids.len(), "Resolved source ids");
        Ok(ids)
    }
}
