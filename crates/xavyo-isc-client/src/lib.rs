//! Identity Security Cloud client for xavyo
//!
//! Talks to the ISC REST API on behalf of the orphan account connector.
//!
//! # Features
//!
//! - `OAuth2` client credentials with an expiry-driven token cache
//! - Offset pagination driven by the `X-Total-Count` header
//! - Bounded exponential retry on network errors, 5xx and 429
//! - Escaped filter expressions for collection queries
//! - Account, source, entitlement and identity-search operations
//!
//! # Example
//!
//! ```no_run
//! use xavyo_isc_client::{IscClient, IscCredentials};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = IscClient::new(
//!     "https://acme.api.identitynow.com",
//!     IscCredentials::new("client-id", "client-secret"),
//! )?;
//!
//! let source_ids = client.resolve_source_ids(&["Active Directory".to_string()]).await?;
//! let orphans = client.list_orphan_accounts(&source_ids, true).await?;
//! println!("{} orphan accounts", orphans.len());
//! # Ok(())
//! # }
//! ```

mod accounts;
mod auth;
mod client;
mod entitlements;
mod error;
pub mod filter;
pub mod models;
mod retry;
mod search;
mod sources;

// Re-exports
pub use auth::{IscCredentials, TokenCache, TOKEN_URL_PATH};
pub use client::{IscClient, PAGE_SIZE, TOTAL_COUNT_HEADER};
pub use error::{IscError, IscResult};
pub use filter::Filter;
pub use models::{Account, EntitlementRecord, IdentityDocument, Source};
pub use retry::{RetryPolicy, DEFAULT_BASE_DELAY, DEFAULT_MAX_RETRIES};
