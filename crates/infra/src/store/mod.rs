//! Storage abstractions for the catalog and customer accounts.
//!
//! The traits are synchronous and object-safe; in-memory implementations are
//! provided for tests, the CLI and development deployments.

pub mod accounts;
pub mod catalog;

use thiserror::Error;

use agrocat_core::{AccountId, ProductId};

pub use accounts::{AccountStore, InMemoryAccountStore};
pub use catalog::{CatalogSnapshot, CatalogStore, InMemoryCatalogStore};

/// Backing-store fault.
///
/// These are infrastructure errors, as opposed to caller-fixable domain errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("account not found: {0}")]
    AccountNotFound(AccountId),

    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    #[error("duplicate {what}: {key}")]
    Duplicate { what: &'static str, key: String },

    /// The tax identifier is already bound to a different verified account.
    #[error("tax id {masked} is already verified for another account")]
    TaxIdTaken { masked: String },

    #[error("storage error: {0}")]
    Storage(String),
}

impl StoreError {
    pub(crate) fn poisoned() -> Self {
        StoreError::Storage("lock poisoned".to_string())
    }
}
