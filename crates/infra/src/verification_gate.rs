//! Business verification pipeline.
//!
//! ```text
//! verify(account, tax id)
//!   ↓
//! 0. Environment gate (decided once at construction)
//!   ↓
//! 1. Load account (fresh from the store)
//!   ↓
//! 2. Submit: validate the identifier (Unverified/Verified → Pending)
//!   ↓
//! 3. Registry lookup
//!   ↓
//! 4. Resolve (Pending → Verified | Rejected)
//!   ↓
//! 5. Commit: record + tier upgrade in one store operation
//! ```
//!
//! Outside development the gate holds no registry at all, so there is no
//! lookup path to reach: every request short-circuits at step 0 before the
//! identifier is even parsed.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use agrocat_accounts::{Account, VerificationRecord, VerificationState};
use agrocat_core::{AccountId, DomainError};

use crate::config::Environment;
use crate::registry::{RegistryError, RegistryLookup};
use crate::store::{AccountStore, StoreError};

/// Fixed message for gated requests; never depends on the identifier.
pub const SERVICE_UNAVAILABLE_MESSAGE: &str =
    "business verification is temporarily unavailable";

const NOT_FOUND_MESSAGE: &str = "tax id not found in the registry";

/// Result of a verification attempt. These are outcomes, not failures.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum VerificationOutcome {
    Verified {
        account: Account,
        record: VerificationRecord,
        /// An earlier record existed and was replaced.
        replaced: bool,
    },
    Invalid {
        reason: String,
    },
    NotFound,
    ServiceUnavailable,
}

impl VerificationOutcome {
    pub fn message(&self) -> &str {
        match self {
            VerificationOutcome::Verified { .. } => "verification successful",
            VerificationOutcome::Invalid { reason } => reason,
            VerificationOutcome::NotFound => NOT_FOUND_MESSAGE,
            VerificationOutcome::ServiceUnavailable => SERVICE_UNAVAILABLE_MESSAGE,
        }
    }

    pub fn is_verified(&self) -> bool {
        matches!(self, VerificationOutcome::Verified { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            VerificationOutcome::Verified { .. } => "verified",
            VerificationOutcome::Invalid { .. } => "invalid",
            VerificationOutcome::NotFound => "not_found",
            VerificationOutcome::ServiceUnavailable => "service_unavailable",
        }
    }
}

/// Unexpected faults only; every expected branch is a [`VerificationOutcome`].
#[derive(Debug, Error)]
pub enum GateError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

#[derive(Debug)]
enum Mode<R> {
    Disabled,
    Enabled(R),
}

/// Gate around the registry lookup and the verification commit.
///
/// The registry is only ever constructed for [`Environment::Development`];
/// the mode cannot change after construction.
#[derive(Debug)]
pub struct VerificationGate<S, R> {
    store: S,
    mode: Mode<R>,
}

impl<S, R> VerificationGate<S, R> {
    /// `make_registry` is called only in development.
    pub fn for_environment<F>(environment: Environment, store: S, make_registry: F) -> Self
    where
        F: FnOnce() -> R,
    {
        let mode = if environment.is_development() {
            Mode::Enabled(make_registry())
        } else {
            Mode::Disabled
        };
        tracing::info!(
            environment = %environment,
            enabled = matches!(mode, Mode::Enabled(_)),
            "verification gate configured"
        );
        Self { store, mode }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self.mode, Mode::Enabled(_))
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S, R> VerificationGate<S, R>
where
    S: AccountStore,
    R: RegistryLookup,
{
    pub fn verify(
        &self,
        account_id: AccountId,
        raw_tax_id: &str,
    ) -> Result<VerificationOutcome, GateError> {
        self.verify_at(account_id, raw_tax_id, Utc::now())
    }

    pub fn verify_at(
        &self,
        account_id: AccountId,
        raw_tax_id: &str,
        at: DateTime<Utc>,
    ) -> Result<VerificationOutcome, GateError> {
        let registry = match &self.mode {
            Mode::Enabled(registry) => registry,
            Mode::Disabled => {
                tracing::warn!(%account_id, "verification rejected: registry disabled in this environment");
                return Ok(VerificationOutcome::ServiceUnavailable);
            }
        };

        let account = self.store.account(account_id)?;
        let current = &account.verification;

        let pending = match current.submit(raw_tax_id, at) {
            Ok(pending) => pending,
            Err(DomainError::Validation(reason)) => {
                tracing::debug!(%account_id, %reason, "verification input rejected");
                return Ok(VerificationOutcome::Invalid { reason });
            }
            Err(other) => return Err(other.into()),
        };
        let tax_id = match &pending {
            VerificationState::Pending { tax_id, .. } => tax_id.clone(),
            other => {
                return Err(DomainError::invariant(format!(
                    "submit produced state '{}'",
                    other.name()
                ))
                .into());
            }
        };

        let company = registry.lookup(&tax_id)?;
        let resolved = pending
            .resolve(company.as_ref(), at, current.carried_pricing_tier())
            .map_err(|e| match e {
                DomainError::InvariantViolation(msg) => GateError::Registry(RegistryError::Malformed(msg)),
                other => GateError::Domain(other),
            })?;

        match resolved {
            VerificationState::Verified { record } => {
                let replaced = current.is_verified();
                let account = self.store.commit_verification(account_id, record.clone())?;
                tracing::info!(
                    %account_id,
                    tax_id = %tax_id.masked(),
                    replaced,
                    pricing_tier = ?record.pricing_tier,
                    "business verification succeeded"
                );
                Ok(VerificationOutcome::Verified {
                    account,
                    record,
                    replaced,
                })
            }
            VerificationState::Rejected { .. } => {
                tracing::warn!(%account_id, tax_id = %tax_id.masked(), "tax id not found in registry");
                Ok(VerificationOutcome::NotFound)
            }
            other => Err(DomainError::invariant(format!(
                "resolve produced state '{}'",
                other.name()
            ))
            .into()),
        }
    }
}
