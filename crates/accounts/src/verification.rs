//! Business verification lifecycle.
//!
//! ```text
//! Unverified ──submit──▶ Pending ──match──▶ Verified
//!                           │
//!                           └──no match──▶ Rejected
//! ```
//!
//! `Verified` always carries its [`VerificationRecord`]; there is no way to
//! represent a verified account without the registry data backing it.
//! Transitions are pure: they consume the current state and return the next one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use agrocat_core::{DomainError, DomainResult};

use crate::account::PricingTier;
use crate::registry::CompanyRecord;
use crate::tax_id::TaxId;

/// Persisted outcome of a successful registry check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub tax_id: TaxId,
    pub company_name: String,
    pub legal_address: String,
    pub vat_payer: bool,
    pub verified_at: DateTime<Utc>,
    /// Raw registry response, stored verbatim.
    pub registry_response: serde_json::Value,
    pub pricing_tier: PricingTier,
}

impl VerificationRecord {
    pub fn from_company(
        company: &CompanyRecord,
        verified_at: DateTime<Utc>,
        pricing_tier: PricingTier,
    ) -> Self {
        Self {
            tax_id: company.tax_id.clone(),
            company_name: company.company_name.clone(),
            legal_address: company.legal_address.clone(),
            vat_payer: company.vat_payer,
            verified_at,
            registry_response: company.raw_response(),
            pricing_tier,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum VerificationState {
    #[default]
    Unverified,
    Pending {
        tax_id: TaxId,
        submitted_at: DateTime<Utc>,
    },
    Verified {
        record: VerificationRecord,
    },
    Rejected {
        tax_id: TaxId,
        rejected_at: DateTime<Utc>,
    },
}

impl VerificationState {
    pub fn is_verified(&self) -> bool {
        matches!(self, VerificationState::Verified { .. })
    }

    pub fn record(&self) -> Option<&VerificationRecord> {
        match self {
            VerificationState::Verified { record } => Some(record),
            _ => None,
        }
    }

    /// Pricing sub-tier to carry into a new record: an existing record keeps
    /// its tier across re-verification, a first verification starts at retail.
    pub fn carried_pricing_tier(&self) -> PricingTier {
        self.record().map(|r| r.pricing_tier).unwrap_or_default()
    }

    /// Submit a tax identifier for verification.
    ///
    /// Allowed from every state except `Pending`. A verified account may
    /// re-verify; its stored record is only replaced if the new attempt matches.
    pub fn submit(&self, raw_tax_id: &str, at: DateTime<Utc>) -> DomainResult<VerificationState> {
        if let VerificationState::Pending { .. } = self {
            return Err(DomainError::conflict("a verification attempt is already pending"));
        }
        let tax_id = TaxId::parse(raw_tax_id)?;
        Ok(VerificationState::Pending {
            tax_id,
            submitted_at: at,
        })
    }

    /// Resolve a pending attempt with the registry's answer.
    pub fn resolve(
        self,
        lookup: Option<&CompanyRecord>,
        at: DateTime<Utc>,
        pricing_tier: PricingTier,
    ) -> DomainResult<VerificationState> {
        let tax_id = match self {
            VerificationState::Pending { tax_id, .. } => tax_id,
            other => {
                return Err(DomainError::conflict(format!(
                    "cannot resolve verification from state '{}'",
                    other.name()
                )));
            }
        };

        match lookup {
            Some(company) if company.tax_id == tax_id => Ok(VerificationState::Verified {
                record: VerificationRecord::from_company(company, at, pricing_tier),
            }),
            Some(_) => Err(DomainError::invariant(
                "registry answered for a different tax id",
            )),
            None => Ok(VerificationState::Rejected {
                tax_id,
                rejected_at: at,
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            VerificationState::Unverified => "unverified",
            VerificationState::Pending { .. } => "pending",
            VerificationState::Verified { .. } => "verified",
            VerificationState::Rejected { .. } => "rejected",
        }
    }
}
