//! `agrocat-accounts`: customer accounts, caller identity and business verification.
//!
//! Pure domain logic: no storage, no registry client, no HTTP.

pub mod account;
pub mod caller;
pub mod registry;
pub mod tax_id;
pub mod verification;

pub use account::{Account, AccountTier, PricingTier};
pub use caller::{CallerContext, CallerIdentity};
pub use registry::CompanyRecord;
pub use tax_id::TaxId;
pub use verification::{VerificationRecord, VerificationState};
