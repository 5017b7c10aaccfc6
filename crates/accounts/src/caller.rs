use agrocat_core::{AccountId, Language};

use crate::account::{Account, AccountTier, PricingTier};
use crate::verification::VerificationState;

/// The authenticated side of a caller, read fresh from the identity store for
/// every request.
#[derive(Debug, Clone, PartialEq)]
pub struct CallerIdentity {
    pub account_id: AccountId,
    pub tier: AccountTier,
    pub preferred_language: Language,
    pub verification: VerificationState,
}

/// Who is asking. `identity` is `None` for unauthenticated requests.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CallerContext {
    identity: Option<CallerIdentity>,
}

impl CallerContext {
    pub fn anonymous() -> Self {
        Self { identity: None }
    }

    pub fn authenticated(account: &Account) -> Self {
        Self {
            identity: Some(CallerIdentity {
                account_id: account.id,
                tier: account.tier,
                preferred_language: account.preferred_language,
                verification: account.verification.clone(),
            }),
        }
    }

    pub fn identity(&self) -> Option<&CallerIdentity> {
        self.identity.as_ref()
    }

    pub fn account_id(&self) -> Option<AccountId> {
        self.identity.as_ref().map(|i| i.account_id)
    }

    pub fn preferred_language(&self) -> Option<Language> {
        self.identity.as_ref().map(|i| i.preferred_language)
    }

    /// No identity, or an identity still on the guest tier.
    pub fn is_guest(&self) -> bool {
        match &self.identity {
            None => true,
            Some(identity) => identity.tier == AccountTier::Guest,
        }
    }

    /// Pricing sub-tier, present only for a business account whose
    /// verification record exists. The tier label alone is never enough.
    pub fn verified_pricing_tier(&self) -> Option<PricingTier> {
        let identity = self.identity.as_ref()?;
        if identity.tier != AccountTier::Business {
            return None;
        }
        identity.verification.record().map(|r| r.pricing_tier)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::registry::CompanyRecord;
    use crate::tax_id::TaxId;
    use crate::verification::VerificationRecord;

    fn verified(tier: PricingTier) -> VerificationState {
        let company = CompanyRecord {
            tax_id: TaxId::parse("123456789").unwrap(),
            company_name: "ООО \"АгроТех Ферма\"".to_string(),
            legal_address: "г. Ташкент".to_string(),
            vat_payer: true,
            status: "active".to_string(),
        };
        VerificationState::Verified {
            record: VerificationRecord::from_company(&company, Utc::now(), tier),
        }
    }

    #[test]
    fn anonymous_and_guest_tier_are_guests() {
        assert!(CallerContext::anonymous().is_guest());
        let guest = Account::new(AccountId::new(), "g", AccountTier::Guest);
        assert!(CallerContext::authenticated(&guest).is_guest());
        let farmer = Account::new(AccountId::new(), "f", AccountTier::Individual);
        assert!(!CallerContext::authenticated(&farmer).is_guest());
    }

    #[test]
    fn self_declared_business_has_no_pricing_tier() {
        let account = Account::new(AccountId::new(), "b", AccountTier::Business);
        assert_eq!(CallerContext::authenticated(&account).verified_pricing_tier(), None);
    }

    #[test]
    fn verified_business_exposes_record_tier() {
        let account = Account::new(AccountId::new(), "b", AccountTier::Business)
            .with_verification(verified(PricingTier::Wholesale));
        assert_eq!(
            CallerContext::authenticated(&account).verified_pricing_tier(),
            Some(PricingTier::Wholesale)
        );
    }

    #[test]
    fn record_on_non_business_tier_is_ignored() {
        let account = Account::new(AccountId::new(), "d", AccountTier::Dealer)
            .with_verification(verified(PricingTier::Vip));
        assert_eq!(CallerContext::authenticated(&account).verified_pricing_tier(), None);
    }
}
