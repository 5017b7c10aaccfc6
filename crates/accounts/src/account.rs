use core::str::FromStr;

use serde::{Deserialize, Serialize};

use agrocat_core::{AccountId, DomainError, Entity, Language};

use crate::verification::VerificationState;

/// Account classification controlling price visibility.
///
/// Parsing is lenient: a stored value this build does not know becomes
/// [`AccountTier::Unrecognized`], which grants no more than an individual
/// account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AccountTier {
    #[default]
    Guest,
    Individual,
    Business,
    Dealer,
    Admin,
    Unrecognized,
}

impl AccountTier {
    pub fn as_str(self) -> &'static str {
        match self {
            AccountTier::Guest => "guest",
            AccountTier::Individual => "individual",
            AccountTier::Business => "business",
            AccountTier::Dealer => "dealer",
            AccountTier::Admin => "admin",
            AccountTier::Unrecognized => "unrecognized",
        }
    }

    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "guest" => AccountTier::Guest,
            // Older records label private farms "farmer".
            "individual" | "farmer" => AccountTier::Individual,
            "business" => AccountTier::Business,
            "dealer" => AccountTier::Dealer,
            "admin" => AccountTier::Admin,
            _ => AccountTier::Unrecognized,
        }
    }
}

impl From<String> for AccountTier {
    fn from(value: String) -> Self {
        Self::parse_lenient(&value)
    }
}

impl From<AccountTier> for String {
    fn from(value: AccountTier) -> Self {
        value.as_str().to_string()
    }
}

/// Pricing sub-tier of a verified business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PricingTier {
    #[default]
    Retail,
    Wholesale,
    Vip,
}

impl FromStr for PricingTier {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "retail" => Ok(PricingTier::Retail),
            "wholesale" => Ok(PricingTier::Wholesale),
            "vip" => Ok(PricingTier::Vip),
            other => Err(DomainError::validation(format!("unknown pricing tier '{other}'"))),
        }
    }
}

/// A customer account as read from the identity store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub username: String,
    pub tier: AccountTier,
    #[serde(default)]
    pub preferred_language: Language,
    #[serde(default)]
    pub verification: VerificationState,
}

impl Account {
    pub fn new(id: AccountId, username: impl Into<String>, tier: AccountTier) -> Self {
        Self {
            id,
            username: username.into(),
            tier,
            preferred_language: Language::default(),
            verification: VerificationState::Unverified,
        }
    }

    pub fn with_language(mut self, lang: Language) -> Self {
        self.preferred_language = lang;
        self
    }

    pub fn with_verification(mut self, verification: VerificationState) -> Self {
        self.verification = verification;
        self
    }
}

impl Entity for Account {
    type Id = AccountId;

    fn id(&self) -> AccountId {
        self.id
    }
}
