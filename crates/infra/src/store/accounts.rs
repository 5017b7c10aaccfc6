use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use agrocat_accounts::{Account, AccountTier, CallerContext, VerificationRecord, VerificationState};
use agrocat_core::AccountId;

use super::StoreError;

/// Customer accounts as seen by the engine.
pub trait AccountStore: Send + Sync {
    fn account(&self, id: AccountId) -> Result<Account, StoreError>;

    /// Fresh caller context; `None` is an anonymous caller.
    fn caller_context(&self, id: Option<AccountId>) -> Result<CallerContext, StoreError> {
        match id {
            None => Ok(CallerContext::anonymous()),
            Some(id) => self.account(id).map(|a| CallerContext::authenticated(&a)),
        }
    }

    /// Create-or-replace the account's verification record and upgrade its
    /// tier to business, as one atomic unit. Returns the updated account.
    fn commit_verification(
        &self,
        id: AccountId,
        record: VerificationRecord,
    ) -> Result<Account, StoreError>;
}

impl<S> AccountStore for Arc<S>
where
    S: AccountStore + ?Sized,
{
    fn account(&self, id: AccountId) -> Result<Account, StoreError> {
        (**self).account(id)
    }

    fn caller_context(&self, id: Option<AccountId>) -> Result<CallerContext, StoreError> {
        (**self).caller_context(id)
    }

    fn commit_verification(
        &self,
        id: AccountId,
        record: VerificationRecord,
    ) -> Result<Account, StoreError> {
        (**self).commit_verification(id, record)
    }
}

/// In-memory account store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    inner: RwLock<HashMap<AccountId, Account>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, account: Account) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| StoreError::poisoned())?;
        if map.contains_key(&account.id) {
            return Err(StoreError::Duplicate {
                what: "account",
                key: account.id.to_string(),
            });
        }
        map.insert(account.id, account);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AccountStore for InMemoryAccountStore {
    fn account(&self, id: AccountId) -> Result<Account, StoreError> {
        let map = self.inner.read().map_err(|_| StoreError::poisoned())?;
        map.get(&id).cloned().ok_or(StoreError::AccountNotFound(id))
    }

    fn commit_verification(
        &self,
        id: AccountId,
        record: VerificationRecord,
    ) -> Result<Account, StoreError> {
        // One write lock covers the uniqueness check, the record and the tier.
        let mut map = self.inner.write().map_err(|_| StoreError::poisoned())?;

        let taken = map.values().any(|other| {
            other.id != id
                && other
                    .verification
                    .record()
                    .is_some_and(|r| r.tax_id == record.tax_id)
        });
        if taken {
            return Err(StoreError::TaxIdTaken {
                masked: record.tax_id.masked(),
            });
        }

        let account = map.get_mut(&id).ok_or(StoreError::AccountNotFound(id))?;
        account.verification = VerificationState::Verified { record };
        account.tier = AccountTier::Business;
        Ok(account.clone())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use agrocat_accounts::{CompanyRecord, PricingTier, TaxId};

    use super::*;

    fn record(tax_id: &str) -> VerificationRecord {
        let company = CompanyRecord {
            tax_id: TaxId::parse(tax_id).unwrap(),
            company_name: "ООО \"Тест\"".to_string(),
            legal_address: "Ташкент".to_string(),
            vat_payer: true,
            status: "active".to_string(),
        };
        VerificationRecord::from_company(&company, Utc::now(), PricingTier::Retail)
    }

    #[test]
    fn caller_context_reads_current_account() {
        let store = InMemoryAccountStore::new();
        let account = Account::new(AccountId::new(), "farmer1", AccountTier::Individual);
        let id = account.id;
        store.insert(account).unwrap();

        assert!(store.caller_context(None).unwrap().is_guest());
        let ctx = store.caller_context(Some(id)).unwrap();
        assert_eq!(ctx.account_id(), Some(id));
        assert!(!ctx.is_guest());

        let missing = AccountId::new();
        assert_eq!(
            store.caller_context(Some(missing)),
            Err(StoreError::AccountNotFound(missing))
        );
    }

    #[test]
    fn commit_sets_record_and_tier_together() {
        let store = InMemoryAccountStore::new();
        let account = Account::new(AccountId::new(), "agro", AccountTier::Individual);
        let id = account.id;
        store.insert(account).unwrap();

        let updated = store.commit_verification(id, record("123456789")).unwrap();
        assert_eq!(updated.tier, AccountTier::Business);
        assert!(updated.verification.is_verified());
        assert_eq!(store.account(id).unwrap(), updated);
    }

    #[test]
    fn tax_id_is_unique_across_accounts() {
        let store = InMemoryAccountStore::new();
        let a = Account::new(AccountId::new(), "a", AccountTier::Individual);
        let b = Account::new(AccountId::new(), "b", AccountTier::Individual);
        let (a_id, b_id) = (a.id, b.id);
        store.insert(a).unwrap();
        store.insert(b).unwrap();

        store.commit_verification(a_id, record("123456789")).unwrap();
        // Re-verifying the same account with the same id is fine.
        store.commit_verification(a_id, record("123456789")).unwrap();

        let err = store.commit_verification(b_id, record("123456789")).unwrap_err();
        assert!(matches!(err, StoreError::TaxIdTaken { .. }));
        let b = store.account(b_id).unwrap();
        assert_eq!(b.tier, AccountTier::Individual);
        assert!(!b.verification.is_verified());
    }

    #[test]
    fn duplicate_account_insert() {
        let store = InMemoryAccountStore::new();
        let account = Account::new(AccountId::new(), "a", AccountTier::Guest);
        store.insert(account.clone()).unwrap();
        assert!(store.insert(account).is_err());
        assert_eq!(store.len(), 1);
    }
}
