//! Tax registry lookup boundary.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use agrocat_accounts::{CompanyRecord, TaxId};

/// The registry could not answer (as opposed to answering "no match").
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("registry unavailable: {0}")]
    Unavailable(String),

    #[error("malformed registry response: {0}")]
    Malformed(String),
}

/// Company lookup by tax identifier.
///
/// `Ok(None)` means the registry answered and has no such company.
pub trait RegistryLookup: Send + Sync {
    fn lookup(&self, tax_id: &TaxId) -> Result<Option<CompanyRecord>, RegistryError>;
}

impl<R> RegistryLookup for Arc<R>
where
    R: RegistryLookup + ?Sized,
{
    fn lookup(&self, tax_id: &TaxId) -> Result<Option<CompanyRecord>, RegistryError> {
        (**self).lookup(tax_id)
    }
}

/// Fixed development table. Unknown identifiers are not found.
#[derive(Debug, Clone)]
pub struct MockRegistry {
    companies: HashMap<TaxId, CompanyRecord>,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self::with_companies(default_companies())
    }

    pub fn with_companies(companies: impl IntoIterator<Item = CompanyRecord>) -> Self {
        Self {
            companies: companies
                .into_iter()
                .map(|c| (c.tax_id.clone(), c))
                .collect(),
        }
    }
}

impl Default for MockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryLookup for MockRegistry {
    fn lookup(&self, tax_id: &TaxId) -> Result<Option<CompanyRecord>, RegistryError> {
        Ok(self.companies.get(tax_id).cloned())
    }
}

fn default_companies() -> Vec<CompanyRecord> {
    let entries = [
        (
            "123456789",
            "ООО \"АгроТех Ферма\"",
            "г. Ташкент, Мирзо-Улугбекский район, ул. Буюк Ипак Йули, 15",
            true,
        ),
        (
            "987654321",
            "ЧП \"Фермерское хозяйство Навои\"",
            "Навоийская область, г. Навои, ул. Галаба, 42",
            false,
        ),
    ];

    entries
        .into_iter()
        .filter_map(|(inn, name, address, vat)| {
            Some(CompanyRecord {
                tax_id: TaxId::parse(inn).ok()?,
                company_name: name.to_string(),
                legal_address: address.to_string(),
                vat_payer: vat,
                status: "active".to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_table_has_both_companies() {
        let registry = MockRegistry::new();
        let agro = registry.lookup(&TaxId::parse("123456789").unwrap()).unwrap().unwrap();
        assert_eq!(agro.company_name, "ООО \"АгроТех Ферма\"");
        assert!(agro.vat_payer);

        let navoi = registry.lookup(&TaxId::parse("987654321").unwrap()).unwrap().unwrap();
        assert!(navoi.legal_address.contains("Навои"));
        assert!(!navoi.vat_payer);
    }

    #[test]
    fn unknown_tax_id_is_not_found() {
        let registry = MockRegistry::new();
        assert_eq!(registry.lookup(&TaxId::parse("555555555").unwrap()), Ok(None));
    }
}
