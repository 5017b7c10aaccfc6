//! Company data returned by the external tax registry.

use serde::{Deserialize, Serialize};

use crate::tax_id::TaxId;

/// A positive registry match for a tax identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub tax_id: TaxId,
    pub company_name: String,
    pub legal_address: String,
    pub vat_payer: bool,
    /// Registry-side status string (`"active"`, ...), kept verbatim.
    pub status: String,
}

impl CompanyRecord {
    /// Raw registry payload as persisted on the verification record.
    pub fn raw_response(&self) -> serde_json::Value {
        serde_json::json!({
            "inn": self.tax_id.as_str(),
            "company_name": self.company_name,
            "legal_address": self.legal_address,
            "vat_payer": self.vat_payer,
            "status": self.status,
        })
    }
}
