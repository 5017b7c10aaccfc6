use agrocat_core::AccountId;

/// Per-request inputs supplied by the transport after authentication.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Authenticated account, if any.
    pub account_id: Option<AccountId>,
    /// Raw `Accept-Language`-style hint.
    pub language_hint: Option<String>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn for_account(account_id: AccountId) -> Self {
        Self {
            account_id: Some(account_id),
            language_hint: None,
        }
    }

    pub fn with_language(mut self, hint: impl Into<String>) -> Self {
        self.language_hint = Some(hint.into());
        self
    }
}
