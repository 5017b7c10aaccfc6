use serde::Serialize;
use serde_json::{Value as JsonValue, json};
use thiserror::Error;

use agrocat_core::DomainError;
use agrocat_infra::{ConfigError, GateError, RegistryError, StoreError};

/// Coarse error classes for the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    PermissionDenied,
    Conflict,
    Unavailable,
    Internal,
}

impl ErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation_error",
            ErrorKind::NotFound => "not_found",
            ErrorKind::PermissionDenied => "permission_denied",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Unavailable => "unavailable",
            ErrorKind::Internal => "internal",
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Gate(#[from] GateError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

fn domain_kind(err: &DomainError) -> ErrorKind {
    match err {
        DomainError::Validation(_) | DomainError::InvalidId(_) => ErrorKind::Validation,
        DomainError::NotFound(_) => ErrorKind::NotFound,
        DomainError::PermissionDenied(_) => ErrorKind::PermissionDenied,
        DomainError::Conflict(_) => ErrorKind::Conflict,
        DomainError::InvariantViolation(_) => ErrorKind::Internal,
    }
}

fn store_kind(err: &StoreError) -> ErrorKind {
    match err {
        StoreError::AccountNotFound(_) | StoreError::ProductNotFound(_) => ErrorKind::NotFound,
        StoreError::TaxIdTaken { .. } => ErrorKind::Conflict,
        StoreError::Duplicate { .. } | StoreError::Storage(_) => ErrorKind::Internal,
    }
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Domain(e) => domain_kind(e),
            EngineError::Store(e) => store_kind(e),
            EngineError::Gate(GateError::Store(e)) => store_kind(e),
            EngineError::Gate(GateError::Domain(e)) => domain_kind(e),
            EngineError::Gate(GateError::Registry(RegistryError::Unavailable(_))) => {
                ErrorKind::Unavailable
            }
            EngineError::Gate(GateError::Registry(RegistryError::Malformed(_))) => {
                ErrorKind::Internal
            }
            EngineError::Config(_) => ErrorKind::Internal,
        }
    }

    /// `{"error": <code>, "message": <text>}`. Internal faults carry a generic
    /// message only.
    pub fn to_json(&self) -> JsonValue {
        let kind = self.kind();
        let message = match kind {
            ErrorKind::Internal => "internal error".to_string(),
            _ => self.to_string(),
        };
        json!({
            "error": kind.code(),
            "message": message,
        })
    }
}
