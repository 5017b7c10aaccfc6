//! `agrocat-core`: identifiers, errors and localisation shared by every crate.
//!
//! Nothing here touches storage or transport.

pub mod entity;
pub mod error;
pub mod id;
pub mod language;
pub mod value_object;

pub use entity::{Entity, find_by_id};
pub use error::{DomainError, DomainResult};
pub use id::{AccountId, BrandId, CategoryId, ProductId};
pub use language::{Language, LanguageResolver, LocalizedText};
pub use value_object::ValueObject;
