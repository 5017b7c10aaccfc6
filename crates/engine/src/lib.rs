//! `agrocat-engine`: the transport-facing catalog access and verification
//! facade.
//!
//! Every call reads the caller's account fresh, resolves the display
//! language, and returns a serialisable view or an [`EngineError`] whose
//! [`ErrorKind`] the transport maps to its own status codes.

pub mod engine;
pub mod error;
pub mod request;
pub mod views;

pub use engine::CatalogEngine;
pub use error::{EngineError, ErrorKind};
pub use request::RequestContext;
pub use views::{
    BrandView, CatalogPage, CategoryTreeView, CategoryView, ProductDetailView, ProductPricing, ProductView,
    SearchResults,
};
