//! Catalog domain module.
//!
//! Price visibility, schema-less specification handling, catalog filtering and
//! search, implemented as deterministic domain logic (no IO, no HTTP, no storage).

pub mod browse;
pub mod filter;
pub mod pricing;
pub mod product;
pub mod search;
pub mod specification;

pub use browse::{CategoryNode, active_categories, category_tree, featured_brands};
pub use filter::{
    Bound, CatalogFilterEngine, FilterSpec, SortKey, SortOrder, SpecRange, TextQuery,
};
pub use pricing::{CurrencyProjection, DisplayPrice, PriceBreakdown, PriceQuote, PriceRule, PriceVisibilityResolver};
pub use product::{
    Brand, BrandRef, Category, CategoryRef, PriceLadder, Product, ProductType, StockStatus,
};
pub use search::{CatalogView, SearchHits, SearchLimits, search};
pub use specification::{SpecScalar, SpecValue, SpecificationIndex, SpecificationLine, Specifications};
