//! Catalog filtering.
//!
//! A [`FilterSpec`] is built per request from transport parameters and applied
//! by [`CatalogFilterEngine`] as a conjunction of optional predicates.

use core::cmp::Ordering;
use core::str::FromStr;

use rust_decimal::Decimal;

use agrocat_core::{DomainError, DomainResult};

use crate::product::{Product, ProductType, StockStatus};
use crate::specification::SpecificationIndex;

/// Queries are cut to this many characters before matching.
pub const MAX_QUERY_CHARS: usize = 100;

/// Queries shorter than this (after trimming) match nothing.
pub const MIN_QUERY_CHARS: usize = 2;

const SPEC_PARAM_PREFIX: &str = "spec_";

/// Normalised free-text query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextQuery {
    /// Too short to search; matches nothing without scanning.
    TooShort,
    /// Lower-cased needle, at most [`MAX_QUERY_CHARS`] characters.
    Needle(String),
}

impl TextQuery {
    /// `None` when the input is empty after trimming (no text filter at all).
    pub fn parse(raw: &str) -> Option<Self> {
        let truncated: String = raw.trim().chars().take(MAX_QUERY_CHARS).collect();
        if truncated.is_empty() {
            return None;
        }
        if truncated.chars().count() < MIN_QUERY_CHARS {
            return Some(TextQuery::TooShort);
        }
        Some(TextQuery::Needle(truncated.to_lowercase()))
    }

    pub fn is_too_short(&self) -> bool {
        matches!(self, TextQuery::TooShort)
    }

    /// Case-insensitive substring match against any of `haystacks`.
    pub fn matches_any<'a>(&self, haystacks: impl IntoIterator<Item = &'a str>) -> bool {
        match self {
            TextQuery::TooShort => false,
            TextQuery::Needle(needle) => haystacks
                .into_iter()
                .any(|h| !h.is_empty() && h.to_lowercase().contains(needle.as_str())),
        }
    }

    /// Product text match: names in every language, SKU, short descriptions.
    pub fn matches_product(&self, product: &Product) -> bool {
        let names = product.name.entries();
        let descriptions = product.short_description.entries();
        self.matches_any(
            names
                .into_iter()
                .chain(core::iter::once(product.sku.as_str()))
                .chain(descriptions),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Min,
    Max,
}

/// One `spec_<attribute>_<min|max>` constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecRange {
    pub attribute: String,
    pub bound: Bound,
    pub value: Decimal,
}

impl SpecRange {
    /// Split `spec_working_width_max` into `("working_width", Max)`.
    ///
    /// Returns `None` for anything that is not a well-formed spec parameter.
    pub fn parse_param_name(name: &str) -> Option<(String, Bound)> {
        let rest = name.strip_prefix(SPEC_PARAM_PREFIX)?;
        let (attribute, bound) = rest.rsplit_once('_')?;
        if attribute.is_empty() {
            return None;
        }
        let bound = match bound {
            "min" => Bound::Min,
            "max" => Bound::Max,
            _ => return None,
        };
        Some((attribute.to_string(), bound))
    }

    fn matches(&self, product: &Product) -> bool {
        let index = SpecificationIndex::new(&product.specifications);
        match self.bound {
            Bound::Min => index.in_range(&self.attribute, Some(self.value), None),
            Bound::Max => index.in_range(&self.attribute, None, Some(self.value)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Price,
    CreatedAt,
    Name,
    Popularity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub key: SortKey,
    pub descending: bool,
}

impl Default for SortOrder {
    /// Most recent first.
    fn default() -> Self {
        Self {
            key: SortKey::CreatedAt,
            descending: true,
        }
    }
}

impl SortOrder {
    /// Parse an `ordering` parameter; anything outside the allow-list falls
    /// back to the default.
    pub fn parse_lenient(raw: &str) -> Self {
        let raw = raw.trim();
        let (descending, field) = match raw.strip_prefix('-') {
            Some(field) => (true, field),
            None => (false, raw),
        };
        let key = match field {
            "price" | "base_price_usd" => SortKey::Price,
            "created_at" | "recency" => SortKey::CreatedAt,
            "name" | "name_ru" => SortKey::Name,
            "popularity" | "view_count" => SortKey::Popularity,
            _ => return Self::default(),
        };
        Self { key, descending }
    }

    fn compare(&self, a: &Product, b: &Product) -> Ordering {
        let primary = match self.key {
            SortKey::Price => a.pricing.base().cmp(&b.pricing.base()),
            SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            SortKey::Name => a.name.ru.to_lowercase().cmp(&b.name.ru.to_lowercase()),
            SortKey::Popularity => a.view_count.cmp(&b.view_count),
        };
        let primary = if self.descending { primary.reverse() } else { primary };
        primary.then_with(|| a.sku.cmp(&b.sku))
    }
}

/// Per-request catalog filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    pub category: Option<String>,
    /// Empty means any brand.
    pub brands: Vec<String>,
    pub product_type: Option<ProductType>,
    pub stock_status: Option<StockStatus>,
    pub featured: Option<bool>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub spec_ranges: Vec<SpecRange>,
    pub text: Option<TextQuery>,
    pub ordering: SortOrder,
}

impl FilterSpec {
    /// Build from transport key/value pairs.
    ///
    /// Unknown keys and malformed `spec_*` names are ignored; malformed values
    /// of known parameters are validation errors. Empty values mean "absent".
    pub fn from_params<I, K, V>(params: I) -> DomainResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut spec = FilterSpec::default();

        for (key, value) in params {
            let key = key.as_ref();
            let value = value.as_ref().trim();
            if value.is_empty() {
                continue;
            }

            match key {
                "category" => spec.category = Some(value.to_string()),
                "brand" => spec.brands = parse_brand_list(value),
                "product_type" => spec.product_type = Some(value.parse()?),
                "stock_status" => spec.stock_status = Some(value.parse()?),
                "is_featured" => spec.featured = Some(parse_flag(key, value)?),
                "min_price" => spec.min_price = Some(parse_number(key, value)?),
                "max_price" => spec.max_price = Some(parse_number(key, value)?),
                "search" => spec.text = TextQuery::parse(value),
                "ordering" => spec.ordering = SortOrder::parse_lenient(value),
                other => {
                    if let Some((attribute, bound)) = SpecRange::parse_param_name(other) {
                        spec.spec_ranges.push(SpecRange {
                            attribute,
                            bound,
                            value: parse_number(other, value)?,
                        });
                    }
                }
            }
        }

        Ok(spec)
    }

    pub fn with_text(mut self, raw: &str) -> Self {
        self.text = TextQuery::parse(raw);
        self
    }

    pub fn with_brands(mut self, raw: &str) -> Self {
        self.brands = parse_brand_list(raw);
        self
    }

    /// True when the filter can only produce an empty result.
    pub fn is_unsatisfiable(&self) -> bool {
        self.text.as_ref().is_some_and(TextQuery::is_too_short)
    }

    pub fn matches(&self, product: &Product) -> bool {
        product.is_active
            && self.category.as_deref().is_none_or(|c| product.category.slug == c)
            && (self.brands.is_empty() || self.brands.iter().any(|b| *b == product.brand.slug))
            && self.product_type.is_none_or(|t| product.product_type == t)
            && self.stock_status.is_none_or(|s| product.stock_status == s)
            && self.featured.is_none_or(|f| product.is_featured == f)
            && self.min_price.is_none_or(|min| product.pricing.base() >= min)
            && self.max_price.is_none_or(|max| product.pricing.base() <= max)
            && self.spec_ranges.iter().all(|r| r.matches(product))
            && self.text.as_ref().is_none_or(|t| t.matches_product(product))
    }
}

fn parse_brand_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_number(key: &str, value: &str) -> DomainResult<Decimal> {
    Decimal::from_str(value).map_err(|_| DomainError::validation(format!("{key} must be a number")))
}

fn parse_flag(key: &str, value: &str) -> DomainResult<bool> {
    match value {
        "true" | "True" | "1" => Ok(true),
        "false" | "False" | "0" => Ok(false),
        _ => Err(DomainError::validation(format!("{key} must be true or false"))),
    }
}

/// Applies a [`FilterSpec`] to a product set.
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogFilterEngine;

impl CatalogFilterEngine {
    /// Lazily yield matching products in input order. Restartable: calling it
    /// again with the same inputs yields the same sequence.
    pub fn matching<'a, I>(products: I, spec: &'a FilterSpec) -> impl Iterator<Item = &'a Product> + 'a
    where
        I: IntoIterator<Item = &'a Product>,
        I::IntoIter: 'a,
    {
        let budget = if spec.is_unsatisfiable() { 0 } else { usize::MAX };
        products
            .into_iter()
            .take(budget)
            .filter(move |p| spec.matches(p))
    }

    /// Matching products in the filter's order (ties broken by SKU).
    pub fn apply<'a, I>(products: I, spec: &FilterSpec) -> Vec<&'a Product>
    where
        I: IntoIterator<Item = &'a Product>,
    {
        if spec.is_unsatisfiable() {
            tracing::debug!("catalog filter short-circuited: query too short");
            return Vec::new();
        }
        let mut out: Vec<&Product> = products.into_iter().filter(|p| spec.matches(p)).collect();
        out.sort_by(|a, b| spec.ordering.compare(a, b));
        tracing::debug!(
            matched = out.len(),
            spec_ranges = spec.spec_ranges.len(),
            "catalog filter applied"
        );
        out
    }
}
