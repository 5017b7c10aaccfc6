//! Global search across products, categories and brands.

use crate::filter::{CatalogFilterEngine, FilterSpec, TextQuery};
use crate::product::{Brand, Category, Product};

/// Borrowed view of the catalog a search runs against.
#[derive(Debug, Clone, Copy)]
pub struct CatalogView<'a> {
    pub products: &'a [Product],
    pub categories: &'a [Category],
    pub brands: &'a [Brand],
}

/// Per-section result caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    pub products: usize,
    pub categories: usize,
    pub brands: usize,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            products: 10,
            categories: 5,
            brands: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchHits<'a> {
    pub products: Vec<&'a Product>,
    pub categories: Vec<&'a Category>,
    pub brands: Vec<&'a Brand>,
}

impl SearchHits<'_> {
    fn empty() -> Self {
        Self {
            products: Vec::new(),
            categories: Vec::new(),
            brands: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty() && self.categories.is_empty() && self.brands.is_empty()
    }
}

/// Run a global search. Blank or one-character queries return no hits.
pub fn search<'a>(view: CatalogView<'a>, raw_query: &str, limits: SearchLimits) -> SearchHits<'a> {
    let query = match TextQuery::parse(raw_query) {
        Some(q @ TextQuery::Needle(_)) => q,
        _ => return SearchHits::empty(),
    };

    let spec = FilterSpec {
        text: Some(query.clone()),
        ..FilterSpec::default()
    };
    let mut products = CatalogFilterEngine::apply(view.products, &spec);
    products.truncate(limits.products);

    let mut categories: Vec<&Category> = view
        .categories
        .iter()
        .filter(|c| c.is_active && query.matches_any(c.name.entries()))
        .collect();
    categories.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.name.ru.cmp(&b.name.ru)));
    categories.truncate(limits.categories);

    let mut brands: Vec<&Brand> = view
        .brands
        .iter()
        .filter(|b| b.is_active && query.matches_any([b.name.as_str()]))
        .collect();
    brands.sort_by(|a, b| a.name.cmp(&b.name));
    brands.truncate(limits.brands);

    tracing::debug!(
        products = products.len(),
        categories = categories.len(),
        brands = brands.len(),
        "catalog search"
    );

    SearchHits {
        products,
        categories,
        brands,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal::Decimal;

    use agrocat_core::LocalizedText;

    use super::*;
    use crate::product::PriceLadder;

    fn catalog() -> (Vec<Product>, Vec<Category>, Vec<Brand>) {
        let tractors = Category::new("tractors", LocalizedText::new("Тракторы", "Traktorlar", "Tractors"));
        let mut retired = Category::new("old-tractors", LocalizedText::ru("Старые тракторы"));
        retired.is_active = false;
        let yto = Brand::new("yto", "YTO", "China");
        let mut tractor_brand = Brand::new("traktor-zavod", "Traktor Zavod", "Uzbekistan");
        tractor_brand.is_featured = true;

        let t0 = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let products = (0..15)
            .map(|i| {
                Product::new(
                    format!("YTO-{i:03}"),
                    format!("yto-{i}"),
                    LocalizedText::new(format!("Трактор {i}"), "", format!("Tractor {i}")),
                    tractors.to_ref(),
                    yto.to_ref(),
                    PriceLadder::base_only(Decimal::from(1000 + i)).unwrap(),
                    t0 + Duration::hours(i),
                )
                .unwrap()
            })
            .collect();
        (products, vec![tractors, retired], vec![yto, tractor_brand])
    }

    #[test]
    fn single_character_returns_nothing_two_characters_matches() {
        let (p, c, b) = catalog();
        let view = CatalogView { products: &p, categories: &c, brands: &b };
        assert!(search(view, " t ", SearchLimits::default()).is_empty());
        assert!(search(view, "", SearchLimits::default()).is_empty());
        assert!(!search(view, "tr", SearchLimits::default()).is_empty());
    }

    #[test]
    fn sections_are_capped_and_inactive_rows_skipped() {
        let (p, c, b) = catalog();
        let view = CatalogView { products: &p, categories: &c, brands: &b };
        let hits = search(view, "TRAKTOR", SearchLimits::default());
        // Product names only match "Tractor"; the uz category name matches.
        assert!(hits.products.is_empty());
        assert_eq!(hits.categories.len(), 1);
        assert_eq!(hits.brands.len(), 1);

        let hits = search(view, "трактор", SearchLimits::default());
        assert_eq!(hits.products.len(), 10);
        assert_eq!(hits.products[0].sku, "YTO-014", "most recent first");
        assert_eq!(hits.categories.len(), 1, "inactive category is skipped");
        assert_eq!(hits.categories[0].slug, "tractors");
    }

    #[test]
    fn limits_are_configurable() {
        let (p, c, b) = catalog();
        let view = CatalogView { products: &p, categories: &c, brands: &b };
        let limits = SearchLimits { products: 3, categories: 0, brands: 0 };
        let hits = search(view, "tractor", limits);
        assert_eq!(hits.products.len(), 3);
        assert!(hits.categories.is_empty());
    }
}
