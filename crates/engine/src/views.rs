//! Response views. Everything here is already localized and already filtered
//! by price visibility; the transport only serializes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use agrocat_catalog::{
    Brand, BrandRef, Category, CategoryNode, CategoryRef, CurrencyProjection, PriceBreakdown, PriceQuote,
    Product, ProductType, SpecificationIndex, SpecificationLine, Specifications, StockStatus,
};
use agrocat_core::{BrandId, CategoryId, Language, LocalizedText, ProductId, find_by_id};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryView {
    pub id: CategoryId,
    pub slug: String,
    pub name: String,
}

impl CategoryView {
    pub fn new(category: &Category, lang: Language) -> Self {
        Self {
            id: category.id,
            slug: category.slug.clone(),
            name: category.name.get(lang).to_string(),
        }
    }

    /// Falls back to the slug when the category row is missing.
    fn from_ref(reference: &CategoryRef, categories: &[Category], lang: Language) -> Self {
        match find_by_id(categories, reference.id) {
            Some(category) => Self::new(category, lang),
            None => Self {
                id: reference.id,
                slug: reference.slug.clone(),
                name: reference.slug.clone(),
            },
        }
    }
}

/// Navigation tree entry; `children` is empty below the first level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTreeView {
    pub id: CategoryId,
    pub slug: String,
    pub name: String,
    pub order: u32,
    pub product_count: usize,
    pub children: Vec<CategoryTreeView>,
}

impl CategoryTreeView {
    pub fn new(node: &CategoryNode<'_>, lang: Language) -> Self {
        Self {
            id: node.category.id,
            slug: node.category.slug.clone(),
            name: node.category.name.get(lang).to_string(),
            order: node.category.order,
            product_count: node.product_count,
            children: node.children.iter().map(|c| Self::new(c, lang)).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrandView {
    pub id: BrandId,
    pub slug: String,
    pub name: String,
    pub country: String,
}

impl BrandView {
    pub fn new(brand: &Brand) -> Self {
        Self {
            id: brand.id,
            slug: brand.slug.clone(),
            name: brand.name.clone(),
            country: brand.country.clone(),
        }
    }

    fn from_ref(reference: &BrandRef, brands: &[Brand]) -> Self {
        match find_by_id(brands, reference.id) {
            Some(brand) => Self::new(brand),
            None => Self {
                id: reference.id,
                slug: reference.slug.clone(),
                name: reference.name.clone(),
                country: String::new(),
            },
        }
    }
}

/// Listing-level pricing block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductPricing {
    pub show_to_guests: bool,
    pub can_see_price: bool,
    pub price_usd: Option<Decimal>,
    pub price_uzs: Option<i64>,
}

impl ProductPricing {
    pub fn new(product: &Product, quote: &PriceQuote, projection: &CurrencyProjection) -> Self {
        let display = projection.project(quote);
        Self {
            show_to_guests: product.visible_to_unauthenticated,
            can_see_price: quote.visible,
            price_usd: display.usd,
            price_uzs: display.uzs,
        }
    }
}

/// Lookup tables a view needs besides the product itself.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ViewContext<'a> {
    pub lang: Language,
    pub projection: &'a CurrencyProjection,
    pub categories: &'a [Category],
    pub brands: &'a [Brand],
}

/// Product as shown in listings, search results and related/featured rails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductView {
    pub id: ProductId,
    pub sku: String,
    pub slug: String,
    pub product_type: ProductType,
    pub name: String,
    pub short_description: String,
    pub category: CategoryView,
    pub brand: BrandView,
    pub pricing: ProductPricing,
    pub stock_status: StockStatus,
    pub is_featured: bool,
}

impl ProductView {
    pub(crate) fn new(product: &Product, quote: &PriceQuote, ctx: ViewContext<'_>) -> Self {
        Self {
            id: product.id,
            sku: product.sku.clone(),
            slug: product.slug.clone(),
            product_type: product.product_type,
            name: product.name.get(ctx.lang).to_string(),
            short_description: product.short_description.get(ctx.lang).to_string(),
            category: CategoryView::from_ref(&product.category, ctx.categories, ctx.lang),
            brand: BrandView::from_ref(&product.brand, ctx.brands),
            pricing: ProductPricing::new(product, quote, ctx.projection),
            stock_status: product.stock_status,
            is_featured: product.is_featured,
        }
    }
}

/// Full product page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductDetailView {
    pub id: ProductId,
    pub sku: String,
    pub slug: String,
    pub product_type: ProductType,
    pub name: String,
    /// All translations, for language switchers.
    pub names: LocalizedText,
    pub short_description: String,
    pub full_description: String,
    pub category: CategoryView,
    pub brand: BrandView,
    pub pricing: PriceBreakdown,
    pub stock_status: StockStatus,
    pub stock_quantity: u32,
    pub specifications: Specifications,
    pub specifications_formatted: Vec<SpecificationLine>,
    pub is_featured: bool,
    pub view_count: u64,
    pub created_at: DateTime<Utc>,
}

impl ProductDetailView {
    pub(crate) fn new(product: &Product, quote: &PriceQuote, ctx: ViewContext<'_>) -> Self {
        Self {
            id: product.id,
            sku: product.sku.clone(),
            slug: product.slug.clone(),
            product_type: product.product_type,
            name: product.name.get(ctx.lang).to_string(),
            names: product.name.clone(),
            short_description: product.short_description.get(ctx.lang).to_string(),
            full_description: product.full_description.get(ctx.lang).to_string(),
            category: CategoryView::from_ref(&product.category, ctx.categories, ctx.lang),
            brand: BrandView::from_ref(&product.brand, ctx.brands),
            pricing: PriceBreakdown::new(product, quote, ctx.projection),
            stock_status: product.stock_status,
            stock_quantity: product.stock_quantity,
            specifications: product.specifications.clone(),
            specifications_formatted: SpecificationIndex::new(&product.specifications)
                .render(ctx.lang),
            is_featured: product.is_featured,
            view_count: product.view_count,
            created_at: product.created_at,
        }
    }
}

/// Filtered listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogPage {
    pub count: usize,
    pub results: Vec<ProductView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResults {
    pub products: Vec<ProductView>,
    pub categories: Vec<CategoryView>,
    pub brands: Vec<BrandView>,
}

impl SearchResults {
    pub fn empty() -> Self {
        Self {
            products: Vec::new(),
            categories: Vec::new(),
            brands: Vec::new(),
        }
    }
}
