use core::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use agrocat_core::{
    BrandId, CategoryId, DomainError, DomainResult, Entity, LocalizedText, ProductId, ValueObject,
};

use crate::specification::Specifications;

/// Kind of catalog item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    #[default]
    Machinery,
    Attachment,
    SparePart,
}

impl FromStr for ProductType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "machinery" => Ok(ProductType::Machinery),
            "attachment" => Ok(ProductType::Attachment),
            "spare_part" => Ok(ProductType::SparePart),
            other => Err(DomainError::validation(format!(
                "product_type must be one of: machinery, attachment, spare_part (got '{other}')"
            ))),
        }
    }
}

/// Stock availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    #[default]
    InStock,
    LowStock,
    PreOrder,
    OutOfStock,
}

impl FromStr for StockStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_stock" => Ok(StockStatus::InStock),
            "low_stock" => Ok(StockStatus::LowStock),
            "pre_order" => Ok(StockStatus::PreOrder),
            "out_of_stock" => Ok(StockStatus::OutOfStock),
            other => Err(DomainError::validation(format!(
                "stock_status must be one of: in_stock, low_stock, pre_order, out_of_stock (got '{other}')"
            ))),
        }
    }
}

/// A product's price set, denominated in USD.
///
/// `base` is always present; `retail` and `wholesale` are optional overrides.
/// No rung is ever negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PriceLadderRepr")]
pub struct PriceLadder {
    base: Decimal,
    retail: Option<Decimal>,
    wholesale: Option<Decimal>,
}

#[derive(Deserialize)]
struct PriceLadderRepr {
    base: Decimal,
    #[serde(default)]
    retail: Option<Decimal>,
    #[serde(default)]
    wholesale: Option<Decimal>,
}

impl TryFrom<PriceLadderRepr> for PriceLadder {
    type Error = DomainError;

    fn try_from(value: PriceLadderRepr) -> Result<Self, Self::Error> {
        PriceLadder::new(value.base, value.retail, value.wholesale)
    }
}

impl PriceLadder {
    pub fn new(
        base: Decimal,
        retail: Option<Decimal>,
        wholesale: Option<Decimal>,
    ) -> DomainResult<Self> {
        let rungs = [("base", Some(base)), ("retail", retail), ("wholesale", wholesale)];
        for (name, value) in rungs {
            if value.is_some_and(|v| v < Decimal::ZERO) {
                return Err(DomainError::validation(format!("{name} price cannot be negative")));
            }
        }
        Ok(Self {
            base,
            retail,
            wholesale,
        })
    }

    /// Ladder with only a base price.
    pub fn base_only(base: Decimal) -> DomainResult<Self> {
        Self::new(base, None, None)
    }

    pub fn base(&self) -> Decimal {
        self.base
    }

    pub fn retail(&self) -> Option<Decimal> {
        self.retail
    }

    pub fn wholesale(&self) -> Option<Decimal> {
        self.wholesale
    }
}

impl ValueObject for PriceLadder {}

/// Category as referenced from a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: CategoryId,
    pub slug: String,
}

/// Brand as referenced from a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandRef {
    pub id: BrandId,
    pub slug: String,
    pub name: String,
}

/// Hierarchical product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub slug: String,
    #[serde(default)]
    pub parent: Option<CategoryId>,
    pub name: LocalizedText,
    #[serde(default)]
    pub order: u32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Category {
    pub fn new(slug: impl Into<String>, name: LocalizedText) -> Self {
        Self {
            id: CategoryId::new(),
            slug: slug.into(),
            parent: None,
            name,
            order: 0,
            is_active: true,
        }
    }

    pub fn child_of(mut self, parent: &Category) -> Self {
        self.parent = Some(parent.id);
        self
    }

    pub fn ordered(mut self, order: u32) -> Self {
        self.order = order;
        self
    }

    pub fn to_ref(&self) -> CategoryRef {
        CategoryRef {
            id: self.id,
            slug: self.slug.clone(),
        }
    }
}

/// Manufacturer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    pub id: BrandId,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub country: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_featured: bool,
}

impl Brand {
    pub fn new(slug: impl Into<String>, name: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            id: BrandId::new(),
            slug: slug.into(),
            name: name.into(),
            country: country.into(),
            is_active: true,
            is_featured: false,
        }
    }

    pub fn featured(mut self, featured: bool) -> Self {
        self.is_featured = featured;
        self
    }

    pub fn to_ref(&self) -> BrandRef {
        BrandRef {
            id: self.id,
            slug: self.slug.clone(),
            name: self.name.clone(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Catalog product (read view; owned by catalog storage).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub sku: String,
    pub slug: String,
    #[serde(default)]
    pub product_type: ProductType,
    pub name: LocalizedText,
    #[serde(default)]
    pub short_description: LocalizedText,
    #[serde(default)]
    pub full_description: LocalizedText,
    pub category: CategoryRef,
    pub brand: BrandRef,
    pub pricing: PriceLadder,
    #[serde(default, alias = "show_price_to_guests")]
    pub visible_to_unauthenticated: bool,
    #[serde(default)]
    pub stock_status: StockStatus,
    #[serde(default)]
    pub stock_quantity: u32,
    #[serde(default)]
    pub specifications: Specifications,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub view_count: u64,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn new(
        sku: impl Into<String>,
        slug: impl Into<String>,
        name: LocalizedText,
        category: CategoryRef,
        brand: BrandRef,
        pricing: PriceLadder,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let sku = sku.into();
        let slug = slug.into();
        if sku.trim().is_empty() {
            return Err(DomainError::validation("SKU cannot be empty"));
        }
        if slug.trim().is_empty() {
            return Err(DomainError::validation("slug cannot be empty"));
        }
        if name.ru.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }

        Ok(Self {
            id: ProductId::new(),
            sku,
            slug,
            product_type: ProductType::default(),
            name,
            short_description: LocalizedText::default(),
            full_description: LocalizedText::default(),
            category,
            brand,
            pricing,
            visible_to_unauthenticated: false,
            stock_status: StockStatus::default(),
            stock_quantity: 0,
            specifications: Specifications::default(),
            is_featured: false,
            is_active: true,
            view_count: 0,
            created_at,
        })
    }

    pub fn with_specifications(mut self, specifications: Specifications) -> Self {
        self.specifications = specifications;
        self
    }

    pub fn with_short_description(mut self, text: LocalizedText) -> Self {
        self.short_description = text;
        self
    }

    pub fn visible_to_guests(mut self, visible: bool) -> Self {
        self.visible_to_unauthenticated = visible;
        self
    }

    pub fn with_stock_status(mut self, status: StockStatus) -> Self {
        self.stock_status = status;
        self
    }

    pub fn with_product_type(mut self, product_type: ProductType) -> Self {
        self.product_type = product_type;
        self
    }

    pub fn featured(mut self, featured: bool) -> Self {
        self.is_featured = featured;
        self
    }

    pub fn with_view_count(mut self, views: u64) -> Self {
        self.view_count = views;
        self
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> ProductId {
        self.id
    }
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> CategoryId {
        self.id
    }
}

impl Entity for Brand {
    type Id = BrandId;

    fn id(&self) -> BrandId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refs() -> (CategoryRef, BrandRef) {
        let category = Category::new("tractors", LocalizedText::ru("Тракторы"));
        let brand = Brand::new("yto", "YTO", "China");
        (category.to_ref(), brand.to_ref())
    }

    #[test]
    fn ladder_rejects_negative_rungs() {
        let err = PriceLadder::new(Decimal::from(100), Some(Decimal::from(-1)), None).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(PriceLadder::new(Decimal::from(-5), None, None).is_err());
        assert!(PriceLadder::new(Decimal::ZERO, Some(Decimal::ZERO), Some(Decimal::ZERO)).is_ok());
    }

    #[test]
    fn ladder_deserialization_enforces_invariant() {
        let ok: PriceLadder = serde_json::from_str(r#"{"base":"100.00","retail":"120.00"}"#).unwrap();
        assert_eq!(ok.retail(), Some(Decimal::new(12000, 2)));
        assert_eq!(ok.wholesale(), None);

        let bad = serde_json::from_str::<PriceLadder>(r#"{"base":"100","wholesale":"-3"}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn product_requires_sku_slug_and_name() {
        let (c, b) = refs();
        let ladder = PriceLadder::base_only(Decimal::from(1000)).unwrap();
        assert!(Product::new(" ", "slug", LocalizedText::ru("X"), c.clone(), b.clone(), ladder.clone(), Utc::now()).is_err());
        assert!(Product::new("SKU", "", LocalizedText::ru("X"), c.clone(), b.clone(), ladder.clone(), Utc::now()).is_err());
        assert!(Product::new("SKU", "slug", LocalizedText::ru(""), c.clone(), b.clone(), ladder.clone(), Utc::now()).is_err());
        assert!(Product::new("SKU", "slug", LocalizedText::ru("X"), c, b, ladder, Utc::now()).is_ok());
    }

    #[test]
    fn guest_visibility_accepts_legacy_field_name() {
        let (c, b) = refs();
        let product = Product::new(
            "YTO-X1204",
            "yto-x1204",
            LocalizedText::ru("Трактор YTO X1204"),
            c,
            b,
            PriceLadder::base_only(Decimal::from(45000)).unwrap(),
            Utc::now(),
        )
        .unwrap();
        let mut json = serde_json::to_value(&product).unwrap();
        let obj = json.as_object_mut().unwrap();
        obj.remove("visible_to_unauthenticated");
        obj.insert("show_price_to_guests".to_string(), serde_json::Value::Bool(true));

        let parsed: Product = serde_json::from_value(json).unwrap();
        assert!(parsed.visible_to_unauthenticated);
    }

    #[test]
    fn filter_enums_parse_wire_values() {
        assert_eq!("spare_part".parse::<ProductType>().unwrap(), ProductType::SparePart);
        assert_eq!("pre_order".parse::<StockStatus>().unwrap(), StockStatus::PreOrder);
        assert!("sold".parse::<StockStatus>().is_err());
    }
}
