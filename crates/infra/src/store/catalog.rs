use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use agrocat_catalog::{Brand, CatalogView, Category, Product};
use agrocat_core::{ProductId, find_by_id};

use super::StoreError;

/// Immutable catalog contents at a point in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub brands: Vec<Brand>,
}

impl CatalogSnapshot {
    pub fn view(&self) -> CatalogView<'_> {
        CatalogView {
            products: &self.products,
            categories: &self.categories,
            brands: &self.brands,
        }
    }

    pub fn product(&self, id: ProductId) -> Option<&Product> {
        find_by_id(&self.products, id)
    }

    /// Active product by slug.
    pub fn product_by_slug(&self, slug: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.is_active && p.slug == slug)
    }

    /// SKU and slug must each be unique.
    fn check_unique(&self) -> Result<(), StoreError> {
        let mut skus = HashSet::new();
        let mut slugs = HashSet::new();
        for p in &self.products {
            if !skus.insert(p.sku.as_str()) {
                return Err(StoreError::Duplicate {
                    what: "sku",
                    key: p.sku.clone(),
                });
            }
            if !slugs.insert(p.slug.as_str()) {
                return Err(StoreError::Duplicate {
                    what: "slug",
                    key: p.slug.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Read access to the catalog plus the one write the engine performs.
pub trait CatalogStore: Send + Sync {
    fn snapshot(&self) -> Result<Arc<CatalogSnapshot>, StoreError>;

    /// Increment a product's view counter; returns the new count.
    fn record_view(&self, id: ProductId) -> Result<u64, StoreError>;
}

impl<S> CatalogStore for Arc<S>
where
    S: CatalogStore + ?Sized,
{
    fn snapshot(&self) -> Result<Arc<CatalogSnapshot>, StoreError> {
        (**self).snapshot()
    }

    fn record_view(&self, id: ProductId) -> Result<u64, StoreError> {
        (**self).record_view(id)
    }
}

/// In-memory catalog for tests/dev.
///
/// Readers share an `Arc` snapshot; the view counter copies on write.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    inner: RwLock<Arc<CatalogSnapshot>>,
}

impl InMemoryCatalogStore {
    pub fn new(snapshot: CatalogSnapshot) -> Result<Self, StoreError> {
        snapshot.check_unique()?;
        Ok(Self {
            inner: RwLock::new(Arc::new(snapshot)),
        })
    }
}

impl CatalogStore for InMemoryCatalogStore {
    fn snapshot(&self) -> Result<Arc<CatalogSnapshot>, StoreError> {
        let guard = self.inner.read().map_err(|_| StoreError::poisoned())?;
        Ok(Arc::clone(&guard))
    }

    fn record_view(&self, id: ProductId) -> Result<u64, StoreError> {
        let mut guard = self.inner.write().map_err(|_| StoreError::poisoned())?;
        let snapshot = Arc::make_mut(&mut guard);
        let product = snapshot
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StoreError::ProductNotFound(id))?;
        product.view_count = product.view_count.saturating_add(1);
        Ok(product.view_count)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use agrocat_catalog::PriceLadder;
    use agrocat_core::LocalizedText;

    use super::*;

    fn product(sku: &str, slug: &str) -> Product {
        let category = Category::new("tractors", LocalizedText::ru("Тракторы"));
        let brand = Brand::new("yto", "YTO", "China");
        Product::new(
            sku,
            slug,
            LocalizedText::ru("Трактор"),
            category.to_ref(),
            brand.to_ref(),
            PriceLadder::base_only(Decimal::from(100)).unwrap(),
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn rejects_duplicate_sku_or_slug() {
        let dup_sku = CatalogSnapshot {
            products: vec![product("A", "a"), product("A", "b")],
            ..Default::default()
        };
        assert!(matches!(
            InMemoryCatalogStore::new(dup_sku),
            Err(StoreError::Duplicate { what: "sku", .. })
        ));

        let dup_slug = CatalogSnapshot {
            products: vec![product("A", "a"), product("B", "a")],
            ..Default::default()
        };
        assert!(matches!(
            InMemoryCatalogStore::new(dup_slug),
            Err(StoreError::Duplicate { what: "slug", .. })
        ));
    }

    #[test]
    fn record_view_increments_without_disturbing_held_snapshots() {
        let p = product("A", "a");
        let id = p.id;
        let store = InMemoryCatalogStore::new(CatalogSnapshot {
            products: vec![p],
            ..Default::default()
        })
        .unwrap();

        let before = store.snapshot().unwrap();
        assert_eq!(store.record_view(id).unwrap(), 1);
        assert_eq!(store.record_view(id).unwrap(), 2);

        assert_eq!(before.products[0].view_count, 0);
        assert_eq!(store.snapshot().unwrap().products[0].view_count, 2);
    }

    #[test]
    fn record_view_unknown_product() {
        let store = InMemoryCatalogStore::default();
        let id = ProductId::new();
        assert_eq!(store.record_view(id), Err(StoreError::ProductNotFound(id)));
    }
}
