//! Category and brand navigation.

use agrocat_core::CategoryId;

use crate::product::{Brand, Category};
use crate::search::CatalogView;

/// An active category with its active direct children.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryNode<'a> {
    pub category: &'a Category,
    /// Active products filed directly under this category.
    pub product_count: usize,
    pub children: Vec<CategoryNode<'a>>,
}

fn by_order(a: &&Category, b: &&Category) -> core::cmp::Ordering {
    a.order.cmp(&b.order).then_with(|| a.name.ru.cmp(&b.name.ru))
}

fn product_count(view: CatalogView<'_>, id: CategoryId) -> usize {
    view.products
        .iter()
        .filter(|p| p.is_active && p.category.id == id)
        .count()
}

/// Every active category, by display order.
pub fn active_categories<'a>(view: CatalogView<'a>) -> Vec<&'a Category> {
    let mut categories: Vec<&Category> = view.categories.iter().filter(|c| c.is_active).collect();
    categories.sort_by(by_order);
    categories
}

/// Active top-level categories, each with one level of active children.
/// Children of an inactive parent are not listed.
pub fn category_tree<'a>(view: CatalogView<'a>) -> Vec<CategoryNode<'a>> {
    let active = active_categories(view);
    active
        .iter()
        .filter(|c| c.parent.is_none())
        .map(|root| CategoryNode {
            category: root,
            product_count: product_count(view, root.id),
            children: active
                .iter()
                .filter(|c| c.parent == Some(root.id))
                .map(|child| CategoryNode {
                    category: child,
                    product_count: product_count(view, child.id),
                    children: Vec::new(),
                })
                .collect(),
        })
        .collect()
}

/// Active brands flagged as featured, by name.
pub fn featured_brands<'a>(view: CatalogView<'a>) -> Vec<&'a Brand> {
    let mut brands: Vec<&Brand> = view
        .brands
        .iter()
        .filter(|b| b.is_active && b.is_featured)
        .collect();
    brands.sort_by(|a, b| a.name.cmp(&b.name));
    brands
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use agrocat_core::LocalizedText;

    use super::*;
    use crate::product::{PriceLadder, Product};

    #[test]
    fn tree_nests_active_children_under_ordered_roots() {
        let machinery = Category::new("machinery", LocalizedText::ru("Техника")).ordered(2);
        let parts = Category::new("parts", LocalizedText::ru("Запчасти")).ordered(1);
        let tractors = Category::new("tractors", LocalizedText::ru("Тракторы")).child_of(&machinery);
        let retired = Category {
            is_active: false,
            ..Category::new("retired", LocalizedText::ru("Архив")).child_of(&machinery)
        };
        let brand = Brand::new("yto", "YTO", "China");
        let tractor = Product::new(
            "YTO-1",
            "yto-1",
            LocalizedText::ru("Трактор"),
            tractors.to_ref(),
            brand.to_ref(),
            PriceLadder::base_only(Decimal::from(100)).unwrap(),
            Utc::now(),
        )
        .unwrap();

        let categories = [machinery, parts, tractors, retired];
        let products = [tractor];
        let view = CatalogView {
            products: &products,
            categories: &categories,
            brands: &[],
        };

        let tree = category_tree(view);
        let roots: Vec<&str> = tree.iter().map(|n| n.category.slug.as_str()).collect();
        assert_eq!(roots, ["parts", "machinery"]);
        assert_eq!(tree[1].children.len(), 1);
        assert_eq!(tree[1].children[0].category.slug, "tractors");
        assert_eq!(tree[1].children[0].product_count, 1);
        assert_eq!(tree[1].product_count, 0);

        let flat: Vec<&str> = active_categories(view).iter().map(|c| c.slug.as_str()).collect();
        assert_eq!(flat, ["tractors", "parts", "machinery"]);
    }

    #[test]
    fn featured_brands_skip_inactive_and_unflagged() {
        let brands = [
            Brand::new("yto", "YTO", "China").featured(true),
            Brand::new("claas", "Claas", "Germany").featured(true),
            Brand::new("kuhn", "KUHN", "France"),
            Brand {
                is_active: false,
                ..Brand::new("old", "Old", "").featured(true)
            },
        ];
        let view = CatalogView {
            products: &[],
            categories: &[],
            brands: &brands,
        };
        let names: Vec<&str> = featured_brands(view).iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["Claas", "YTO"]);
    }
}
