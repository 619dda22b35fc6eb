//! Category → section → product grouping for menu display.
//!
//! Within a category, sections appear in this order:
//!
//! 1. Sections the category declares, in declared order, skipping any that
//!    have no products.
//! 2. Every other bucket in the order its first product appears: ad-hoc
//!    section names missing from the category's list, and the bucket for
//!    products with no section at all.
//!
//! Section names are compared exactly. A product whose section is the
//! fallback heading itself lands in the no-section bucket.

use crate::models::{Category, Product};

/// Heading shown for products without a section
pub const UNSECTIONED_LABEL: &str = "بدون قسم";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SectionKey {
    Named(String),
    Unsectioned,
}

impl SectionKey {
    pub fn of(product: &Product) -> Self {
        product
            .section_name()
            .map_or(SectionKey::Unsectioned, SectionKey::from_name)
    }

    /// Key for a section name; the fallback heading shares the no-section key
    pub fn from_name(name: &str) -> Self {
        if name.is_empty() || name == UNSECTIONED_LABEL {
            SectionKey::Unsectioned
        } else {
            SectionKey::Named(name.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            SectionKey::Named(name) => name,
            SectionKey::Unsectioned => UNSECTIONED_LABEL,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionGroup<'a> {
    pub key: SectionKey,
    pub products: Vec<&'a Product>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryGroup<'a> {
    pub category: &'a Category,
    pub sections: Vec<SectionGroup<'a>>,
}

impl<'a> CategoryGroup<'a> {
    pub fn product_count(&self) -> usize {
        self.sections.iter().map(|s| s.products.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn section_labels(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.key.label()).collect()
    }
}

/// Partition `products` into ordered sections for `category`.
/// Products are not checked against the category id.
pub fn group_sections<'a, I>(category: &Category, products: I) -> Vec<SectionGroup<'a>>
where
    I: IntoIterator<Item = &'a Product>,
{
    // Buckets in first-seen order
    let mut buckets: Vec<SectionGroup<'a>> = Vec::new();
    for product in products {
        let key = SectionKey::of(product);
        match buckets.iter_mut().find(|b| b.key == key) {
            Some(bucket) => bucket.products.push(product),
            None => buckets.push(SectionGroup {
                key,
                products: vec![product],
            }),
        }
    }

    let mut ordered = Vec::with_capacity(buckets.len());
    for declared in &category.sections {
        let key = SectionKey::from_name(declared);
        if let Some(pos) = buckets.iter().position(|b| b.key == key) {
            ordered.push(buckets.remove(pos));
        }
    }
    ordered.extend(buckets);
    ordered
}

/// Group the products belonging to `category`
pub fn group_category<'a>(category: &'a Category, products: &'a [Product]) -> CategoryGroup<'a> {
    let own = products.iter().filter(|p| p.category_id == category.id);
    CategoryGroup {
        category,
        sections: group_sections(category, own),
    }
}

/// Group every category in the given order, omitting categories with no products
pub fn group_all<'a>(categories: &'a [Category], products: &'a [Product]) -> Vec<CategoryGroup<'a>> {
    categories
        .iter()
        .map(|category| group_category(category, products))
        .filter(|group| !group.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: &str, sections: &[&str]) -> Category {
        Category {
            id: id.to_string(),
            name_ar: id.to_string(),
            sections: sections.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn product(id: &str, category_id: &str, section: Option<&str>) -> Product {
        Product {
            id: id.to_string(),
            category_id: category_id.to_string(),
            name_ar: id.to_string(),
            section: section.map(str::to_string),
            is_available: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_declared_then_first_seen_order() {
        let cat = category("c", &["Drinks", "Mains"]);
        let products = vec![
            product("p1", "c", Some("Mains")),
            product("p2", "c", Some("Desserts")),
            product("p3", "c", Some("Drinks")),
            product("p4", "c", None),
        ];

        let group = group_category(&cat, &products);
        assert_eq!(group.section_labels(), vec!["Drinks", "Mains", "Desserts", UNSECTIONED_LABEL]);
        assert_eq!(group.sections[3].key, SectionKey::Unsectioned);
        assert_eq!(group.product_count(), 4);
    }

    #[test]
    fn test_unsectioned_bucket_keeps_first_seen_position() {
        let cat = category("c", &["Drinks"]);
        let products = vec![
            product("p1", "c", None),
            product("p2", "c", Some("Grill")),
            product("p3", "c", Some("Drinks")),
            product("p4", "c", Some("")),
        ];

        let group = group_category(&cat, &products);
        assert_eq!(group.section_labels(), vec!["Drinks", UNSECTIONED_LABEL, "Grill"]);
        let unsectioned: Vec<&str> = group.sections[1].products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(unsectioned, vec!["p1", "p4"]);
    }

    #[test]
    fn test_declared_sections_without_products_are_skipped() {
        let cat = category("c", &["Breakfast", "Drinks", "Drinks"]);
        let products = vec![product("p1", "c", Some("Drinks")), product("p2", "c", Some("Drinks"))];

        let group = group_category(&cat, &products);
        assert_eq!(group.section_labels(), vec!["Drinks"]);
        assert_eq!(group.sections[0].products.len(), 2);
    }

    #[test]
    fn test_section_named_like_fallback_joins_unsectioned_bucket() {
        let cat = category("c", &[]);
        let products = vec![product("p1", "c", None), product("p2", "c", Some(UNSECTIONED_LABEL))];

        let group = group_category(&cat, &products);
        assert_eq!(group.section_labels(), vec![UNSECTIONED_LABEL]);
        assert_eq!(group.sections[0].key, SectionKey::Unsectioned);
        assert_eq!(group.sections[0].products.len(), 2);
    }

    #[test]
    fn test_declared_fallback_heading_orders_unsectioned_bucket() {
        let cat = category("c", &[UNSECTIONED_LABEL, "Grill"]);
        let products = vec![product("p1", "c", Some("Grill")), product("p2", "c", None)];

        let group = group_category(&cat, &products);
        assert_eq!(group.section_labels(), vec![UNSECTIONED_LABEL, "Grill"]);
    }

    #[test]
    fn test_section_names_are_not_trimmed() {
        let cat = category("c", &["Drinks"]);
        let products = vec![
            product("p1", "c", Some("Drinks ")),
            product("p2", "c", Some("Drinks")),
            product("p3", "c", Some("  ")),
        ];

        let group = group_category(&cat, &products);
        assert_eq!(group.section_labels(), vec!["Drinks", "Drinks ", "  "]);
        assert_eq!(group.sections[0].products[0].id, "p2");
    }

    #[test]
    fn test_group_all_omits_empty_categories() {
        let categories = vec![category("a", &[]), category("b", &[]), category("c", &[])];
        let products = vec![product("p1", "c", None), product("p2", "a", Some("X"))];

        let groups = group_all(&categories, &products);
        let ids: Vec<&str> = groups.iter().map(|g| g.category.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_products_stay_in_input_order_within_section() {
        let cat = category("c", &["Hot"]);
        let products = vec![
            product("tea", "c", Some("Hot")),
            product("other", "x", Some("Hot")),
            product("coffee", "c", Some("Hot")),
        ];

        let group = group_category(&cat, &products);
        let ids: Vec<&str> = group.sections[0].products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["tea", "coffee"]);
    }
}
