//! Public menu state.
//!
//! `MenuView` owns everything the menu screen needs. Selection changes take
//! the view by value and hand back the updated one, so there is no hidden
//! state between renders.

use crate::models::{Category, Product, RestaurantSettings};
use crate::store::FullMenu;
use crate::utils::format_currency;

use super::filter::{section_options, CategoryFilter, MenuContent, MenuFilter, SectionFilter};

/// Label of the "all categories" tab
pub const ALL_LABEL: &str = "الكل";

#[derive(Debug, Clone, Default)]
pub struct MenuView {
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
    pub settings: Option<RestaurantSettings>,
    pub filter: MenuFilter,
}

impl MenuView {
    pub fn new(menu: FullMenu, settings: Option<RestaurantSettings>) -> Self {
        Self {
            categories: menu.categories,
            products: menu.products,
            settings,
            filter: MenuFilter::default(),
        }
    }

    /// Select a category; the section filter resets to all
    pub fn select_category(self, category: CategoryFilter) -> Self {
        Self {
            filter: MenuFilter {
                category,
                section: SectionFilter::All,
                ..self.filter
            },
            ..self
        }
    }

    pub fn select_section(self, section: SectionFilter) -> Self {
        Self {
            filter: MenuFilter {
                section,
                ..self.filter
            },
            ..self
        }
    }

    pub fn search(self, text: &str) -> Self {
        Self {
            filter: MenuFilter {
                search: text.to_string(),
                ..self.filter
            },
            ..self
        }
    }

    /// Move to the next category tab, wrapping after the last
    pub fn next_category(self) -> Self {
        let next = match self.filter.category {
            CategoryFilter::All => self.categories.first().map(|c| CategoryFilter::Id(c.id.clone())),
            CategoryFilter::Id(ref id) => {
                let pos = self.categories.iter().position(|c| &c.id == id);
                pos.and_then(|i| self.categories.get(i + 1))
                    .map(|c| CategoryFilter::Id(c.id.clone()))
            }
        };
        self.select_category(next.unwrap_or(CategoryFilter::All))
    }

    /// Cycle the section filter through the selected category's sections
    pub fn next_section(self) -> Self {
        let options = self.section_choices();
        let next = match self.filter.section {
            SectionFilter::All => options.first().cloned(),
            SectionFilter::Named(ref name) => {
                let pos = options.iter().position(|s| s == name);
                pos.and_then(|i| options.get(i + 1)).cloned()
            }
        };
        self.select_section(next.map(SectionFilter::Named).unwrap_or(SectionFilter::All))
    }

    pub fn selected_category(&self) -> Option<&Category> {
        match self.filter.category {
            CategoryFilter::All => None,
            CategoryFilter::Id(ref id) => self.categories.iter().find(|c| &c.id == id),
        }
    }

    /// Section names available for the selected category
    pub fn section_choices(&self) -> Vec<String> {
        self.selected_category()
            .map(|c| section_options(c, &self.products))
            .unwrap_or_default()
    }

    /// Tab labels: "all" first, then each category
    pub fn category_tabs(&self) -> Vec<(CategoryFilter, &str)> {
        std::iter::once((CategoryFilter::All, ALL_LABEL))
            .chain(
                self.categories
                    .iter()
                    .map(|c| (CategoryFilter::Id(c.id.clone()), c.display_name())),
            )
            .collect()
    }

    pub fn content(&self) -> MenuContent<'_> {
        self.filter.apply(&self.categories, &self.products)
    }

    pub fn currency(&self) -> Option<&str> {
        self.settings.as_ref().map(|s| s.currency_or_default())
    }

    pub fn price(&self, product: &Product) -> String {
        format_currency(product.price, self.currency())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> MenuView {
        let categories = vec![
            Category {
                id: "drinks".into(),
                name_ar: "مشروبات".into(),
                sections: vec!["Hot".into(), "Cold".into()],
                ..Default::default()
            },
            Category {
                id: "food".into(),
                name_ar: "أكل".into(),
                ..Default::default()
            },
        ];
        let products = vec![
            Product {
                id: "p1".into(),
                category_id: "drinks".into(),
                name_ar: "شاي".into(),
                section: Some("Hot".into()),
                price: 15.0,
                ..Default::default()
            },
            Product {
                id: "p2".into(),
                category_id: "drinks".into(),
                name_ar: "عصير".into(),
                section: Some("Cold".into()),
                price: 22.5,
                ..Default::default()
            },
        ];
        MenuView::new(FullMenu { categories, products }, None)
    }

    #[test]
    fn test_category_cycle_wraps_to_all() {
        let view = view().next_category();
        assert_eq!(view.filter.category, CategoryFilter::Id("drinks".into()));
        let view = view.next_category();
        assert_eq!(view.filter.category, CategoryFilter::Id("food".into()));
        let view = view.next_category();
        assert_eq!(view.filter.category, CategoryFilter::All);
    }

    #[test]
    fn test_selecting_category_resets_section() {
        let view = view()
            .select_category(CategoryFilter::Id("drinks".into()))
            .next_section();
        assert_eq!(view.filter.section, SectionFilter::Named("Hot".into()));
        let view = view.next_section();
        assert_eq!(view.filter.section, SectionFilter::Named("Cold".into()));
        let view = view.next_section();
        assert_eq!(view.filter.section, SectionFilter::All);

        let view = view.next_section().select_category(CategoryFilter::All);
        assert_eq!(view.filter.section, SectionFilter::All);
    }

    #[test]
    fn test_food_tab_is_empty() {
        let view = view().select_category(CategoryFilter::Id("food".into()));
        assert!(view.content().is_empty());
    }

    #[test]
    fn test_tabs_and_prices() {
        let view = view();
        let labels: Vec<&str> = view.category_tabs().into_iter().map(|(_, l)| l).collect();
        assert_eq!(labels, vec![ALL_LABEL, "مشروبات", "أكل"]);
        assert_eq!(view.price(&view.products[1]), "22.5 ج.م");
    }
}
