use crate::models::{Category, Product};

use super::grouping::{group_all, group_sections, CategoryGroup, SectionKey};

/// Shown when a filter leaves nothing to display
pub const EMPTY_MESSAGE: &str = "No products match the current filter";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Id(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SectionFilter {
    #[default]
    All,
    Named(String),
}

impl SectionFilter {
    fn matches(&self, product: &Product) -> bool {
        match self {
            SectionFilter::All => true,
            SectionFilter::Named(name) => product.section_name() == Some(name.as_str()),
        }
    }
}

/// What the menu shows after filtering.
#[derive(Debug, Clone, PartialEq)]
pub enum MenuContent<'a> {
    Groups(Vec<CategoryGroup<'a>>),
    Empty { message: &'static str },
}

impl<'a> MenuContent<'a> {
    pub fn groups(&self) -> &[CategoryGroup<'a>] {
        match self {
            MenuContent::Groups(groups) => groups,
            MenuContent::Empty { .. } => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, MenuContent::Empty { .. })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuFilter {
    pub category: CategoryFilter,
    /// Only applies when a single category is selected
    pub section: SectionFilter,
    pub search: String,
}

impl MenuFilter {
    pub fn apply<'a>(&self, categories: &'a [Category], products: &'a [Product]) -> MenuContent<'a> {
        let groups = match self.category {
            CategoryFilter::All if self.search.trim().is_empty() => group_all(categories, products),
            CategoryFilter::All => categories
                .iter()
                .map(|category| CategoryGroup {
                    category,
                    sections: group_sections(
                        category,
                        products
                            .iter()
                            .filter(|p| p.category_id == category.id)
                            .filter(|p| p.matches_search(&self.search)),
                    ),
                })
                .filter(|group| !group.is_empty())
                .collect(),
            CategoryFilter::Id(ref id) => match categories.iter().find(|c| &c.id == id) {
                Some(category) => {
                    let group = CategoryGroup {
                        category,
                        sections: group_sections(
                            category,
                            products
                                .iter()
                                .filter(|p| &p.category_id == id)
                                .filter(|p| self.section.matches(p))
                                .filter(|p| p.matches_search(&self.search)),
                        ),
                    };
                    if group.is_empty() {
                        Vec::new()
                    } else {
                        vec![group]
                    }
                }
                None => Vec::new(),
            },
        };

        if groups.is_empty() {
            MenuContent::Empty {
                message: EMPTY_MESSAGE,
            }
        } else {
            MenuContent::Groups(groups)
        }
    }
}

/// Section choices for one category: declared sections that have products,
/// then ad-hoc names, in display order. The no-section bucket is left out.
pub fn section_options(category: &Category, products: &[Product]) -> Vec<String> {
    let own = products.iter().filter(|p| p.category_id == category.id);
    group_sections(category, own)
        .into_iter()
        .filter_map(|group| match group.key {
            SectionKey::Named(name) => Some(name),
            SectionKey::Unsectioned => None,
        })
        .collect()
}
