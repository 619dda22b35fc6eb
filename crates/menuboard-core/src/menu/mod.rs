//! Menu display logic.
//!
//! - `grouping`: category → section → product ordering
//! - `filter`: category/section/search filtering on top of the grouping
//! - `view`: the menu screen state, passed in and returned explicitly

pub mod filter;
pub mod grouping;
pub mod view;

pub use filter::{section_options, CategoryFilter, MenuContent, MenuFilter, SectionFilter, EMPTY_MESSAGE};
pub use grouping::{
    group_all, group_category, group_sections, CategoryGroup, SectionGroup, SectionKey, UNSECTIONED_LABEL,
};
pub use view::{MenuView, ALL_LABEL};
