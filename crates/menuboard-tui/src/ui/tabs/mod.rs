//! Per-tab content rendering.

pub mod categories;
pub mod dashboard;
pub mod menu;
pub mod products;
pub mod reviews;
pub mod settings;
pub mod users;

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use crate::ui::styles;

/// Bordered block with the standard title styling
pub(crate) fn panel(title: String, focused: bool) -> Block<'static> {
    Block::default()
        .title(title)
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused))
}

/// Render `items` as a selectable list
pub(crate) fn render_list(
    frame: &mut Frame,
    area: Rect,
    block: Block,
    items: Vec<ListItem>,
    selection: usize,
) {
    let list = List::new(items).block(block);
    let mut state = ListState::default();
    state.select(Some(selection));
    frame.render_stateful_widget(list, area, &mut state);
}

/// `label: value` detail line
pub(crate) fn field(label: &'static str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(label, styles::highlight_style()),
        Span::raw(value),
    ])
}

/// Selected rows are highlighted regardless of focus
pub(crate) fn row_style(selected: bool) -> ratatui::style::Style {
    if selected {
        styles::selected_style()
    } else {
        styles::list_item_style()
    }
}
