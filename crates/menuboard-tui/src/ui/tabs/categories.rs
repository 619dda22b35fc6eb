use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{ListItem, Paragraph},
    Frame,
};

use menuboard_core::menu::group_category;
use menuboard_core::utils::{format_optional, truncate_string};

use crate::app::{App, Focus};
use crate::ui::styles;

use super::{field, panel, render_list, row_style};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    render_category_list(frame, app, chunks[0]);
    render_category_detail(frame, app, chunks[1]);
}

fn render_category_list(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .dashboard
        .categories
        .iter()
        .enumerate()
        .map(|(i, category)| {
            let line = Line::from(vec![
                Span::styled(
                    if category.is_active { "● " } else { "○ " },
                    styles::flag_style(category.is_active),
                ),
                Span::raw(format!(
                    "{:<24} ({})",
                    truncate_string(category.display_name(), 24),
                    app.product_count(&category.id)
                )),
            ]);
            ListItem::new(line).style(row_style(i == app.category_selection))
        })
        .collect();

    let block = panel(
        format!(" Categories ({}) ", app.dashboard.categories.len()),
        app.focus == Focus::List,
    );
    render_list(frame, area, block, items, app.category_selection);
}

fn render_category_detail(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::Detail;

    let Some(category) = app.selected_category() else {
        let empty = Paragraph::new(Line::from(Span::styled(
            "No categories yet",
            styles::muted_style(),
        )))
        .block(panel(" No Category Selected ".to_string(), focused));
        frame.render_widget(empty, area);
        return;
    };

    let mut lines = vec![
        field("English name: ", format_optional(&category.name_en, "-")),
        field("Description:  ", format_optional(&category.description_ar, "-")),
        field("Order:        ", category.display_order.to_string()),
        field(
            "Status:       ",
            if category.is_active { "Visible" } else { "Hidden" }.to_string(),
        ),
        Line::from(""),
        Line::from(Span::styled(
            format!("Declared sections ({})", category.sections.len()),
            styles::title_style(),
        )),
    ];

    for (i, section) in category.sections.iter().enumerate() {
        let style = if focused {
            row_style(i == app.section_selection)
        } else {
            styles::list_item_style()
        };
        lines.push(Line::styled(format!("  {}", section), style));
    }
    if category.sections.is_empty() {
        lines.push(Line::from(Span::styled("  None", styles::muted_style())));
    }

    // What the menu will actually show, including ad-hoc sections
    let group = group_category(category, &app.dashboard.products);
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("Menu layout ({} products)", group.product_count()),
        styles::title_style(),
    )));
    for section in &group.sections {
        lines.push(Line::from(vec![
            Span::raw(format!("  {}", section.key.label())),
            Span::styled(format!("  {}", section.products.len()), styles::muted_style()),
        ]));
    }

    let block = panel(format!(" {} ", category.display_name()), focused);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
