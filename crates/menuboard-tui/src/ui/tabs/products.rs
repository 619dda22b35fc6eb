use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{ListItem, Paragraph, Wrap},
    Frame,
};

use menuboard_core::utils::{format_currency, format_optional, truncate_string};

use crate::app::{App, Focus};
use crate::ui::styles;

use super::{field, panel, render_list, row_style};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    render_product_list(frame, app, chunks[0]);
    render_product_detail(frame, app, chunks[1]);
}

fn currency(app: &App) -> Option<&str> {
    app.dashboard
        .settings
        .as_ref()
        .map(|s| s.currency_or_default())
}

fn render_product_list(frame: &mut Frame, app: &App, area: Rect) {
    let products = app.filtered_products();
    let items: Vec<ListItem> = products
        .iter()
        .enumerate()
        .map(|(i, product)| {
            let line = Line::from(vec![
                Span::styled(
                    if product.is_available { "● " } else { "○ " },
                    styles::flag_style(product.is_available),
                ),
                Span::raw(format!(
                    "{:<22} {:<14} {:>10}",
                    truncate_string(&product.name_ar, 22),
                    truncate_string(app.category_name(&product.category_id), 14),
                    format_currency(product.price, currency(app)),
                )),
                Span::styled(
                    if product.is_featured { " ★" } else { "" },
                    styles::highlight_style(),
                ),
            ]);
            ListItem::new(line).style(row_style(i == app.product_selection))
        })
        .collect();

    let title = if app.search_query.is_empty() {
        format!(" Products ({}) ", products.len())
    } else {
        format!(" Products ({}) /{} ", products.len(), app.search_query)
    };
    render_list(frame, area, panel(title, app.focus == Focus::List), items, app.product_selection);
}

fn render_product_detail(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::Detail;

    let Some(product) = app.selected_product() else {
        let empty = Paragraph::new(Line::from(Span::styled(
            "No products match",
            styles::muted_style(),
        )))
        .block(panel(" No Product Selected ".to_string(), focused));
        frame.render_widget(empty, area);
        return;
    };

    let lines = vec![
        field("English name: ", format_optional(&product.name_en, "-")),
        field("Category:     ", app.category_name(&product.category_id).to_string()),
        field("Section:      ", product.section_name().unwrap_or("-").to_string()),
        field("Price:        ", format_currency(product.price, currency(app))),
        field(
            "Available:    ",
            if product.is_available { "Yes" } else { "No" }.to_string(),
        ),
        field(
            "Featured:     ",
            if product.is_featured { "Yes" } else { "No" }.to_string(),
        ),
        Line::from(""),
        Line::from(Span::styled("Description", styles::title_style())),
        Line::from(format_optional(&product.description_ar, "-")),
        Line::from(Span::styled(
            format_optional(&product.description_en, ""),
            styles::muted_style(),
        )),
    ];

    let block = panel(format!(" {} ", product.name_ar), focused);
    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}
