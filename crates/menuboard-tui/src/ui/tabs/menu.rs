//! Public menu preview: the same grouping customers see.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use menuboard_core::menu::{MenuContent, SectionFilter, ALL_LABEL};
use menuboard_core::utils::format_optional;

use crate::app::App;
use crate::ui::styles;

use super::panel;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(5)])
        .split(area);

    render_filters(frame, app, chunks[0]);
    render_content(frame, app, chunks[1]);
}

fn selector_line(label: &'static str, options: Vec<(String, bool)>) -> Line<'static> {
    let mut spans = vec![Span::styled(label, styles::muted_style())];
    for (i, (name, selected)) in options.into_iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        spans.push(Span::styled(name, styles::tab_style(selected)));
    }
    Line::from(spans)
}

fn render_filters(frame: &mut Frame, app: &App, area: Rect) {
    let view = &app.menu;
    let categories = view
        .category_tabs()
        .into_iter()
        .map(|(filter, name)| (name.to_string(), filter == view.filter.category))
        .collect();

    let mut lines = vec![selector_line("[c] ", categories)];

    let sections = view.section_choices();
    if !sections.is_empty() {
        let options = std::iter::once((
            ALL_LABEL.to_string(),
            view.filter.section == SectionFilter::All,
        ))
        .chain(sections.into_iter().map(|name| {
            let selected = view.filter.section == SectionFilter::Named(name.clone());
            (name, selected)
        }))
        .collect();
        lines.push(selector_line("[s] ", options));
    }

    frame.render_widget(
        Paragraph::new(lines).block(panel(" Menu ".to_string(), false)),
        area,
    );
}

fn render_content(frame: &mut Frame, app: &App, area: Rect) {
    let view = &app.menu;
    let mut lines = Vec::new();

    match view.content() {
        MenuContent::Empty { message } => {
            lines.push(Line::from(Span::styled(message, styles::muted_style())));
        }
        MenuContent::Groups(groups) => {
            for group in groups {
                lines.push(Line::from(Span::styled(
                    group.category.display_name().to_string(),
                    styles::title_style(),
                )));
                for section in &group.sections {
                    lines.push(Line::from(Span::styled(
                        format!("  {}", section.key.label()),
                        styles::highlight_style(),
                    )));
                    for product in &section.products {
                        lines.push(Line::from(vec![
                            Span::raw(format!("    {:<28}", product.name_ar)),
                            Span::styled(view.price(product), styles::success_style()),
                            Span::styled(
                                format!("  {}", format_optional(&product.description_ar, "")),
                                styles::muted_style(),
                            ),
                        ]));
                    }
                }
                lines.push(Line::from(""));
            }
        }
    }

    let title = if view.filter.search.is_empty() {
        " Products ".to_string()
    } else {
        format!(" Products matching \"{}\" ", view.filter.search)
    };
    frame.render_widget(Paragraph::new(lines).block(panel(title, false)), area);
}
