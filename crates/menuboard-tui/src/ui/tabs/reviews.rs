use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{ListItem, Paragraph, Wrap},
    Frame,
};

use menuboard_core::models::stars;
use menuboard_core::utils::{format_date, format_optional, truncate_string};

use crate::app::{App, Focus};
use crate::ui::styles;

use super::{field, panel, render_list, row_style};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    render_review_list(frame, app, chunks[0]);
    render_review_detail(frame, app, chunks[1]);
}

fn render_review_list(frame: &mut Frame, app: &App, area: Rect) {
    let reviews = app.visible_reviews();
    let items: Vec<ListItem> = reviews
        .iter()
        .enumerate()
        .map(|(i, review)| {
            let status_style = if review.is_approved {
                styles::success_style()
            } else {
                styles::highlight_style()
            };
            let line = Line::from(vec![
                Span::raw(format!(
                    "{:<20} {:.1} ",
                    truncate_string(&review.customer_name, 20),
                    review.average_rating()
                )),
                Span::styled(review.status_label(), status_style),
            ]);
            ListItem::new(line).style(row_style(i == app.review_selection))
        })
        .collect();

    let title = format!(
        " Reviews: {} ({}) [f]ilter ",
        app.review_filter.label(),
        reviews.len()
    );
    render_list(frame, area, panel(title, app.focus == Focus::List), items, app.review_selection);
}

fn rating_line(label: &'static str, rating: u8) -> Line<'static> {
    Line::from(vec![
        Span::styled(label, styles::highlight_style()),
        Span::styled(stars(rating), styles::title_style()),
    ])
}

fn render_review_detail(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::Detail;

    let Some(review) = app.selected_review() else {
        let empty = Paragraph::new(Line::from(Span::styled(
            "No reviews",
            styles::muted_style(),
        )))
        .block(panel(" No Review Selected ".to_string(), focused));
        frame.render_widget(empty, area);
        return;
    };

    let location = review.location();
    let lines = vec![
        field("Phone:    ", format_optional(&review.customer_phone, "-")),
        field(
            "Location: ",
            if location.is_empty() { "-".to_string() } else { location },
        ),
        field(
            "Date:     ",
            review.created_at.as_deref().map(format_date).unwrap_or_default(),
        ),
        field("Status:   ", review.status_label().to_string()),
        Line::from(""),
        rating_line("Place:    ", review.place_rating),
        rating_line("Food:     ", review.products_rating),
        rating_line("Service:  ", review.service_rating),
        Line::from(""),
        Line::from(format_optional(&review.comment, "")),
        Line::from(""),
        Line::from(Span::styled(
            "[a]pprove  [r]eject  [d]elete",
            styles::muted_style(),
        )),
    ];

    let block = panel(format!(" {} ", review.customer_name), focused);
    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}
