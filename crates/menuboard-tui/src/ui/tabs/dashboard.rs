use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use menuboard_core::models::stars;

use crate::app::App;
use crate::ui::styles;

use super::panel;

/// Number of pending reviews listed under the stats
const PENDING_PREVIEW: usize = 8;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(5)])
        .split(area);

    render_stats(frame, app, chunks[0]);
    render_pending_reviews(frame, app, chunks[1]);
}

fn render_stats(frame: &mut Frame, app: &App, area: Rect) {
    let stats = &app.dashboard.stats;
    let cards = [
        ("Categories", stats.category_count.to_string()),
        (
            "Products",
            format!("{} ({} available)", stats.product_count, stats.available_products),
        ),
        (
            "Reviews",
            format!("{} ({} pending)", stats.review_count, stats.pending_reviews),
        ),
        ("Rating", format!("{:.1} / 5", stats.average_rating)),
        ("Users", stats.user_count.to_string()),
    ];

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, cards.len() as u32); 5])
        .split(area);

    for ((label, value), column) in cards.into_iter().zip(columns.iter()) {
        let block = Block::default()
            .title(format!(" {} ", label))
            .title_style(styles::muted_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(false));
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(format!(" {}", value), styles::title_style())),
        ];
        frame.render_widget(Paragraph::new(text).block(block), *column);
    }
}

fn render_pending_reviews(frame: &mut Frame, app: &App, area: Rect) {
    let pending: Vec<_> = app
        .dashboard
        .reviews
        .iter()
        .filter(|r| !r.is_approved)
        .take(PENDING_PREVIEW)
        .collect();

    let mut lines = Vec::new();
    if pending.is_empty() {
        lines.push(Line::from(Span::styled(
            "  No reviews waiting for approval",
            styles::muted_style(),
        )));
    }
    for review in pending {
        lines.push(Line::from(vec![
            Span::styled(
                format!("  {} ", stars(review.average_rating().round() as u8)),
                styles::highlight_style(),
            ),
            Span::raw(review.customer_name.clone()),
            Span::styled(
                review
                    .comment
                    .as_ref()
                    .map(|c| format!(" - {}", c))
                    .unwrap_or_default(),
                styles::muted_style(),
            ),
        ]));
    }

    let block = panel(
        format!(" Pending Reviews ({}) ", app.dashboard.stats.pending_reviews),
        false,
    );
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
