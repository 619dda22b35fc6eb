use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{ListItem, Paragraph},
    Frame,
};

use menuboard_core::auth::Role;
use menuboard_core::utils::{format_date, format_optional, truncate_string};

use crate::app::{App, Focus};
use crate::ui::styles;

use super::{field, panel, render_list, row_style};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    render_user_list(frame, app, chunks[0]);
    render_user_detail(frame, app, chunks[1]);
}

fn render_user_list(frame: &mut Frame, app: &App, area: Rect) {
    let users = app.filtered_users();
    let items: Vec<ListItem> = users
        .iter()
        .enumerate()
        .map(|(i, user)| {
            let line = Line::from(vec![
                Span::styled(
                    if user.is_active { "● " } else { "○ " },
                    styles::flag_style(user.is_active),
                ),
                Span::raw(format!(
                    "{:<22} {:<8}",
                    truncate_string(&user.full_name, 22),
                    user.role.label()
                )),
            ]);
            ListItem::new(line).style(row_style(i == app.user_selection))
        })
        .collect();

    let block = panel(format!(" Users ({}) ", users.len()), app.focus == Focus::List);
    render_list(frame, area, block, items, app.user_selection);
}

fn render_user_detail(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::Detail;

    let Some(user) = app.selected_user() else {
        let empty = Paragraph::new(Line::from(Span::styled("No users", styles::muted_style())))
            .block(panel(" No User Selected ".to_string(), focused));
        frame.render_widget(empty, area);
        return;
    };

    let mut lines = vec![
        field("Email:   ", user.email.clone()),
        field("Phone:   ", format_optional(&user.phone, "-")),
        field("Role:    ", user.role.label().to_string()),
        field(
            "Status:  ",
            if user.is_active { "Active" } else { "Inactive" }.to_string(),
        ),
        field(
            "Joined:  ",
            user.created_at.as_deref().map(format_date).unwrap_or_default(),
        ),
        Line::from(""),
    ];

    if app.role().satisfies(Role::Admin) {
        lines.push(Line::from(Span::styled(
            "[t]oggle active  [d]elete",
            styles::muted_style(),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "Only admins can change accounts",
            styles::muted_style(),
        )));
    }

    let block = panel(format!(" {} ", user.full_name), focused);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
