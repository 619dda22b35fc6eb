use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, AppState, LoginFocus, Tab};

use super::styles;
use super::tabs::{categories, dashboard, menu, products, reviews, settings, users};

const LOGO: [&str; 3] = [
    "   ╔╦╗╔═╗╔╗╔╦ ╦╔╗ ╔═╗╔═╗╦═╗╔╦╗",
    "   ║║║║╣ ║║║║ ║╠╩╗║ ║╠═╣╠╦╝ ║║",
    "   ╩ ╩╚═╝╝╚╝╚═╝╚═╝╚═╝╩ ╩╩╚══╩╝",
];

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    // Render overlays
    match app.state {
        AppState::ShowingHelp => render_help_overlay(frame),
        AppState::LoggingIn => render_login_overlay(frame, app),
        AppState::ConfirmingQuit => render_quit_overlay(frame),
        AppState::ConfirmingDelete => render_delete_overlay(frame, app),
        AppState::AddingSection => render_section_overlay(frame, app),
        AppState::EditingForm => render_form_overlay(frame, app),
        AppState::Normal | AppState::Searching | AppState::Quitting => {}
    }
}

fn logo_lines() -> Vec<Line<'static>> {
    LOGO.iter()
        .map(|row| Line::from(Span::styled(*row, styles::title_style())))
        .collect()
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let name = app.restaurant_name();
    let title = if name.is_empty() {
        "  menuboard".to_string()
    } else {
        format!("  menuboard · {}", name)
    };
    let right = match app.session.data {
        Some(ref data) => format!("{} ({})  [?] Help", data.user_name, data.role.label()),
        None => "[?] Help".to_string(),
    };

    let padding = (area.width as usize)
        .saturating_sub(title.chars().count() + right.chars().count() + 2);

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(padding)),
        Span::styled(right, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::raw(" ")];
    for (i, tab) in Tab::ALL.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        let label = format!("[{}] {}", i + 1, tab.title());
        if *tab == app.current_tab {
            spans.push(Span::styled(label, styles::tab_style(true)));
        } else {
            spans.push(Span::styled(label, styles::muted_style()));
        }
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.current_tab {
        Tab::Dashboard => dashboard::render(frame, app, area),
        Tab::Categories => categories::render(frame, app, area),
        Tab::Products => products::render(frame, app, area),
        Tab::Reviews => reviews::render(frame, app, area),
        Tab::Users => users::render(frame, app, area),
        Tab::Settings => settings::render(frame, app, area),
        Tab::Menu => menu::render(frame, app, area),
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = "[u]pdate | [L]ogout | [q]uit";

    let left_text = if matches!(app.state, AppState::Searching) {
        format!(" /{}▌", app.search_query)
    } else if let Some(ref msg) = app.status_message {
        format!(" {} ", msg)
    } else if app.loading {
        " Loading... ".to_string()
    } else if let Some(ref at) = app.last_refresh {
        format!(" Updated {} ", at.format("%H:%M"))
    } else {
        " Not loaded ".to_string()
    };

    let left_style = if matches!(app.state, AppState::Searching) {
        styles::search_style()
    } else {
        styles::muted_style()
    };

    let right_text = format!(" {} ", shortcuts);
    let padding_len = (area.width as usize)
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.len());

    let status_line = Line::from(vec![
        Span::styled(left_text, left_style),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn help_line(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(key, styles::help_key_style()),
        Span::styled(desc, styles::help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(52, 31, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let mut help_text = logo_lines();
    help_text.extend([
        Line::from(Span::styled(
            format!("              version {}", version),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        help_line("  1-7       ", "Switch tabs"),
        help_line("  ←/→       ", "Prev/next tab"),
        help_line("  Tab       ", "Switch focus (list ↔ detail)"),
        help_line("  ↑/↓ j/k   ", "Navigate list"),
        help_line("  /         ", "Search products, users, menu"),
        Line::from(""),
        Line::from(Span::styled(" Actions", styles::highlight_style())),
        help_line("  u         ", "Update data from the server"),
        help_line("  t         ", "Toggle active / available"),
        help_line("  f         ", "Feature product / filter reviews"),
        help_line("  a / r     ", "Approve / reject review"),
        help_line("  s / x     ", "Add / remove category section"),
        help_line("  n / e     ", "New / edit the selected row"),
        help_line("  d         ", "Delete selection"),
        help_line("  L         ", "Log out"),
        help_line("  q         ", "Quit"),
        Line::from(""),
        Line::from(Span::styled(" Menu Tab", styles::highlight_style())),
        help_line("  c / s     ", "Next category / section"),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(help_text).block(block);

    frame.render_widget(paragraph, area);
}

fn input_field<'a>(label: &'static str, value: String, focused: bool) -> Line<'a> {
    let style = if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let cursor = if focused { "▌" } else { "" };
    Line::from(vec![
        Span::raw("   "),
        Span::styled(label, styles::muted_style()),
        Span::styled(format!("{:<24}{}", value, cursor), style),
        Span::styled("]", styles::muted_style()),
    ])
}

fn render_login_overlay(frame: &mut Frame, app: &App) {
    let height = if app.login_error.is_some() { 15 } else { 13 };
    let area = centered_rect_fixed(46, height, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let mut lines = logo_lines();
    lines.push(Line::from(""));

    // Keep the tail of long emails visible
    let email: String = {
        let chars: Vec<char> = app.login_email.chars().collect();
        chars[chars.len().saturating_sub(24)..].iter().collect()
    };
    lines.push(input_field(
        "Email:    [",
        email,
        app.login_focus == LoginFocus::Email,
    ));
    lines.push(input_field(
        "Password: [",
        "*".repeat(app.login_password.chars().count().min(24)),
        app.login_focus == LoginFocus::Password,
    ));

    let button_focused = app.login_focus == LoginFocus::Button;
    let button_style = if button_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    lines.push(Line::from(""));
    let button_label = if button_focused { " ▶ Login ◀ " } else { "   Login   " };
    lines.push(Line::from(vec![
        Span::raw("              ["),
        Span::styled(button_label, button_style),
        Span::raw("]"),
    ]));

    lines.push(Line::from(vec![
        Span::styled("        ", styles::muted_style()),
        Span::styled("F2", styles::help_key_style()),
        Span::styled(" to register a restaurant", styles::muted_style()),
    ]));

    if let Some(ref error) = app.login_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", error),
            styles::error_style(),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block);

    frame.render_widget(paragraph, area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn confirm_keys(action: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled("   Press ", styles::muted_style()),
        Span::styled("[Y]", styles::help_key_style()),
        Span::styled(action, styles::muted_style()),
        Span::styled("[N]", styles::help_key_style()),
        Span::styled(" to cancel", styles::muted_style()),
    ])
}

fn render_dialog(frame: &mut Frame, height: u16, lines: Vec<Line>) {
    let area = centered_rect_fixed(46, height, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_quit_overlay(frame: &mut Frame) {
    let mut lines = logo_lines();
    lines.extend([
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        confirm_keys(" to quit, "),
    ]);
    render_dialog(frame, 10, lines);
}

fn render_delete_overlay(frame: &mut Frame, app: &App) {
    let target = app
        .pending_delete
        .as_ref()
        .map(|p| p.describe())
        .unwrap_or_default();

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("   Delete", styles::error_style())),
        Line::from(Span::styled(format!("   {}?", target), styles::highlight_style())),
        Line::from(""),
        Line::from(Span::styled("   This cannot be undone.", styles::muted_style())),
        Line::from(""),
        confirm_keys(" to delete, "),
    ];
    render_dialog(frame, 9, lines);
}

fn render_section_overlay(frame: &mut Frame, app: &App) {
    let category = app
        .selected_category()
        .map(|c| c.display_name().to_string())
        .unwrap_or_default();

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("   New section in {}", category),
            styles::highlight_style(),
        )),
        Line::from(""),
        input_field("Name: [", app.section_input.clone(), true),
        Line::from(""),
        Line::from(vec![
            Span::styled("   ", styles::muted_style()),
            Span::styled("Enter", styles::help_key_style()),
            Span::styled(" to add, ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];
    render_dialog(frame, 8, lines);
}

/// Width of the value column in the form overlay
const FORM_VALUE_WIDTH: usize = 32;

fn render_form_overlay(frame: &mut Frame, app: &App) {
    let Some(ref form) = app.form else {
        return;
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("   {}", form.kind.title()),
            styles::highlight_style(),
        )),
        Line::from(""),
    ];

    for (i, field) in form.fields.iter().enumerate() {
        let focused = i == form.focus;
        let style = if focused {
            styles::selected_style()
        } else {
            styles::list_item_style()
        };
        // Keep the tail of long values visible
        let value: String = {
            let chars: Vec<char> = field.display().chars().collect();
            chars[chars.len().saturating_sub(FORM_VALUE_WIDTH)..].iter().collect()
        };
        let cursor = if focused { "▌" } else { "" };
        lines.push(Line::from(vec![
            Span::styled(format!("   {:<22}", field.label), styles::muted_style()),
            Span::styled(format!("{}{}", value, cursor), style),
        ]));
    }

    if let Some(ref error) = form.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("   {}", error),
            styles::error_style(),
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("   ", styles::muted_style()),
        Span::styled("Tab", styles::help_key_style()),
        Span::styled(" next, ", styles::muted_style()),
        Span::styled("Space/←→", styles::help_key_style()),
        Span::styled(" change, ", styles::muted_style()),
        Span::styled("Enter", styles::help_key_style()),
        Span::styled(" save, ", styles::muted_style()),
        Span::styled("Esc", styles::help_key_style()),
        Span::styled(" cancel", styles::muted_style()),
    ]));

    let height = lines.len() as u16 + 2;
    let area = centered_rect_fixed(64, height, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::{loaded_app, test_app};
    use menuboard_core::auth::Role;
    use ratatui::{backend::TestBackend, Terminal};

    fn draw(app: &App) -> String {
        let backend = TestBackend::new(100, 32);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_centered_rect_fixed_clamps_to_area() {
        let outer = Rect::new(0, 0, 20, 10);
        assert_eq!(centered_rect_fixed(46, 12, outer), Rect::new(0, 0, 20, 10));
        assert_eq!(centered_rect_fixed(10, 4, outer), Rect::new(5, 3, 10, 4));
    }

    #[test]
    fn test_every_tab_renders() {
        let (mut app, _dir) = loaded_app(Role::Admin);
        for tab in Tab::ALL {
            app.current_tab = tab;
            let screen = draw(&app);
            assert!(screen.contains(tab.title()));
        }
    }

    #[test]
    fn test_login_overlay_shows_error() {
        let (mut app, _dir) = test_app(None);
        app.start_login();
        app.login_error = Some("Invalid email or password".to_string());
        let screen = draw(&app);
        assert!(screen.contains("Email:"));
        assert!(screen.contains("Invalid email or password"));
    }

    #[test]
    fn test_form_overlay_masks_secrets_and_shows_error() {
        let (mut app, _dir) = loaded_app(Role::Admin);
        app.current_tab = Tab::Users;
        app.begin_create();
        if let Some(form) = app.form.as_mut() {
            form.focus = 4;
            for c in "hunter22".chars() {
                form.push_char(c);
            }
            form.error = Some("email is required".to_string());
        }
        let screen = draw(&app);
        assert!(screen.contains("New user"));
        assert!(screen.contains("********"));
        assert!(!screen.contains("hunter22"));
        assert!(screen.contains("email is required"));
    }

    #[test]
    fn test_delete_overlay_names_target() {
        let (mut app, _dir) = loaded_app(Role::Manager);
        app.current_tab = Tab::Products;
        app.request_delete();
        let screen = draw(&app);
        assert!(screen.contains("product \"Tea\"?"));
    }
}
