//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{
    can_add_email_char, can_add_password_char, can_add_section_char, App, AppState, Focus,
    LoginFocus, Tab, PAGE_SCROLL_SIZE,
};

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match app.state {
        AppState::LoggingIn => return handle_login_input(app, key).await,
        AppState::Searching => return Ok(handle_search_input(app, key)),
        AppState::AddingSection => return Ok(handle_section_input(app, key)),
        AppState::EditingForm => {
            handle_form_input(app, key).await;
            return Ok(false);
        }
        AppState::ShowingHelp => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                app.state = AppState::Normal;
            }
            return Ok(false);
        }
        AppState::ConfirmingQuit => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    app.state = AppState::Quitting;
                    return Ok(true);
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.state = AppState::Normal;
                }
                _ => {}
            }
            return Ok(false);
        }
        AppState::ConfirmingDelete => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_delete(),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.cancel_delete(),
                _ => {}
            }
            return Ok(false);
        }
        AppState::Normal | AppState::Quitting => {}
    }

    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
        }
        KeyCode::Char(c @ '1'..='7') => {
            if let Some(tab) = c.to_digit(10).and_then(|n| Tab::from_number(n as usize)) {
                switch_tab(app, tab);
            }
        }
        KeyCode::Left => switch_tab(app, app.current_tab.prev()),
        KeyCode::Right => switch_tab(app, app.current_tab.next()),
        KeyCode::Char('u') => {
            app.status_message = None;
            app.refresh_all_background();
        }
        KeyCode::Char('L') => app.logout(),
        KeyCode::Char('/') => {
            app.state = AppState::Searching;
            app.search_query.clear();
            apply_search(app);
        }
        KeyCode::Tab => {
            app.focus = match app.focus {
                Focus::List => Focus::Detail,
                Focus::Detail => Focus::List,
            };
        }
        KeyCode::Esc => {
            if app.focus == Focus::Detail {
                app.focus = Focus::List;
            } else {
                app.search_query.clear();
                app.status_message = None;
                apply_search(app);
            }
        }
        KeyCode::Char('d') => app.request_delete(),
        KeyCode::Char('n') => app.begin_create(),
        KeyCode::Char('e') => app.begin_edit(),
        _ => match app.current_tab {
            Tab::Categories => handle_categories_input(app, key),
            Tab::Products => handle_products_input(app, key),
            Tab::Reviews => handle_reviews_input(app, key),
            Tab::Users => handle_users_input(app, key),
            Tab::Menu => handle_menu_input(app, key),
            Tab::Dashboard | Tab::Settings => {}
        },
    }

    Ok(false)
}

fn switch_tab(app: &mut App, tab: Tab) {
    app.current_tab = tab;
    app.focus = Focus::List;
}

/// Push the search box into whichever view filters on it
fn apply_search(app: &mut App) {
    app.product_selection = 0;
    app.user_selection = 0;
    app.sync_menu_search();
}

fn handle_search_input(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Normal;
            app.search_query.clear();
            apply_search(app);
        }
        KeyCode::Enter => {
            // Keep search query active
            app.state = AppState::Normal;
        }
        KeyCode::Backspace => {
            app.search_query.pop();
            apply_search(app);
        }
        KeyCode::Char(c) => {
            app.search_query.push(c);
            apply_search(app);
        }
        _ => {}
    }
    false
}

fn handle_section_input(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc => {
            app.section_input.clear();
            app.state = AppState::Normal;
        }
        KeyCode::Enter => app.submit_section(),
        KeyCode::Backspace => {
            app.section_input.pop();
        }
        KeyCode::Char(c) => {
            if can_add_section_char(app.section_input.chars().count(), c) {
                app.section_input.push(c);
            }
        }
        _ => {}
    }
    false
}

/// Field editing inside a form overlay. Space flips toggles and choices,
/// and is typed into text fields.
async fn handle_form_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => return app.cancel_form(),
        KeyCode::Enter => return app.submit_form().await,
        _ => {}
    }

    let Some(form) = app.form.as_mut() else {
        app.state = AppState::Normal;
        return;
    };
    match key.code {
        KeyCode::Tab | KeyCode::Down => form.next_field(),
        KeyCode::BackTab | KeyCode::Up => form.prev_field(),
        KeyCode::Left => {
            form.cycle(false);
        }
        KeyCode::Right => {
            form.cycle(true);
        }
        KeyCode::Backspace => form.pop_char(),
        KeyCode::Char(' ') if form.cycle(true) => {}
        KeyCode::Char(c) => form.push_char(c),
        _ => {}
    }
}

async fn handle_login_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            // Quit if on login screen
            app.state = AppState::Quitting;
            return Ok(true);
        }
        KeyCode::F(2) => app.begin_register(),
        KeyCode::Down | KeyCode::Tab => {
            app.login_focus = match app.login_focus {
                LoginFocus::Email => LoginFocus::Password,
                LoginFocus::Password => LoginFocus::Button,
                LoginFocus::Button => LoginFocus::Email,
            };
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.login_focus = match app.login_focus {
                LoginFocus::Email => LoginFocus::Button,
                LoginFocus::Password => LoginFocus::Email,
                LoginFocus::Button => LoginFocus::Password,
            };
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Email => app.login_focus = LoginFocus::Password,
            LoginFocus::Password | LoginFocus::Button => {
                // Errors are shown in the overlay
                let _ = app.attempt_login().await;
            }
        },
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Email => {
                app.login_email.pop();
            }
            LoginFocus::Password => {
                app.login_password.pop();
            }
            LoginFocus::Button => {}
        },
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Email => {
                if can_add_email_char(app.login_email.chars().count(), c) {
                    app.login_email.push(c);
                }
            }
            LoginFocus::Password => {
                if can_add_password_char(app.login_password.chars().count(), c) {
                    app.login_password.push(c);
                }
            }
            LoginFocus::Button => {}
        },
        _ => {}
    }
    Ok(false)
}

/// Move a selection with the usual list keys. Returns false for other keys.
fn navigate(selection: &mut usize, len: usize, key: KeyEvent) -> bool {
    let max = len.saturating_sub(1);
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => *selection = (*selection + 1).min(max),
        KeyCode::Char('k') | KeyCode::Up => *selection = selection.saturating_sub(1),
        KeyCode::PageDown => *selection = (*selection + PAGE_SCROLL_SIZE).min(max),
        KeyCode::PageUp => *selection = selection.saturating_sub(PAGE_SCROLL_SIZE),
        KeyCode::Home => *selection = 0,
        KeyCode::End => *selection = max,
        _ => return false,
    }
    true
}

fn handle_categories_input(app: &mut App, key: KeyEvent) {
    match app.focus {
        Focus::List => {
            let len = app.dashboard.categories.len();
            if navigate(&mut app.category_selection, len, key) {
                app.section_selection = 0;
                return;
            }
        }
        Focus::Detail => {
            let len = app.selected_category().map_or(0, |c| c.sections.len());
            if navigate(&mut app.section_selection, len, key) {
                return;
            }
        }
    }

    match key.code {
        KeyCode::Char('t') => app.toggle_selected_category(),
        KeyCode::Char('s') => app.begin_add_section(),
        KeyCode::Char('x') if app.focus == Focus::Detail => app.remove_selected_section(),
        _ => {}
    }
}

fn handle_products_input(app: &mut App, key: KeyEvent) {
    let len = app.filtered_products().len();
    if navigate(&mut app.product_selection, len, key) {
        return;
    }
    match key.code {
        KeyCode::Char('t') => app.toggle_selected_availability(),
        KeyCode::Char('f') => app.toggle_selected_featured(),
        _ => {}
    }
}

fn handle_reviews_input(app: &mut App, key: KeyEvent) {
    let len = app.visible_reviews().len();
    if navigate(&mut app.review_selection, len, key) {
        return;
    }
    match key.code {
        KeyCode::Char('f') => app.cycle_review_filter(),
        KeyCode::Char('a') => app.approve_selected_review(),
        KeyCode::Char('r') => app.reject_selected_review(),
        _ => {}
    }
}

fn handle_users_input(app: &mut App, key: KeyEvent) {
    let len = app.filtered_users().len();
    if navigate(&mut app.user_selection, len, key) {
        return;
    }
    if key.code == KeyCode::Char('t') {
        app.toggle_selected_user();
    }
}

fn handle_menu_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('c') => app.menu_next_category(),
        KeyCode::Char('s') => app.menu_next_section(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::{loaded_app, test_app};
    use crate::app::PendingDelete;
    use crate::form::FormKind;
    use crossterm::event::KeyModifiers;
    use menuboard_core::auth::Role;
    use menuboard_core::menu::{CategoryFilter, SectionFilter};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    async fn press(app: &mut App, code: KeyCode) -> bool {
        handle_input(app, key(code)).await.unwrap()
    }

    async fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c)).await;
        }
    }

    // -------------------------------------------------------------------------
    // Navigation
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_number_keys_switch_tabs() {
        let (mut app, _dir) = loaded_app(Role::Admin);
        press(&mut app, KeyCode::Char('3')).await;
        assert_eq!(app.current_tab, Tab::Products);
        press(&mut app, KeyCode::Char('7')).await;
        assert_eq!(app.current_tab, Tab::Menu);
        press(&mut app, KeyCode::Right).await;
        assert_eq!(app.current_tab, Tab::Dashboard);
    }

    #[tokio::test]
    async fn test_list_navigation_clamps() {
        let (mut app, _dir) = loaded_app(Role::Admin);
        app.current_tab = Tab::Products;
        for _ in 0..5 {
            press(&mut app, KeyCode::Down).await;
        }
        assert_eq!(app.product_selection, 2);
        press(&mut app, KeyCode::Home).await;
        assert_eq!(app.product_selection, 0);
        press(&mut app, KeyCode::Up).await;
        assert_eq!(app.product_selection, 0);
    }

    #[tokio::test]
    async fn test_quit_requires_confirmation() {
        let (mut app, _dir) = loaded_app(Role::Admin);
        assert!(!press(&mut app, KeyCode::Char('q')).await);
        assert_eq!(app.state, AppState::ConfirmingQuit);
        assert!(!press(&mut app, KeyCode::Char('n')).await);
        assert_eq!(app.state, AppState::Normal);
        press(&mut app, KeyCode::Char('q')).await;
        assert!(press(&mut app, KeyCode::Char('y')).await);
        assert_eq!(app.state, AppState::Quitting);
    }

    // -------------------------------------------------------------------------
    // Search
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_search_filters_products_and_menu() {
        let (mut app, _dir) = loaded_app(Role::Admin);
        app.current_tab = Tab::Products;
        press(&mut app, KeyCode::Char('/')).await;
        assert_eq!(app.state, AppState::Searching);
        type_text(&mut app, "tea").await;
        press(&mut app, KeyCode::Enter).await;

        assert_eq!(app.state, AppState::Normal);
        assert_eq!(app.filtered_products().len(), 1);
        assert_eq!(app.menu.filter.search, "tea");

        press(&mut app, KeyCode::Esc).await;
        assert!(app.search_query.is_empty());
        assert!(app.menu.filter.search.is_empty());
    }

    #[tokio::test]
    async fn test_search_keys_do_not_trigger_actions() {
        let (mut app, _dir) = loaded_app(Role::Admin);
        app.current_tab = Tab::Products;
        press(&mut app, KeyCode::Char('/')).await;
        type_text(&mut app, "dq").await;
        assert_eq!(app.state, AppState::Searching);
        assert!(app.pending_delete.is_none());
    }

    // -------------------------------------------------------------------------
    // Login
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_login_form_typing_and_focus() {
        let (mut app, _dir) = test_app(None);
        app.start_login();
        type_text(&mut app, "chef@example.com").await;
        press(&mut app, KeyCode::Tab).await;
        type_text(&mut app, "pa ss").await;
        press(&mut app, KeyCode::Backspace).await;

        assert_eq!(app.login_email, "chef@example.com");
        assert_eq!(app.login_password, "pa s");
        assert_eq!(app.login_focus, LoginFocus::Password);

        press(&mut app, KeyCode::Up).await;
        assert_eq!(app.login_focus, LoginFocus::Email);
    }

    #[tokio::test]
    async fn test_login_escape_quits() {
        let (mut app, _dir) = test_app(None);
        app.start_login();
        assert!(press(&mut app, KeyCode::Esc).await);
    }

    // -------------------------------------------------------------------------
    // Tab Actions
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_delete_flow_can_be_cancelled() {
        let (mut app, _dir) = loaded_app(Role::Manager);
        app.current_tab = Tab::Reviews;
        press(&mut app, KeyCode::Char('d')).await;
        assert_eq!(app.state, AppState::ConfirmingDelete);
        assert!(matches!(app.pending_delete, Some(PendingDelete::Review { .. })));

        press(&mut app, KeyCode::Esc).await;
        assert_eq!(app.state, AppState::Normal);
        assert!(app.pending_delete.is_none());
    }

    #[tokio::test]
    async fn test_review_filter_key_cycles() {
        let (mut app, _dir) = loaded_app(Role::Staff);
        app.current_tab = Tab::Reviews;
        press(&mut app, KeyCode::Char('f')).await;
        assert_eq!(app.visible_reviews().len(), 1);
    }

    #[tokio::test]
    async fn test_section_prompt_collects_text() {
        let (mut app, _dir) = loaded_app(Role::Manager);
        app.current_tab = Tab::Categories;
        press(&mut app, KeyCode::Char('s')).await;
        assert_eq!(app.state, AppState::AddingSection);

        // 'q' is text here, not quit
        type_text(&mut app, "Iced q").await;
        assert_eq!(app.section_input, "Iced q");
        press(&mut app, KeyCode::Esc).await;
        assert_eq!(app.state, AppState::Normal);
        assert!(app.section_input.is_empty());
    }

    #[tokio::test]
    async fn test_staff_cannot_open_section_prompt() {
        let (mut app, _dir) = loaded_app(Role::Staff);
        app.current_tab = Tab::Categories;
        press(&mut app, KeyCode::Char('s')).await;
        assert_eq!(app.state, AppState::Normal);
        assert_eq!(app.status_message.as_deref(), Some("Requires Manager role"));
    }

    // -------------------------------------------------------------------------
    // Forms
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_new_category_form_collects_fields() {
        let (mut app, _dir) = loaded_app(Role::Manager);
        app.current_tab = Tab::Categories;
        press(&mut app, KeyCode::Char('n')).await;
        assert_eq!(app.state, AppState::EditingForm);

        // 'q' and 'd' are text here
        type_text(&mut app, "Soup qd").await;
        press(&mut app, KeyCode::Down).await;
        type_text(&mut app, "Soups").await;

        let form = app.form.as_ref().unwrap();
        assert_eq!(form.kind, FormKind::NewCategory);
        assert_eq!(form.fields[0].display(), "Soup qd");
        assert_eq!(form.fields[1].display(), "Soups");
        assert!(app.pending_delete.is_none());
    }

    #[tokio::test]
    async fn test_space_flips_toggle_but_types_in_text() {
        let (mut app, _dir) = loaded_app(Role::Manager);
        app.current_tab = Tab::Categories;
        press(&mut app, KeyCode::Char('e')).await;
        type_text(&mut app, " x").await;
        press(&mut app, KeyCode::Up).await;
        press(&mut app, KeyCode::Char(' ')).await;

        let form = app.form.as_ref().unwrap();
        assert_eq!(form.fields[0].display(), "Drinks x");
        assert_eq!(form.focused().map(|f| f.display()).as_deref(), Some("[ ]"));
    }

    #[tokio::test]
    async fn test_invalid_form_stays_open_with_error() {
        let (mut app, _dir) = loaded_app(Role::Manager);
        app.current_tab = Tab::Categories;
        press(&mut app, KeyCode::Char('n')).await;
        press(&mut app, KeyCode::Enter).await;

        assert_eq!(app.state, AppState::EditingForm);
        let error = app.form.as_ref().and_then(|f| f.error.clone());
        assert_eq!(error.as_deref(), Some("name ar is required"));
        assert!(!app.loading);

        press(&mut app, KeyCode::Esc).await;
        assert_eq!(app.state, AppState::Normal);
        assert!(app.form.is_none());
    }

    #[tokio::test]
    async fn test_staff_cannot_open_product_form() {
        let (mut app, _dir) = loaded_app(Role::Staff);
        app.current_tab = Tab::Products;
        press(&mut app, KeyCode::Char('e')).await;
        assert_eq!(app.state, AppState::Normal);
        assert!(app.form.is_none());
    }

    #[tokio::test]
    async fn test_settings_edit_needs_admin() {
        let (mut app, _dir) = loaded_app(Role::Manager);
        app.current_tab = Tab::Settings;
        press(&mut app, KeyCode::Char('e')).await;
        assert_eq!(app.status_message.as_deref(), Some("Requires Admin role"));

        let (mut app, _dir) = loaded_app(Role::Admin);
        app.current_tab = Tab::Settings;
        press(&mut app, KeyCode::Char('e')).await;
        assert_eq!(app.form.as_ref().map(|f| &f.kind), Some(&FormKind::Settings));
    }

    #[tokio::test]
    async fn test_register_form_returns_to_login() {
        let (mut app, _dir) = test_app(None);
        app.start_login();
        type_text(&mut app, "owner@example.com").await;
        press(&mut app, KeyCode::F(2)).await;
        assert_eq!(app.state, AppState::EditingForm);
        let form = app.form.as_ref().unwrap();
        assert_eq!(form.kind, FormKind::Register);
        assert_eq!(form.fields[2].display(), "owner@example.com");

        press(&mut app, KeyCode::Esc).await;
        assert_eq!(app.state, AppState::LoggingIn);
    }

    #[tokio::test]
    async fn test_menu_keys_cycle_filters() {
        let (mut app, _dir) = loaded_app(Role::Staff);
        app.current_tab = Tab::Menu;
        press(&mut app, KeyCode::Char('c')).await;
        assert_eq!(app.menu.filter.category, CategoryFilter::Id("c-1".to_string()));

        press(&mut app, KeyCode::Char('s')).await;
        assert_eq!(app.menu.filter.section, SectionFilter::Named("Hot".to_string()));

        press(&mut app, KeyCode::Char('c')).await;
        assert_eq!(app.menu.filter.category, CategoryFilter::Id("c-2".to_string()));
        assert_eq!(app.menu.filter.section, SectionFilter::All);
    }
}
