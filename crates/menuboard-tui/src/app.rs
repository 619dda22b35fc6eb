//! Application state management for menuboard.
//!
//! This module contains the core `App` struct that manages all application state,
//! including UI state, fetched menu data, session management, and background
//! task coordination.

use std::future::Future;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Local};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use menuboard_core::api::{ApiError, RestClient};
use menuboard_core::auth::{Role, Session, SessionData};
use menuboard_core::cache::{CacheManager, DEFAULT_NAMESPACE};
use menuboard_core::config::Config;
use menuboard_core::menu::MenuView;
use menuboard_core::models::{Category, Product, Review, ReviewFilter, User, ValidationError};
use menuboard_core::store::{self, Dashboard, FullMenu, TenantStore, UserUpdate};

use crate::form::{Form, FormKind};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Maximum length for email input (RFC 5321 path limit).
const MAX_EMAIL_LENGTH: usize = 254;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Maximum length for a new section name.
const MAX_SECTION_LENGTH: usize = 40;

/// Number of items to scroll on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

/// Environment variable that pre-fills the login email
const ENV_EMAIL: &str = "MENUBOARD_EMAIL";

const NOT_CONFIGURED: &str = "No backend configured. Set MENUBOARD_SUPABASE_URL and run --set-key";
const NOT_LOGGED_IN: &str = "Not logged in";

// ============================================================================
// UI State Types
// ============================================================================

/// Main navigation tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Dashboard,
    Categories,
    Products,
    Reviews,
    Users,
    Settings,
    Menu,
}

impl Tab {
    /// Every tab in display order; index + 1 is the number key
    pub const ALL: [Tab; 7] = [
        Tab::Dashboard,
        Tab::Categories,
        Tab::Products,
        Tab::Reviews,
        Tab::Users,
        Tab::Settings,
        Tab::Menu,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::Categories => "Categories",
            Tab::Products => "Products",
            Tab::Reviews => "Reviews",
            Tab::Users => "Users",
            Tab::Settings => "Settings",
            Tab::Menu => "Menu",
        }
    }

    fn index(&self) -> usize {
        Tab::ALL.iter().position(|t| t == self).unwrap_or(0)
    }

    /// Get the next tab (wrapping around)
    pub fn next(&self) -> Self {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    /// Get the previous tab (wrapping around)
    pub fn prev(&self) -> Self {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }

    /// Tab for a number key, 1-based
    pub fn from_number(n: usize) -> Option<Self> {
        n.checked_sub(1).and_then(|i| Tab::ALL.get(i).copied())
    }
}

/// Current UI focus area (list panel or detail panel)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    Detail,
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    Searching,
    ShowingHelp,
    LoggingIn,
    AddingSection,
    EditingForm,
    ConfirmingDelete,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoginFocus {
    Email,
    Password,
    Button,
}

/// A delete waiting for confirmation.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingDelete {
    Category { id: String, name: String },
    Product { id: String, name: String },
    Review { id: String, name: String },
    User { id: String, name: String },
}

impl PendingDelete {
    pub fn describe(&self) -> String {
        match self {
            PendingDelete::Category { name, .. } => format!("category \"{}\"", name),
            PendingDelete::Product { name, .. } => format!("product \"{}\"", name),
            PendingDelete::Review { name, .. } => format!("review by {}", name),
            PendingDelete::User { name, .. } => format!("user {}", name),
        }
    }
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Messages sent from spawned tasks back to the main loop.
enum RefreshResult {
    /// Dashboard data and the public menu, fetched together
    Loaded(Box<Dashboard>, FullMenu),
    /// A write finished; the message goes to the status bar
    ActionDone(String),
    /// A fetch or write failed; already converted to a user-facing message
    Error(String),
}

/// A result tagged with the session generation that spawned it. Logging in
/// or out bumps the generation, so late results from an earlier session
/// are dropped instead of showing one restaurant's rows to another.
struct TaggedResult {
    generation: u64,
    result: RefreshResult,
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    // Core services
    pub config: Config,
    pub session: Session,
    client: Option<RestClient>,
    store: Option<TenantStore>,
    cache_dir: PathBuf,

    // UI State
    pub state: AppState,
    pub current_tab: Tab,
    pub focus: Focus,
    pub search_query: String,
    pub review_filter: ReviewFilter,

    // Login form state
    pub login_email: String,
    pub login_password: String,
    pub login_focus: LoginFocus,
    pub login_error: Option<String>,

    // Prompts
    pub section_input: String,
    pub pending_delete: Option<PendingDelete>,
    pub form: Option<Form>,

    // Selection indices
    pub category_selection: usize,
    pub section_selection: usize,
    pub product_selection: usize,
    pub review_selection: usize,
    pub user_selection: usize,

    // Data
    pub dashboard: Dashboard,
    pub menu: MenuView,

    refresh_rx: mpsc::Receiver<TaggedResult>,
    refresh_tx: mpsc::Sender<TaggedResult>,
    generation: u64,

    pub status_message: Option<String>,
    pub loading: bool,
    pub last_refresh: Option<DateTime<Local>>,
}

impl App {
    /// Create the application from the saved config and session
    pub fn new() -> Result<Self> {
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };

        let cache_dir = config.cache_dir().unwrap_or_else(|_| PathBuf::from("./cache"));
        debug!(?cache_dir, "Cache directory configured");

        let mut session = Session::new(cache_dir.clone());
        match session.load() {
            Ok(found) => debug!(found, "Session loaded"),
            Err(e) => warn!(error = %e, "Failed to load session"),
        }

        let client = match Self::build_client(&config) {
            Ok(client) => Some(client),
            Err(e) => {
                warn!(error = %e, "Backend client unavailable");
                None
            }
        };

        let mut app = Self::with_parts(config, session, client, cache_dir);
        if let Ok(email) = std::env::var(ENV_EMAIL) {
            app.login_email = email;
        }
        Ok(app)
    }

    fn build_client(config: &Config) -> Result<RestClient> {
        let url = config
            .supabase_url
            .as_deref()
            .context("No backend URL configured")?;
        let key = config.api_key()?;
        Ok(RestClient::new(url, &key)?.with_timeout(config.timeout()))
    }

    /// Assemble an app from already-loaded parts
    pub fn with_parts(
        config: Config,
        session: Session,
        client: Option<RestClient>,
        cache_dir: PathBuf,
    ) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let login_email = config.last_email.clone().unwrap_or_default();
        let status_message = client.is_none().then(|| NOT_CONFIGURED.to_string());

        let mut app = Self {
            config,
            session,
            client,
            store: None,
            cache_dir,

            state: AppState::Normal,
            current_tab: Tab::Dashboard,
            focus: Focus::List,
            search_query: String::new(),
            review_filter: ReviewFilter::default(),

            login_email,
            login_password: String::new(),
            login_focus: LoginFocus::Email,
            login_error: None,

            section_input: String::new(),
            pending_delete: None,
            form: None,

            category_selection: 0,
            section_selection: 0,
            product_selection: 0,
            review_selection: 0,
            user_selection: 0,

            dashboard: Dashboard::default(),
            menu: MenuView::default(),

            refresh_rx: rx,
            refresh_tx: tx,
            generation: 0,

            status_message,
            loading: false,
            last_refresh: None,
        };
        app.open_store();
        app
    }

    /// Build the tenant store for the session's restaurant, if possible
    fn open_store(&mut self) {
        self.store = match (&self.client, self.session.restaurant_id()) {
            (Some(client), Some(tenant)) => {
                let store = TenantStore::new(client.clone(), tenant);
                match CacheManager::with_settings(
                    self.cache_dir.clone(),
                    DEFAULT_NAMESPACE,
                    self.config.cache_ttl(),
                ) {
                    Ok(cache) => Some(store.with_cache(cache)),
                    Err(e) => {
                        warn!(error = %e, "Cache unavailable, reading directly");
                        Some(store)
                    }
                }
            }
            _ => None,
        };
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    pub fn is_authenticated(&self) -> bool {
        self.session.is_logged_in() && self.store.is_some()
    }

    pub fn role(&self) -> Role {
        self.session.role()
    }

    /// Attempt login with the credentials from the login form
    pub async fn attempt_login(&mut self) -> Result<()> {
        let email = self.login_email.trim().to_string();
        let password = self.login_password.clone();

        if email.is_empty() || password.is_empty() {
            self.login_error = Some("Email and password required".to_string());
            return Err(anyhow!("Email and password required"));
        }

        let Some(client) = self.client.clone() else {
            self.login_error = Some(NOT_CONFIGURED.to_string());
            return Err(anyhow!(NOT_CONFIGURED));
        };

        self.login_error = None;

        match store::login(&client, &email, &password).await {
            Ok(session_data) => {
                info!(role = session_data.role.label(), "Login successful");
                self.finish_login(email, session_data);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Login failed");
                self.login_error = Some(e.user_message());
                Err(e.into())
            }
        }
    }

    /// Persist a fresh session and load its restaurant
    fn finish_login(&mut self, email: String, session_data: SessionData) {
        self.config.last_email = Some(email.clone());
        self.config.restaurant_id = Some(session_data.restaurant_id.clone());
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }

        self.session.update(session_data);
        if let Err(e) = self.session.save() {
            warn!(error = %e, "Failed to save session");
        }

        self.login_email = email;
        self.login_password.clear();
        self.state = AppState::Normal;
        self.begin_session();
        self.open_store();
        self.refresh_all_background();
    }

    /// Switch the login overlay to the sign-up form
    pub fn begin_register(&mut self) {
        self.form = Some(Form::register(self.login_email.trim()));
        self.state = AppState::EditingForm;
    }

    /// Create a restaurant and its admin, then continue as that admin
    async fn submit_registration(&mut self, form: Form) {
        let registration = match form.to_registration() {
            Ok(r) => r,
            Err(e) => return self.reopen_form(form, e.to_string()),
        };
        let Some(client) = self.client.clone() else {
            return self.reopen_form(form, NOT_CONFIGURED.to_string());
        };

        match store::register(&client, &registration).await {
            Ok(session_data) => {
                info!(restaurant_id = %session_data.restaurant_id, "Registration successful");
                self.finish_login(registration.email.trim().to_string(), session_data);
            }
            Err(e) => {
                error!(error = %e, "Registration failed");
                self.reopen_form(form, e.user_message());
            }
        }
    }

    /// Start the login process (show login overlay)
    pub fn start_login(&mut self) {
        self.state = AppState::LoggingIn;
        self.login_focus = if self.login_email.is_empty() {
            LoginFocus::Email
        } else {
            LoginFocus::Password
        };
        self.login_error = None;
    }

    /// Forget the session and everything fetched under it
    pub fn logout(&mut self) {
        if let Err(e) = self.session.clear() {
            warn!(error = %e, "Failed to clear session");
        }
        self.store = None;
        self.begin_session();
        info!("Logged out");
        self.start_login();
    }

    /// Start a new session generation and drop everything fetched under the
    /// previous one
    fn begin_session(&mut self) {
        self.generation += 1;
        self.dashboard = Dashboard::default();
        self.menu = MenuView::default();
        self.last_refresh = None;
        self.loading = false;
        self.status_message = None;
        self.pending_delete = None;
        self.form = None;
        self.category_selection = 0;
        self.section_selection = 0;
        self.product_selection = 0;
        self.review_selection = 0;
        self.user_selection = 0;
    }

    // =========================================================================
    // Background Data Refresh
    // =========================================================================

    /// Spawn a background task that reloads the dashboard and the menu
    pub fn refresh_all_background(&mut self) {
        let Some(store) = self.store.clone() else {
            self.status_message = Some(NOT_LOGGED_IN.to_string());
            return;
        };

        info!(tenant = store.tenant_id(), "Starting background refresh");
        self.loading = true;
        let tx = self.refresh_tx.clone();
        let generation = self.generation;

        tokio::spawn(async move {
            let result = match tokio::try_join!(store.dashboard(), store.full_menu()) {
                Ok((dashboard, menu)) => RefreshResult::Loaded(Box::new(dashboard), menu),
                Err(e) => {
                    error!(error = %e, "Background refresh failed");
                    RefreshResult::Error(e.user_message())
                }
            };
            Self::send_result(&tx, generation, result).await;
        });
    }

    /// Helper to send refresh results, logging any channel errors
    async fn send_result(tx: &mpsc::Sender<TaggedResult>, generation: u64, result: RefreshResult) {
        if let Err(e) = tx.send(TaggedResult { generation, result }).await {
            error!(error = %e, "Failed to send refresh result - channel closed");
        }
    }

    /// Run a write in the background; a success triggers a refresh
    fn spawn_action<F>(&mut self, done: String, action: F)
    where
        F: Future<Output = Result<(), ApiError>> + Send + 'static,
    {
        self.loading = true;
        let tx = self.refresh_tx.clone();
        let generation = self.generation;

        tokio::spawn(async move {
            let result = match action.await {
                Ok(()) => RefreshResult::ActionDone(done),
                Err(e) => {
                    error!(error = %e, "Action failed");
                    RefreshResult::Error(e.user_message())
                }
            };
            Self::send_result(&tx, generation, result).await;
        });
    }

    /// Check for completed background tasks and process results
    pub fn check_background_tasks(&mut self) {
        let mut results = Vec::new();
        while let Ok(tagged) = self.refresh_rx.try_recv() {
            if tagged.generation == self.generation {
                results.push(tagged.result);
            } else {
                debug!(
                    generation = tagged.generation,
                    current = self.generation,
                    "Dropping result from an earlier session"
                );
            }
        }

        for result in results {
            self.process_refresh_result(result);
        }
    }

    fn process_refresh_result(&mut self, result: RefreshResult) {
        match result {
            RefreshResult::Loaded(dashboard, menu) => {
                let filter = self.menu.filter.clone();
                let mut view = MenuView::new(menu, dashboard.settings.clone());
                view.filter = filter;
                self.menu = view;
                self.dashboard = *dashboard;
                self.loading = false;
                self.last_refresh = Some(Local::now());
                self.clamp_selections();
            }
            RefreshResult::ActionDone(message) => {
                info!(%message, "Action completed");
                self.status_message = Some(message);
                self.refresh_all_background();
            }
            RefreshResult::Error(message) => {
                self.loading = false;
                self.status_message = Some(message);
            }
        }
    }

    fn clamp_selections(&mut self) {
        let clamp = |selection: usize, len: usize| selection.min(len.saturating_sub(1));
        self.category_selection = clamp(self.category_selection, self.dashboard.categories.len());
        let sections = self.selected_category().map_or(0, |c| c.sections.len());
        self.section_selection = clamp(self.section_selection, sections);
        self.product_selection = clamp(self.product_selection, self.filtered_products().len());
        self.review_selection = clamp(self.review_selection, self.visible_reviews().len());
        self.user_selection = clamp(self.user_selection, self.filtered_users().len());
    }

    // =========================================================================
    // Derived Views
    // =========================================================================

    pub fn selected_category(&self) -> Option<&Category> {
        self.dashboard.categories.get(self.category_selection)
    }

    pub fn category_name(&self, category_id: &str) -> &str {
        self.dashboard
            .categories
            .iter()
            .find(|c| c.id == category_id)
            .map_or("-", |c| c.display_name())
    }

    pub fn product_count(&self, category_id: &str) -> usize {
        self.dashboard
            .products
            .iter()
            .filter(|p| p.category_id == category_id)
            .count()
    }

    /// Products matching the search query, in display order
    pub fn filtered_products(&self) -> Vec<&Product> {
        self.dashboard
            .products
            .iter()
            .filter(|p| p.matches_search(&self.search_query))
            .collect()
    }

    pub fn selected_product(&self) -> Option<&Product> {
        self.filtered_products().get(self.product_selection).copied()
    }

    /// Reviews passing the current review filter
    pub fn visible_reviews(&self) -> Vec<&Review> {
        self.dashboard
            .reviews
            .iter()
            .filter(|r| self.review_filter.matches(r))
            .collect()
    }

    pub fn selected_review(&self) -> Option<&Review> {
        self.visible_reviews().get(self.review_selection).copied()
    }

    /// Users whose name or email contains the search query
    pub fn filtered_users(&self) -> Vec<&User> {
        let query = self.search_query.trim().to_lowercase();
        self.dashboard
            .users
            .iter()
            .filter(|u| {
                query.is_empty()
                    || u.full_name.to_lowercase().contains(&query)
                    || u.email.to_lowercase().contains(&query)
            })
            .collect()
    }

    pub fn selected_user(&self) -> Option<&User> {
        self.filtered_users().get(self.user_selection).copied()
    }

    /// Display name of the tenant for the title bar
    pub fn restaurant_name(&self) -> String {
        self.dashboard
            .settings
            .as_ref()
            .map(|s| s.restaurant_name_ar.clone())
            .or_else(|| self.session.data.as_ref().map(|d| d.user_name.clone()))
            .unwrap_or_default()
    }

    pub fn cycle_review_filter(&mut self) {
        self.review_filter = self.review_filter.next();
        self.review_selection = 0;
    }

    /// Apply the search box to the menu view
    pub fn sync_menu_search(&mut self) {
        let menu = std::mem::take(&mut self.menu);
        self.menu = menu.search(&self.search_query);
    }

    pub fn menu_next_category(&mut self) {
        let menu = std::mem::take(&mut self.menu);
        self.menu = menu.next_category();
    }

    pub fn menu_next_section(&mut self) {
        let menu = std::mem::take(&mut self.menu);
        self.menu = menu.next_section();
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// Check the session role, reporting in the status bar when it falls short
    fn require_role(&mut self, required: Role) -> bool {
        if self.session.has_role(required) {
            true
        } else {
            self.status_message = Some(format!("Requires {} role", required.label()));
            false
        }
    }

    fn active_store(&mut self) -> Option<TenantStore> {
        if self.store.is_none() {
            self.status_message = Some(NOT_LOGGED_IN.to_string());
        }
        self.store.clone()
    }

    pub fn toggle_selected_category(&mut self) {
        if !self.require_role(Role::Manager) {
            return;
        }
        let Some(category) = self.selected_category().cloned() else {
            return;
        };
        let Some(store) = self.active_store() else {
            return;
        };

        let active = !category.is_active;
        let done = format!(
            "{} {}",
            category.display_name(),
            if active { "shown" } else { "hidden" }
        );
        self.spawn_action(done, async move {
            store.toggle_category(&category.id, active).await.map(|_| ())
        });
    }

    /// Open the new-section prompt for the selected category
    pub fn begin_add_section(&mut self) {
        if !self.require_role(Role::Manager) || self.selected_category().is_none() {
            return;
        }
        self.section_input.clear();
        self.state = AppState::AddingSection;
    }

    pub fn submit_section(&mut self) {
        self.state = AppState::Normal;
        let name = self.section_input.trim().to_string();
        self.section_input.clear();

        let Some(category) = self.selected_category().cloned() else {
            return;
        };
        let Some(store) = self.active_store() else {
            return;
        };

        let done = format!("Added section {}", name);
        self.spawn_action(done, async move {
            store.add_section(&category, &name).await.map(|_| ())
        });
    }

    pub fn remove_selected_section(&mut self) {
        if !self.require_role(Role::Manager) {
            return;
        }
        let Some(category) = self.selected_category().cloned() else {
            return;
        };
        let Some(name) = category.sections.get(self.section_selection).cloned() else {
            return;
        };
        let Some(store) = self.active_store() else {
            return;
        };

        let done = format!("Removed section {}", name);
        self.spawn_action(done, async move {
            store.remove_section(&category, &name).await.map(|_| ())
        });
    }

    /// Staff may mark products sold out; everything else needs a manager
    pub fn toggle_selected_availability(&mut self) {
        if !self.require_role(Role::Staff) {
            return;
        }
        let Some(product) = self.selected_product().cloned() else {
            return;
        };
        let Some(store) = self.active_store() else {
            return;
        };

        let available = !product.is_available;
        let done = format!(
            "{} {}",
            product.name_ar,
            if available { "available" } else { "unavailable" }
        );
        self.spawn_action(done, async move {
            store.toggle_availability(&product.id, available).await.map(|_| ())
        });
    }

    pub fn toggle_selected_featured(&mut self) {
        if !self.require_role(Role::Manager) {
            return;
        }
        let Some(product) = self.selected_product().cloned() else {
            return;
        };
        let Some(store) = self.active_store() else {
            return;
        };

        let featured = !product.is_featured;
        let done = format!(
            "{} {}",
            product.name_ar,
            if featured { "featured" } else { "no longer featured" }
        );
        self.spawn_action(done, async move {
            store.toggle_featured(&product.id, featured).await.map(|_| ())
        });
    }

    pub fn approve_selected_review(&mut self) {
        self.set_selected_review_approval(true);
    }

    pub fn reject_selected_review(&mut self) {
        self.set_selected_review_approval(false);
    }

    fn set_selected_review_approval(&mut self, approve: bool) {
        if !self.require_role(Role::Manager) {
            return;
        }
        let Some(review) = self.selected_review().cloned() else {
            return;
        };
        let Some(store) = self.active_store() else {
            return;
        };

        let done = format!(
            "Review by {} {}",
            review.customer_name,
            if approve { "approved" } else { "rejected" }
        );
        self.spawn_action(done, async move {
            let result = if approve {
                store.approve_review(&review.id).await
            } else {
                store.reject_review(&review.id).await
            };
            result.map(|_| ())
        });
    }

    pub fn toggle_selected_user(&mut self) {
        if !self.require_role(Role::Admin) {
            return;
        }
        let Some(user) = self.selected_user().cloned() else {
            return;
        };
        if self.session.user_id() == Some(user.id.as_str()) {
            self.status_message = Some("You cannot deactivate your own account".to_string());
            return;
        }
        let Some(store) = self.active_store() else {
            return;
        };

        let active = !user.is_active;
        let done = format!(
            "{} {}",
            user.full_name,
            if active { "activated" } else { "deactivated" }
        );
        let changes = UserUpdate {
            is_active: Some(active),
            ..Default::default()
        };
        self.spawn_action(done, async move {
            store.update_user(&user.id, &changes).await.map(|_| ())
        });
    }

    /// Ask for confirmation before deleting the selection on the current tab
    pub fn request_delete(&mut self) {
        let (required, pending) = match self.current_tab {
            Tab::Categories => (
                Role::Manager,
                self.selected_category().map(|c| PendingDelete::Category {
                    id: c.id.clone(),
                    name: c.display_name().to_string(),
                }),
            ),
            Tab::Products => (
                Role::Manager,
                self.selected_product().map(|p| PendingDelete::Product {
                    id: p.id.clone(),
                    name: p.name_ar.clone(),
                }),
            ),
            Tab::Reviews => (
                Role::Manager,
                self.selected_review().map(|r| PendingDelete::Review {
                    id: r.id.clone(),
                    name: r.customer_name.clone(),
                }),
            ),
            Tab::Users => (
                Role::Admin,
                self.selected_user()
                    .filter(|u| self.session.user_id() != Some(u.id.as_str()))
                    .map(|u| PendingDelete::User {
                        id: u.id.clone(),
                        name: u.full_name.clone(),
                    }),
            ),
            Tab::Dashboard | Tab::Settings | Tab::Menu => return,
        };

        if !self.require_role(required) {
            return;
        }
        if let Some(pending) = pending {
            self.pending_delete = Some(pending);
            self.state = AppState::ConfirmingDelete;
        }
    }

    pub fn confirm_delete(&mut self) {
        self.state = AppState::Normal;
        let Some(pending) = self.pending_delete.take() else {
            return;
        };
        let Some(store) = self.active_store() else {
            return;
        };

        let done = format!("Deleted {}", pending.describe());
        self.spawn_action(done, async move {
            match pending {
                PendingDelete::Category { id, .. } => store.delete_category(&id).await,
                PendingDelete::Product { id, .. } => store.delete_product(&id).await,
                PendingDelete::Review { id, .. } => store.delete_review(&id).await,
                PendingDelete::User { id, .. } => store.delete_user(&id).await,
            }
        });
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
        self.state = AppState::Normal;
    }

    // =========================================================================
    // Forms
    // =========================================================================

    fn open_form(&mut self, required: Role, build: impl FnOnce(&App) -> Option<Form>) {
        if !self.require_role(required) {
            return;
        }
        if let Some(form) = build(self) {
            self.form = Some(form);
            self.state = AppState::EditingForm;
        }
    }

    /// Open the create form for the current tab
    pub fn begin_create(&mut self) {
        match self.current_tab {
            Tab::Categories => self.open_form(Role::Manager, |app| {
                let next = app.dashboard.categories.iter().map(|c| c.display_order).max();
                Some(Form::new_category(next.map_or(0, |n| n + 1)))
            }),
            Tab::Products => {
                if self.dashboard.categories.is_empty() {
                    self.status_message = Some("Add a category first".to_string());
                    return;
                }
                self.open_form(Role::Manager, |app| {
                    let current = app.selected_product().map(|p| p.category_id.clone());
                    Some(Form::new_product(&app.dashboard.categories, current.as_deref()))
                });
            }
            Tab::Users => self.open_form(Role::Admin, |_| Some(Form::new_user())),
            Tab::Dashboard | Tab::Reviews | Tab::Settings | Tab::Menu => {}
        }
    }

    /// Open the edit form for the selection on the current tab
    pub fn begin_edit(&mut self) {
        match self.current_tab {
            Tab::Categories => self.open_form(Role::Manager, |app| {
                app.selected_category().map(Form::edit_category)
            }),
            Tab::Products => self.open_form(Role::Manager, |app| {
                app.selected_product()
                    .map(|p| Form::edit_product(p, &app.dashboard.categories))
            }),
            Tab::Settings => self.open_form(Role::Admin, |app| {
                Some(Form::settings(app.dashboard.settings.as_ref()))
            }),
            Tab::Dashboard | Tab::Reviews | Tab::Users | Tab::Menu => {}
        }
    }

    /// Close the form; registration goes back to the login overlay
    pub fn cancel_form(&mut self) {
        let registering = matches!(
            self.form.take().map(|f| f.kind),
            Some(FormKind::Register)
        );
        self.state = if registering {
            AppState::LoggingIn
        } else {
            AppState::Normal
        };
    }

    fn reopen_form(&mut self, mut form: Form, error: String) {
        form.error = Some(error);
        self.form = Some(form);
        self.state = AppState::EditingForm;
    }

    /// Validate the open form and send it. Invalid input keeps the form open
    /// with the message shown under the fields.
    pub async fn submit_form(&mut self) {
        let Some(form) = self.form.take() else {
            self.state = AppState::Normal;
            return;
        };
        if form.kind == FormKind::Register {
            return self.submit_registration(form).await;
        }

        self.state = AppState::Normal;
        if let Err(e) = self.spawn_form_write(&form) {
            debug!(field = e.field, "Form rejected");
            self.reopen_form(form, e.to_string());
        }
    }

    fn spawn_form_write(&mut self, form: &Form) -> Result<(), ValidationError> {
        // Validation runs before the store check
        match &form.kind {
            FormKind::NewCategory => {
                let category = form.to_category(Vec::new())?;
                let Some(store) = self.active_store() else {
                    return Ok(());
                };
                let done = format!("Created category {}", category.name_ar);
                self.spawn_action(done, async move {
                    store.create_category(&category).await.map(|_| ())
                });
            }
            FormKind::EditCategory { id, sections } => {
                let category = form.to_category(sections.clone())?;
                let Some(store) = self.active_store() else {
                    return Ok(());
                };
                let id = id.clone();
                let done = format!("Saved category {}", category.name_ar);
                self.spawn_action(done, async move {
                    store.update_category(&id, &category).await.map(|_| ())
                });
            }
            FormKind::NewProduct => {
                let product = form.to_product()?;
                let Some(store) = self.active_store() else {
                    return Ok(());
                };
                let done = format!("Created product {}", product.name_ar);
                self.spawn_action(done, async move {
                    store.create_product(&product).await.map(|_| ())
                });
            }
            FormKind::EditProduct { id } => {
                let product = form.to_product()?;
                let Some(store) = self.active_store() else {
                    return Ok(());
                };
                let id = id.clone();
                let done = format!("Saved product {}", product.name_ar);
                self.spawn_action(done, async move {
                    store.update_product(&id, &product).await.map(|_| ())
                });
            }
            FormKind::Settings => {
                let settings = form.to_settings()?;
                let Some(store) = self.active_store() else {
                    return Ok(());
                };
                self.spawn_action("Settings saved".to_string(), async move {
                    store.save_settings(&settings).await.map(|_| ())
                });
            }
            FormKind::NewUser => {
                let user = form.to_user()?;
                let Some(store) = self.active_store() else {
                    return Ok(());
                };
                let done = format!("Created user {}", user.full_name);
                self.spawn_action(done, async move {
                    store.create_user(&user).await.map(|_| ())
                });
            }
            // Runs inline from submit_registration
            FormKind::Register => {}
        }
        Ok(())
    }
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

pub fn can_add_email_char(current_len: usize, c: char) -> bool {
    current_len < MAX_EMAIL_LENGTH && is_valid_input_char(c) && !c.is_whitespace()
}

pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

pub fn can_add_section_char(current_len: usize, c: char) -> bool {
    current_len < MAX_SECTION_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================
