//! Restaurant data access.
//!
//! - `TenantStore`: every table operation, pinned to one restaurant
//! - `forms`: validated input for creates and edits
//! - `account`: login and registration, which run before a tenant is known

pub mod account;
pub mod forms;
pub mod tenant;

pub use account::{login, register};
pub use forms::{NewCategory, NewProduct, NewReview, NewUser, Registration, SettingsForm, UserUpdate};
pub use tenant::{Dashboard, DashboardStats, FullMenu, TenantStore, IMAGE_BUCKET};
