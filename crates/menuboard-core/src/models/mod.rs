//! Data models for menu tables.
//!
//! This module contains the row types fetched from the backend:
//!
//! - `Restaurant`, `RestaurantSettings`: the tenant and its display settings
//! - `Category`, `Product`: menu structure, with free-text product sections
//! - `Review`: customer ratings awaiting or past approval
//! - `User`, `Role`: dashboard accounts and the role hierarchy
//! - `ValidationError` and field validators used by input forms

pub mod category;
pub mod product;
pub mod restaurant;
pub mod review;
pub mod user;
pub mod validation;

use serde::{Deserialize, Deserializer};

pub use category::Category;
pub use product::Product;
pub use restaurant::{
    Restaurant, RestaurantSettings, DEFAULT_CURRENCY, DEFAULT_PRIMARY_COLOR, MAX_BANNER_IMAGES,
};
pub use review::{stars, Review, ReviewFilter, MAX_RATING};
pub use user::{Role, User};
pub use validation::ValidationError;

/// Deserialize `null` as the type's default value
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
