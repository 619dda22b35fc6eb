//! Utility functions for formatting prices, colors, strings and dates.

pub mod format;

pub use crate::models::validation::is_valid_hex_color;
pub use format::{darken_color, format_currency, format_date, format_optional, hex_to_rgb, truncate_string};
