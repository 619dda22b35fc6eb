//! Restaurant (tenant) records and their display settings.

use serde::{Deserialize, Serialize};

/// Default currency label for new restaurants
pub const DEFAULT_CURRENCY: &str = "ج.م";

/// Default theme color for new restaurants
pub const DEFAULT_PRIMARY_COLOR: &str = "#D97706";

/// Maximum number of banner images shown on the public menu
pub const MAX_BANNER_IMAGES: usize = 3;

/// A tenant account.
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: String,
    pub name_ar: String,
    #[serde(default)]
    pub name_en: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub primary_color: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Per-restaurant display settings edited from the settings tab.
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RestaurantSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub restaurant_id: String,
    #[serde(default)]
    pub restaurant_name_ar: String,
    #[serde(default)]
    pub restaurant_name_en: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub primary_color: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub facebook_url: Option<String>,
    #[serde(default)]
    pub instagram_url: Option<String>,
    #[serde(default)]
    pub tiktok_url: Option<String>,
    #[serde(default)]
    pub whatsapp_number: Option<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub ad_banner_urls: Vec<String>,
    #[serde(default)]
    pub social_ad_image: Option<String>,
    #[serde(default)]
    pub social_ad_video: Option<String>,
}

impl RestaurantSettings {
    pub fn currency_or_default(&self) -> &str {
        self.currency
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CURRENCY)
    }

    pub fn primary_color_or_default(&self) -> &str {
        self.primary_color
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_PRIMARY_COLOR)
    }

    /// Social links that are set, as (label, url) pairs
    pub fn social_links(&self) -> Vec<(&'static str, &str)> {
        [
            ("Facebook", &self.facebook_url),
            ("Instagram", &self.instagram_url),
            ("TikTok", &self.tiktok_url),
            ("WhatsApp", &self.whatsapp_number),
        ]
        .into_iter()
        .filter_map(|(label, value)| {
            value
                .as_deref()
                .filter(|v| !v.trim().is_empty())
                .map(|v| (label, v))
        })
        .collect()
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults() {
        let settings: RestaurantSettings =
            serde_json::from_str(r#"{"restaurant_id":"r-1","ad_banner_urls":null}"#).unwrap();
        assert_eq!(settings.currency_or_default(), DEFAULT_CURRENCY);
        assert_eq!(settings.primary_color_or_default(), DEFAULT_PRIMARY_COLOR);
        assert!(settings.ad_banner_urls.is_empty());
    }

    #[test]
    fn test_social_links_skip_blank() {
        let settings = RestaurantSettings {
            facebook_url: Some("https://facebook.com/cafe".to_string()),
            instagram_url: Some("  ".to_string()),
            whatsapp_number: Some("01012345678".to_string()),
            ..Default::default()
        };
        let links = settings.social_links();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].0, "Facebook");
        assert_eq!(links[1].1, "01012345678");
    }

    #[test]
    fn test_restaurant_is_active_defaults_true() {
        let restaurant: Restaurant = serde_json::from_str(r#"{"id":"r-1","name_ar":"مطعم"}"#).unwrap();
        assert!(restaurant.is_active);
    }
}
