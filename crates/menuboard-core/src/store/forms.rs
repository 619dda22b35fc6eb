//! Input forms for creating and editing rows.
//!
//! Every form validates locally before anything is sent. The tenant id is
//! not part of any form; `TenantStore` stamps it into the body.

use serde::Serialize;

use crate::auth::password::MIN_PASSWORD_LENGTH;
use crate::models::validation::{is_valid_email, is_valid_hex_color, is_valid_phone, require};
use crate::models::{Role, ValidationError, MAX_BANNER_IMAGES, MAX_RATING};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewCategory {
    pub name_ar: String,
    pub name_en: Option<String>,
    pub description_ar: Option<String>,
    pub image_url: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub sections: Vec<String>,
}

impl NewCategory {
    pub fn new(name_ar: &str) -> Self {
        Self {
            name_ar: name_ar.trim().to_string(),
            is_active: true,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require("name_ar", &self.name_ar)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewProduct {
    pub category_id: String,
    pub name_ar: String,
    pub name_en: Option<String>,
    pub description_ar: Option<String>,
    pub description_en: Option<String>,
    pub price: f64,
    pub image_url: Option<String>,
    pub section: Option<String>,
    pub is_available: bool,
    pub is_featured: bool,
    pub display_order: i32,
}

impl NewProduct {
    pub fn new(category_id: &str, name_ar: &str, price: f64) -> Self {
        Self {
            category_id: category_id.to_string(),
            name_ar: name_ar.trim().to_string(),
            price,
            is_available: true,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require("category_id", &self.category_id)?;
        require("name_ar", &self.name_ar)?;
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(ValidationError::new("price", "price must be zero or more"));
        }
        Ok(())
    }
}

/// The editable part of `RestaurantSettings`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SettingsForm {
    pub restaurant_name_ar: String,
    pub restaurant_name_en: Option<String>,
    pub currency: Option<String>,
    pub primary_color: Option<String>,
    pub logo_url: Option<String>,
    pub facebook_url: Option<String>,
    pub instagram_url: Option<String>,
    pub tiktok_url: Option<String>,
    pub whatsapp_number: Option<String>,
    pub ad_banner_urls: Vec<String>,
    pub social_ad_image: Option<String>,
    pub social_ad_video: Option<String>,
}

impl SettingsForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("restaurant_name_ar", &self.restaurant_name_ar)?;
        if let Some(ref color) = self.primary_color {
            if !is_valid_hex_color(color) {
                return Err(ValidationError::new(
                    "primary_color",
                    format!("{} is not a hex color", color),
                ));
            }
        }
        if self.ad_banner_urls.len() > MAX_BANNER_IMAGES {
            return Err(ValidationError::new(
                "ad_banner_urls",
                format!("at most {} banner images", MAX_BANNER_IMAGES),
            ));
        }
        Ok(())
    }
}

impl From<&crate::models::RestaurantSettings> for SettingsForm {
    fn from(s: &crate::models::RestaurantSettings) -> Self {
        Self {
            restaurant_name_ar: s.restaurant_name_ar.clone(),
            restaurant_name_en: s.restaurant_name_en.clone(),
            currency: s.currency.clone(),
            primary_color: s.primary_color.clone(),
            logo_url: s.logo_url.clone(),
            facebook_url: s.facebook_url.clone(),
            instagram_url: s.instagram_url.clone(),
            tiktok_url: s.tiktok_url.clone(),
            whatsapp_number: s.whatsapp_number.clone(),
            ad_banner_urls: s.ad_banner_urls.clone(),
            social_ad_image: s.social_ad_image.clone(),
            social_ad_video: s.social_ad_video.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewReview {
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub customer_governorate: Option<String>,
    pub customer_city: Option<String>,
    pub place_rating: u8,
    pub products_rating: u8,
    pub service_rating: u8,
    pub comment: Option<String>,
}

impl NewReview {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("customer_name", &self.customer_name)?;
        for (field, rating) in [
            ("place_rating", self.place_rating),
            ("products_rating", self.products_rating),
            ("service_rating", self.service_rating),
        ] {
            if !(1..=MAX_RATING).contains(&rating) {
                return Err(ValidationError::new(
                    field,
                    format!("rating must be between 1 and {}", MAX_RATING),
                ));
            }
        }
        Ok(())
    }
}

/// A dashboard account to create. The password is hashed before sending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
    pub password: String,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("full_name", &self.full_name)?;
        require("email", &self.email)?;
        if !is_valid_email(self.email.trim()) {
            return Err(ValidationError::new("email", "email address is not valid"));
        }
        if self.role == Role::Unknown {
            return Err(ValidationError::new("role", "role must be admin, manager or staff"));
        }
        check_password(&self.password)
    }
}

/// Row body for a user insert
#[derive(Debug, Serialize)]
pub(crate) struct UserRow<'a> {
    pub full_name: &'a str,
    pub email: &'a str,
    pub phone: Option<&'a str>,
    pub role: Role,
    pub is_active: bool,
    pub password_hash: &'a str,
}

/// Fields an admin can change on an existing account.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Sign-up form: a new restaurant and its first admin.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registration {
    pub restaurant_name: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
    pub accept_terms: bool,
}

impl Registration {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("restaurant_name", &self.restaurant_name)?;
        require("full_name", &self.full_name)?;
        require("email", &self.email)?;
        require("phone", &self.phone)?;
        if self.password.is_empty() {
            return Err(ValidationError::required("password"));
        }
        if self.confirm_password.is_empty() {
            return Err(ValidationError::required("confirm_password"));
        }
        if !is_valid_email(self.email.trim()) {
            return Err(ValidationError::new("email", "email address is not valid"));
        }
        if !is_valid_phone(self.phone.trim()) {
            return Err(ValidationError::new("phone", "phone number is not valid"));
        }
        check_password(&self.password)?;
        if self.password != self.confirm_password {
            return Err(ValidationError::new("confirm_password", "passwords do not match"));
        }
        if !self.accept_terms {
            return Err(ValidationError::new("accept_terms", "terms must be accepted"));
        }
        Ok(())
    }
}

fn check_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::new(
            "password",
            format!("password must be at least {} characters", MIN_PASSWORD_LENGTH),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration() -> Registration {
        Registration {
            restaurant_name: "مطعم النيل".to_string(),
            full_name: "Omar Adel".to_string(),
            email: "omar@nile.eg".to_string(),
            phone: "+20 100 123 4567".to_string(),
            password: "s3cret-pass".to_string(),
            confirm_password: "s3cret-pass".to_string(),
            accept_terms: true,
        }
    }

    // -------------------------------------------------------------------------
    // Menu forms
    // -------------------------------------------------------------------------

    #[test]
    fn test_category_requires_name() {
        assert!(NewCategory::new("مشروبات").validate().is_ok());
        let err = NewCategory::new("   ").validate().unwrap_err();
        assert_eq!(err.field, "name_ar");
    }

    #[test]
    fn test_product_validation() {
        assert!(NewProduct::new("c-1", "شاي", 15.0).validate().is_ok());
        assert!(NewProduct::new("c-1", "شاي", 0.0).validate().is_ok());
        assert_eq!(NewProduct::new("", "شاي", 15.0).validate().unwrap_err().field, "category_id");
        assert_eq!(NewProduct::new("c-1", "", 15.0).validate().unwrap_err().field, "name_ar");
        assert_eq!(NewProduct::new("c-1", "شاي", -1.0).validate().unwrap_err().field, "price");
        assert_eq!(NewProduct::new("c-1", "شاي", f64::NAN).validate().unwrap_err().field, "price");
    }

    #[test]
    fn test_settings_validation() {
        let mut form = SettingsForm {
            restaurant_name_ar: "مطعم".to_string(),
            primary_color: Some("#D97706".to_string()),
            ..Default::default()
        };
        assert!(form.validate().is_ok());

        form.primary_color = Some("orange".to_string());
        assert_eq!(form.validate().unwrap_err().field, "primary_color");

        form.primary_color = None;
        form.ad_banner_urls = vec!["a".into(), "b".into(), "c".into(), "d".into()];
        assert_eq!(form.validate().unwrap_err().field, "ad_banner_urls");
    }

    #[test]
    fn test_review_ratings_in_range() {
        let mut review = NewReview {
            customer_name: "Mona".to_string(),
            place_rating: 5,
            products_rating: 4,
            service_rating: 1,
            ..Default::default()
        };
        assert!(review.validate().is_ok());

        review.service_rating = 0;
        assert_eq!(review.validate().unwrap_err().field, "service_rating");
        review.service_rating = 6;
        assert_eq!(review.validate().unwrap_err().field, "service_rating");
    }

    // -------------------------------------------------------------------------
    // Accounts
    // -------------------------------------------------------------------------

    #[test]
    fn test_registration_valid() {
        assert!(registration().validate().is_ok());
    }

    #[test]
    fn test_registration_rejections() {
        let cases: Vec<(fn(&mut Registration), &str)> = vec![
            (|r: &mut Registration| r.restaurant_name.clear(), "restaurant_name"),
            (|r: &mut Registration| r.confirm_password.clear(), "confirm_password"),
            (|r: &mut Registration| r.email = "omar@nile".to_string(), "email"),
            (|r: &mut Registration| r.phone = "12345".to_string(), "phone"),
            (|r: &mut Registration| r.phone = "0100-ABC-45678".to_string(), "phone"),
            (|r: &mut Registration| { r.password = "short".into(); r.confirm_password = "short".into(); }, "password"),
            (|r: &mut Registration| r.confirm_password = "different1".to_string(), "confirm_password"),
            (|r: &mut Registration| r.accept_terms = false, "accept_terms"),
        ];
        for (mutate, field) in cases {
            let mut form = registration();
            mutate(&mut form);
            assert_eq!(form.validate().unwrap_err().field, field);
        }
    }

    #[test]
    fn test_new_user_rejects_unknown_role() {
        let user = NewUser {
            full_name: "Ali".into(),
            email: "ali@nile.eg".into(),
            role: Role::Unknown,
            password: "long-enough".into(),
            ..Default::default()
        };
        assert_eq!(user.validate().unwrap_err().field, "role");
    }

    #[test]
    fn test_user_update_only_sends_changed_fields() {
        let update = UserUpdate {
            is_active: Some(false),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&update).unwrap(), serde_json::json!({"is_active": false}));
    }
}
