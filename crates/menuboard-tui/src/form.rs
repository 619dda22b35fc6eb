//! Multi-field editing overlays.
//!
//! A `Form` is a list of labelled fields plus the kind of row it edits.
//! Conversions into the core store forms run the same validation the store
//! runs, so a bad value keeps the overlay open instead of reaching the
//! backend.

use menuboard_core::auth::Role;
use menuboard_core::models::{Category, Product, RestaurantSettings, ValidationError};
use menuboard_core::store::{NewCategory, NewProduct, NewUser, Registration, SettingsForm};

/// Maximum characters in a single text field.
const MAX_FIELD_LENGTH: usize = 200;

/// Roles offered when creating a user, lowest first
const USER_ROLES: [Role; 3] = [Role::Staff, Role::Manager, Role::Admin];

/// What a submitted form writes.
#[derive(Debug, Clone, PartialEq)]
pub enum FormKind {
    NewCategory,
    /// Sections are edited with their own prompt and carried through as-is
    EditCategory { id: String, sections: Vec<String> },
    NewProduct,
    EditProduct { id: String },
    Settings,
    NewUser,
    Register,
}

impl FormKind {
    pub fn title(&self) -> &'static str {
        match self {
            FormKind::NewCategory => "New category",
            FormKind::EditCategory { .. } => "Edit category",
            FormKind::NewProduct => "New product",
            FormKind::EditProduct { .. } => "Edit product",
            FormKind::Settings => "Restaurant settings",
            FormKind::NewUser => "New user",
            FormKind::Register => "Register a restaurant",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    /// `(value, label)` pairs
    Choice {
        options: Vec<(String, String)>,
        selected: usize,
    },
    Toggle(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub key: &'static str,
    pub label: &'static str,
    pub value: FieldValue,
    /// Rendered masked
    pub secret: bool,
}

impl Field {
    fn text(key: &'static str, label: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            label,
            value: FieldValue::Text(value.into()),
            secret: false,
        }
    }

    fn optional(key: &'static str, label: &'static str, value: Option<&String>) -> Self {
        Self::text(key, label, value.cloned().unwrap_or_default())
    }

    fn secret(key: &'static str, label: &'static str) -> Self {
        Self {
            secret: true,
            ..Self::text(key, label, "")
        }
    }

    fn toggle(key: &'static str, label: &'static str, on: bool) -> Self {
        Self {
            key,
            label,
            value: FieldValue::Toggle(on),
            secret: false,
        }
    }

    fn choice(key: &'static str, label: &'static str, options: Vec<(String, String)>, selected: usize) -> Self {
        Self {
            key,
            label,
            value: FieldValue::Choice { options, selected },
            secret: false,
        }
    }

    /// Text shown in the overlay for this field's current value
    pub fn display(&self) -> String {
        match &self.value {
            FieldValue::Text(s) if self.secret => "*".repeat(s.chars().count()),
            FieldValue::Text(s) => s.clone(),
            FieldValue::Choice { options, selected } => options
                .get(*selected)
                .map(|(_, label)| format!("< {} >", label))
                .unwrap_or_default(),
            FieldValue::Toggle(true) => "[x]".to_string(),
            FieldValue::Toggle(false) => "[ ]".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Form {
    pub kind: FormKind,
    pub fields: Vec<Field>,
    pub focus: usize,
    pub error: Option<String>,
}

impl Form {
    fn new(kind: FormKind, fields: Vec<Field>) -> Self {
        Self {
            kind,
            fields,
            focus: 0,
            error: None,
        }
    }

    // -------------------------------------------------------------------------
    // Builders
    // -------------------------------------------------------------------------

    pub fn new_category(display_order: i32) -> Self {
        let blank = NewCategory {
            display_order,
            ..NewCategory::new("")
        };
        Self::category_fields(FormKind::NewCategory, &blank)
    }

    pub fn edit_category(category: &Category) -> Self {
        let kind = FormKind::EditCategory {
            id: category.id.clone(),
            sections: category.sections.clone(),
        };
        let current = NewCategory {
            name_ar: category.name_ar.clone(),
            name_en: category.name_en.clone(),
            description_ar: category.description_ar.clone(),
            image_url: category.image_url.clone(),
            display_order: category.display_order,
            is_active: category.is_active,
            sections: category.sections.clone(),
        };
        Self::category_fields(kind, &current)
    }

    fn category_fields(kind: FormKind, c: &NewCategory) -> Self {
        Self::new(
            kind,
            vec![
                Field::text("name_ar", "Name (Arabic)", c.name_ar.as_str()),
                Field::optional("name_en", "Name (English)", c.name_en.as_ref()),
                Field::optional("description_ar", "Description", c.description_ar.as_ref()),
                Field::optional("image_url", "Image URL", c.image_url.as_ref()),
                Field::text("display_order", "Display order", c.display_order.to_string()),
                Field::toggle("is_active", "Active", c.is_active),
            ],
        )
    }

    /// A blank product, filed under `category_id` when it is one of `categories`
    pub fn new_product(categories: &[Category], category_id: Option<&str>) -> Self {
        let blank = NewProduct::new(category_id.unwrap_or_default(), "", 0.0);
        Self::product_fields(FormKind::NewProduct, &blank, categories)
    }

    pub fn edit_product(product: &Product, categories: &[Category]) -> Self {
        let current = NewProduct {
            category_id: product.category_id.clone(),
            name_ar: product.name_ar.clone(),
            name_en: product.name_en.clone(),
            description_ar: product.description_ar.clone(),
            description_en: product.description_en.clone(),
            price: product.price,
            image_url: product.image_url.clone(),
            section: product.section.clone(),
            is_available: product.is_available,
            is_featured: product.is_featured,
            display_order: product.display_order,
        };
        let kind = FormKind::EditProduct {
            id: product.id.clone(),
        };
        Self::product_fields(kind, &current, categories)
    }

    fn product_fields(kind: FormKind, p: &NewProduct, categories: &[Category]) -> Self {
        let options: Vec<(String, String)> = categories
            .iter()
            .map(|c| (c.id.clone(), c.display_name().to_string()))
            .collect();
        let selected = options
            .iter()
            .position(|(id, _)| *id == p.category_id)
            .unwrap_or(0);

        Self::new(
            kind,
            vec![
                Field::choice("category_id", "Category", options, selected),
                Field::text("name_ar", "Name (Arabic)", p.name_ar.as_str()),
                Field::optional("name_en", "Name (English)", p.name_en.as_ref()),
                Field::text("price", "Price", p.price.to_string()),
                Field::optional("section", "Section", p.section.as_ref()),
                Field::optional("description_ar", "Description (Arabic)", p.description_ar.as_ref()),
                Field::optional("description_en", "Description (English)", p.description_en.as_ref()),
                Field::optional("image_url", "Image URL", p.image_url.as_ref()),
                Field::text("display_order", "Display order", p.display_order.to_string()),
                Field::toggle("is_available", "Available", p.is_available),
                Field::toggle("is_featured", "Featured", p.is_featured),
            ],
        )
    }

    /// Settings prefilled from the saved row, blank on first save
    pub fn settings(current: Option<&RestaurantSettings>) -> Self {
        let s = current.map(SettingsForm::from).unwrap_or_default();
        Self::new(
            FormKind::Settings,
            vec![
                Field::text("restaurant_name_ar", "Name (Arabic)", s.restaurant_name_ar.as_str()),
                Field::optional("restaurant_name_en", "Name (English)", s.restaurant_name_en.as_ref()),
                Field::optional("currency", "Currency", s.currency.as_ref()),
                Field::optional("primary_color", "Color (#hex)", s.primary_color.as_ref()),
                Field::optional("logo_url", "Logo URL", s.logo_url.as_ref()),
                Field::optional("facebook_url", "Facebook", s.facebook_url.as_ref()),
                Field::optional("instagram_url", "Instagram", s.instagram_url.as_ref()),
                Field::optional("tiktok_url", "TikTok", s.tiktok_url.as_ref()),
                Field::optional("whatsapp_number", "WhatsApp", s.whatsapp_number.as_ref()),
                Field::text("ad_banner_urls", "Banners (a, b)", s.ad_banner_urls.join(", ")),
                Field::optional("social_ad_image", "Social ad image", s.social_ad_image.as_ref()),
                Field::optional("social_ad_video", "Social ad video", s.social_ad_video.as_ref()),
            ],
        )
    }

    pub fn new_user() -> Self {
        let roles = USER_ROLES
            .iter()
            .map(|r| (r.label().to_lowercase(), r.label().to_string()))
            .collect();
        Self::new(
            FormKind::NewUser,
            vec![
                Field::text("full_name", "Full name", ""),
                Field::text("email", "Email", ""),
                Field::text("phone", "Phone", ""),
                Field::choice("role", "Role", roles, 0),
                Field::secret("password", "Password"),
            ],
        )
    }

    pub fn register(email: &str) -> Self {
        Self::new(
            FormKind::Register,
            vec![
                Field::text("restaurant_name", "Restaurant", ""),
                Field::text("full_name", "Your name", ""),
                Field::text("email", "Email", email),
                Field::text("phone", "Phone", ""),
                Field::secret("password", "Password"),
                Field::secret("confirm_password", "Confirm"),
                Field::toggle("accept_terms", "Accept terms", false),
            ],
        )
    }

    // -------------------------------------------------------------------------
    // Editing
    // -------------------------------------------------------------------------

    pub fn focused(&self) -> Option<&Field> {
        self.fields.get(self.focus)
    }

    pub fn next_field(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    pub fn prev_field(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
        }
    }

    /// Type into a text field; choices and toggles ignore characters
    pub fn push_char(&mut self, c: char) {
        if let Some(FieldValue::Text(s)) = self.fields.get_mut(self.focus).map(|f| &mut f.value) {
            if s.chars().count() < MAX_FIELD_LENGTH && !c.is_control() {
                s.push(c);
            }
        }
    }

    pub fn pop_char(&mut self) {
        if let Some(FieldValue::Text(s)) = self.fields.get_mut(self.focus).map(|f| &mut f.value) {
            s.pop();
        }
    }

    /// Step a choice or flip a toggle. Returns false on text fields.
    pub fn cycle(&mut self, forward: bool) -> bool {
        match self.fields.get_mut(self.focus).map(|f| &mut f.value) {
            Some(FieldValue::Choice { options, selected }) if !options.is_empty() => {
                let len = options.len();
                *selected = if forward {
                    (*selected + 1) % len
                } else {
                    (*selected + len - 1) % len
                };
                true
            }
            Some(FieldValue::Toggle(on)) => {
                *on = !*on;
                true
            }
            _ => false,
        }
    }

    // -------------------------------------------------------------------------
    // Reading values
    // -------------------------------------------------------------------------

    fn value(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|f| f.key == key).map(|f| &f.value)
    }

    fn text(&self, key: &str) -> &str {
        match self.value(key) {
            Some(FieldValue::Text(s)) => s,
            _ => "",
        }
    }

    /// Trimmed text, `None` when blank
    fn optional(&self, key: &str) -> Option<String> {
        let s = self.text(key).trim();
        (!s.is_empty()).then(|| s.to_string())
    }

    fn flag(&self, key: &str) -> bool {
        matches!(self.value(key), Some(FieldValue::Toggle(true)))
    }

    fn choice(&self, key: &str) -> &str {
        match self.value(key) {
            Some(FieldValue::Choice { options, selected }) => {
                options.get(*selected).map_or("", |(value, _)| value)
            }
            _ => "",
        }
    }

    fn display_order(&self) -> Result<i32, ValidationError> {
        let raw = self.text("display_order").trim();
        if raw.is_empty() {
            return Ok(0);
        }
        raw.parse()
            .map_err(|_| ValidationError::new("display_order", "display order must be a whole number"))
    }

    // -------------------------------------------------------------------------
    // Conversions
    // -------------------------------------------------------------------------

    pub fn to_category(&self, sections: Vec<String>) -> Result<NewCategory, ValidationError> {
        let category = NewCategory {
            name_ar: self.text("name_ar").trim().to_string(),
            name_en: self.optional("name_en"),
            description_ar: self.optional("description_ar"),
            image_url: self.optional("image_url"),
            display_order: self.display_order()?,
            is_active: self.flag("is_active"),
            sections,
        };
        category.validate()?;
        Ok(category)
    }

    pub fn to_product(&self) -> Result<NewProduct, ValidationError> {
        let price = self
            .text("price")
            .trim()
            .parse::<f64>()
            .map_err(|_| ValidationError::new("price", "price must be a number"))?;
        let product = NewProduct {
            category_id: self.choice("category_id").to_string(),
            name_ar: self.text("name_ar").trim().to_string(),
            name_en: self.optional("name_en"),
            description_ar: self.optional("description_ar"),
            description_en: self.optional("description_en"),
            price,
            image_url: self.optional("image_url"),
            section: self.optional("section"),
            is_available: self.flag("is_available"),
            is_featured: self.flag("is_featured"),
            display_order: self.display_order()?,
        };
        product.validate()?;
        Ok(product)
    }

    pub fn to_settings(&self) -> Result<SettingsForm, ValidationError> {
        let settings = SettingsForm {
            restaurant_name_ar: self.text("restaurant_name_ar").trim().to_string(),
            restaurant_name_en: self.optional("restaurant_name_en"),
            currency: self.optional("currency"),
            primary_color: self.optional("primary_color"),
            logo_url: self.optional("logo_url"),
            facebook_url: self.optional("facebook_url"),
            instagram_url: self.optional("instagram_url"),
            tiktok_url: self.optional("tiktok_url"),
            whatsapp_number: self.optional("whatsapp_number"),
            ad_banner_urls: self
                .text("ad_banner_urls")
                .split(',')
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(str::to_string)
                .collect(),
            social_ad_image: self.optional("social_ad_image"),
            social_ad_video: self.optional("social_ad_video"),
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_user(&self) -> Result<NewUser, ValidationError> {
        let user = NewUser {
            full_name: self.text("full_name").trim().to_string(),
            email: self.text("email").trim().to_string(),
            phone: self.optional("phone"),
            role: Role::parse(self.choice("role")),
            password: self.text("password").to_string(),
        };
        user.validate()?;
        Ok(user)
    }

    pub fn to_registration(&self) -> Result<Registration, ValidationError> {
        let registration = Registration {
            restaurant_name: self.text("restaurant_name").to_string(),
            full_name: self.text("full_name").to_string(),
            email: self.text("email").to_string(),
            phone: self.text("phone").to_string(),
            password: self.text("password").to_string(),
            confirm_password: self.text("confirm_password").to_string(),
            accept_terms: self.flag("accept_terms"),
        };
        registration.validate()?;
        Ok(registration)
    }
}
