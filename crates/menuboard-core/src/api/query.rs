//! Typed query construction for the REST-over-tables API.
//!
//! Queries are built without a target table and validated against a
//! `Resource` schema when rendered, so a typo in a column name fails
//! locally instead of returning an empty list from the backend.

use std::fmt;

use super::ApiError;

/// A remote table the client can talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Restaurants,
    Users,
    Categories,
    Products,
    RestaurantSettings,
    Reviews,
    /// Flattened public menu view served by the edge proxy
    Menu,
}

const RESTAURANT_COLUMNS: &[&str] = &[
    "id",
    "name_ar",
    "name_en",
    "email",
    "phone",
    "address",
    "currency",
    "primary_color",
    "logo_url",
    "is_active",
    "created_at",
];

const USER_COLUMNS: &[&str] = &[
    "id",
    "restaurant_id",
    "full_name",
    "email",
    "phone",
    "role",
    "is_active",
    "password_hash",
    "created_at",
];

const CATEGORY_COLUMNS: &[&str] = &[
    "id",
    "restaurant_id",
    "name_ar",
    "name_en",
    "description_ar",
    "image_url",
    "display_order",
    "is_active",
    "sections",
    "created_at",
];

const PRODUCT_COLUMNS: &[&str] = &[
    "id",
    "restaurant_id",
    "category_id",
    "name_ar",
    "name_en",
    "description_ar",
    "description_en",
    "price",
    "image_url",
    "section",
    "is_available",
    "is_featured",
    "display_order",
    "created_at",
];

const SETTINGS_COLUMNS: &[&str] = &[
    "id",
    "restaurant_id",
    "restaurant_name_ar",
    "restaurant_name_en",
    "currency",
    "primary_color",
    "logo_url",
    "facebook_url",
    "instagram_url",
    "tiktok_url",
    "whatsapp_number",
    "ad_banner_urls",
    "social_ad_image",
    "social_ad_video",
    "updated_at",
];

const REVIEW_COLUMNS: &[&str] = &[
    "id",
    "restaurant_id",
    "customer_name",
    "customer_phone",
    "customer_governorate",
    "customer_city",
    "place_rating",
    "products_rating",
    "service_rating",
    "comment",
    "is_approved",
    "created_at",
];

const MENU_COLUMNS: &[&str] = &[
    "id",
    "restaurant_id",
    "category_id",
    "name_ar",
    "name_en",
    "price",
    "section",
    "image_url",
    "is_available",
    "updated_at",
];

impl Resource {
    pub fn table(&self) -> &'static str {
        match self {
            Resource::Restaurants => "restaurants",
            Resource::Users => "users",
            Resource::Categories => "categories",
            Resource::Products => "products",
            Resource::RestaurantSettings => "restaurant_settings",
            Resource::Reviews => "reviews",
            Resource::Menu => "menu",
        }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Resource::Restaurants => RESTAURANT_COLUMNS,
            Resource::Users => USER_COLUMNS,
            Resource::Categories => CATEGORY_COLUMNS,
            Resource::Products => PRODUCT_COLUMNS,
            Resource::RestaurantSettings => SETTINGS_COLUMNS,
            Resource::Reviews => REVIEW_COLUMNS,
            Resource::Menu => MENU_COLUMNS,
        }
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns().contains(&column)
    }

    /// Every table except `restaurants` carries a `restaurant_id` foreign key.
    pub fn is_tenant_scoped(&self) -> bool {
        !matches!(self, Resource::Restaurants)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

/// Filter/order/select parameters for a single request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    filters: Vec<(String, String)>,
    select: Option<Vec<String>>,
    order: Vec<(String, Direction)>,
    limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a `column=eq.value` filter
    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.filters.push((column.to_string(), value.to_string()));
        self
    }

    pub fn order(mut self, column: &str, direction: Direction) -> Self {
        self.order.push((column.to_string(), direction));
        self
    }

    /// Restrict returned columns. `"*"` selects everything.
    pub fn select(mut self, columns: &[&str]) -> Self {
        self.select = Some(columns.iter().map(|c| c.to_string()).collect());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Value of the equality filter on `column`, if any
    pub fn filter_value(&self, column: &str) -> Option<&str> {
        self.filters
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty() && self.select.is_none() && self.order.is_empty() && self.limit.is_none()
    }

    /// Render the query string for `resource`, validating every column.
    pub fn render(&self, resource: Resource) -> Result<String, ApiError> {
        let check = |column: &str| -> Result<(), ApiError> {
            if resource.has_column(column) {
                Ok(())
            } else {
                Err(ApiError::UnknownColumn {
                    table: resource.table(),
                    column: column.to_string(),
                })
            }
        };

        let mut parts = Vec::new();

        for (column, value) in &self.filters {
            check(column)?;
            parts.push(format!("{}=eq.{}", column, urlencoding::encode(value)));
        }

        if let Some(ref columns) = self.select {
            for column in columns.iter().filter(|c| c.as_str() != "*") {
                check(column)?;
            }
            parts.push(format!("select={}", columns.join(",")));
        }

        if !self.order.is_empty() {
            let mut terms = Vec::with_capacity(self.order.len());
            for (column, direction) in &self.order {
                check(column)?;
                terms.push(format!("{}.{}", column, direction.as_str()));
            }
            parts.push(format!("order={}", terms.join(",")));
        }

        if let Some(limit) = self.limit {
            parts.push(format!("limit={}", limit));
        }

        Ok(parts.join("&"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_filters_and_order() {
        let query = Query::new()
            .eq("restaurant_id", "r-1")
            .eq("is_available", true)
            .order("display_order", Direction::Asc);

        assert_eq!(
            query.render(Resource::Products).unwrap(),
            "restaurant_id=eq.r-1&is_available=eq.true&order=display_order.asc"
        );
    }

    #[test]
    fn test_render_encodes_values() {
        let query = Query::new().eq("email", "a+b@example.com");
        assert_eq!(
            query.render(Resource::Users).unwrap(),
            "email=eq.a%2Bb%40example.com"
        );
    }

    #[test]
    fn test_render_select_star_and_limit() {
        let query = Query::new().eq("restaurant_id", "r-9").select(&["*"]).limit(1);
        assert_eq!(
            query.render(Resource::Menu).unwrap(),
            "restaurant_id=eq.r-9&select=*&limit=1"
        );
    }

    #[test]
    fn test_unknown_column_rejected() {
        let query = Query::new().eq("restaurantid", "r-1");
        match query.render(Resource::Categories) {
            Err(ApiError::UnknownColumn { table, column }) => {
                assert_eq!(table, "categories");
                assert_eq!(column, "restaurantid");
            }
            other => panic!("expected UnknownColumn, got {:?}", other),
        }

        // Same column is fine on a table that has it
        assert!(Query::new()
            .order("full_name", Direction::Asc)
            .render(Resource::Users)
            .is_ok());
        assert!(Query::new()
            .order("full_name", Direction::Asc)
            .render(Resource::Products)
            .is_err());
    }

    #[test]
    fn test_tenant_scoping() {
        assert!(!Resource::Restaurants.is_tenant_scoped());
        for resource in [
            Resource::Users,
            Resource::Categories,
            Resource::Products,
            Resource::RestaurantSettings,
            Resource::Reviews,
            Resource::Menu,
        ] {
            assert!(resource.is_tenant_scoped(), "{} should be scoped", resource);
            assert!(resource.has_column("restaurant_id"));
        }
    }

    #[test]
    fn test_empty_query() {
        assert!(Query::new().is_empty());
        assert_eq!(Query::new().render(Resource::Reviews).unwrap(), "");
        assert_eq!(Query::new().eq("id", 5).filter_value("id"), Some("5"));
    }
}
