//! Tenant-scoped data access.
//!
//! `TenantStore` is the only way the application layers talk to the menu
//! tables. It pins every request to one restaurant: reads carry a
//! `restaurant_id=eq.{tenant}` filter, inserts have `restaurant_id` stamped
//! into the body, and updates/deletes by id filter on both the id and the
//! tenant so a stale or foreign id can never touch another restaurant's rows.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::api::{ApiError, Direction, Query, Resource, RestClient};
use crate::auth::password::hash_password;
use crate::cache::CacheManager;
use crate::models::{Category, Product, Restaurant, RestaurantSettings, Review, ReviewFilter, User};

use super::forms::{
    NewCategory, NewProduct, NewReview, NewUser, SettingsForm, UserRow, UserUpdate,
};

/// Storage bucket holding uploaded menu images
pub const IMAGE_BUCKET: &str = "restaurant-images";

const TENANT_COLUMN: &str = "restaurant_id";

/// Counts shown on the dashboard overview.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardStats {
    pub user_count: usize,
    pub category_count: usize,
    pub product_count: usize,
    pub available_products: usize,
    pub review_count: usize,
    pub approved_reviews: usize,
    pub pending_reviews: usize,
    /// Mean of every review's average rating; 0 with no reviews
    pub average_rating: f64,
}

impl DashboardStats {
    pub fn compute(users: &[User], categories: &[Category], products: &[Product], reviews: &[Review]) -> Self {
        let approved_reviews = reviews.iter().filter(|r| r.is_approved).count();
        let average_rating = if reviews.is_empty() {
            0.0
        } else {
            reviews.iter().map(Review::average_rating).sum::<f64>() / reviews.len() as f64
        };
        Self {
            user_count: users.len(),
            category_count: categories.len(),
            product_count: products.len(),
            available_products: products.iter().filter(|p| p.is_available).count(),
            review_count: reviews.len(),
            approved_reviews,
            pending_reviews: reviews.len() - approved_reviews,
            average_rating,
        }
    }
}

/// Everything the dashboard shows, fetched in one batch.
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    pub users: Vec<User>,
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
    pub reviews: Vec<Review>,
    pub settings: Option<RestaurantSettings>,
    pub stats: DashboardStats,
}

/// Categories plus the products the public menu shows.
#[derive(Debug, Clone, Default)]
pub struct FullMenu {
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
}

#[derive(Clone)]
pub struct TenantStore {
    client: RestClient,
    tenant_id: String,
    cache: Option<CacheManager>,
}

impl TenantStore {
    pub fn new(client: RestClient, tenant_id: &str) -> Self {
        Self {
            client,
            tenant_id: tenant_id.to_string(),
            cache: None,
        }
    }

    /// Serve repeated reads from `cache` until it expires or a write happens
    pub fn with_cache(mut self, cache: CacheManager) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    pub fn client(&self) -> &RestClient {
        &self.client
    }

    // =========================================================================
    // Scoping
    // =========================================================================

    fn scoped(&self) -> Query {
        Query::new().eq(TENANT_COLUMN, &self.tenant_id)
    }

    fn by_id(&self, id: &str) -> Query {
        Query::new().eq("id", id).eq(TENANT_COLUMN, &self.tenant_id)
    }

    /// Serialize `body` and set its `restaurant_id` to this tenant
    fn stamp<B: Serialize>(&self, body: &B) -> Result<Value, ApiError> {
        let mut value =
            serde_json::to_value(body).map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        match value {
            Value::Object(ref mut map) => {
                map.insert(TENANT_COLUMN.to_string(), Value::String(self.tenant_id.clone()));
                Ok(value)
            }
            _ => Err(ApiError::InvalidRequest(
                "request body must be a JSON object".to_string(),
            )),
        }
    }

    fn first<T>(rows: Vec<T>, what: &str) -> Result<T, ApiError> {
        rows.into_iter()
            .next()
            .ok_or_else(|| ApiError::NotFound(what.to_string()))
    }

    async fn read<T>(&self, resource: Resource, query: Query) -> Result<Vec<T>, ApiError>
    where
        T: Serialize + DeserializeOwned,
    {
        match self.cache {
            Some(ref cache) => {
                let endpoint = format!("{}?{}", resource, query.render(resource)?);
                cache
                    .fetch_cached(&endpoint, || self.client.get(resource, &query))
                    .await
            }
            None => self.client.get(resource, &query).await,
        }
    }

    /// Drop cached reads after a write
    fn invalidate(&self) {
        if let Some(ref cache) = self.cache {
            match cache.clear() {
                Ok(count) => debug!(count, "Invalidated cached reads"),
                Err(e) => warn!(error = %e, "Failed to invalidate cache"),
            }
        }
    }

    async fn insert<T, B>(&self, resource: Resource, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let body = self.stamp(body)?;
        let rows = self.client.post(resource, &body).await?;
        self.invalidate();
        Self::first(rows, resource.table())
    }

    async fn update<T, B>(&self, resource: Resource, id: &str, body: &B) -> Result<Vec<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let rows = self.client.patch(resource, &self.by_id(id), body).await?;
        self.invalidate();
        Ok(rows)
    }

    async fn remove(&self, resource: Resource, id: &str) -> Result<(), ApiError> {
        self.client.delete(resource, &self.by_id(id)).await?;
        self.invalidate();
        Ok(())
    }

    // =========================================================================
    // Restaurant
    // =========================================================================

    pub async fn restaurant(&self) -> Result<Restaurant, ApiError> {
        let query = Query::new().eq("id", &self.tenant_id);
        let rows = self.client.get(Resource::Restaurants, &query).await?;
        Self::first(rows, "restaurant")
    }

    pub async fn update_restaurant(&self, changes: &Value) -> Result<Vec<Restaurant>, ApiError> {
        let query = Query::new().eq("id", &self.tenant_id);
        let rows = self.client.patch(Resource::Restaurants, &query, changes).await?;
        self.invalidate();
        Ok(rows)
    }

    // =========================================================================
    // Users
    // =========================================================================

    pub async fn users(&self) -> Result<Vec<User>, ApiError> {
        let query = self.scoped().order("created_at", Direction::Desc);
        self.read(Resource::Users, query).await
    }

    pub async fn user_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let query = self.scoped().eq("email", email.trim()).limit(1);
        let rows: Vec<User> = self.client.get(Resource::Users, &query).await?;
        Ok(rows.into_iter().next())
    }

    pub async fn active_users(&self) -> Result<Vec<User>, ApiError> {
        let query = self
            .scoped()
            .eq("is_active", true)
            .order("full_name", Direction::Asc);
        self.read(Resource::Users, query).await
    }

    /// Validate, hash the password and insert the account
    pub async fn create_user(&self, user: &NewUser) -> Result<User, ApiError> {
        user.validate()?;
        let password_hash = hash_password(&user.password)
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        let row = UserRow {
            full_name: user.full_name.trim(),
            email: user.email.trim(),
            phone: user.phone.as_deref(),
            role: user.role,
            is_active: true,
            password_hash: &password_hash,
        };
        self.insert(Resource::Users, &row).await
    }

    pub async fn update_user(&self, id: &str, changes: &UserUpdate) -> Result<Vec<User>, ApiError> {
        self.update(Resource::Users, id, changes).await
    }

    pub async fn delete_user(&self, id: &str) -> Result<(), ApiError> {
        self.remove(Resource::Users, id).await
    }

    // =========================================================================
    // Categories
    // =========================================================================

    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        let query = self.scoped().order("display_order", Direction::Asc);
        self.read(Resource::Categories, query).await
    }

    pub async fn create_category(&self, category: &NewCategory) -> Result<Category, ApiError> {
        category.validate()?;
        self.insert(Resource::Categories, category).await
    }

    pub async fn update_category(&self, id: &str, category: &NewCategory) -> Result<Vec<Category>, ApiError> {
        category.validate()?;
        self.update(Resource::Categories, id, category).await
    }

    pub async fn delete_category(&self, id: &str) -> Result<(), ApiError> {
        self.remove(Resource::Categories, id).await
    }

    pub async fn toggle_category(&self, id: &str, active: bool) -> Result<Vec<Category>, ApiError> {
        self.update(Resource::Categories, id, &json!({ "is_active": active }))
            .await
    }

    /// Append a section name to a category's declared list
    pub async fn add_section(&self, category: &Category, name: &str) -> Result<Vec<Category>, ApiError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(crate::models::ValidationError::required("section").into());
        }
        if category.has_section(name) {
            return Err(crate::models::ValidationError::new(
                "section",
                format!("section {} already exists", name),
            )
            .into());
        }
        let mut sections = category.sections.clone();
        sections.push(name.to_string());
        self.update(Resource::Categories, &category.id, &json!({ "sections": sections }))
            .await
    }

    /// Remove a section name. Products keep their section text.
    pub async fn remove_section(&self, category: &Category, name: &str) -> Result<Vec<Category>, ApiError> {
        let sections: Vec<&String> = category.sections.iter().filter(|s| *s != name).collect();
        self.update(Resource::Categories, &category.id, &json!({ "sections": sections }))
            .await
    }

    // =========================================================================
    // Products
    // =========================================================================

    pub async fn products(&self, category_id: Option<&str>) -> Result<Vec<Product>, ApiError> {
        let mut query = self.scoped();
        if let Some(category_id) = category_id {
            query = query.eq("category_id", category_id);
        }
        self.read(Resource::Products, query.order("display_order", Direction::Asc))
            .await
    }

    pub async fn available_products(&self) -> Result<Vec<Product>, ApiError> {
        let query = self
            .scoped()
            .eq("is_available", true)
            .order("display_order", Direction::Asc);
        self.read(Resource::Products, query).await
    }

    pub async fn featured_products(&self) -> Result<Vec<Product>, ApiError> {
        let query = self
            .scoped()
            .eq("is_featured", true)
            .order("display_order", Direction::Asc);
        self.read(Resource::Products, query).await
    }

    pub async fn create_product(&self, product: &NewProduct) -> Result<Product, ApiError> {
        product.validate()?;
        self.insert(Resource::Products, product).await
    }

    pub async fn update_product(&self, id: &str, product: &NewProduct) -> Result<Vec<Product>, ApiError> {
        product.validate()?;
        self.update(Resource::Products, id, product).await
    }

    pub async fn delete_product(&self, id: &str) -> Result<(), ApiError> {
        self.remove(Resource::Products, id).await
    }

    pub async fn toggle_availability(&self, id: &str, available: bool) -> Result<Vec<Product>, ApiError> {
        self.update(Resource::Products, id, &json!({ "is_available": available }))
            .await
    }

    pub async fn toggle_featured(&self, id: &str, featured: bool) -> Result<Vec<Product>, ApiError> {
        self.update(Resource::Products, id, &json!({ "is_featured": featured }))
            .await
    }

    /// Delete an uploaded image given its object name or public URL
    pub async fn delete_image(&self, path: &str) -> Result<(), ApiError> {
        let name = path.rsplit('/').next().unwrap_or(path);
        self.client.delete_object(IMAGE_BUCKET, name).await
    }

    // =========================================================================
    // Settings
    // =========================================================================

    pub async fn settings(&self) -> Result<Option<RestaurantSettings>, ApiError> {
        let rows: Vec<RestaurantSettings> = self
            .read(Resource::RestaurantSettings, self.scoped().limit(1))
            .await?;
        Ok(rows.into_iter().next())
    }

    /// Create the settings row on first save, update it afterwards
    pub async fn save_settings(&self, form: &SettingsForm) -> Result<RestaurantSettings, ApiError> {
        form.validate()?;
        let existing = self.settings().await?;
        match existing.and_then(|s| s.id) {
            Some(id) => {
                let rows = self.update(Resource::RestaurantSettings, &id, form).await?;
                Self::first(rows, "restaurant_settings")
            }
            None => self.insert(Resource::RestaurantSettings, form).await,
        }
    }

    // =========================================================================
    // Reviews
    // =========================================================================

    pub async fn reviews(&self, filter: ReviewFilter) -> Result<Vec<Review>, ApiError> {
        let mut query = self.scoped();
        if let Some(approved) = filter.approved() {
            query = query.eq("is_approved", approved);
        }
        self.read(Resource::Reviews, query.order("created_at", Direction::Desc))
            .await
    }

    pub async fn create_review(&self, review: &NewReview) -> Result<Review, ApiError> {
        review.validate()?;
        self.insert(Resource::Reviews, review).await
    }

    pub async fn approve_review(&self, id: &str) -> Result<Vec<Review>, ApiError> {
        self.update(Resource::Reviews, id, &json!({ "is_approved": true }))
            .await
    }

    pub async fn reject_review(&self, id: &str) -> Result<Vec<Review>, ApiError> {
        self.update(Resource::Reviews, id, &json!({ "is_approved": false }))
            .await
    }

    pub async fn delete_review(&self, id: &str) -> Result<(), ApiError> {
        self.remove(Resource::Reviews, id).await
    }

    // =========================================================================
    // Aggregates
    // =========================================================================

    /// Categories and available products, fetched concurrently
    pub async fn full_menu(&self) -> Result<FullMenu, ApiError> {
        let (categories, products) = tokio::try_join!(self.categories(), self.available_products())?;
        Ok(FullMenu {
            categories,
            products,
        })
    }

    /// All dashboard data, fetched concurrently
    pub async fn dashboard(&self) -> Result<Dashboard, ApiError> {
        let (users, categories, products, reviews, settings) = tokio::try_join!(
            self.users(),
            self.categories(),
            self.products(None),
            self.reviews(ReviewFilter::All),
            self.settings(),
        )?;
        let stats = DashboardStats::compute(&users, &categories, &products, &reviews);
        Ok(Dashboard {
            users,
            categories,
            products,
            reviews,
            settings,
            stats,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
