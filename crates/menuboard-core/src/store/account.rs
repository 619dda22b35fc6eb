//! Sign-in and sign-up against the users table.

use serde::Serialize;
use tracing::info;

use crate::api::{ApiError, Query, Resource, RestClient};
use crate::auth::{verify_password, SessionData};
use crate::models::{Restaurant, Role, User, ValidationError, DEFAULT_CURRENCY, DEFAULT_PRIMARY_COLOR};

use super::forms::{NewUser, Registration};
use super::TenantStore;

async fn find_user(client: &RestClient, email: &str) -> Result<Option<User>, ApiError> {
    let query = Query::new().eq("email", email.trim()).limit(1);
    let rows: Vec<User> = client.get(Resource::Users, &query).await?;
    Ok(rows.into_iter().next())
}

/// Look up an active account by email and check its password.
///
/// Unknown emails, inactive accounts and wrong passwords all surface as
/// `InvalidCredentials`.
pub async fn login(client: &RestClient, email: &str, password: &str) -> Result<SessionData, ApiError> {
    let user = match find_user(client, email).await? {
        Some(user) if user.is_active => user,
        _ => return Err(ApiError::InvalidCredentials),
    };

    let verified = user
        .password_hash
        .as_deref()
        .is_some_and(|hash| verify_password(password, hash));
    if !verified {
        return Err(ApiError::InvalidCredentials);
    }

    info!(user_id = %user.id, restaurant_id = %user.restaurant_id, "Logged in");
    Ok(SessionData::new(&user.restaurant_id, &user.id, user.role, &user.full_name).with_email(email.trim()))
}

#[derive(Serialize)]
struct RestaurantRow<'a> {
    name_ar: &'a str,
    name_en: &'a str,
    email: &'a str,
    phone: &'a str,
    currency: &'a str,
    primary_color: &'a str,
}

/// Create a restaurant and its first admin account, returning the new session.
pub async fn register(client: &RestClient, form: &Registration) -> Result<SessionData, ApiError> {
    form.validate()?;

    if find_user(client, &form.email).await?.is_some() {
        return Err(ValidationError::new("email", "email is already registered").into());
    }

    let name = form.restaurant_name.trim();
    let row = RestaurantRow {
        name_ar: name,
        name_en: name,
        email: form.email.trim(),
        phone: form.phone.trim(),
        currency: DEFAULT_CURRENCY,
        primary_color: DEFAULT_PRIMARY_COLOR,
    };
    let restaurant: Restaurant = client
        .post(Resource::Restaurants, &row)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::NotFound("restaurant".to_string()))?;

    let store = TenantStore::new(client.clone(), &restaurant.id);
    let admin = store
        .create_user(&NewUser {
            full_name: form.full_name.trim().to_string(),
            email: form.email.trim().to_string(),
            phone: Some(form.phone.trim().to_string()),
            role: Role::Admin,
            password: form.password.clone(),
        })
        .await?;

    info!(restaurant_id = %restaurant.id, user_id = %admin.id, "Registered restaurant");
    Ok(SessionData::new(&restaurant.id, &admin.id, admin.role, &admin.full_name).with_email(&admin.email))
}
