use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::Result;
use menuboard_core::api::RestClient;
use tokio::sync::RwLock;

use super::config::Config;

/// A cached upstream menu body.
#[derive(Debug, Clone)]
pub struct CachedMenu {
    pub body: String,
    pub stored_at: Instant,
}

pub struct State {
    pub client: RestClient,
    pub max_age: Duration,
    menus: RwLock<HashMap<String, CachedMenu>>,
}

impl State {
    pub fn new(client: RestClient, max_age: Duration) -> Arc<Self> {
        Arc::new(Self {
            client,
            max_age,
            menus: RwLock::new(HashMap::new()),
        })
    }

    pub fn from_config(config: &Config) -> Result<Arc<Self>> {
        let client = RestClient::new(&config.supabase_url, &config.supabase_key)?;
        Ok(Self::new(client, config.max_age))
    }

    /// Cached body for `restaurant_id` if younger than `max_age`
    pub async fn fresh_menu(&self, restaurant_id: &str) -> Option<String> {
        let menus = self.menus.read().await;
        menus
            .get(restaurant_id)
            .filter(|m| m.stored_at.elapsed() < self.max_age)
            .map(|m| m.body.clone())
    }

    pub async fn store_menu(&self, restaurant_id: &str, body: &str) {
        let mut menus = self.menus.write().await;
        // Drop stale entries while holding the lock anyway
        menus.retain(|_, m| m.stored_at.elapsed() < self.max_age);
        menus.insert(
            restaurant_id.to_string(),
            CachedMenu {
                body: body.to_string(),
                stored_at: Instant::now(),
            },
        );
    }
}
