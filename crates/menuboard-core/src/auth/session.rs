use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Role;

/// Session file name in cache directory
const SESSION_FILE: &str = "session.json";

/// The signed-in identity: which restaurant, which user, which role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    pub restaurant_id: String,
    pub user_id: String,
    pub role: Role,
    pub user_name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub login_time: DateTime<Utc>,
}

impl SessionData {
    pub fn new(restaurant_id: &str, user_id: &str, role: Role, user_name: &str) -> Self {
        Self {
            restaurant_id: restaurant_id.to_string(),
            user_id: user_id.to_string(),
            role,
            user_name: user_name.to_string(),
            email: None,
            login_time: Utc::now(),
        }
    }

    pub fn with_email(mut self, email: &str) -> Self {
        self.email = Some(email.to_string());
        self
    }
}

pub struct Session {
    cache_dir: PathBuf,
    pub data: Option<SessionData>,
}

impl Session {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            data: None,
        }
    }

    /// Load session from disk. Returns whether a session was found.
    pub fn load(&mut self) -> Result<bool> {
        let path = self.session_path();
        if !path.exists() {
            return Ok(false);
        }

        let contents = std::fs::read_to_string(&path)
            .context("Failed to read session file")?;
        let data: SessionData = serde_json::from_str(&contents)
            .context("Failed to parse session file")?;
        self.data = Some(data);
        Ok(true)
    }

    /// Save session to disk
    pub fn save(&self) -> Result<()> {
        if let Some(ref data) = self.data {
            let path = self.session_path();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let contents = serde_json::to_string_pretty(data)?;
            std::fs::write(path, contents)?;
        }
        Ok(())
    }

    /// Log out: forget the identity and delete the session file
    pub fn clear(&mut self) -> Result<()> {
        self.data = None;
        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    pub fn update(&mut self, data: SessionData) {
        self.data = Some(data);
    }

    pub fn is_logged_in(&self) -> bool {
        self.data.is_some()
    }

    pub fn restaurant_id(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.restaurant_id.as_str())
    }

    pub fn user_id(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.user_id.as_str())
    }

    pub fn role(&self) -> Role {
        self.data.as_ref().map(|d| d.role).unwrap_or_default()
    }

    /// Whether the signed-in user meets `required`. False when logged out.
    pub fn has_role(&self, required: Role) -> bool {
        self.data
            .as_ref()
            .map(|d| d.role.satisfies(required))
            .unwrap_or(false)
    }

    fn session_path(&self) -> PathBuf {
        self.cache_dir.join(SESSION_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_load_clear() {
        let dir = TempDir::new().unwrap();

        let mut session = Session::new(dir.path().to_path_buf());
        assert!(!session.load().unwrap());
        assert!(!session.is_logged_in());

        session.update(SessionData::new("r-1", "u-1", Role::Manager, "Sara").with_email("sara@cafe.com"));
        session.save().unwrap();

        let mut reloaded = Session::new(dir.path().to_path_buf());
        assert!(reloaded.load().unwrap());
        assert_eq!(reloaded.restaurant_id(), Some("r-1"));
        assert_eq!(reloaded.user_id(), Some("u-1"));
        assert_eq!(reloaded.data, session.data);

        reloaded.clear().unwrap();
        assert!(!reloaded.is_logged_in());
        assert!(!dir.path().join(SESSION_FILE).exists());
    }

    #[test]
    fn test_has_role() {
        let dir = TempDir::new().unwrap();
        let mut session = Session::new(dir.path().to_path_buf());
        assert!(!session.has_role(Role::Staff));

        session.update(SessionData::new("r-1", "u-1", Role::Manager, "Sara"));
        assert!(session.has_role(Role::Staff));
        assert!(session.has_role(Role::Manager));
        assert!(!session.has_role(Role::Admin));
    }

    #[test]
    fn test_corrupt_session_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(SESSION_FILE), "{").unwrap();
        let mut session = Session::new(dir.path().to_path_buf());
        assert!(session.load().is_err());
        assert!(!session.is_logged_in());
    }
}
