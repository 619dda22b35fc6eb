//! Authentication module for sessions, roles and credentials.
//!
//! This module provides:
//! - `Session`: the signed-in restaurant/user/role, persisted to disk
//! - `CredentialStore`: the backend API key in the OS keychain
//! - `password`: Argon2 hashing and a password strength meter
//!
//! `Role` lives with the models and is re-exported here for convenience.

pub mod credentials;
pub mod password;
pub mod session;

pub use crate::models::Role;
pub use credentials::CredentialStore;
pub use password::{hash_password, password_strength, verify_password, PasswordStrength};
pub use session::{Session, SessionData};
