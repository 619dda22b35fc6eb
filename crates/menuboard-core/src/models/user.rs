use serde::{Deserialize, Serialize};

/// Staff role. Roles form a strict hierarchy: admin > manager > staff.
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Staff,
    /// Any role string this version does not know
    #[default]
    #[serde(other)]
    Unknown,
}

impl Role {
    /// Position in the hierarchy; unknown roles rank below everything
    pub fn level(&self) -> u8 {
        match self {
            Role::Admin => 3,
            Role::Manager => 2,
            Role::Staff => 1,
            Role::Unknown => 0,
        }
    }

    /// Whether this role meets a required minimum role
    pub fn satisfies(&self, required: Role) -> bool {
        self.level() >= required.level()
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "admin" => Role::Admin,
            "manager" => Role::Manager,
            "staff" => Role::Staff,
            _ => Role::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Manager => "Manager",
            Role::Staff => "Staff",
            Role::Unknown => "Unknown",
        }
    }
}

/// A dashboard account belonging to one restaurant.
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub restaurant_id: String,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Argon2 PHC string. Never sent back to the backend from this struct.
    #[cfg_attr(feature = "ts", ts(skip))]
    #[serde(default, skip_serializing)]
    pub password_hash: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

fn default_true() -> bool {
    true
}
