//! User module - owners of transactions

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Database-assigned user identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Access role of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Role {
    /// Full administrative access
    Admin,

    /// Regular account
    #[default]
    User,

    /// Read-only visitor
    Guest,

    /// Account that may no longer record transactions
    BlockedUser,
}

impl Role {
    /// Get the role name as stored
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::User => "User",
            Role::Guest => "Guest",
            Role::BlockedUser => "BlockedUser",
        }
    }

    /// Parse a role from its stored name
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Admin" => Some(Role::Admin),
            "User" => Some(Role::User),
            "Guest" => Some(Role::Guest),
            "BlockedUser" => Some(Role::BlockedUser),
            _ => None,
        }
    }
}

impl std::str::FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| DomainError::UnknownVariant {
            kind: "role",
            value: s.to_string(),
        })
    }
}

/// Where the account was registered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Platform {
    /// Registered directly against this service
    #[default]
    SelfHosted,

    /// Registered through the LINE messaging bot
    Line,
}

impl Platform {
    /// Get the platform name as stored
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::SelfHosted => "Self",
            Platform::Line => "LINE",
        }
    }

    /// Parse a platform from its stored name
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Self" => Some(Platform::SelfHosted),
            "LINE" => Some(Platform::Line),
            _ => None,
        }
    }
}

impl std::str::FromStr for Platform {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| DomainError::UnknownVariant {
            kind: "platform",
            value: s.to_string(),
        })
    }
}

/// A registered user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique identifier
    pub id: UserId,

    /// Login / lookup name, unique
    pub user_name: String,

    /// Contact email, unique
    pub email: String,

    /// Access role
    pub role: Role,

    /// Registration platform
    pub platform: Platform,

    /// Identifier on the external platform, if any
    pub external_id: Option<String>,

    /// When the account was created (unix seconds)
    pub created_at: u64,
}

impl User {
    /// Whether this user may record new transactions
    pub fn can_record(&self) -> bool {
        !matches!(self.role, Role::Guest | Role::BlockedUser)
    }
}

/// A user that has not been persisted yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Login / lookup name
    pub user_name: String,

    /// Contact email
    pub email: String,

    /// Access role
    pub role: Role,

    /// Registration platform
    pub platform: Platform,

    /// Identifier on the external platform, if any
    pub external_id: Option<String>,
}

impl NewUser {
    /// A regular self-registered user
    pub fn new(user_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            email: email.into(),
            role: Role::default(),
            platform: Platform::default(),
            external_id: None,
        }
    }
}
