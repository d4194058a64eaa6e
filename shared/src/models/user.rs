//! User Model

use serde::{Deserialize, Serialize};

/// Account role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum UserRole {
    Client,
    /// Created implicitly by a guest checkout
    Guest,
    Admin,
}

/// User entity
///
/// The password hash is never serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub role: UserRole,
    #[serde(skip)]
    pub password_hash: String,
    pub created_at: i64,
}

/// Guest identity payload, built from the contact fields of an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuestCreate {
    pub name: String,
    pub email: String,
    pub address: Option<String>,
    pub phone: Option<String>,
}
