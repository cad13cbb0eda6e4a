// ABOUTME: User type definitions
// ABOUTME: Public user profile plus registration and profile update inputs

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub unique_name: String,
    pub email: String,
    pub description: String,
    /// Object key of the avatar
    pub icon_uri: String,
    /// Public URL of the avatar
    pub icon_url: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdateInput {
    pub name: Option<String>,
    pub unique_name: Option<String>,
}
