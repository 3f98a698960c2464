use serde::{Deserialize, Serialize};

use super::auth::Role;

/// User account (public fields only).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub phone: String,
    pub role: Role,
    pub created_at: String,
    pub updated_at: String,
}
