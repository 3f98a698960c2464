//! # User Endpoints

use shared::dto::auth::Role;
use shared::dto::user::UserResponse;

use crate::cache::ResourceKey;
use crate::core::error::Result;
use crate::core::Core;

pub fn users_key() -> ResourceKey {
    ResourceKey::from(["users"])
}

pub fn user_key(user_id: &str) -> ResourceKey {
    ResourceKey::from(["users", user_id])
}

fn role_filter_key(role: Role) -> ResourceKey {
    ResourceKey::from(["users", "role", role.as_str()])
}

/// List accounts, optionally narrowed to one role (the dispatcher console
/// lists drivers this way).
pub async fn get_users(core: &Core, role: Option<Role>) -> Result<Vec<UserResponse>> {
    let gateway = core.gateway();
    let (key, path) = match role {
        Some(role) => (
            role_filter_key(role),
            format!("/users?role={}", role.as_str()),
        ),
        None => (users_key(), "/users".to_string()),
    };
    core.cache()
        .fetch(key, move || async move { gateway.get(&path).await })
        .await
}

pub async fn get_user(core: &Core, user_id: &str) -> Result<UserResponse> {
    let gateway = core.gateway();
    let path = format!("/users/{user_id}");
    core.cache()
        .fetch(user_key(user_id), move || async move {
            gateway.get(&path).await
        })
        .await
}
