//! # Authentication Endpoints
//!
//! Login and registration. Logout is a purely local affair and lives on
//! [`crate::core::Core::logout`].

use shared::dto::auth::{AuthResponse, LoginRequest, RegisterRequest};
use shared::dto::user::UserResponse;

use crate::core::error::Result;
use crate::core::Core;
use crate::session::Session;

/// Log in and establish the session. The device messaging token, when the
/// push provider has issued one, is sent along so the backend can target
/// this device.
#[tracing::instrument(skip(core, password, device_token), fields(username = %username))]
pub async fn login(
    core: &Core,
    username: &str,
    password: &str,
    device_token: Option<String>,
) -> Result<Session> {
    tracing::info!("attempting login");

    let request = LoginRequest {
        username: username.to_string(),
        password: password.to_string(),
        fcm_token: device_token.clone(),
    };
    let auth: AuthResponse = core.gateway().post("/auth/login", &request).await?;

    let session = Session {
        token: auth.token,
        user_id: auth.user_id,
        username: auth.username,
        role: auth.role,
        device_token,
    };
    core.session().set_session(session.clone())?;
    tracing::info!(role = ?session.role, "login successful");
    Ok(session)
}

/// Register a new account. Does not establish a session; the caller routes
/// to login afterwards.
pub async fn register(core: &Core, request: &RegisterRequest) -> Result<UserResponse> {
    core.gateway().post("/auth/register", request).await
}
