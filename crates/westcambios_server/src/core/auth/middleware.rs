use crate::core::error::{detail_response, forbidden, internal_server_error, unauthorized};
use crate::core::state::AppState;

use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Json,
};
use axum_extra::extract::cookie::CookieJar;
use std::str::FromStr;
use std::sync::Arc;
use westcambios_sql::base::SqlClient;
use westcambios_sql::schemas::schema::UserRecord;
use westcambios_types::UserRole;

/// Authenticated account attached to the request once the token checks out.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub record: UserRecord,
}

impl CurrentUser {
    /// Records with an unknown role string fall back to the lowest
    /// privilege level.
    pub fn role(&self) -> UserRole {
        UserRole::from_str(&self.record.role).unwrap_or(UserRole::Client)
    }

    pub fn is_admin(&self) -> bool {
        self.role() == UserRole::Admin
    }
}

/// Token check for every protected route. Accepts the token from the
/// `access_token` cookie or the `Authorization: Bearer` header.
pub async fn auth_api_middleware(
    cookie_jar: CookieJar,
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    let access_token = cookie_jar
        .get("access_token")
        .map(|cookie| cookie.value().to_string())
        .or_else(|| {
            req.headers()
                .get(header::AUTHORIZATION)
                .and_then(|auth_header| auth_header.to_str().ok())
                .and_then(|auth_value| {
                    auth_value
                        .strip_prefix("Bearer ")
                        .map(|token| token.to_owned())
                })
        });

    let access_token = access_token
        .ok_or_else(|| detail_response(StatusCode::UNAUTHORIZED, "Could not validate credentials"))?;

    let claims = state
        .auth_manager
        .validate_jwt(&access_token)
        .map_err(|_| unauthorized("Could not validate credentials"))?;

    let user = state
        .sql_client
        .get_user_by_email(&claims.sub)
        .await
        .map_err(internal_server_error)?
        .ok_or_else(|| unauthorized("User not found"))?;

    if !user.is_active {
        return Err(forbidden("Inactive user"));
    }

    req.extensions_mut().insert(CurrentUser { record: user });

    Ok(next.run(req).await)
}

/// Admin gate, layered inside `auth_api_middleware`.
pub async fn admin_api_middleware(
    req: Request,
    next: Next,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    let is_admin = req
        .extensions()
        .get::<CurrentUser>()
        .map(|user| user.is_admin())
        .ok_or_else(|| unauthorized("Could not validate credentials"))?;

    if !is_admin {
        return Err(forbidden("The user does not have enough privileges"));
    }

    Ok(next.run(req).await)
}
