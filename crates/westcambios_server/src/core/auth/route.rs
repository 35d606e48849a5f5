use crate::core::error::{bad_request, internal_server_error, unauthorized};
use crate::core::state::AppState;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::{http::StatusCode, routing::post, Form, Json, Router};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{error, info};
use westcambios_sql::base::SqlClient;
use westcambios_sql::schemas::schema::UserRecord;
use westcambios_types::{LoginForm, Token, UserCreate, UserResponse, UserRole};

/// Exchange credentials for an access token. The `username` form field
/// carries the account email.
pub async fn api_login_handler(
    State(state): State<Arc<AppState>>,
    Form(login): Form<LoginForm>,
) -> Result<Json<Token>, (StatusCode, Json<serde_json::Value>)> {
    let user = state
        .sql_client
        .get_user_by_email(&login.username)
        .await
        .map_err(internal_server_error)?
        .ok_or_else(|| unauthorized("Invalid email or password"))?;

    state
        .auth_manager
        .validate_user(&user, &login.password)
        .map_err(|_| unauthorized("Invalid email or password"))?;

    let access_token = state
        .auth_manager
        .generate_jwt(&user)
        .map_err(internal_server_error)?;

    info!("Issued access token for {}", user.email);

    Ok(Json(Token::new(access_token)))
}

/// Public registration. New accounts always start as clients, whatever the
/// payload asks for.
pub async fn api_register_handler(
    State(state): State<Arc<AppState>>,
    Json(user_in): Json<UserCreate>,
) -> Result<(StatusCode, Json<UserResponse>), (StatusCode, Json<serde_json::Value>)> {
    let user = create_user(&state, user_in, UserRole::Client)
        .await?
        .ok_or_else(|| bad_request("Email or username already registered"))?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Shared creation path for public registration and admin provisioning.
/// Returns None when the email is already taken.
pub async fn create_user(
    state: &Arc<AppState>,
    user_in: UserCreate,
    role: UserRole,
) -> Result<Option<UserResponse>, (StatusCode, Json<serde_json::Value>)> {
    let existing = state
        .sql_client
        .get_user_by_email(&user_in.email)
        .await
        .map_err(internal_server_error)?;

    if existing.is_some() {
        return Ok(None);
    }

    let mut record = UserRecord::new(
        user_in.email,
        user_in.username,
        state.auth_manager.hash_password(&user_in.password),
        role,
    );

    if let Some(is_active) = user_in.is_active {
        record.is_active = is_active;
    }

    let created = state
        .sql_client
        .insert_user(&record)
        .await
        .map_err(internal_server_error)?;

    let response = created.to_response().map_err(internal_server_error)?;

    Ok(Some(response))
}

pub async fn get_auth_router(prefix: &str) -> Result<Router<Arc<AppState>>> {
    let result = catch_unwind(AssertUnwindSafe(|| {
        Router::new()
            .route(&format!("{}/auth/login", prefix), post(api_login_handler))
            .route(
                &format!("{}/auth/register", prefix),
                post(api_register_handler),
            )
    }));

    match result {
        Ok(router) => Ok(router),
        Err(_) => {
            error!("Failed to create auth router");
            Err(anyhow::anyhow!("Failed to create auth router"))
                .context("Panic occurred while creating the router")
        }
    }
}
