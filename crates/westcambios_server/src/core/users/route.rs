use crate::core::auth::middleware::CurrentUser;
use crate::core::error::internal_server_error;
use crate::core::state::AppState;
use crate::core::users::schema::{EmailQuery, PasswordQuery};

use anyhow::{Context, Result};
use axum::extract::{Query, State};
use axum::routing::{get, patch};
use axum::{http::StatusCode, Extension, Json, Router};
use chrono::Utc;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::error;
use westcambios_sql::base::SqlClient;
use westcambios_sql::schemas::schema::UserRecord;
use westcambios_types::{UserResponse, UserUpdate};

pub async fn get_me_handler(
    Extension(current_user): Extension<CurrentUser>,
) -> Result<Json<UserResponse>, (StatusCode, Json<serde_json::Value>)> {
    let response = current_user
        .record
        .to_response()
        .map_err(internal_server_error)?;

    Ok(Json(response))
}

async fn save_user(
    state: &Arc<AppState>,
    record: &mut UserRecord,
) -> Result<UserResponse, (StatusCode, Json<serde_json::Value>)> {
    record.updated_at = Some(Utc::now());

    let updated = state
        .sql_client
        .update_user(record)
        .await
        .map_err(internal_server_error)?;

    updated.to_response().map_err(internal_server_error)
}

/// Self-service profile update. Only the username and email fields are
/// honored here; role and active flags go through the admin routes.
pub async fn update_user_handler(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
    Json(update): Json<UserUpdate>,
) -> Result<Json<UserResponse>, (StatusCode, Json<serde_json::Value>)> {
    let mut record = current_user.record;

    if let Some(username) = update.username {
        record.username = username;
    }
    if let Some(email) = update.email {
        record.email = email;
    }

    let response = save_user(&state, &mut record).await?;

    Ok(Json(response))
}

pub async fn update_password_handler(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
    Query(query): Query<PasswordQuery>,
) -> Result<Json<UserResponse>, (StatusCode, Json<serde_json::Value>)> {
    let mut record = current_user.record;
    record.password_hash = state.auth_manager.hash_password(&query.new_password);

    let response = save_user(&state, &mut record).await?;

    Ok(Json(response))
}

pub async fn update_email_handler(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<CurrentUser>,
    Query(query): Query<EmailQuery>,
) -> Result<Json<UserResponse>, (StatusCode, Json<serde_json::Value>)> {
    let mut record = current_user.record;
    record.email = query.new_email;

    let response = save_user(&state, &mut record).await?;

    Ok(Json(response))
}

pub async fn get_user_router(prefix: &str) -> Result<Router<Arc<AppState>>> {
    let result = catch_unwind(AssertUnwindSafe(|| {
        Router::new()
            .route(&format!("{}/users/me", prefix), get(get_me_handler))
            .route(
                &format!("{}/users/update_user", prefix),
                patch(update_user_handler),
            )
            .route(
                &format!("{}/users/update_password", prefix),
                patch(update_password_handler),
            )
            .route(
                &format!("{}/users/update_email", prefix),
                patch(update_email_handler),
            )
    }));

    match result {
        Ok(router) => Ok(router),
        Err(_) => {
            error!("Failed to create user router");
            Err(anyhow::anyhow!("Failed to create user router"))
                .context("Panic occurred while creating the router")
        }
    }
}
