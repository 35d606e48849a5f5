use crate::core::admin::schema::{DateRangeQuery, RoleQuery};
use crate::core::auth::route::create_user;
use crate::core::error::{bad_request, internal_server_error, not_found};
use crate::core::state::AppState;
use crate::core::window::{day_window, parse_date_range};

use anyhow::{Context, Result};
use axum::extract::{Path, Query, State};
use axum::routing::{delete, get, patch, post};
use axum::{http::StatusCode, Json, Router};
use chrono::{DateTime, Utc};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info};
use westcambios_sql::base::SqlClient;
use westcambios_sql::schemas::schema::RateRecord;
use westcambios_types::{
    RateCreate, RateListResponse, RateResponse, RateUpdate, UserCreate, UserListResponse,
    UserResponse, UserRole, UserUpdate,
};

pub async fn register_user_handler(
    State(state): State<Arc<AppState>>,
    Json(user_in): Json<UserCreate>,
) -> Result<Json<UserResponse>, (StatusCode, Json<serde_json::Value>)> {
    let role = user_in.role.unwrap_or(UserRole::Client);

    let user = create_user(&state, user_in, role)
        .await?
        .ok_or_else(|| bad_request("User could not be created"))?;

    info!("Admin registered user {}", user.email);

    Ok(Json(user))
}

pub async fn update_user_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    Json(update): Json<UserUpdate>,
) -> Result<Json<UserResponse>, (StatusCode, Json<serde_json::Value>)> {
    let mut record = state
        .sql_client
        .get_user_by_id(user_id)
        .await
        .map_err(internal_server_error)?
        .ok_or_else(|| not_found("User not found"))?;

    if let Some(email) = update.email {
        record.email = email;
    }
    if let Some(username) = update.username {
        record.username = username;
    }
    if let Some(is_active) = update.is_active {
        record.is_active = is_active;
    }
    if let Some(role) = update.role {
        record.role = role.to_string();
    }
    record.updated_at = Some(Utc::now());

    let updated = state
        .sql_client
        .update_user(&record)
        .await
        .map_err(internal_server_error)?;

    let response = updated.to_response().map_err(internal_server_error)?;

    Ok(Json(response))
}

pub async fn delete_user_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<StatusCode, (StatusCode, Json<serde_json::Value>)> {
    let deleted = state
        .sql_client
        .delete_user(user_id)
        .await
        .map_err(internal_server_error)?;

    if !deleted {
        return Err(not_found("User not found"));
    }

    info!("Deleted user {}", user_id);

    Ok(StatusCode::NO_CONTENT)
}

async fn set_user_active(
    state: &Arc<AppState>,
    user_id: i64,
    is_active: bool,
) -> Result<UserResponse, (StatusCode, Json<serde_json::Value>)> {
    let mut record = state
        .sql_client
        .get_user_by_id(user_id)
        .await
        .map_err(internal_server_error)?
        .ok_or_else(|| not_found("User not found"))?;

    record.is_active = is_active;
    record.updated_at = Some(Utc::now());

    let updated = state
        .sql_client
        .update_user(&record)
        .await
        .map_err(internal_server_error)?;

    updated.to_response().map_err(internal_server_error)
}

pub async fn activate_user_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserResponse>, (StatusCode, Json<serde_json::Value>)> {
    let response = set_user_active(&state, user_id, true).await?;
    Ok(Json(response))
}

pub async fn deactivate_user_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserResponse>, (StatusCode, Json<serde_json::Value>)> {
    let response = set_user_active(&state, user_id, false).await?;
    Ok(Json(response))
}

pub async fn update_user_role_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    Query(query): Query<RoleQuery>,
) -> Result<Json<UserResponse>, (StatusCode, Json<serde_json::Value>)> {
    let role = UserRole::from_str(&query.user_role).map_err(|_| bad_request("Invalid user role"))?;

    let mut record = state
        .sql_client
        .get_user_by_id(user_id)
        .await
        .map_err(internal_server_error)?
        .ok_or_else(|| not_found("User not found"))?;

    record.role = role.to_string();
    record.updated_at = Some(Utc::now());

    let updated = state
        .sql_client
        .update_user(&record)
        .await
        .map_err(internal_server_error)?;

    let response = updated.to_response().map_err(internal_server_error)?;

    Ok(Json(response))
}

fn to_user_list(
    users: Vec<westcambios_sql::schemas::schema::UserRecord>,
) -> Result<UserListResponse, (StatusCode, Json<serde_json::Value>)> {
    let users = users
        .iter()
        .map(|user| user.to_response())
        .collect::<Result<Vec<_>, _>>()
        .map_err(internal_server_error)?;

    Ok(UserListResponse {
        count: users.len() as i64,
        users,
    })
}

pub async fn all_users_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<UserListResponse>, (StatusCode, Json<serde_json::Value>)> {
    let users = state
        .sql_client
        .get_all_users()
        .await
        .map_err(internal_server_error)?;

    Ok(Json(to_user_list(users)?))
}

async fn users_registered_within(
    state: &Arc<AppState>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Json<UserListResponse>, (StatusCode, Json<serde_json::Value>)> {
    let users = state
        .sql_client
        .get_users_registered_between(start, end)
        .await
        .map_err(internal_server_error)?;

    Ok(Json(to_user_list(users)?))
}

pub async fn users_last_month_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<UserListResponse>, (StatusCode, Json<serde_json::Value>)> {
    let (start, end) = day_window(30);
    users_registered_within(&state, start, end).await
}

pub async fn users_last_3_months_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<UserListResponse>, (StatusCode, Json<serde_json::Value>)> {
    let (start, end) = day_window(90);
    users_registered_within(&state, start, end).await
}

pub async fn users_last_6_months_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<UserListResponse>, (StatusCode, Json<serde_json::Value>)> {
    let (start, end) = day_window(180);
    users_registered_within(&state, start, end).await
}

pub async fn users_last_year_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<UserListResponse>, (StatusCode, Json<serde_json::Value>)> {
    let (start, end) = day_window(365);
    users_registered_within(&state, start, end).await
}

pub async fn users_by_custom_range_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DateRangeQuery>,
) -> Result<Json<UserListResponse>, (StatusCode, Json<serde_json::Value>)> {
    let (start, end) = parse_date_range(&query.start_date, &query.end_date)
        .map_err(|_| bad_request("Invalid date format, expected YYYY-MM-DD"))?;

    users_registered_within(&state, start, end).await
}

pub async fn register_rate_handler(
    State(state): State<Arc<AppState>>,
    Json(rate_in): Json<RateCreate>,
) -> Result<Json<RateResponse>, (StatusCode, Json<serde_json::Value>)> {
    let record = RateRecord::new(
        rate_in.from_currency,
        rate_in.to_currency,
        rate_in.rate,
        rate_in.timestamp,
    );

    let created = state
        .sql_client
        .insert_rate(&record)
        .await
        .map_err(internal_server_error)?;

    let response = created.to_response().map_err(internal_server_error)?;

    info!(
        "Registered rate {} {}/{}",
        response.rate, response.from_currency, response.to_currency
    );

    Ok(Json(response))
}

pub async fn update_rate_handler(
    State(state): State<Arc<AppState>>,
    Path(rate_id): Path<i64>,
    Json(update): Json<RateUpdate>,
) -> Result<Json<RateResponse>, (StatusCode, Json<serde_json::Value>)> {
    let updated = state
        .sql_client
        .update_rate(rate_id, update.rate)
        .await
        .map_err(internal_server_error)?
        .ok_or_else(|| not_found("Rate record not found"))?;

    let response = updated.to_response().map_err(internal_server_error)?;

    Ok(Json(response))
}

pub async fn delete_rate_handler(
    State(state): State<Arc<AppState>>,
    Path(rate_id): Path<i64>,
) -> Result<StatusCode, (StatusCode, Json<serde_json::Value>)> {
    let deleted = state
        .sql_client
        .delete_rate(rate_id)
        .await
        .map_err(internal_server_error)?;

    if !deleted {
        return Err(not_found("Rate record not found"));
    }

    info!("Deleted rate {}", rate_id);

    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_admin_router(prefix: &str) -> Result<Router<Arc<AppState>>> {
    let result = catch_unwind(AssertUnwindSafe(|| {
        Router::new()
            .route(
                &format!("{}/admin/register_user", prefix),
                post(register_user_handler),
            )
            .route(
                &format!("{}/admin/update_user/:user_id", prefix),
                patch(update_user_handler),
            )
            .route(
                &format!("{}/admin/delete_user/:user_id", prefix),
                delete(delete_user_handler),
            )
            .route(
                &format!("{}/admin/activate_user/:user_id", prefix),
                patch(activate_user_handler),
            )
            .route(
                &format!("{}/admin/deactivate_user/:user_id", prefix),
                patch(deactivate_user_handler),
            )
            .route(
                &format!("{}/admin/update_user_role/:user_id", prefix),
                patch(update_user_role_handler),
            )
            .route(
                &format!("{}/admin/all_users", prefix),
                get(all_users_handler),
            )
            .route(
                &format!("{}/admin/users_register_last_month", prefix),
                get(users_last_month_handler),
            )
            .route(
                &format!("{}/admin/users_register_last_3_months", prefix),
                get(users_last_3_months_handler),
            )
            .route(
                &format!("{}/admin/users_register_last_6_months", prefix),
                get(users_last_6_months_handler),
            )
            .route(
                &format!("{}/admin/users_register_last_year", prefix),
                get(users_last_year_handler),
            )
            .route(
                &format!("{}/admin/users_by_custom_range", prefix),
                get(users_by_custom_range_handler),
            )
            .route(
                &format!("{}/admin/register_rate", prefix),
                post(register_rate_handler),
            )
            .route(
                &format!("{}/admin/update_rate/:rate_id", prefix),
                patch(update_rate_handler),
            )
            .route(
                &format!("{}/admin/delete_rate/:rate_id", prefix),
                delete(delete_rate_handler),
            )
    }));

    match result {
        Ok(router) => Ok(router),
        Err(_) => {
            error!("Failed to create admin router");
            Err(anyhow::anyhow!("Failed to create admin router"))
                .context("Panic occurred while creating the router")
        }
    }
}
