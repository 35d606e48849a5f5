use crate::core::admin::schema::DateRangeQuery;
use crate::core::error::{bad_request, internal_server_error, not_found};
use crate::core::state::AppState;
use crate::core::window::{day_window, parse_date_range};

use anyhow::{Context, Result};
use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{http::StatusCode, Json, Router};
use chrono::{DateTime, Utc};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::error;
use westcambios_sql::base::SqlClient;
use westcambios_sql::schemas::schema::RateRecord;
use westcambios_types::{RateListResponse, RateResponse};

fn to_rate_list(
    rates: Vec<RateRecord>,
) -> Result<RateListResponse, (StatusCode, Json<serde_json::Value>)> {
    let rates = rates
        .iter()
        .map(|rate| rate.to_response())
        .collect::<Result<Vec<_>, _>>()
        .map_err(internal_server_error)?;

    Ok(RateListResponse {
        count: rates.len() as i64,
        rates,
    })
}

pub async fn all_rates_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RateListResponse>, (StatusCode, Json<serde_json::Value>)> {
    let rates = state
        .sql_client
        .get_all_rates()
        .await
        .map_err(internal_server_error)?;

    Ok(Json(to_rate_list(rates)?))
}

async fn rates_within(
    state: &Arc<AppState>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Json<RateListResponse>, (StatusCode, Json<serde_json::Value>)> {
    let rates = state
        .sql_client
        .get_rates_between(start, end)
        .await
        .map_err(internal_server_error)?;

    Ok(Json(to_rate_list(rates)?))
}

pub async fn today_rates_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RateListResponse>, (StatusCode, Json<serde_json::Value>)> {
    let (start, end) = day_window(0);
    rates_within(&state, start, end).await
}

pub async fn week_rates_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RateListResponse>, (StatusCode, Json<serde_json::Value>)> {
    let (start, end) = day_window(7);
    rates_within(&state, start, end).await
}

pub async fn month_rates_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RateListResponse>, (StatusCode, Json<serde_json::Value>)> {
    let (start, end) = day_window(30);
    rates_within(&state, start, end).await
}

pub async fn three_months_rates_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RateListResponse>, (StatusCode, Json<serde_json::Value>)> {
    let (start, end) = day_window(90);
    rates_within(&state, start, end).await
}

pub async fn six_months_rates_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RateListResponse>, (StatusCode, Json<serde_json::Value>)> {
    let (start, end) = day_window(180);
    rates_within(&state, start, end).await
}

pub async fn year_rates_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RateListResponse>, (StatusCode, Json<serde_json::Value>)> {
    let (start, end) = day_window(365);
    rates_within(&state, start, end).await
}

pub async fn custom_rates_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DateRangeQuery>,
) -> Result<Json<RateListResponse>, (StatusCode, Json<serde_json::Value>)> {
    let (start, end) = parse_date_range(&query.start_date, &query.end_date)
        .map_err(|_| bad_request("Invalid date format, expected YYYY-MM-DD"))?;

    rates_within(&state, start, end).await
}

pub async fn rate_by_id_handler(
    State(state): State<Arc<AppState>>,
    Path(rate_id): Path<i64>,
) -> Result<Json<RateResponse>, (StatusCode, Json<serde_json::Value>)> {
    let rate = state
        .sql_client
        .get_rate_by_id(rate_id)
        .await
        .map_err(internal_server_error)?
        .ok_or_else(|| not_found("Rate record not found"))?;

    let response = rate.to_response().map_err(internal_server_error)?;

    Ok(Json(response))
}

pub async fn get_rates_router(prefix: &str) -> Result<Router<Arc<AppState>>> {
    let result = catch_unwind(AssertUnwindSafe(|| {
        Router::new()
            .route(&format!("{}/rates/all", prefix), get(all_rates_handler))
            .route(&format!("{}/rates/today", prefix), get(today_rates_handler))
            .route(&format!("{}/rates/week", prefix), get(week_rates_handler))
            .route(&format!("{}/rates/month", prefix), get(month_rates_handler))
            .route(
                &format!("{}/rates/3months", prefix),
                get(three_months_rates_handler),
            )
            .route(
                &format!("{}/rates/6months", prefix),
                get(six_months_rates_handler),
            )
            .route(&format!("{}/rates/year", prefix), get(year_rates_handler))
            .route(
                &format!("{}/rates/custom", prefix),
                get(custom_rates_handler),
            )
            .route(
                &format!("{}/rates/:rate_id", prefix),
                get(rate_by_id_handler),
            )
    }));

    match result {
        Ok(router) => Ok(router),
        Err(_) => {
            error!("Failed to create rates router");
            Err(anyhow::anyhow!("Failed to create rates router"))
                .context("Panic occurred while creating the router")
        }
    }
}
