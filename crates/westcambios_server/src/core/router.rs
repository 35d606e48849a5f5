use crate::core::admin::route::get_admin_router;
use crate::core::auth::middleware::{admin_api_middleware, auth_api_middleware};
use crate::core::auth::route::get_auth_router;
use crate::core::health::route::health_check;
use crate::core::rates::route::get_rates_router;
use crate::core::state::AppState;
use crate::core::users::route::get_user_router;

use anyhow::Result;
use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    Method,
};
use axum::middleware;
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};

const ROUTE_PREFIX: &str = "/api/v1";

pub async fn create_router(app_state: Arc<AppState>) -> Result<Router> {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::PUT,
            Method::DELETE,
            Method::POST,
            Method::PATCH,
        ])
        .allow_credentials(true)
        .allow_origin(AllowOrigin::mirror_request())
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE]);

    let auth_router = get_auth_router(ROUTE_PREFIX).await?;

    let user_router = get_user_router(ROUTE_PREFIX).await?.route_layer(
        middleware::from_fn_with_state(app_state.clone(), auth_api_middleware),
    );

    let rates_router = get_rates_router(ROUTE_PREFIX).await?.route_layer(
        middleware::from_fn_with_state(app_state.clone(), auth_api_middleware),
    );

    // admin routes run the token check first, then the privilege gate
    let admin_router = get_admin_router(ROUTE_PREFIX)
        .await?
        .route_layer(middleware::from_fn(admin_api_middleware))
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            auth_api_middleware,
        ));

    Ok(Router::new()
        .route(&format!("{}/health", ROUTE_PREFIX), get(health_check))
        .merge(auth_router)
        .merge(user_router)
        .merge(rates_router)
        .merge(admin_router)
        .with_state(app_state)
        .layer(cors))
}
