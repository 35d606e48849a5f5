use crate::core::state::AppState;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;
use westcambios_auth::auth::AuthManager;
use westcambios_logging::logging::setup_logging;
use westcambios_market::binance::BinanceP2pClient;
use westcambios_settings::config::WestcambiosConfig;
use westcambios_sql::base::SqlClient;
use westcambios_sql::schemas::schema::UserRecord;
use westcambios_sql::sqlite::client::SqliteClient;
use westcambios_types::UserRole;

pub async fn setup_components() -> Result<Arc<AppState>> {
    let config = WestcambiosConfig::default();

    setup_logging().await.context("Failed to setup logging")?;

    info!("Starting WestCambios server ....");

    let sql_client = SqliteClient::new(&config.database_settings)
        .await
        .context("Failed to setup database client")?;

    let auth_manager = AuthManager::new(&config.jwt_secret, config.access_token_expire_minutes);

    let market_client = BinanceP2pClient::new(Some(config.market_url.clone()))
        .context("Failed to setup exchange client")?;

    let state = Arc::new(AppState {
        sql_client: Arc::new(sql_client),
        auth_manager,
        market_client,
        config: Arc::new(config),
    });

    create_initial_admin(&state)
        .await
        .context("Failed to seed admin account")?;

    Ok(state)
}

/// Seed the first admin account from configuration. Skipped when the
/// credentials are not configured or the account already exists.
pub async fn create_initial_admin(state: &Arc<AppState>) -> Result<bool> {
    let (email, username, password) = match (
        state.config.admin_email.as_ref(),
        state.config.admin_username.as_ref(),
        state.config.admin_password.as_ref(),
    ) {
        (Some(email), Some(username), Some(password)) => (email, username, password),
        _ => {
            info!("Admin credentials not configured, skipping admin seed");
            return Ok(false);
        }
    };

    if state.sql_client.get_user_by_email(email).await?.is_some() {
        info!("Admin account already exists");
        return Ok(false);
    }

    let record = UserRecord::new(
        email.clone(),
        username.clone(),
        state.auth_manager.hash_password(password),
        UserRole::Admin,
    );

    state.sql_client.insert_user(&record).await?;

    info!("Admin account created");

    Ok(true)
}
