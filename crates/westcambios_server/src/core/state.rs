use std::sync::Arc;
use westcambios_auth::auth::AuthManager;
use westcambios_market::binance::BinanceP2pClient;
use westcambios_settings::config::WestcambiosConfig;
use westcambios_sql::sqlite::client::SqliteClient;

pub struct AppState {
    pub sql_client: Arc<SqliteClient>,
    pub auth_manager: AuthManager,
    pub market_client: BinanceP2pClient,
    pub config: Arc<WestcambiosConfig>,
}
