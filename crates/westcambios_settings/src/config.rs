use rand::Rng;
use std::default::Default;
use std::env;
use std::path::PathBuf;

/// Database connection settings consumed by the sql client.
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub connection_uri: String,
    pub max_connections: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            connection_uri: env::var("WESTCAMBIOS_DATABASE_URI")
                .unwrap_or_else(|_| "sqlite://westcambios.db?mode=rwc".to_string()),
            max_connections: env::var("WESTCAMBIOS_MAX_POOL_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
        }
    }
}

/// Settings used by the api client and the admin console.
#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub api_prefix: String,
    pub token_path: PathBuf,
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: env::var("WESTCAMBIOS_SERVER_URI")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            api_prefix: "api/v1".to_string(),
            token_path: default_token_path(),
        }
    }
}

fn default_token_path() -> PathBuf {
    if let Ok(path) = env::var("WESTCAMBIOS_TOKEN_PATH") {
        return PathBuf::from(path);
    }

    match env::var("HOME") {
        Ok(home) => PathBuf::from(home).join(".westcambios").join("credentials.json"),
        Err(_) => PathBuf::from(".westcambios").join("credentials.json"),
    }
}

/// WestcambiosConfig is the primary server configuration. Every field falls
/// back to a development default when the variable is not set.
#[derive(Debug, Clone)]
pub struct WestcambiosConfig {
    pub app_name: String,
    pub app_env: String,
    pub app_version: String,
    pub server_host: String,
    pub server_port: u16,
    pub database_settings: DatabaseSettings,
    pub jwt_secret: String,
    pub access_token_expire_minutes: i64,
    pub admin_email: Option<String>,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
    pub rate_refresh_secs: u64,
    pub market_url: String,
}

impl Default for WestcambiosConfig {
    fn default() -> Self {
        WestcambiosConfig {
            app_name: "westcambios".to_string(),
            app_env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            server_host: env::var("WESTCAMBIOS_SERVER_HOST")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("WESTCAMBIOS_SERVER_PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .unwrap_or(8000),
            database_settings: DatabaseSettings::default(),
            jwt_secret: env::var("WESTCAMBIOS_JWT_SECRET").unwrap_or_else(|_| generate_jwt_secret()),
            access_token_expire_minutes: env::var("WESTCAMBIOS_TOKEN_EXPIRE_MINUTES")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
            admin_email: env::var("WESTCAMBIOS_ADMIN_EMAIL").ok(),
            admin_username: env::var("WESTCAMBIOS_ADMIN_USERNAME").ok(),
            admin_password: env::var("WESTCAMBIOS_ADMIN_PASSWORD").ok(),
            rate_refresh_secs: env::var("WESTCAMBIOS_RATE_REFRESH_SECS")
                .unwrap_or_else(|_| "21600".to_string())
                .parse()
                .unwrap_or(21600),
            market_url: env::var("WESTCAMBIOS_MARKET_URI")
                .unwrap_or_else(|_| "https://p2p.binance.com".to_string()),
        }
    }
}

/// Generate a random 32 character jwt secret. Used when no secret is set,
/// which means tokens do not survive a server restart.
fn generate_jwt_secret() -> String {
    let mut rng = rand::thread_rng();
    (0..32)
        .map(|_| rng.sample(rand::distributions::Alphanumeric) as char)
        .collect()
}

impl WestcambiosConfig {
    pub fn new() -> Self {
        WestcambiosConfig::default()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WestcambiosConfig::default();

        assert_eq!(config.app_name, "westcambios");
        assert_eq!(config.access_token_expire_minutes, 30);
        assert_eq!(config.rate_refresh_secs, 21600);
        assert_eq!(config.jwt_secret.len(), 32);
    }

    #[test]
    fn test_bind_address() {
        let mut config = WestcambiosConfig::default();
        config.server_host = "127.0.0.1".to_string();
        config.server_port = 9000;

        assert_eq!(config.bind_address(), "127.0.0.1:9000");
    }

    #[test]
    fn test_api_settings_defaults() {
        let settings = ApiSettings::default();

        assert_eq!(settings.api_prefix, "api/v1");
        assert!(settings.token_path.ends_with("credentials.json"));
    }

    #[test]
    fn test_generate_jwt_secret() {
        let secret = generate_jwt_secret();
        assert_eq!(secret.len(), 32);
        assert_ne!(secret, generate_jwt_secret());
    }
}
