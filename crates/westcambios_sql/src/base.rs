use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;
use westcambios_error::error::SqlError;
use westcambios_settings::config::DatabaseSettings;

use crate::schemas::schema::{RateRecord, UserRecord};

pub enum SqlTableNames {
    Users,
    Rates,
}

impl fmt::Display for SqlTableNames {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = match self {
            SqlTableNames::Users => "users",
            SqlTableNames::Rates => "rates",
        };
        write!(f, "{}", table)
    }
}

#[async_trait]
pub trait SqlClient: Sized {
    async fn new(settings: &DatabaseSettings) -> Result<Self, SqlError>;

    async fn run_migrations(&self) -> Result<(), SqlError>;

    /// Insert a user and return the stored row with its assigned id.
    async fn insert_user(&self, user: &UserRecord) -> Result<UserRecord, SqlError>;

    async fn get_user_by_id(&self, user_id: i64) -> Result<Option<UserRecord>, SqlError>;

    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, SqlError>;

    async fn get_all_users(&self) -> Result<Vec<UserRecord>, SqlError>;

    /// Users whose `created_at` falls inside `[start, end)`.
    async fn get_users_registered_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<UserRecord>, SqlError>;

    /// Persist every mutable column of `user`, keyed by its id.
    async fn update_user(&self, user: &UserRecord) -> Result<UserRecord, SqlError>;

    /// Returns false when no row matched the id.
    async fn delete_user(&self, user_id: i64) -> Result<bool, SqlError>;

    async fn insert_rate(&self, rate: &RateRecord) -> Result<RateRecord, SqlError>;

    async fn get_rate_by_id(&self, rate_id: i64) -> Result<Option<RateRecord>, SqlError>;

    async fn get_all_rates(&self) -> Result<Vec<RateRecord>, SqlError>;

    /// Rates whose `timestamp` falls inside `[start, end)`.
    async fn get_rates_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<RateRecord>, SqlError>;

    /// Set a new value on a rate. Returns the updated row, or None when
    /// the id does not exist.
    async fn update_rate(&self, rate_id: i64, rate: f64) -> Result<Option<RateRecord>, SqlError>;

    async fn delete_rate(&self, rate_id: i64) -> Result<bool, SqlError>;
}
