use crate::base::{SqlClient, SqlTableNames};
use crate::schemas::schema::{RateRecord, UserRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};
use tracing::info;
use westcambios_error::error::SqlError;
use westcambios_settings::config::DatabaseSettings;

pub struct SqliteClient {
    pub pool: Pool<Sqlite>,
}

#[async_trait]
impl SqlClient for SqliteClient {
    async fn new(settings: &DatabaseSettings) -> Result<Self, SqlError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(settings.max_connections)
            .connect(&settings.connection_uri)
            .await
            .map_err(|e| SqlError::ConnectionError(format!("{}", e)))?;

        let client = SqliteClient { pool };

        client.run_migrations().await?;

        Ok(client)
    }

    async fn run_migrations(&self) -> Result<(), SqlError> {
        info!("Running migrations");

        sqlx::migrate!("src/sqlite/migrations")
            .run(&self.pool)
            .await
            .map_err(|e| SqlError::MigrationError(format!("{}", e)))?;

        Ok(())
    }

    async fn insert_user(&self, user: &UserRecord) -> Result<UserRecord, SqlError> {
        let query = format!(
            "INSERT INTO {} (email, username, password_hash, is_active, role, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            SqlTableNames::Users
        );

        let result = sqlx::query(&query)
            .bind(&user.email)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(user.is_active)
            .bind(&user.role)
            .bind(user.created_at)
            .bind(user.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| SqlError::QueryError(format!("{}", e)))?;

        let user_id = result.last_insert_rowid();

        self.get_user_by_id(user_id)
            .await?
            .ok_or_else(|| SqlError::QueryError(format!("User {} missing after insert", user_id)))
    }

    async fn get_user_by_id(&self, user_id: i64) -> Result<Option<UserRecord>, SqlError> {
        let query = format!("SELECT * FROM {} WHERE id = ?", SqlTableNames::Users);

        sqlx::query_as::<_, UserRecord>(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| SqlError::QueryError(format!("{}", e)))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, SqlError> {
        let query = format!("SELECT * FROM {} WHERE email = ?", SqlTableNames::Users);

        sqlx::query_as::<_, UserRecord>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| SqlError::QueryError(format!("{}", e)))
    }

    async fn get_all_users(&self) -> Result<Vec<UserRecord>, SqlError> {
        let query = format!("SELECT * FROM {} ORDER BY id", SqlTableNames::Users);

        sqlx::query_as::<_, UserRecord>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| SqlError::QueryError(format!("{}", e)))
    }

    async fn get_users_registered_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<UserRecord>, SqlError> {
        let query = format!(
            "SELECT * FROM {} WHERE created_at >= ? AND created_at < ? ORDER BY id",
            SqlTableNames::Users
        );

        sqlx::query_as::<_, UserRecord>(&query)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| SqlError::QueryError(format!("{}", e)))
    }

    async fn update_user(&self, user: &UserRecord) -> Result<UserRecord, SqlError> {
        let query = format!(
            "UPDATE {} SET email = ?, username = ?, password_hash = ?, is_active = ?, role = ?, updated_at = ?
             WHERE id = ?",
            SqlTableNames::Users
        );

        sqlx::query(&query)
            .bind(&user.email)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(user.is_active)
            .bind(&user.role)
            .bind(user.updated_at)
            .bind(user.id)
            .execute(&self.pool)
            .await
            .map_err(|e| SqlError::QueryError(format!("{}", e)))?;

        self.get_user_by_id(user.id)
            .await?
            .ok_or_else(|| SqlError::QueryError(format!("User {} missing after update", user.id)))
    }

    async fn delete_user(&self, user_id: i64) -> Result<bool, SqlError> {
        let query = format!("DELETE FROM {} WHERE id = ?", SqlTableNames::Users);

        let result = sqlx::query(&query)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| SqlError::QueryError(format!("{}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_rate(&self, rate: &RateRecord) -> Result<RateRecord, SqlError> {
        let query = format!(
            "INSERT INTO {} (from_currency, to_currency, rate, timestamp) VALUES (?, ?, ?, ?)",
            SqlTableNames::Rates
        );

        let result = sqlx::query(&query)
            .bind(&rate.from_currency)
            .bind(&rate.to_currency)
            .bind(rate.rate)
            .bind(rate.timestamp)
            .execute(&self.pool)
            .await
            .map_err(|e| SqlError::QueryError(format!("{}", e)))?;

        let rate_id = result.last_insert_rowid();

        self.get_rate_by_id(rate_id)
            .await?
            .ok_or_else(|| SqlError::QueryError(format!("Rate {} missing after insert", rate_id)))
    }

    async fn get_rate_by_id(&self, rate_id: i64) -> Result<Option<RateRecord>, SqlError> {
        let query = format!("SELECT * FROM {} WHERE id = ?", SqlTableNames::Rates);

        sqlx::query_as::<_, RateRecord>(&query)
            .bind(rate_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| SqlError::QueryError(format!("{}", e)))
    }

    async fn get_all_rates(&self) -> Result<Vec<RateRecord>, SqlError> {
        let query = format!("SELECT * FROM {} ORDER BY id", SqlTableNames::Rates);

        sqlx::query_as::<_, RateRecord>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| SqlError::QueryError(format!("{}", e)))
    }

    async fn get_rates_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<RateRecord>, SqlError> {
        let query = format!(
            "SELECT * FROM {} WHERE timestamp >= ? AND timestamp < ? ORDER BY id",
            SqlTableNames::Rates
        );

        sqlx::query_as::<_, RateRecord>(&query)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| SqlError::QueryError(format!("{}", e)))
    }

    async fn update_rate(&self, rate_id: i64, rate: f64) -> Result<Option<RateRecord>, SqlError> {
        let query = format!("UPDATE {} SET rate = ? WHERE id = ?", SqlTableNames::Rates);

        let result = sqlx::query(&query)
            .bind(rate)
            .bind(rate_id)
            .execute(&self.pool)
            .await
            .map_err(|e| SqlError::QueryError(format!("{}", e)))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_rate_by_id(rate_id).await
    }

    async fn delete_rate(&self, rate_id: i64) -> Result<bool, SqlError> {
        let query = format!("DELETE FROM {} WHERE id = ?", SqlTableNames::Rates);

        let result = sqlx::query(&query)
            .bind(rate_id)
            .execute(&self.pool)
            .await
            .map_err(|e| SqlError::QueryError(format!("{}", e)))?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use westcambios_types::{Currency, UserRole};

    async fn test_client() -> SqliteClient {
        let settings = DatabaseSettings {
            connection_uri: "sqlite::memory:".to_string(),
            max_connections: 1,
        };

        SqliteClient::new(&settings).await.unwrap()
    }

    fn test_user(email: &str) -> UserRecord {
        UserRecord::new(
            email.to_string(),
            "tester".to_string(),
            "hashed".to_string(),
            UserRole::Client,
        )
    }

    #[tokio::test]
    async fn test_insert_and_get_user() {
        let client = test_client().await;

        let created = client.insert_user(&test_user("a@b.com")).await.unwrap();
        assert!(created.id > 0);
        assert!(created.is_active);
        assert_eq!(created.role, "CLIENT");
        assert!(created.updated_at.is_none());

        let by_email = client.get_user_by_email("a@b.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, created.id);

        assert!(client.get_user_by_email("missing@b.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let client = test_client().await;

        client.insert_user(&test_user("a@b.com")).await.unwrap();
        let result = client.insert_user(&test_user("a@b.com")).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_update_user() {
        let client = test_client().await;

        let mut user = client.insert_user(&test_user("a@b.com")).await.unwrap();
        user.username = "renamed".to_string();
        user.is_active = false;
        user.role = UserRole::Manager.to_string();
        user.updated_at = Some(Utc::now());

        let updated = client.update_user(&user).await.unwrap();
        assert_eq!(updated.username, "renamed");
        assert!(!updated.is_active);
        assert_eq!(updated.role, "MANAGER");
        assert!(updated.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_delete_user() {
        let client = test_client().await;

        let user = client.insert_user(&test_user("a@b.com")).await.unwrap();
        assert!(client.delete_user(user.id).await.unwrap());
        assert!(!client.delete_user(user.id).await.unwrap());
        assert!(client.get_user_by_id(user.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_users_registered_between() {
        let client = test_client().await;

        let mut old = test_user("old@b.com");
        old.created_at = Utc::now() - Duration::days(60);
        client.insert_user(&old).await.unwrap();
        client.insert_user(&test_user("new@b.com")).await.unwrap();

        let start = Utc::now() - Duration::days(30);
        let end = Utc::now() + Duration::days(1);
        let recent = client.get_users_registered_between(start, end).await.unwrap();

        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].email, "new@b.com");
    }

    #[tokio::test]
    async fn test_rate_crud() {
        let client = test_client().await;

        let rate = RateRecord::new(Currency::Ves, Currency::Usdt, 36.5, None);
        let created = client.insert_rate(&rate).await.unwrap();
        assert!(created.id > 0);
        assert_eq!(created.from_currency, "VES");

        let updated = client.update_rate(created.id, 40.0).await.unwrap().unwrap();
        assert_eq!(updated.rate, 40.0);

        assert!(client.update_rate(9999, 1.0).await.unwrap().is_none());

        assert!(client.delete_rate(created.id).await.unwrap());
        assert!(!client.delete_rate(created.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_rates_between() {
        let client = test_client().await;

        let fresh = RateRecord::new(Currency::Ves, Currency::Usdt, 36.5, None);
        let stale = RateRecord::new(
            Currency::Usd,
            Currency::Brl,
            5.2,
            Some(Utc::now() - Duration::days(10)),
        );
        client.insert_rate(&fresh).await.unwrap();
        client.insert_rate(&stale).await.unwrap();

        let start = Utc::now() - Duration::days(7);
        let end = Utc::now() + Duration::days(1);
        let recent = client.get_rates_between(start, end).await.unwrap();

        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].from_currency, "VES");

        let all = client.get_all_rates().await.unwrap();
        assert_eq!(all.len(), 2);
    }
}
