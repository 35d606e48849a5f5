use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use std::str::FromStr;
use westcambios_error::error::TypeError;
use westcambios_types::{Currency, RateResponse, UserResponse, UserRole};

/// Stored user row. `role` is kept as the raw string so records with
/// unknown roles still load; conversion happens in `to_response`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub is_active: bool,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserRecord {
    pub fn new(email: String, username: String, password_hash: String, role: UserRole) -> Self {
        UserRecord {
            id: 0,
            email,
            username,
            password_hash,
            is_active: true,
            role: role.to_string(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    pub fn to_response(&self) -> Result<UserResponse, TypeError> {
        Ok(UserResponse {
            id: self.id,
            email: self.email.clone(),
            username: self.username.clone(),
            is_active: self.is_active,
            role: UserRole::from_str(&self.role)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RateRecord {
    pub id: i64,
    pub from_currency: String,
    pub to_currency: String,
    pub rate: f64,
    pub timestamp: DateTime<Utc>,
}

impl RateRecord {
    pub fn new(
        from_currency: Currency,
        to_currency: Currency,
        rate: f64,
        timestamp: Option<DateTime<Utc>>,
    ) -> Self {
        RateRecord {
            id: 0,
            from_currency: from_currency.to_string(),
            to_currency: to_currency.to_string(),
            rate,
            timestamp: timestamp.unwrap_or_else(Utc::now),
        }
    }

    pub fn to_response(&self) -> Result<RateResponse, TypeError> {
        Ok(RateResponse {
            id: self.id,
            from_currency: Currency::from_str(&self.from_currency)?,
            to_currency: Currency::from_str(&self.to_currency)?,
            rate: self.rate,
            timestamp: self.timestamp,
        })
    }
}
