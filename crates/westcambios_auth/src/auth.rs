use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use password_auth::{generate_hash, verify_password};
use serde::{Deserialize, Serialize};
use westcambios_error::error::AuthError;
use westcambios_sql::schemas::schema::UserRecord;

/// Claims carried by every access token. `sub` is the account email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

#[derive(Debug, Clone)]
pub struct AuthManager {
    jwt_secret: String,
    token_expire_minutes: i64,
}

impl AuthManager {
    pub fn new(jwt_secret: &str, token_expire_minutes: i64) -> Self {
        AuthManager {
            jwt_secret: jwt_secret.to_string(),
            token_expire_minutes,
        }
    }

    pub fn hash_password(&self, password: &str) -> String {
        generate_hash(password)
    }

    pub fn validate_user(&self, user: &UserRecord, password: &str) -> Result<(), AuthError> {
        verify_password(password, &user.password_hash).map_err(|_| AuthError::InvalidCredentials)
    }

    pub fn generate_jwt(&self, user: &UserRecord) -> Result<String, AuthError> {
        let expiration = Utc::now()
            .checked_add_signed(chrono::Duration::minutes(self.token_expire_minutes))
            .ok_or_else(|| AuthError::Error("Failed to compute token expiration".to_string()))?
            .timestamp() as usize;

        let claims = Claims {
            sub: user.email.clone(),
            exp: expiration,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::Error(format!("Failed to encode jwt token with error: {}", e)))
    }

    pub fn validate_jwt(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|_| AuthError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use westcambios_types::UserRole;

    fn test_manager() -> AuthManager {
        AuthManager::new("test-secret", 30)
    }

    fn test_user(password_hash: String) -> UserRecord {
        UserRecord::new(
            "admin@westcambios.app".to_string(),
            "admin".to_string(),
            password_hash,
            UserRole::Admin,
        )
    }

    #[test]
    fn test_password_hash_differs_from_plain() {
        let manager = test_manager();
        let hashed = manager.hash_password("secret");

        assert_ne!(hashed, "secret");
    }

    #[test]
    fn test_validate_user() {
        let manager = test_manager();
        let user = test_user(manager.hash_password("secret"));

        assert!(manager.validate_user(&user, "secret").is_ok());
        assert!(manager.validate_user(&user, "wrong").is_err());
    }

    #[test]
    fn test_jwt_round_trip() {
        let manager = test_manager();
        let user = test_user("hashed".to_string());

        let token = manager.generate_jwt(&user).unwrap();
        let claims = manager.validate_jwt(&token).unwrap();

        assert_eq!(claims.sub, "admin@westcambios.app");
    }

    #[test]
    fn test_expired_jwt_rejected() {
        let manager = AuthManager::new("test-secret", -5);
        let user = test_user("hashed".to_string());

        let token = manager.generate_jwt(&user).unwrap();
        assert!(manager.validate_jwt(&token).is_err());
    }

    #[test]
    fn test_jwt_wrong_secret_rejected() {
        let manager = test_manager();
        let user = test_user("hashed".to_string());
        let token = manager.generate_jwt(&user).unwrap();

        let other = AuthManager::new("other-secret", 30);
        assert!(other.validate_jwt(&token).is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        let manager = test_manager();
        assert!(manager.validate_jwt("not-a-token").is_err());
    }
}
