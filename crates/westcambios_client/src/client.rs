use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use westcambios_error::error::ApiError;
use westcambios_settings::config::ApiSettings;
use westcambios_types::{
    RateCreate, RateListResponse, RateResponse, RateUpdate, Token, UserCreate, UserListResponse,
    UserResponse, UserRole, UserUpdate,
};

use crate::token_store::TokenStore;

const TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub enum RequestType {
    Get,
    Post,
    Patch,
    Delete,
}

/// Server routes, relative to the api prefix.
#[derive(Debug, Clone)]
pub enum Routes {
    AuthLogin,
    AuthRegister,
    UsersMe,
    UsersUpdate,
    UsersUpdatePassword,
    UsersUpdateEmail,
    AdminRegisterUser,
    AdminAllUsers,
    AdminUpdateUser(i64),
    AdminDeleteUser(i64),
    AdminActivateUser(i64),
    AdminDeactivateUser(i64),
    AdminUpdateUserRole(i64),
    AdminUsersLastMonth,
    AdminUsersLast3Months,
    AdminUsersLast6Months,
    AdminUsersLastYear,
    AdminUsersCustomRange,
    AdminRegisterRate,
    AdminUpdateRate(i64),
    AdminDeleteRate(i64),
    RatesAll,
    RatesToday,
    RatesWeek,
    RatesMonth,
    Rates3Months,
    Rates6Months,
    RatesYear,
    RatesCustom,
    RateById(i64),
    Health,
}

impl Routes {
    pub fn as_path(&self) -> String {
        match self {
            Routes::AuthLogin => "auth/login".to_string(),
            Routes::AuthRegister => "auth/register".to_string(),
            Routes::UsersMe => "users/me".to_string(),
            Routes::UsersUpdate => "users/update_user".to_string(),
            Routes::UsersUpdatePassword => "users/update_password".to_string(),
            Routes::UsersUpdateEmail => "users/update_email".to_string(),
            Routes::AdminRegisterUser => "admin/register_user".to_string(),
            Routes::AdminAllUsers => "admin/all_users".to_string(),
            Routes::AdminUpdateUser(user_id) => format!("admin/update_user/{}", user_id),
            Routes::AdminDeleteUser(user_id) => format!("admin/delete_user/{}", user_id),
            Routes::AdminActivateUser(user_id) => format!("admin/activate_user/{}", user_id),
            Routes::AdminDeactivateUser(user_id) => format!("admin/deactivate_user/{}", user_id),
            Routes::AdminUpdateUserRole(user_id) => format!("admin/update_user_role/{}", user_id),
            Routes::AdminUsersLastMonth => "admin/users_register_last_month".to_string(),
            Routes::AdminUsersLast3Months => "admin/users_register_last_3_months".to_string(),
            Routes::AdminUsersLast6Months => "admin/users_register_last_6_months".to_string(),
            Routes::AdminUsersLastYear => "admin/users_register_last_year".to_string(),
            Routes::AdminUsersCustomRange => "admin/users_by_custom_range".to_string(),
            Routes::AdminRegisterRate => "admin/register_rate".to_string(),
            Routes::AdminUpdateRate(rate_id) => format!("admin/update_rate/{}", rate_id),
            Routes::AdminDeleteRate(rate_id) => format!("admin/delete_rate/{}", rate_id),
            Routes::RatesAll => "rates/all".to_string(),
            Routes::RatesToday => "rates/today".to_string(),
            Routes::RatesWeek => "rates/week".to_string(),
            Routes::RatesMonth => "rates/month".to_string(),
            Routes::Rates3Months => "rates/3months".to_string(),
            Routes::Rates6Months => "rates/6months".to_string(),
            Routes::RatesYear => "rates/year".to_string(),
            Routes::RatesCustom => "rates/custom".to_string(),
            Routes::RateById(rate_id) => format!("rates/{}", rate_id),
            Routes::Health => "health".to_string(),
        }
    }
}

/// Time windows offered for rate history queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateWindow {
    Today,
    Week,
    Month,
    ThreeMonths,
    SixMonths,
    Year,
}

impl RateWindow {
    fn route(&self) -> Routes {
        match self {
            RateWindow::Today => Routes::RatesToday,
            RateWindow::Week => Routes::RatesWeek,
            RateWindow::Month => Routes::RatesMonth,
            RateWindow::ThreeMonths => Routes::Rates3Months,
            RateWindow::SixMonths => Routes::Rates6Months,
            RateWindow::Year => Routes::RatesYear,
        }
    }
}

/// Registration windows offered for user queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserWindow {
    Month,
    ThreeMonths,
    SixMonths,
    Year,
}

impl UserWindow {
    fn route(&self) -> Routes {
        match self {
            UserWindow::Month => Routes::AdminUsersLastMonth,
            UserWindow::ThreeMonths => Routes::AdminUsersLast3Months,
            UserWindow::SixMonths => Routes::AdminUsersLast6Months,
            UserWindow::Year => Routes::AdminUsersLastYear,
        }
    }
}

pub fn build_http_client() -> Result<Client, ApiError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    Client::builder()
        .timeout(std::time::Duration::from_secs(TIMEOUT_SECS))
        .default_headers(headers)
        .build()
        .map_err(|e| ApiError::Error(format!("Failed to create client with error: {}", e)))
}

/// Client for the westcambios rest api. Authenticated requests read the
/// bearer token from the token store on every call; a 401 or 403 response
/// wipes the stored token so the next command starts from the login step.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_path: String,
    token_store: TokenStore,
}

impl ApiClient {
    pub fn new(settings: &ApiSettings, client: &Client) -> Self {
        ApiClient {
            client: client.clone(),
            base_path: format!("{}/{}", settings.base_url, settings.api_prefix),
            token_store: TokenStore::new(&settings.token_path),
        }
    }

    pub fn token_store(&self) -> &TokenStore {
        &self.token_store
    }

    pub fn is_logged_in(&self) -> bool {
        self.token_store.load().is_some()
    }

    /// Exchange credentials for a token and persist it. The email travels
    /// in the `username` form field.
    pub async fn login(&self, username: &str, password: &str) -> Result<Token, ApiError> {
        let url = format!("{}/{}", self.base_path, Routes::AuthLogin.as_path());
        let form = [("username", username), ("password", password)];

        let response = self
            .client
            .post(url)
            .form(&form)
            .send()
            .await
            .map_err(|e| ApiError::Connection(format!("{}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::rejection(status, response).await);
        }

        let token = response
            .json::<Token>()
            .await
            .map_err(|e| ApiError::Error(format!("Failed to parse response with error: {}", e)))?;

        self.token_store.save(&token.access_token)?;

        Ok(token)
    }

    pub fn logout(&self) -> Result<(), ApiError> {
        self.token_store.clear()
    }

    pub async fn health(&self) -> Result<Value, ApiError> {
        let url = format!("{}/{}", self.base_path, Routes::Health.as_path());

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::Connection(format!("{}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::rejection(status, response).await);
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ApiError::Error(format!("Failed to parse response with error: {}", e)))
    }

    async fn rejection(status: StatusCode, response: Response) -> ApiError {
        let detail = response
            .json::<westcambios_types::DetailResponse>()
            .await
            .map(|body| body.detail)
            .unwrap_or_else(|_| format!("Request failed with status {}", status.as_u16()));

        ApiError::Rejected {
            status: status.as_u16(),
            detail,
        }
    }

    async fn request(
        &self,
        route: Routes,
        request_type: RequestType,
        body_params: Option<Value>,
        query_params: Option<HashMap<String, String>>,
    ) -> Result<Value, ApiError> {
        let token = self.token_store.load().ok_or(ApiError::NotLoggedIn)?;
        let url = format!("{}/{}", self.base_path, route.as_path());
        let query_params = query_params.unwrap_or_default();

        let response = match request_type {
            RequestType::Get => {
                self.client
                    .get(url)
                    .query(&query_params)
                    .bearer_auth(&token)
                    .send()
                    .await
            }
            RequestType::Post => {
                self.client
                    .post(url)
                    .json(&body_params)
                    .bearer_auth(&token)
                    .send()
                    .await
            }
            RequestType::Patch => {
                self.client
                    .patch(url)
                    .query(&query_params)
                    .json(&body_params)
                    .bearer_auth(&token)
                    .send()
                    .await
            }
            RequestType::Delete => {
                self.client
                    .delete(url)
                    .query(&query_params)
                    .bearer_auth(&token)
                    .send()
                    .await
            }
        }
        .map_err(|e| ApiError::Connection(format!("{}", e)))?;

        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            // stale or revoked session
            self.token_store.clear()?;
            return Err(ApiError::SessionExpired);
        }

        if !status.is_success() {
            return Err(Self::rejection(status, response).await);
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ApiError::Error(format!("Failed to parse response with error: {}", e)))
    }

    fn parse<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
        serde_json::from_value::<T>(value).map_err(|e| {
            ApiError::Error(format!(
                "Failed to deserialize response with error: {}",
                e
            ))
        })
    }

    fn to_body<T: serde::Serialize>(body: &T) -> Result<Value, ApiError> {
        serde_json::to_value(body)
            .map_err(|e| ApiError::Error(format!("Failed to serialize request with error: {}", e)))
    }

    pub async fn me(&self) -> Result<UserResponse, ApiError> {
        let response = self
            .request(Routes::UsersMe, RequestType::Get, None, None)
            .await?;
        Self::parse(response)
    }

    pub async fn update_me(&self, update: &UserUpdate) -> Result<UserResponse, ApiError> {
        let response = self
            .request(
                Routes::UsersUpdate,
                RequestType::Patch,
                Some(Self::to_body(update)?),
                None,
            )
            .await?;
        Self::parse(response)
    }

    pub async fn update_password(&self, new_password: &str) -> Result<UserResponse, ApiError> {
        let query = HashMap::from([("new_password".to_string(), new_password.to_string())]);
        let response = self
            .request(
                Routes::UsersUpdatePassword,
                RequestType::Patch,
                None,
                Some(query),
            )
            .await?;
        Self::parse(response)
    }

    pub async fn update_email(&self, new_email: &str) -> Result<UserResponse, ApiError> {
        let query = HashMap::from([("new_email".to_string(), new_email.to_string())]);
        let response = self
            .request(
                Routes::UsersUpdateEmail,
                RequestType::Patch,
                None,
                Some(query),
            )
            .await?;
        Self::parse(response)
    }

    pub async fn register_user(&self, user: &UserCreate) -> Result<UserResponse, ApiError> {
        let response = self
            .request(
                Routes::AdminRegisterUser,
                RequestType::Post,
                Some(Self::to_body(user)?),
                None,
            )
            .await?;
        Self::parse(response)
    }

    pub async fn all_users(&self) -> Result<UserListResponse, ApiError> {
        let response = self
            .request(Routes::AdminAllUsers, RequestType::Get, None, None)
            .await?;
        Self::parse(response)
    }

    pub async fn users_registered_last(
        &self,
        window: UserWindow,
    ) -> Result<UserListResponse, ApiError> {
        let response = self
            .request(window.route(), RequestType::Get, None, None)
            .await?;
        Self::parse(response)
    }

    /// Users registered between two `YYYY-MM-DD` dates, inclusive.
    pub async fn users_registered_between(
        &self,
        start_date: &str,
        end_date: &str,
    ) -> Result<UserListResponse, ApiError> {
        let query = HashMap::from([
            ("start_date".to_string(), start_date.to_string()),
            ("end_date".to_string(), end_date.to_string()),
        ]);
        let response = self
            .request(
                Routes::AdminUsersCustomRange,
                RequestType::Get,
                None,
                Some(query),
            )
            .await?;
        Self::parse(response)
    }

    pub async fn update_user(
        &self,
        user_id: i64,
        update: &UserUpdate,
    ) -> Result<UserResponse, ApiError> {
        let response = self
            .request(
                Routes::AdminUpdateUser(user_id),
                RequestType::Patch,
                Some(Self::to_body(update)?),
                None,
            )
            .await?;
        Self::parse(response)
    }

    pub async fn delete_user(&self, user_id: i64) -> Result<(), ApiError> {
        self.request(
            Routes::AdminDeleteUser(user_id),
            RequestType::Delete,
            None,
            None,
        )
        .await?;
        Ok(())
    }

    pub async fn activate_user(&self, user_id: i64) -> Result<UserResponse, ApiError> {
        let response = self
            .request(
                Routes::AdminActivateUser(user_id),
                RequestType::Patch,
                None,
                None,
            )
            .await?;
        Self::parse(response)
    }

    pub async fn deactivate_user(&self, user_id: i64) -> Result<UserResponse, ApiError> {
        let response = self
            .request(
                Routes::AdminDeactivateUser(user_id),
                RequestType::Patch,
                None,
                None,
            )
            .await?;
        Self::parse(response)
    }

    pub async fn update_user_role(
        &self,
        user_id: i64,
        role: UserRole,
    ) -> Result<UserResponse, ApiError> {
        let query = HashMap::from([("user_role".to_string(), role.to_string())]);
        let response = self
            .request(
                Routes::AdminUpdateUserRole(user_id),
                RequestType::Patch,
                None,
                Some(query),
            )
            .await?;
        Self::parse(response)
    }

    pub async fn all_rates(&self) -> Result<RateListResponse, ApiError> {
        let response = self
            .request(Routes::RatesAll, RequestType::Get, None, None)
            .await?;
        Self::parse(response)
    }

    pub async fn rates_last(&self, window: RateWindow) -> Result<RateListResponse, ApiError> {
        let response = self
            .request(window.route(), RequestType::Get, None, None)
            .await?;
        Self::parse(response)
    }

    /// Rates recorded between two `YYYY-MM-DD` dates, inclusive.
    pub async fn rates_between(
        &self,
        start_date: &str,
        end_date: &str,
    ) -> Result<RateListResponse, ApiError> {
        let query = HashMap::from([
            ("start_date".to_string(), start_date.to_string()),
            ("end_date".to_string(), end_date.to_string()),
        ]);
        let response = self
            .request(Routes::RatesCustom, RequestType::Get, None, Some(query))
            .await?;
        Self::parse(response)
    }

    pub async fn rate_by_id(&self, rate_id: i64) -> Result<RateResponse, ApiError> {
        let response = self
            .request(Routes::RateById(rate_id), RequestType::Get, None, None)
            .await?;
        Self::parse(response)
    }

    pub async fn register_rate(&self, rate: &RateCreate) -> Result<RateResponse, ApiError> {
        let response = self
            .request(
                Routes::AdminRegisterRate,
                RequestType::Post,
                Some(Self::to_body(rate)?),
                None,
            )
            .await?;
        Self::parse(response)
    }

    pub async fn update_rate(&self, rate_id: i64, rate: f64) -> Result<RateResponse, ApiError> {
        let update = RateUpdate { rate };
        let response = self
            .request(
                Routes::AdminUpdateRate(rate_id),
                RequestType::Patch,
                Some(Self::to_body(&update)?),
                None,
            )
            .await?;
        Self::parse(response)
    }

    pub async fn delete_rate(&self, rate_id: i64) -> Result<(), ApiError> {
        self.request(
            Routes::AdminDeleteRate(rate_id),
            RequestType::Delete,
            None,
            None,
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn test_settings(server_url: &str, dir: &tempfile::TempDir) -> ApiSettings {
        ApiSettings {
            base_url: server_url.to_string(),
            api_prefix: "api/v1".to_string(),
            token_path: dir.path().join("credentials.json"),
        }
    }

    fn test_client(server_url: &str, dir: &tempfile::TempDir) -> ApiClient {
        let settings = test_settings(server_url, dir);
        let client = build_http_client().unwrap();
        ApiClient::new(&settings, &client)
    }

    #[tokio::test]
    async fn test_login_stores_token() {
        let mut server = mockito::Server::new_async().await;
        let dir = tempfile::tempdir().unwrap();

        let mock = server
            .mock("POST", "/api/v1/auth/login")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("username".into(), "admin@westcambios.app".into()),
                Matcher::UrlEncoded("password".into(), "secret".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token": "test_token", "token_type": "bearer"}"#)
            .create_async()
            .await;

        let api = test_client(&server.url(), &dir);
        let token = api.login("admin@westcambios.app", "secret").await.unwrap();

        mock.assert_async().await;
        assert_eq!(token.token_type, "bearer");
        assert_eq!(api.token_store().load(), Some("test_token".to_string()));
        assert!(api.is_logged_in());
    }

    #[tokio::test]
    async fn test_login_rejection_surfaces_detail() {
        let mut server = mockito::Server::new_async().await;
        let dir = tempfile::tempdir().unwrap();

        server
            .mock("POST", "/api/v1/auth/login")
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(r#"{"detail": "Invalid email or password"}"#)
            .create_async()
            .await;

        let api = test_client(&server.url(), &dir);
        let result = api.login("admin@westcambios.app", "wrong").await;

        match result {
            Err(ApiError::Rejected { status, detail }) => {
                assert_eq!(status, 401);
                assert_eq!(detail, "Invalid email or password");
            }
            other => panic!("unexpected result: {:?}", other.map(|t| t.access_token)),
        }
        assert!(!api.is_logged_in());
    }

    #[tokio::test]
    async fn test_authorized_request_sends_bearer() {
        let mut server = mockito::Server::new_async().await;
        let dir = tempfile::tempdir().unwrap();

        let mock = server
            .mock("GET", "/api/v1/admin/all_users")
            .match_header("authorization", "Bearer test_token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                serde_json::json!({
                    "count": 1,
                    "users": [{
                        "id": 1,
                        "email": "admin@westcambios.app",
                        "username": "admin",
                        "is_active": true,
                        "role": "ADMIN",
                        "created_at": "2024-01-01T00:00:00Z",
                        "updated_at": null
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let api = test_client(&server.url(), &dir);
        api.token_store().save("test_token").unwrap();

        let users = api.all_users().await.unwrap();

        mock.assert_async().await;
        assert_eq!(users.count, 1);
        assert_eq!(users.users[0].role, UserRole::Admin);
    }

    #[tokio::test]
    async fn test_unauthorized_response_clears_token() {
        let mut server = mockito::Server::new_async().await;
        let dir = tempfile::tempdir().unwrap();

        server
            .mock("GET", "/api/v1/admin/all_users")
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(r#"{"detail": "Could not validate credentials"}"#)
            .create_async()
            .await;

        let api = test_client(&server.url(), &dir);
        api.token_store().save("stale_token").unwrap();

        let result = api.all_users().await;

        assert!(matches!(result, Err(ApiError::SessionExpired)));
        assert!(!api.is_logged_in());
    }

    #[tokio::test]
    async fn test_missing_token_short_circuits() {
        let mut server = mockito::Server::new_async().await;
        let dir = tempfile::tempdir().unwrap();

        let mock = server
            .mock("GET", "/api/v1/admin/all_users")
            .expect(0)
            .create_async()
            .await;

        let api = test_client(&server.url(), &dir);
        let result = api.all_users().await;

        assert!(matches!(result, Err(ApiError::NotLoggedIn)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_business_rejection_passes_detail() {
        let mut server = mockito::Server::new_async().await;
        let dir = tempfile::tempdir().unwrap();

        server
            .mock("PATCH", "/api/v1/admin/update_rate/42")
            .with_status(404)
            .with_header("content-type", "application/json")
            .with_body(r#"{"detail": "Rate record not found"}"#)
            .create_async()
            .await;

        let api = test_client(&server.url(), &dir);
        api.token_store().save("test_token").unwrap();

        let result = api.update_rate(42, 36.5).await;

        match result {
            Err(ApiError::Rejected { status, detail }) => {
                assert_eq!(status, 404);
                assert_eq!(detail, "Rate record not found");
            }
            other => panic!("unexpected result: {:?}", other.map(|r| r.id)),
        }
        // business errors leave the session alone
        assert!(api.is_logged_in());
    }

    #[tokio::test]
    async fn test_delete_returns_unit_on_no_content() {
        let mut server = mockito::Server::new_async().await;
        let dir = tempfile::tempdir().unwrap();

        let mock = server
            .mock("DELETE", "/api/v1/admin/delete_user/3")
            .match_header("authorization", "Bearer test_token")
            .with_status(204)
            .create_async()
            .await;

        let api = test_client(&server.url(), &dir);
        api.token_store().save("test_token").unwrap();

        api.delete_user(3).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_rate_window_routes() {
        let mut server = mockito::Server::new_async().await;
        let dir = tempfile::tempdir().unwrap();

        let mock = server
            .mock("GET", "/api/v1/rates/month")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"count": 0, "rates": []}"#)
            .create_async()
            .await;

        let api = test_client(&server.url(), &dir);
        api.token_store().save("test_token").unwrap();

        let rates = api.rates_last(RateWindow::Month).await.unwrap();

        mock.assert_async().await;
        assert_eq!(rates.count, 0);
    }

    #[tokio::test]
    async fn test_custom_range_query_params() {
        let mut server = mockito::Server::new_async().await;
        let dir = tempfile::tempdir().unwrap();

        let mock = server
            .mock("GET", "/api/v1/rates/custom")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("start_date".into(), "2024-01-01".into()),
                Matcher::UrlEncoded("end_date".into(), "2024-02-01".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"count": 0, "rates": []}"#)
            .create_async()
            .await;

        let api = test_client(&server.url(), &dir);
        api.token_store().save("test_token").unwrap();

        api.rates_between("2024-01-01", "2024-02-01").await.unwrap();
        mock.assert_async().await;
    }
}
