use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Logging Error: {0}")]
    Error(String),
}

#[derive(Error, Debug)]
pub enum TypeError {
    #[error("Unsupported user role: {0}")]
    InvalidRole(String),

    #[error("Unsupported currency: {0}")]
    InvalidCurrency(String),
}

#[derive(Error, Debug)]
pub enum SqlError {
    #[error("Sql Error: {0}")]
    Error(String),

    #[error("Failed to connect to database with error: {0}")]
    ConnectionError(String),

    #[error("Failed to run migrations with error: {0}")]
    MigrationError(String),

    #[error("Failed to execute query with error: {0}")]
    QueryError(String),
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Auth Error: {0}")]
    Error(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Could not validate credentials")]
    InvalidToken,
}

#[derive(Error, Debug)]
pub enum MarketError {
    #[error("Market Error: {0}")]
    Error(String),

    #[error("Rows must be less than or equal to 20")]
    TooManyRows,

    #[error("Unexpected exchange response: {0}")]
    BadResponse(String),

    #[error("No prices returned by the exchange")]
    EmptyPrices,
}

/// Errors surfaced by the api client. `Rejected` carries the detail message
/// the server sent back so callers can show it verbatim.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Api Error: {0}")]
    Error(String),

    #[error("Failed to reach server: {0}")]
    Connection(String),

    #[error("{detail}")]
    Rejected { status: u16, detail: String },

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Session expired, please log in again")]
    SessionExpired,
}
