pub mod admin;
pub mod auth;
pub mod error;
pub mod health;
pub mod rates;
pub mod router;
pub mod setup;
pub mod state;
pub mod tasks;
pub mod users;
pub mod window;
