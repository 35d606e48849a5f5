pub mod client;
pub mod token_store;
