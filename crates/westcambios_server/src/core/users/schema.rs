use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct PasswordQuery {
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub new_email: String,
}
