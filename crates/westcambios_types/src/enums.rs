use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use westcambios_error::error::TypeError;

/// Access level attached to every account. Roles are stored and serialized
/// as uppercase strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    Admin,
    Manager,
    Employee,
    Client,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let role = match self {
            UserRole::Admin => "ADMIN",
            UserRole::Manager => "MANAGER",
            UserRole::Employee => "EMPLOYEE",
            UserRole::Client => "CLIENT",
        };
        write!(f, "{}", role)
    }
}

impl FromStr for UserRole {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ADMIN" => Ok(UserRole::Admin),
            "MANAGER" => Ok(UserRole::Manager),
            "EMPLOYEE" => Ok(UserRole::Employee),
            "CLIENT" => Ok(UserRole::Client),
            _ => Err(TypeError::InvalidRole(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Ves,
    Brl,
    Usd,
    Usdt,
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let currency = match self {
            Currency::Ves => "VES",
            Currency::Brl => "BRL",
            Currency::Usd => "USD",
            Currency::Usdt => "USDT",
        };
        write!(f, "{}", currency)
    }
}

impl FromStr for Currency {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "VES" => Ok(Currency::Ves),
            "BRL" => Ok(Currency::Brl),
            "USD" => Ok(Currency::Usd),
            "USDT" => Ok(Currency::Usdt),
            _ => Err(TypeError::InvalidCurrency(s.to_string())),
        }
    }
}
