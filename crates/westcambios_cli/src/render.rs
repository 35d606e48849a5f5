use crate::notify::LogColors;
use chrono::Local;
use tabled::builder::Builder;
use tabled::settings::format::Format;
use tabled::settings::object::Rows;
use tabled::settings::{Alignment, Color, Style};
use tabled::{Table, Tabled};
use westcambios_types::{RateResponse, UserResponse};

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "Id")]
    id: i64,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Username")]
    username: String,
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "Active")]
    active: String,
}

#[derive(Tabled)]
struct RateRow {
    #[tabled(rename = "Id")]
    id: i64,
    #[tabled(rename = "From")]
    from_currency: String,
    #[tabled(rename = "To")]
    to_currency: String,
    #[tabled(rename = "Rate")]
    rate: String,
    #[tabled(rename = "Timestamp")]
    timestamp: String,
}

pub fn users_table(users: &[UserResponse]) -> String {
    if users.is_empty() {
        return placeholder_table(
            &["Id", "Email", "Username", "Role", "Active"],
            "No users registered",
        );
    }

    let rows: Vec<UserRow> = users
        .iter()
        .map(|user| UserRow {
            id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            role: user.role.to_string(),
            active: if user.is_active {
                "Active".to_string()
            } else {
                "Inactive".to_string()
            },
        })
        .collect();

    styled_table(Table::new(rows))
}

/// Rates render newest first regardless of the order the server returned.
pub fn rates_table(rates: &[RateResponse]) -> String {
    if rates.is_empty() {
        return placeholder_table(
            &["Id", "From", "To", "Rate", "Timestamp"],
            "No rates registered",
        );
    }

    let mut sorted: Vec<&RateResponse> = rates.iter().collect();
    sorted.sort_by(|a, b| b.id.cmp(&a.id));

    let rows: Vec<RateRow> = sorted
        .iter()
        .map(|rate| RateRow {
            id: rate.id,
            from_currency: rate.from_currency.to_string(),
            to_currency: rate.to_currency.to_string(),
            rate: format!("{:.2}", rate.rate),
            timestamp: rate
                .timestamp
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
        })
        .collect();

    styled_table(Table::new(rows))
}

fn placeholder_table(columns: &[&str], message: &str) -> String {
    let mut builder = Builder::default();
    builder.push_record(columns.iter().copied());
    builder.push_record([message]);

    let mut table = builder.build();
    table.with(Style::sharp());

    table.to_string()
}

fn styled_table(mut table: Table) -> String {
    table.with(Style::sharp());
    table.modify(
        Rows::new(0..1),
        (
            Format::content(|s| LogColors::success(s)),
            Alignment::center(),
            Color::BOLD,
        ),
    );

    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use westcambios_types::{Currency, UserRole};

    fn test_rate(id: i64, rate: f64) -> RateResponse {
        RateResponse {
            id,
            from_currency: Currency::Ves,
            to_currency: Currency::Usdt,
            rate,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_empty_users_placeholder() {
        let table = users_table(&[]);

        assert!(table.contains("No users registered"));
        assert!(table.contains("Email"));
    }

    #[test]
    fn test_empty_rates_placeholder() {
        let table = rates_table(&[]);
        assert!(table.contains("No rates registered"));
    }

    #[test]
    fn test_rates_sorted_newest_first() {
        let rates = vec![test_rate(10, 1.0), test_rate(30, 2.0), test_rate(20, 3.0)];
        let table = rates_table(&rates);

        let pos_30 = table.find("30").unwrap();
        let pos_20 = table.find("20").unwrap();
        let pos_10 = table.find("10").unwrap();

        assert!(pos_30 < pos_20);
        assert!(pos_20 < pos_10);
    }

    #[test]
    fn test_rates_render_two_decimals() {
        let table = rates_table(&[test_rate(1, 3.5)]);
        assert!(table.contains("3.50"));
    }

    #[test]
    fn test_user_active_flag() {
        let user = UserResponse {
            id: 1,
            email: "a@b.com".to_string(),
            username: "ab".to_string(),
            is_active: false,
            role: UserRole::Client,
            created_at: Utc::now(),
            updated_at: None,
        };
        let table = users_table(&[user]);

        assert!(table.contains("Inactive"));
        assert!(table.contains("CLIENT"));
    }
}
