use crate::{is_yes, notify, render};

use std::io::{self, BufRead, Write};
use std::str::FromStr;
use westcambios_client::client::ApiClient;
use westcambios_error::error::ApiError;
use westcambios_types::{Currency, RateCreate, UserCreate, UserRole, UserUpdate};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Tab {
    Users,
    Rates,
}

impl Tab {
    fn label(&self) -> &'static str {
        match self {
            Tab::Users => "users",
            Tab::Rates => "rates",
        }
    }
}

#[derive(Debug, PartialEq)]
enum Command {
    SwitchUsers,
    SwitchRates,
    Reload,
    Add,
    Edit(i64),
    Delete(i64),
    Help,
    Quit,
    Unknown,
}

fn parse_command(input: &str) -> Command {
    let mut parts = input.split_whitespace();
    let head = parts.next().unwrap_or("");
    let id = parts.next().and_then(|raw| raw.parse::<i64>().ok());

    match (head, id) {
        ("u", _) | ("users", _) => Command::SwitchUsers,
        ("r", _) | ("rates", _) => Command::SwitchRates,
        ("", _) | ("reload", _) => Command::Reload,
        ("add", _) => Command::Add,
        ("edit", Some(id)) => Command::Edit(id),
        ("delete", Some(id)) => Command::Delete(id),
        ("help", _) => Command::Help,
        ("q", _) | ("quit", _) | ("exit", _) => Command::Quit,
        _ => Command::Unknown,
    }
}

fn print_help() {
    notify::info("users / u        switch to the users tab");
    notify::info("rates / r        switch to the rates tab");
    notify::info("reload or enter  re-fetch the active tab");
    notify::info("add              create a record in the active tab");
    notify::info("edit <id>        update a record");
    notify::info("delete <id>      delete a record, asks first");
    notify::info("quit / q         leave the dashboard");
}

/// Interactive dashboard. One tab is active at a time and switching to a
/// tab always re-fetches it, so the view never shows stale data after a
/// change made elsewhere.
pub async fn run(api: &ApiClient) -> Result<(), ApiError> {
    notify::info("WestCambios dashboard. Type help for commands, q to quit.");

    let mut tab = Tab::Users;
    refresh(api, tab).await?;

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("{} > ", tab.label());
        io::stdout().flush().ok();

        let Some(line) = lines.next() else { break };
        let line = line
            .map_err(|e| ApiError::Error(format!("Failed to read input with error: {}", e)))?;

        match parse_command(line.trim()) {
            Command::Quit => break,
            Command::SwitchUsers => {
                tab = Tab::Users;
                guard(refresh(api, tab).await)?;
            }
            Command::SwitchRates => {
                tab = Tab::Rates;
                guard(refresh(api, tab).await)?;
            }
            Command::Reload => guard(refresh(api, tab).await)?,
            Command::Help => print_help(),
            Command::Add => guard(add(api, tab, &mut lines).await)?,
            Command::Edit(id) => guard(edit(api, tab, id, &mut lines).await)?,
            Command::Delete(id) => guard(delete(api, tab, id, &mut lines).await)?,
            Command::Unknown => notify::danger("Unknown command, type help for the list"),
        }
    }

    Ok(())
}

/// Auth failures end the session; everything else becomes a banner and
/// the dashboard keeps running.
fn guard(result: Result<(), ApiError>) -> Result<(), ApiError> {
    match result {
        Ok(()) => Ok(()),
        Err(e @ (ApiError::SessionExpired | ApiError::NotLoggedIn)) => Err(e),
        Err(e) => {
            notify::danger(&e.to_string());
            Ok(())
        }
    }
}

async fn refresh(api: &ApiClient, tab: Tab) -> Result<(), ApiError> {
    match tab {
        Tab::Users => {
            let users = notify::with_spinner("Loading users", api.all_users()).await?;
            println!("{}", render::users_table(&users.users));
        }
        Tab::Rates => {
            let rates = notify::with_spinner("Loading rates", api.all_rates()).await?;
            println!("{}", render::rates_table(&rates.rates));
        }
    }

    Ok(())
}

fn prompt<B: BufRead>(lines: &mut io::Lines<B>, label: &str) -> Result<String, ApiError> {
    print!("{}", label);
    io::stdout().flush().ok();

    match lines.next() {
        Some(Ok(line)) => Ok(line.trim().to_string()),
        Some(Err(e)) => Err(ApiError::Error(format!(
            "Failed to read input with error: {}",
            e
        ))),
        None => Ok(String::new()),
    }
}

async fn add<B: BufRead>(
    api: &ApiClient,
    tab: Tab,
    lines: &mut io::Lines<B>,
) -> Result<(), ApiError> {
    match tab {
        Tab::Users => {
            let email = prompt(lines, "Email: ")?;
            let username = prompt(lines, "Username: ")?;
            let password = prompt(lines, "Password: ")?;
            let role_input = prompt(lines, "Role [CLIENT]: ")?;

            let role = if role_input.is_empty() {
                UserRole::Client
            } else {
                UserRole::from_str(&role_input).map_err(|e| ApiError::Error(e.to_string()))?
            };

            let user = UserCreate {
                email,
                username,
                password,
                role: Some(role),
                is_active: None,
            };

            let created = notify::with_spinner("Creating user", api.register_user(&user)).await?;
            notify::success(&format!("User {} created", created.email));
        }
        Tab::Rates => {
            let from = prompt(lines, "From currency: ")?;
            let to = prompt(lines, "To currency: ")?;
            let value = prompt(lines, "Rate: ")?;

            let rate = RateCreate {
                from_currency: Currency::from_str(&from)
                    .map_err(|e| ApiError::Error(e.to_string()))?,
                to_currency: Currency::from_str(&to).map_err(|e| ApiError::Error(e.to_string()))?,
                rate: value
                    .parse::<f64>()
                    .map_err(|e| ApiError::Error(format!("Invalid rate value: {}", e)))?,
                timestamp: None,
            };

            let created = notify::with_spinner("Registering rate", api.register_rate(&rate)).await?;
            notify::success(&format!("Rate {} registered", created.id));
        }
    }

    refresh(api, tab).await
}

async fn edit<B: BufRead>(
    api: &ApiClient,
    tab: Tab,
    id: i64,
    lines: &mut io::Lines<B>,
) -> Result<(), ApiError> {
    match tab {
        Tab::Users => {
            let users = api.all_users().await?;
            let Some(current) = users.users.into_iter().find(|user| user.id == id) else {
                notify::danger(&format!("No user with id {}", id));
                return Ok(());
            };

            let username = prompt(lines, &format!("Username [{}]: ", current.username))?;
            let active_input = prompt(
                lines,
                &format!("Active (y/n) [{}]: ", if current.is_active { "y" } else { "n" }),
            )?;

            let is_active = match active_input.to_lowercase().as_str() {
                "" => current.is_active,
                "y" | "yes" => true,
                "n" | "no" => false,
                other => {
                    notify::danger(&format!("Unrecognized answer: {}", other));
                    return Ok(());
                }
            };

            // the edit form always submits both fields
            let update = UserUpdate {
                username: Some(if username.is_empty() {
                    current.username
                } else {
                    username
                }),
                is_active: Some(is_active),
                ..Default::default()
            };

            notify::with_spinner("Updating user", api.update_user(id, &update)).await?;
            notify::success(&format!("User {} updated", id));
        }
        Tab::Rates => {
            let current = api.rate_by_id(id).await?;
            let value = prompt(lines, &format!("Rate [{:.2}]: ", current.rate))?;

            let new_rate = if value.is_empty() {
                current.rate
            } else {
                value
                    .parse::<f64>()
                    .map_err(|e| ApiError::Error(format!("Invalid rate value: {}", e)))?
            };

            notify::with_spinner("Updating rate", api.update_rate(id, new_rate)).await?;
            notify::success(&format!("Rate {} updated", id));
        }
    }

    refresh(api, tab).await
}

async fn delete<B: BufRead>(
    api: &ApiClient,
    tab: Tab,
    id: i64,
    lines: &mut io::Lines<B>,
) -> Result<(), ApiError> {
    let resource = match tab {
        Tab::Users => "user",
        Tab::Rates => "rate",
    };

    let answer = prompt(
        lines,
        &format!("Delete {} {}? This cannot be undone. [y/N] ", resource, id),
    )?;

    if !is_yes(&answer) {
        notify::info("Delete cancelled");
        return Ok(());
    }

    match tab {
        Tab::Users => notify::with_spinner("Deleting user", api.delete_user(id)).await?,
        Tab::Rates => notify::with_spinner("Deleting rate", api.delete_rate(id)).await?,
    }

    notify::success(&format!("Deleted {} {}", resource, id));

    refresh(api, tab).await
}
