mod dashboard;
mod notify;
mod render;

use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::str::FromStr;
use westcambios_client::client::{build_http_client, ApiClient, RateWindow};
use westcambios_error::error::ApiError;
use westcambios_settings::config::ApiSettings;
use westcambios_types::{Currency, RateCreate, UserCreate, UserRole, UserUpdate};

#[derive(Parser)]
#[command(name = "westcambios")]
#[command(about = "Admin console for the WestCambios exchange api", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session token
    Login {
        /// Account email, sent as the username credential
        #[arg(short, long)]
        username: String,

        /// Account password, prompted for when omitted
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Remove the stored session token
    Logout,

    /// Interactive users and rates dashboard
    Dashboard,

    /// Manage user accounts
    Users {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Manage exchange rates
    Rates {
        #[command(subcommand)]
        command: RateCommands,
    },

    /// Check that the api is reachable
    Health,
}

#[derive(Subcommand)]
enum UserCommands {
    /// List all registered users
    List,

    /// Register a new user
    Create {
        #[arg(long)]
        email: String,

        #[arg(long)]
        username: String,

        #[arg(long)]
        password: String,

        /// ADMIN, MANAGER, EMPLOYEE or CLIENT
        #[arg(long, default_value = "CLIENT")]
        role: String,
    },

    /// Update a user's profile fields
    Update {
        id: i64,

        #[arg(long)]
        username: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        active: Option<bool>,
    },

    /// Delete a user
    Delete {
        id: i64,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum RateCommands {
    /// List rates, newest first
    List {
        /// all, today, week, month, 3months, 6months or year
        #[arg(long, default_value = "all")]
        window: String,
    },

    /// Register a new rate
    Create {
        /// Source currency, e.g. VES
        #[arg(long)]
        from: String,

        /// Target currency, e.g. USDT
        #[arg(long)]
        to: String,

        #[arg(long)]
        rate: f64,
    },

    /// Update a rate value
    Update {
        id: i64,

        #[arg(long)]
        rate: f64,
    },

    /// Delete a rate
    Delete {
        id: i64,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        notify::danger(&e.to_string());
        if matches!(e, ApiError::NotLoggedIn | ApiError::SessionExpired) {
            notify::info("Run westcambios login --username <email> to start a session");
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), ApiError> {
    let settings = ApiSettings::default();
    let client = build_http_client()?;
    let api = ApiClient::new(&settings, &client);

    match cli.command {
        Commands::Login { username, password } => login(&api, &username, password).await,
        Commands::Logout => {
            api.logout()?;
            notify::success("Session closed");
            Ok(())
        }
        Commands::Dashboard => dashboard::run(&api).await,
        Commands::Users { command } => run_users(&api, command).await,
        Commands::Rates { command } => run_rates(&api, command).await,
        Commands::Health => health(&api).await,
    }
}

async fn login(api: &ApiClient, username: &str, password: Option<String>) -> Result<(), ApiError> {
    let password = match password {
        Some(password) => password,
        None => prompt_stdin("Password: ")?,
    };

    notify::with_spinner("Signing in", api.login(username, &password)).await?;
    notify::success("Logged in, session token stored");
    notify::info("Run westcambios dashboard to manage users and rates");

    Ok(())
}

async fn health(api: &ApiClient) -> Result<(), ApiError> {
    let alive = notify::with_spinner("Checking api", api.health()).await?;

    notify::success(&format!(
        "{} {} is {}",
        alive["service"].as_str().unwrap_or("api"),
        alive["version"].as_str().unwrap_or(""),
        alive["status"].as_str().unwrap_or("unknown"),
    ));

    Ok(())
}

async fn run_users(api: &ApiClient, command: UserCommands) -> Result<(), ApiError> {
    match command {
        UserCommands::List => {
            let users = notify::with_spinner("Loading users", api.all_users()).await?;
            println!("{}", render::users_table(&users.users));
            Ok(())
        }
        UserCommands::Create {
            email,
            username,
            password,
            role,
        } => {
            let role = UserRole::from_str(&role).map_err(|e| ApiError::Error(e.to_string()))?;
            let user = UserCreate {
                email,
                username,
                password,
                role: Some(role),
                is_active: None,
            };

            let created = notify::with_spinner("Creating user", api.register_user(&user)).await?;
            notify::success(&format!("User {} created with id {}", created.email, created.id));
            Ok(())
        }
        UserCommands::Update {
            id,
            username,
            email,
            active,
        } => {
            if username.is_none() && email.is_none() && active.is_none() {
                notify::info("Nothing to update");
                return Ok(());
            }

            let update = UserUpdate {
                email,
                username,
                is_active: active,
                role: None,
            };

            let updated = notify::with_spinner("Updating user", api.update_user(id, &update)).await?;
            notify::success(&format!("User {} updated", updated.id));
            Ok(())
        }
        UserCommands::Delete { id, yes } => {
            let deleted = delete_user_command(api, id, yes, &mut io::stdin().lock()).await?;
            if deleted {
                notify::success(&format!("User {} deleted", id));
            }
            Ok(())
        }
    }
}

async fn run_rates(api: &ApiClient, command: RateCommands) -> Result<(), ApiError> {
    match command {
        RateCommands::List { window } => {
            let rates = match window.as_str() {
                "all" => notify::with_spinner("Loading rates", api.all_rates()).await?,
                other => {
                    let window = parse_window(other)?;
                    notify::with_spinner("Loading rates", api.rates_last(window)).await?
                }
            };

            println!("{}", render::rates_table(&rates.rates));
            Ok(())
        }
        RateCommands::Create { from, to, rate } => {
            let from = Currency::from_str(&from).map_err(|e| ApiError::Error(e.to_string()))?;
            let to = Currency::from_str(&to).map_err(|e| ApiError::Error(e.to_string()))?;
            let create = RateCreate {
                from_currency: from,
                to_currency: to,
                rate,
                timestamp: None,
            };

            let created = notify::with_spinner("Registering rate", api.register_rate(&create)).await?;
            notify::success(&format!(
                "Rate {} registered at {:.2}",
                created.id, created.rate
            ));
            Ok(())
        }
        RateCommands::Update { id, rate } => {
            let updated = notify::with_spinner("Updating rate", api.update_rate(id, rate)).await?;
            notify::success(&format!("Rate {} updated to {:.2}", updated.id, updated.rate));
            Ok(())
        }
        RateCommands::Delete { id, yes } => {
            let deleted = delete_rate_command(api, id, yes, &mut io::stdin().lock()).await?;
            if deleted {
                notify::success(&format!("Rate {} deleted", id));
            }
            Ok(())
        }
    }
}

fn parse_window(raw: &str) -> Result<RateWindow, ApiError> {
    match raw {
        "today" => Ok(RateWindow::Today),
        "week" => Ok(RateWindow::Week),
        "month" => Ok(RateWindow::Month),
        "3months" => Ok(RateWindow::ThreeMonths),
        "6months" => Ok(RateWindow::SixMonths),
        "year" => Ok(RateWindow::Year),
        other => Err(ApiError::Error(format!("Unknown window: {}", other))),
    }
}

/// Delete a user after confirmation. Returns false when the prompt is
/// declined, in which case no request is sent.
async fn delete_user_command<R: BufRead>(
    api: &ApiClient,
    user_id: i64,
    assume_yes: bool,
    input: &mut R,
) -> Result<bool, ApiError> {
    if !assume_yes && !confirm_delete("user", user_id, input)? {
        notify::info("Delete cancelled");
        return Ok(false);
    }

    notify::with_spinner("Deleting user", api.delete_user(user_id)).await?;

    Ok(true)
}

async fn delete_rate_command<R: BufRead>(
    api: &ApiClient,
    rate_id: i64,
    assume_yes: bool,
    input: &mut R,
) -> Result<bool, ApiError> {
    if !assume_yes && !confirm_delete("rate", rate_id, input)? {
        notify::info("Delete cancelled");
        return Ok(false);
    }

    notify::with_spinner("Deleting rate", api.delete_rate(rate_id)).await?;

    Ok(true)
}

fn confirm_delete<R: BufRead>(resource: &str, id: i64, input: &mut R) -> Result<bool, ApiError> {
    print!("Delete {} {}? This cannot be undone. [y/N] ", resource, id);
    io::stdout().flush().ok();

    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .map_err(|e| ApiError::Error(format!("Failed to read input with error: {}", e)))?;

    Ok(is_yes(&answer))
}

pub(crate) fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

fn prompt_stdin(label: &str) -> Result<String, ApiError> {
    print!("{}", label);
    io::stdout().flush().ok();

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .map_err(|e| ApiError::Error(format!("Failed to read input with error: {}", e)))?;

    Ok(answer.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn test_api(server_url: &str, dir: &tempfile::TempDir) -> ApiClient {
        let settings = ApiSettings {
            base_url: server_url.to_string(),
            api_prefix: "api/v1".to_string(),
            token_path: dir.path().join("credentials.json"),
        };
        let client = build_http_client().unwrap();
        ApiClient::new(&settings, &client)
    }

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y"));
        assert!(is_yes("YES"));
        assert!(is_yes("  yes \n"));
        assert!(!is_yes(""));
        assert!(!is_yes("n"));
        assert!(!is_yes("nope"));
    }

    #[test]
    fn test_parse_window() {
        assert_eq!(parse_window("week").unwrap(), RateWindow::Week);
        assert_eq!(parse_window("3months").unwrap(), RateWindow::ThreeMonths);
        assert!(parse_window("fortnight").is_err());
    }

    #[tokio::test]
    async fn test_declined_delete_sends_no_request() {
        let mut server = mockito::Server::new_async().await;
        let dir = tempfile::tempdir().unwrap();

        let mock = server
            .mock("DELETE", "/api/v1/admin/delete_user/7")
            .expect(0)
            .create_async()
            .await;

        let api = test_api(&server.url(), &dir);
        api.token_store().save("test_token").unwrap();

        let mut input = Cursor::new(b"n\n".to_vec());
        let deleted = delete_user_command(&api, 7, false, &mut input).await.unwrap();

        assert!(!deleted);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_confirmed_delete_sends_request() {
        let mut server = mockito::Server::new_async().await;
        let dir = tempfile::tempdir().unwrap();

        let mock = server
            .mock("DELETE", "/api/v1/admin/delete_rate/9")
            .match_header("authorization", "Bearer test_token")
            .with_status(204)
            .expect(1)
            .create_async()
            .await;

        let api = test_api(&server.url(), &dir);
        api.token_store().save("test_token").unwrap();

        let mut input = Cursor::new(b"y\n".to_vec());
        let deleted = delete_rate_command(&api, 9, false, &mut input).await.unwrap();

        assert!(deleted);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_assume_yes_skips_prompt() {
        let mut server = mockito::Server::new_async().await;
        let dir = tempfile::tempdir().unwrap();

        let mock = server
            .mock("DELETE", "/api/v1/admin/delete_user/4")
            .with_status(204)
            .expect(1)
            .create_async()
            .await;

        let api = test_api(&server.url(), &dir);
        api.token_store().save("test_token").unwrap();

        // no input available, the flag must bypass the prompt
        let mut input = Cursor::new(Vec::new());
        let deleted = delete_user_command(&api, 4, true, &mut input).await.unwrap();

        assert!(deleted);
        mock.assert_async().await;
    }
}
