use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use feedline::api::{Credentials, HttpApi};
use feedline::config::{self, ClientConfig};
use feedline::router::Navigation;
use feedline::{ApiError, ConfigError, FeedManager, FileTokenStore, Router, SessionError, SessionManager, StoreError};
use serde_json::{Value, json};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("api error: {0}")]
    Api(#[from] ApiError),
    #[error("token store error: {0}")]
    Store(#[from] StoreError),
    #[error("login failed: {0}")]
    Session(#[from] SessionError),
    #[error("not logged in; run `feedline login` first")]
    NotLoggedIn,
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "feedline", about = "Social feed client")]
struct Cli {
    #[arg(long, env = config::API_BASE_VAR)]
    api_base: Option<String>,

    #[arg(long, env = config::STATE_DIR_VAR)]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "FEEDLINE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Logout,
    Whoami,
    Feed {
        /// Print only the post with this id.
        #[arg(long)]
        post: Option<u64>,
    },
    Post {
        content: String,
    },
    Like {
        post_id: u64,
    },
    Navigate {
        path: String,
    },
}

impl Command {
    /// Commands that talk to the API with the stored identity validate it
    /// first. Local decisions (`navigate`, `logout`) and `login`, which
    /// restores on its own, leave the stored token untouched.
    fn restores_session(&self) -> bool {
        matches!(self, Self::Whoami | Self::Feed { .. } | Self::Post { .. } | Self::Like { .. })
    }
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let api = Arc::new(HttpApi::from_config(&config)?);
    let store = Arc::new(FileTokenStore::new(&config.state_dir));
    let mut session = SessionManager::new(api.clone(), store)?;
    if cli.command.restores_session() {
        session.restore_session().await?;
    }

    match cli.command {
        Command::Login { username, password } => {
            session.login(&Credentials { username, password }).await?;
            print_json(&json!({ "logged_in": session.is_authenticated(), "user": session.user() }))
        }
        Command::Logout => {
            session.logout()?;
            print_json(&json!({ "logged_in": false }))
        }
        Command::Whoami => {
            let user = session.user().ok_or(CliError::NotLoggedIn)?;
            print_json(&serde_json::to_value(user)?)
        }
        Command::Feed { post } => {
            let mut feed = FeedManager::new(api);
            feed.fetch_feed(session.request_context()).await?;
            match post {
                Some(id) => print_json(&serde_json::to_value(feed.post(id))?),
                None => print_json(&serde_json::to_value(feed.posts())?),
            }
        }
        Command::Post { content } => {
            let mut feed = FeedManager::new(api);
            let post = feed.create_post(session.request_context(), &content).await?;
            print_json(&serde_json::to_value(post)?)
        }
        Command::Like { post_id } => {
            let mut feed = FeedManager::new(api);
            let toggle = feed.like_post(session.request_context(), post_id).await?;
            print_json(&json!({ "post_id": post_id, "toggle": toggle }))
        }
        Command::Navigate { path } => print_json(&navigation_json(Router::default().navigate(&path, &session))),
    }
}

fn load_config(cli: &Cli) -> Result<ClientConfig, CliError> {
    let mut config = match &cli.api_base {
        Some(base) => ClientConfig::from_lookup(|key| {
            if key == config::API_BASE_VAR { Some(base.clone()) } else { std::env::var(key).ok() }
        })?,
        None => ClientConfig::from_env()?,
    };
    if let Some(dir) = &cli.state_dir {
        config.state_dir.clone_from(dir);
    }
    Ok(config)
}

fn navigation_json(nav: Navigation) -> Value {
    match nav {
        Navigation::Proceed { path, route, params } => {
            json!({ "outcome": "proceed", "path": path, "route": route.path, "params": params })
        }
        Navigation::Redirect { from, to } => json!({ "outcome": "redirect", "from": from, "to": to }),
        Navigation::NotFound { path } => json!({ "outcome": "not_found", "path": path }),
    }
}

fn print_json(value: &Value) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
