//! Chatbot - terminal client for the chatbot service
//!
//! Sign up, sign in, browse conversations and chat with the assistant from a
//! terminal. Logs go to stderr so they stay out of the transcript.

mod app;
mod commands;
mod config;
mod i18n;
mod render;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use chatbot_core::api::{ApiClient, AuthClient, SessionStore};
use chatbot_core::Route;

use crate::config::Config;

#[derive(Parser)]
#[command(name = "chatbot")]
#[command(about = "Terminal client for the chatbot service")]
#[command(version)]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Chatbot backend URL
    #[arg(long)]
    api_url: Option<String>,

    /// Auth service URL
    #[arg(long)]
    auth_url: Option<String>,

    /// Screen to start on
    #[command(subcommand)]
    screen: Option<Screen>,
}

#[derive(Subcommand, Clone, Copy)]
enum Screen {
    /// Create an account
    Signup,
    /// Sign in (default)
    Login,
    /// Go straight to the chat screen
    Chat,
}

impl From<Screen> for Route {
    fn from(screen: Screen) -> Self {
        match screen {
            Screen::Signup => Route::SignUp,
            Screen::Login => Route::Login,
            Screen::Chat => Route::Chat,
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match cli.config.clone().or_else(Config::default_path) {
        Some(path) => Config::load_from(&path)?,
        None => Config::default(),
    };
    config.apply_env();
    if let Some(url) = &cli.api_url {
        config.api_url = url.clone();
    }
    if let Some(url) = &cli.auth_url {
        config.auth_url = url.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    tracing::info!("Starting chatbot client against {}", config.api_url);

    if config.auth_key.is_empty() {
        tracing::warn!("No auth key configured; set {}", config::AUTH_KEY_ENV);
    }

    let session = Arc::new(SessionStore::new());
    let api = Arc::new(ApiClient::new(&config.api_url, session.clone()));
    let auth = Arc::new(AuthClient::new(&config.auth_url, &config.auth_key, session));

    if !api.health().await? {
        tracing::warn!("Chatbot backend at {} is not responding", api.base_url());
    }

    let i18n = i18n::I18n::load();
    let start = cli.screen.map(Route::from).unwrap_or_default();
    app::App::new(api, auth, config, i18n).run(start).await
}
