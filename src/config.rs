//! Configuration for errnotify.
//!
//! This module defines the main `Config` struct and its sub-structs,
//! responsible for holding all application settings. It uses the `figment`
//! crate to load configuration from a TOML file and merge it with
//! environment variables and command-line arguments.

use crate::cli::Cli;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// The main configuration struct for the application.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// The logging level for the application.
    pub log_level: String,
    /// The deployment name stamped onto every dispatched report.
    pub deployment: String,
    /// Configuration for admin email delivery.
    pub email: EmailConfig,
    /// Configuration for the team-chat stream. Absent means no error bot.
    pub chat: Option<ChatConfig>,
}

/// Configuration for admin email delivery.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EmailConfig {
    /// The From address for error mail.
    pub from: String,
    /// Administrator addresses; empty disables the email channel.
    #[serde(default)]
    pub admins: Vec<String>,
    /// SMTP relay hostname.
    pub smtp_host: String,
    /// SMTP relay port, when not the default submission port.
    pub smtp_port: Option<u16>,
    /// SMTP username.
    pub smtp_username: Option<String>,
    /// SMTP password.
    pub smtp_password: Option<String>,
}

/// Configuration for the team-chat stream.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ChatConfig {
    /// Whether the chat channel is active.
    pub enabled: bool,
    /// The chat incoming webhook URL.
    pub webhook_url: String,
    /// The stream errors are posted to.
    pub stream: String,
}

impl Config {
    /// Loads the application configuration by layering sources:
    /// defaults, TOML file, environment, and CLI arguments.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if let Some(path) = &cli.config {
            figment = figment.merge(Toml::file(path));
        }
        let config: Config = figment
            // Allow overriding with environment variables, e.g.
            // ERRNOTIFY_EMAIL__SMTP_HOST=smtp.example.com
            .merge(Env::prefixed("ERRNOTIFY_").split("__"))
            .merge(cli.clone())
            .extract()?;
        Ok(config)
    }
}

// Provide a default implementation for tests and easy setup.
impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            deployment: "unknown".to_string(),
            email: EmailConfig {
                from: "errors@localhost".to_string(),
                admins: vec![],
                smtp_host: "localhost".to_string(),
                smtp_port: None,
                smtp_username: None,
                smtp_password: None,
            },
            chat: None,
        }
    }
}
