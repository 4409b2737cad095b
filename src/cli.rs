//! Command-Line Interface (CLI) argument parsing.
//!
//! This module defines the command-line arguments for the application using
//! the `clap` crate. These arguments are parsed at startup and then merged
//! with the configuration from the TOML file and environment variables.

use clap::Parser;
use figment::{
    value::{Dict, Map, Value},
    Error, Metadata, Profile, Provider,
};
use std::path::PathBuf;

/// Formats a captured error report and delivers it to admin email and the
/// team-chat errors stream.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Report kind: "browser" or "server".
    #[arg(long, value_name = "KIND")]
    pub kind: String,

    /// Path to the JSON report. Reads stdin when omitted or "-".
    #[arg(value_name = "REPORT")]
    pub report: Option<PathBuf>,

    /// Deployment name stamped onto the report.
    #[arg(long, value_name = "NAME")]
    pub deployment: Option<String>,

    /// Do not post server reports to the chat stream.
    #[arg(long)]
    pub skip_chat: bool,

    /// Log level override.
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

impl Provider for Cli {
    fn metadata(&self) -> Metadata {
        Metadata::named("Command-Line Arguments")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let mut dict = Dict::new();

        if let Some(deployment) = &self.deployment {
            dict.insert("deployment".into(), Value::from(deployment.clone()));
        }

        if let Some(level) = &self.log_level {
            dict.insert("log_level".into(), Value::from(level.clone()));
        }

        Ok(Map::from([(Profile::Default, dict)]))
    }
}
