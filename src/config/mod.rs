pub mod cli;
pub mod toml_config;

use crate::api::DEFAULT_API_URL;
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{validate_path, validate_range, validate_url, Validate};
use serde::{Deserialize, Serialize};
use toml_config::TomlConfig;

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

pub const DEFAULT_STATE_DIR: &str = "./.sentiment-client";
pub const DEFAULT_OUTPUT_PATH: &str = "./output";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "sentiment-client")]
#[command(about = "Command-line client for the review sentiment service")]
pub struct CliConfig {
    /// TOML settings file; flags given on the command line win over it
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Where the saved session and reports live
    #[arg(long, global = true)]
    pub state_dir: Option<String>,

    #[arg(long, global = true)]
    pub output_path: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    #[arg(long, short, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Validate a review CSV and classify every row
    Batch {
        file: String,
        /// Check the required columns on every row, not only the first
        #[arg(long)]
        per_row_schema: bool,
        /// Write a zip archive with the CSV and a summary
        #[arg(long)]
        zip: bool,
        /// Parse and validate only
        #[arg(long)]
        dry_run: bool,
    },
    /// Classify a single piece of text
    Classify { text: String },
    /// Metrics, trend and top products
    Dashboard {
        #[arg(long, default_value_t = crate::api::data::DEFAULT_TREND_DAYS)]
        days: u32,
        /// Load sample data when the account has no reviews
        #[arg(long)]
        seed: bool,
    },
    /// Representative positive and negative reviews
    Highlights {
        #[arg(long, default_value_t = crate::api::data::DEFAULT_REVIEW_LIMIT)]
        limit: u32,
    },
    /// Known brands, or the products of one brand
    Catalog {
        #[arg(long)]
        brand: Option<String>,
    },
    /// Page through stored reviews
    Reviews {
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        sentiment: Option<String>,
        #[arg(long)]
        brand: Option<String>,
    },
    Login {
        email: String,
        password: String,
    },
    Register {
        name: String,
        email: String,
        password: String,
    },
    Logout,
    Whoami,
    ForgotPassword {
        email: String,
    },
    ResetPassword {
        token: String,
        password: String,
    },
    /// Print the browser URL for Google sign-in
    GoogleUrl,
    Reports {
        #[command(subcommand)]
        action: ReportsAction,
    },
    Schedules {
        #[command(subcommand)]
        action: SchedulesAction,
    },
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum ReportsAction {
    List,
    Save { title: String },
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum SchedulesAction {
    List,
    Create {
        /// daily, weekly, monthly or custom
        cadence: String,
        email: String,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        time: Option<String>,
    },
    Delete { id: String },
    Toggle { id: String },
}

/// Effective settings after merging the TOML file with command-line flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub api_url: String,
    pub state_dir: String,
    pub output_path: String,
    pub per_row_schema: bool,
    pub zip_output: bool,
    pub request_timeout_secs: u64,
    pub monitor: bool,
    pub json_logs: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            state_dir: DEFAULT_STATE_DIR.to_string(),
            output_path: DEFAULT_OUTPUT_PATH.to_string(),
            per_row_schema: false,
            zip_output: false,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            monitor: false,
            json_logs: false,
        }
    }
}

impl Settings {
    pub fn from_toml(toml: &TomlConfig) -> Self {
        let defaults = Settings::default();
        Self {
            api_url: toml.api.url.clone().unwrap_or(defaults.api_url),
            state_dir: toml.session.state_dir.clone().unwrap_or(defaults.state_dir),
            output_path: toml.output.path.clone().unwrap_or(defaults.output_path),
            per_row_schema: toml.upload.per_row_schema.unwrap_or(false),
            zip_output: toml.output.zip.unwrap_or(false),
            request_timeout_secs: toml
                .api
                .timeout_seconds
                .unwrap_or(defaults.request_timeout_secs),
            monitor: toml.monitoring_enabled(),
            json_logs: toml.json_logs(),
        }
    }

    #[cfg(feature = "cli")]
    pub fn resolve(cli: &CliConfig) -> Result<Self> {
        let mut settings = match &cli.config {
            Some(path) => {
                let toml = TomlConfig::from_file(path)?;
                toml.validate()?;
                Settings::from_toml(&toml)
            }
            None => Settings::default(),
        };

        if let Some(url) = &cli.api_url {
            settings.api_url = url.clone();
        }
        if let Some(dir) = &cli.state_dir {
            settings.state_dir = dir.clone();
        }
        if let Some(path) = &cli.output_path {
            settings.output_path = path.clone();
        }
        if let Some(timeout) = cli.timeout {
            settings.request_timeout_secs = timeout;
        }
        settings.monitor |= cli.monitor;
        settings.json_logs |= cli.json_logs;

        if let Command::Batch {
            per_row_schema,
            zip,
            ..
        } = &cli.command
        {
            settings.per_row_schema |= *per_row_schema;
            settings.zip_output |= *zip;
        }

        Ok(settings)
    }
}

impl ConfigProvider for Settings {
    fn api_url(&self) -> &str {
        &self.api_url
    }

    fn state_dir(&self) -> &str {
        &self.state_dir
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn per_row_schema(&self) -> bool {
        self.per_row_schema
    }

    fn zip_output(&self) -> bool {
        self.zip_output
    }

    fn request_timeout_secs(&self) -> u64 {
        self.request_timeout_secs
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_url("api_url", &self.api_url)?;
        validate_path("state_dir", &self.state_dir)?;
        validate_path("output_path", &self.output_path)?;
        validate_range("timeout", self.request_timeout_secs, 1, 600)?;
        Ok(())
    }
}
