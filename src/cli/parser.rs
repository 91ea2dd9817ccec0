//! CLI argument parsing with clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Routes notification requests from the message bus to SMS, voice and mail providers
#[derive(Parser, Debug)]
#[command(name = "notifier")]
#[command(about = "Routes notification requests from NATS to SMS, voice and mail providers")]
#[command(long_about = "
Notifier subscribes to notification requests on a NATS subject, decodes each
protobuf payload and hands it to the first delivery provider able to handle it
(Kavenegar for SMS and voice calls, SMTP for email). Every request is counted
and timed through OpenTelemetry metrics.

EXAMPLES:
    # Start with the layered configuration in ./config
    notifier

    # Use a single configuration file
    notifier --config /etc/notifier/notifier.toml serve

    # Listen on another subject with a larger worker pool
    notifier serve --subject 'alerts.notifications.*' --pool-size 32

    # Check configuration without connecting to anything
    notifier serve --dry-run
")]
#[command(version = crate::build::CLAP_LONG_VERSION)]
pub struct Cli {
    /// Subcommand to execute, `serve` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file path
    ///
    /// Load this TOML file instead of the layered `config/` directory.
    /// `NOTIFIER_*` environment variables still override its values.
    ///
    /// Example: --config /etc/notifier/production.toml
    #[arg(short, long, value_name = "FILE", value_parser = super::validation::validate_config_file_path)]
    pub config: Option<PathBuf>,

    /// Override environment detection
    ///
    /// Selects which `{environment}.toml` layer is loaded, instead of
    /// reading `NOTIFIER_APP_ENV`.
    #[arg(short, long, value_enum)]
    pub env: Option<Environment>,

    /// Enable verbose logging (debug level)
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Subscribe to the bus and dispatch notifications (default)
    ///
    /// Examples:
    ///   notifier serve                          # Start with defaults
    ///   notifier serve --pool-size 8            # Eight dispatch workers
    ///   notifier serve --dry-run                # Validate config and exit
    Serve {
        /// Subject to subscribe to, NATS wildcards allowed
        #[arg(long, value_name = "SUBJECT", value_parser = super::validation::validate_subject)]
        subject: Option<String>,

        /// Number of dispatch workers
        ///
        /// Also used as the number of runtime worker threads.
        #[arg(short, long, value_name = "N", value_parser = super::validation::validate_pool_size)]
        pool_size: Option<usize>,

        /// Log level override, takes precedence over --verbose/--quiet
        #[arg(long, value_enum)]
        log_level: Option<LogLevel>,

        /// Validate configuration and exit
        #[arg(long)]
        dry_run: bool,
    },
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Serve {
            subject: None,
            pool_size: None,
            log_level: None,
            dry_run: false,
        }
    }
}

/// Environment options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    #[value(name = "development", alias = "dev")]
    Development,
    #[value(name = "test")]
    Test,
    #[value(name = "staging", alias = "stage")]
    Staging,
    #[value(name = "production", alias = "prod")]
    Production,
}

/// Log level options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    #[value(name = "error")]
    Error,
    #[value(name = "warn", alias = "warning")]
    Warn,
    #[value(name = "info")]
    Info,
    #[value(name = "debug")]
    Debug,
    #[value(name = "trace")]
    Trace,
}

impl Cli {
    /// The command to run, defaulting to `serve`
    pub fn command(&self) -> Commands {
        match &self.command {
            Some(Commands::Serve {
                subject,
                pool_size,
                log_level,
                dry_run,
            }) => Commands::Serve {
                subject: subject.clone(),
                pool_size: *pool_size,
                log_level: *log_level,
                dry_run: *dry_run,
            },
            None => Commands::default(),
        }
    }

    /// Validate argument combinations clap cannot express
    pub fn validate(&self) -> Result<(), String> {
        if self.verbose && self.quiet {
            return Err("Cannot use --verbose and --quiet together".to_string());
        }

        Ok(())
    }
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl From<LogLevel> for String {
    fn from(level: LogLevel) -> Self {
        level.as_str().to_string()
    }
}

impl From<Environment> for crate::config::Environment {
    fn from(env: Environment) -> Self {
        match env {
            Environment::Development => crate::config::Environment::Development,
            Environment::Test => crate::config::Environment::Test,
            Environment::Staging => crate::config::Environment::Staging,
            Environment::Production => crate::config::Environment::Production,
        }
    }
}
