//! Configuration settings structures for notifier
//!
//! This module defines all configuration structures that can be loaded from
//! TOML files and environment variables.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;
use crate::logger::{ConsoleConfig, FileConfig, LogFormat, LoggerConfig};

// ============================================================================
// Default value functions
// ============================================================================

fn default_app_name() -> String {
    "notifier".to_string()
}

fn default_app_version() -> String {
    crate::pkg_version().to_string()
}

fn default_nats_servers() -> Vec<String> {
    vec!["nats://127.0.0.1:4222".to_string()]
}

fn default_subject() -> String {
    "notifier.notifications.*".to_string()
}

fn default_queue_group() -> String {
    "notifier-group".to_string()
}

fn default_connection_name() -> String {
    "notifier".to_string()
}

fn default_pool_size() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        * 2
}

fn default_thread_prefix() -> String {
    "notifier-io".to_string()
}

fn default_shutdown_timeout() -> u64 {
    30
}

fn default_http_timeout_ms() -> u64 {
    1000
}

fn default_kavenegar_base_url() -> String {
    "https://api.kavenegar.com/".to_string()
}

fn default_mail_port() -> u16 {
    587
}

fn default_mail_timeout_ms() -> u64 {
    5000
}

fn default_metrics_endpoint() -> String {
    "http://localhost:4318/v1/metrics".to_string()
}

fn default_export_interval() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_log_path() -> String {
    "logs/notifier.log".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

// ============================================================================
// Application Configuration
// ============================================================================

/// Application basic information configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    #[serde(default = "default_app_name")]
    pub name: String,

    #[serde(default = "default_app_version")]
    pub version: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            version: default_app_version(),
        }
    }
}

// ============================================================================
// Message Bus Configuration
// ============================================================================

/// NATS connection and subscription settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NatsConfig {
    /// Server URLs tried in order on connect
    #[serde(default = "default_nats_servers")]
    pub servers: Vec<String>,

    /// Subject (wildcards allowed) notification requests arrive on
    #[serde(default = "default_subject")]
    pub subject: String,

    /// Queue group shared by all notifier instances
    #[serde(default = "default_queue_group")]
    pub queue_group: String,

    /// Connection name reported to the server
    #[serde(default = "default_connection_name")]
    pub connection_name: String,
}

impl Default for NatsConfig {
    fn default() -> Self {
        Self {
            servers: default_nats_servers(),
            subject: default_subject(),
            queue_group: default_queue_group(),
            connection_name: default_connection_name(),
        }
    }
}

// ============================================================================
// Dispatcher Configuration
// ============================================================================

/// Worker pool sizing and shutdown behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatcherConfig {
    /// Number of dispatch workers, also the runtime's worker thread count
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,

    /// Prefix for runtime worker thread names
    #[serde(default = "default_thread_prefix")]
    pub thread_prefix: String,

    /// How long shutdown waits for queued notifications, in seconds
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

impl DispatcherConfig {
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            pool_size: default_pool_size(),
            thread_prefix: default_thread_prefix(),
            shutdown_timeout_secs: default_shutdown_timeout(),
        }
    }
}

// ============================================================================
// HTTP Client Configuration
// ============================================================================

/// Timeouts of the shared outbound HTTP client, in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Whole-request timeout
    #[serde(default = "default_http_timeout_ms")]
    pub call_timeout_ms: u64,

    #[serde(default = "default_http_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Idle read timeout between response chunks
    #[serde(default = "default_http_timeout_ms")]
    pub read_timeout_ms: u64,
}

impl HttpConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            call_timeout_ms: default_http_timeout_ms(),
            connect_timeout_ms: default_http_timeout_ms(),
            read_timeout_ms: default_http_timeout_ms(),
        }
    }
}

// ============================================================================
// Provider Configuration
// ============================================================================

/// Kavenegar SMS and text-to-speech gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KavenegarConfig {
    #[serde(default)]
    pub enabled: bool,

    /// API key, embedded in the request path
    #[serde(default)]
    pub token: String,

    #[serde(default = "default_kavenegar_base_url")]
    pub base_url: String,

    /// Sender line number
    #[serde(default)]
    pub sender: String,
}

impl Default for KavenegarConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            token: String::new(),
            base_url: default_kavenegar_base_url(),
            sender: String::new(),
        }
    }
}

/// Connection security used towards the SMTP relay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailSecurity {
    /// Plain connection upgraded with STARTTLS
    #[default]
    Starttls,
    /// Implicit TLS from the first byte
    Tls,
    /// No encryption, local relays only
    None,
}

impl MailSecurity {
    pub fn as_str(&self) -> &'static str {
        match self {
            MailSecurity::Starttls => "starttls",
            MailSecurity::Tls => "tls",
            MailSecurity::None => "none",
        }
    }
}

/// SMTP relay settings. The mail provider is registered only when `host` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailConfig {
    #[serde(default)]
    pub host: String,

    #[serde(default = "default_mail_port")]
    pub port: u16,

    #[serde(default)]
    pub security: MailSecurity,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// Sender used when a request carries none
    #[serde(default)]
    pub from: Option<String>,

    #[serde(default = "default_mail_timeout_ms")]
    pub timeout_ms: u64,
}

impl MailConfig {
    pub fn is_configured(&self) -> bool {
        !self.host.trim().is_empty()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: default_mail_port(),
            security: MailSecurity::default(),
            username: None,
            password: None,
            from: None,
            timeout_ms: default_mail_timeout_ms(),
        }
    }
}

// ============================================================================
// Metrics Configuration
// ============================================================================

/// OTLP metrics export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default)]
    pub enabled: bool,

    /// OTLP/HTTP metrics endpoint
    #[serde(default = "default_metrics_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_export_interval")]
    pub export_interval_secs: u64,
}

impl MetricsConfig {
    pub fn export_interval(&self) -> Duration {
        Duration::from_secs(self.export_interval_secs)
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_metrics_endpoint(),
            export_interval_secs: default_export_interval(),
        }
    }
}

// ============================================================================
// Logger Settings
// ============================================================================

/// Console output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_true")]
    pub colored: bool,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            colored: default_true(),
        }
    }
}

/// File output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSettings {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_log_path")]
    pub path: String,

    #[serde(default = "default_true")]
    pub append: bool,

    /// Log format: "full", "compact", or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_log_path(),
            append: default_true(),
            format: default_log_format(),
        }
    }
}

/// Logger configuration as it appears in the settings files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerSettings {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub console: ConsoleSettings,

    #[serde(default)]
    pub file: FileSettings,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            console: ConsoleSettings::default(),
            file: FileSettings::default(),
        }
    }
}

impl LoggerSettings {
    /// Convert into the runtime `LoggerConfig` used by the logger module
    pub fn into_logger_config(self) -> Result<LoggerConfig, ConfigError> {
        let console = ConsoleConfig::new(self.console.enabled, self.console.colored);
        let file = self.file.into_file_config()?;

        LoggerConfig::new(console, file, self.level)
            .map_err(|e| ConfigError::validation("logger", e.to_string()))
    }
}

impl FileSettings {
    pub fn into_file_config(self) -> Result<FileConfig, ConfigError> {
        let format = self
            .format
            .parse::<LogFormat>()
            .map_err(|e| ConfigError::validation("logger.file.format", e.to_string()))?;

        FileConfig::new(self.enabled, PathBuf::from(self.path), self.append, format)
            .map_err(|e| ConfigError::validation("logger.file", e.to_string()))
    }
}

// ============================================================================
// Root Settings
// ============================================================================

/// Root configuration, one field per TOML section
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub application: ApplicationConfig,

    #[serde(default)]
    pub nats: NatsConfig,

    #[serde(default)]
    pub dispatcher: DispatcherConfig,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub kavenegar: KavenegarConfig,

    #[serde(default)]
    pub mail: MailConfig,

    #[serde(default)]
    pub metrics: MetricsConfig,

    #[serde(default)]
    pub logger: LoggerSettings,
}
