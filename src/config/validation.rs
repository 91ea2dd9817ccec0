//! Configuration validation logic
//!
//! Validation methods for all configuration structures, ensuring values are
//! within acceptable ranges and formats before anything is started.

use crate::config::error::ConfigError;
use crate::config::settings::{
    DispatcherConfig, FileSettings, HttpConfig, KavenegarConfig, LoggerSettings, MailConfig,
    MetricsConfig, NatsConfig, Settings,
};
use crate::logger::LOG_LEVELS;

/// Valid log formats
const VALID_LOG_FORMATS: &[&str] = &["full", "compact", "json"];

impl NatsConfig {
    /// Validate bus configuration
    ///
    /// # Validation Rules
    /// - At least one server URL
    /// - Subject and queue group must not be blank
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.servers.iter().all(|s| s.trim().is_empty()) {
            return Err(ConfigError::validation(
                "nats.servers",
                "At least one NATS server URL is required.",
            ));
        }

        if self.subject.trim().is_empty() {
            return Err(ConfigError::validation(
                "nats.subject",
                "Subject must not be empty.",
            ));
        }

        if self.queue_group.trim().is_empty() {
            return Err(ConfigError::validation(
                "nats.queue_group",
                "Queue group must not be empty.",
            ));
        }

        Ok(())
    }
}

impl DispatcherConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pool_size == 0 {
            return Err(ConfigError::validation(
                "dispatcher.pool_size",
                "Pool size must be greater than 0.",
            ));
        }

        if self.thread_prefix.trim().is_empty() {
            return Err(ConfigError::validation(
                "dispatcher.thread_prefix",
                "Thread prefix must not be empty.",
            ));
        }

        if self.shutdown_timeout_secs == 0 {
            return Err(ConfigError::validation(
                "dispatcher.shutdown_timeout_secs",
                "Shutdown timeout must be greater than 0 seconds.",
            ));
        }

        Ok(())
    }
}

impl HttpConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("http.call_timeout_ms", self.call_timeout_ms),
            ("http.connect_timeout_ms", self.connect_timeout_ms),
            ("http.read_timeout_ms", self.read_timeout_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::validation(
                    field,
                    "Timeout must be greater than 0 milliseconds.",
                ));
            }
        }
        Ok(())
    }
}

impl KavenegarConfig {
    /// Validate gateway configuration. Nothing is checked while disabled.
    ///
    /// # Validation Rules
    /// - Token and sender must be set
    /// - Base URL must be an absolute URL that can carry path segments
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.enabled {
            return Ok(());
        }

        if self.token.trim().is_empty() {
            return Err(ConfigError::validation(
                "kavenegar.token",
                "API token is required when the Kavenegar provider is enabled.",
            ));
        }

        if self.sender.trim().is_empty() {
            return Err(ConfigError::validation(
                "kavenegar.sender",
                "Sender line is required when the Kavenegar provider is enabled.",
            ));
        }

        match reqwest::Url::parse(&self.base_url) {
            Ok(url) if !url.cannot_be_a_base() => Ok(()),
            Ok(_) => Err(ConfigError::validation(
                "kavenegar.base_url",
                format!("'{}' cannot be used as a base URL.", self.base_url),
            )),
            Err(e) => Err(ConfigError::validation(
                "kavenegar.base_url",
                format!("Invalid base URL '{}': {}", self.base_url, e),
            )),
        }
    }
}

impl MailConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.is_configured() {
            return Ok(());
        }

        if self.port == 0 {
            return Err(ConfigError::validation(
                "mail.port",
                "Port must be between 1 and 65535.",
            ));
        }

        if self.timeout_ms == 0 {
            return Err(ConfigError::validation(
                "mail.timeout_ms",
                "Timeout must be greater than 0 milliseconds.",
            ));
        }

        if self.username.is_some() != self.password.is_some() {
            return Err(ConfigError::validation(
                "mail.username",
                "Username and password must be set together.",
            ));
        }

        Ok(())
    }
}

impl MetricsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.enabled {
            return Ok(());
        }

        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::validation(
                "metrics.endpoint",
                "Endpoint is required when metrics export is enabled.",
            ));
        }

        if self.export_interval_secs == 0 {
            return Err(ConfigError::validation(
                "metrics.export_interval_secs",
                "Export interval must be greater than 0 seconds.",
            ));
        }

        Ok(())
    }
}

impl FileSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.path.trim().is_empty() {
            return Err(ConfigError::validation(
                "logger.file.path",
                "File path is required when file logging is enabled.",
            ));
        }

        if !VALID_LOG_FORMATS.contains(&self.format.to_lowercase().as_str()) {
            return Err(ConfigError::validation(
                "logger.file.format",
                format!(
                    "Invalid log format '{}'. Valid formats are: {}",
                    self.format,
                    VALID_LOG_FORMATS.join(", ")
                ),
            ));
        }

        Ok(())
    }
}

impl LoggerSettings {
    /// Validate logger settings
    ///
    /// # Validation Rules
    /// - Log level must be one of: trace, debug, info, warn, error
    /// - If file logging is enabled, path must not be empty
    /// - Log format must be one of: full, compact, json
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !LOG_LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::validation(
                "logger.level",
                format!(
                    "Invalid log level '{}'. Valid levels are: {}",
                    self.level,
                    LOG_LEVELS.join(", ")
                ),
            ));
        }

        self.file.validate()
    }
}

impl Settings {
    /// Validate all configuration settings, returning the first error encountered
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.nats.validate()?;
        self.dispatcher.validate()?;
        self.http.validate()?;
        self.kavenegar.validate()?;
        self.mail.validate()?;
        self.metrics.validate()?;
        self.logger.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(result: Result<(), ConfigError>) -> String {
        match result {
            Err(ConfigError::ValidationError { field, .. }) => field,
            other => panic!("Expected ValidationError, got {:?}", other),
        }
    }

    fn enabled_kavenegar() -> KavenegarConfig {
        KavenegarConfig {
            enabled: true,
            token: "token".to_string(),
            sender: "10004346".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_settings_valid() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_nats_empty_servers() {
        let config = NatsConfig {
            servers: vec![],
            ..Default::default()
        };
        assert_eq!(field_of(config.validate()), "nats.servers");
    }

    #[test]
    fn test_nats_blank_subject() {
        let config = NatsConfig {
            subject: "  ".to_string(),
            ..Default::default()
        };
        assert_eq!(field_of(config.validate()), "nats.subject");
    }

    #[test]
    fn test_dispatcher_zero_pool_size() {
        let config = DispatcherConfig {
            pool_size: 0,
            ..Default::default()
        };
        assert_eq!(field_of(config.validate()), "dispatcher.pool_size");
    }

    #[test]
    fn test_http_zero_timeouts() {
        let config = HttpConfig {
            read_timeout_ms: 0,
            ..Default::default()
        };
        assert_eq!(field_of(config.validate()), "http.read_timeout_ms");
    }

    #[test]
    fn test_kavenegar_disabled_skips_checks() {
        let config = KavenegarConfig {
            enabled: false,
            base_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_kavenegar_enabled_valid() {
        assert!(enabled_kavenegar().validate().is_ok());
    }

    #[test]
    fn test_kavenegar_missing_token() {
        let config = KavenegarConfig {
            token: String::new(),
            ..enabled_kavenegar()
        };
        assert_eq!(field_of(config.validate()), "kavenegar.token");
    }

    #[test]
    fn test_kavenegar_missing_sender() {
        let config = KavenegarConfig {
            sender: String::new(),
            ..enabled_kavenegar()
        };
        assert_eq!(field_of(config.validate()), "kavenegar.sender");
    }

    #[test]
    fn test_kavenegar_bad_base_urls() {
        for base_url in ["not a url", "mailto:ops@example.com"] {
            let config = KavenegarConfig {
                base_url: base_url.to_string(),
                ..enabled_kavenegar()
            };
            assert_eq!(field_of(config.validate()), "kavenegar.base_url");
        }
    }

    #[test]
    fn test_mail_unconfigured_skips_checks() {
        let config = MailConfig {
            port: 0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_mail_zero_port() {
        let config = MailConfig {
            host: "smtp.example.com".to_string(),
            port: 0,
            ..Default::default()
        };
        assert_eq!(field_of(config.validate()), "mail.port");
    }

    #[test]
    fn test_mail_credentials_pairing() {
        let config = MailConfig {
            host: "smtp.example.com".to_string(),
            username: Some("user".to_string()),
            ..Default::default()
        };
        assert_eq!(field_of(config.validate()), "mail.username");
    }

    #[test]
    fn test_metrics_enabled_zero_interval() {
        let config = MetricsConfig {
            enabled: true,
            export_interval_secs: 0,
            ..Default::default()
        };
        assert_eq!(field_of(config.validate()), "metrics.export_interval_secs");
    }

    #[test]
    fn test_logger_invalid_level() {
        let config = LoggerSettings {
            level: "loud".to_string(),
            ..Default::default()
        };
        assert_eq!(field_of(config.validate()), "logger.level");
    }

    #[test]
    fn test_logger_file_enabled_empty_path() {
        let config = LoggerSettings {
            file: FileSettings {
                enabled: true,
                path: String::new(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(field_of(config.validate()), "logger.file.path");
    }

    #[test]
    fn test_settings_reports_first_error() {
        let settings = Settings {
            dispatcher: DispatcherConfig {
                pool_size: 0,
                ..Default::default()
            },
            kavenegar: KavenegarConfig {
                token: String::new(),
                ..enabled_kavenegar()
            },
            ..Default::default()
        };
        assert_eq!(field_of(settings.validate()), "dispatcher.pool_size");
    }
}
