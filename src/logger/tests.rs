//! Tests for the logger module

use crate::logger::config::*;
use crate::logger::writer::AppendFileWriter;
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::fmt::MakeWriter;

mod config_tests {
    use super::*;

    fn console_only() -> LoggerConfig {
        LoggerConfig {
            console: ConsoleConfig::new(true, false),
            file: FileConfig {
                enabled: false,
                path: PathBuf::from("test.log"),
                append: true,
                format: LogFormat::Full,
            },
            level: "info".to_string(),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = LoggerConfig::default();
        assert!(config.console.enabled);
        assert!(!config.file.enabled);
        assert_eq!(config.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_both_outputs_disabled() {
        let mut config = console_only();
        config.console.enabled = false;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_valid_log_levels() {
        for level in LOG_LEVELS {
            let config = console_only().with_level(*level);
            assert!(config.validate().is_ok(), "Level {} should be valid", level);
        }
        assert!(console_only().with_level("verbose").validate().is_err());
    }

    #[test]
    fn test_enabled_file_requires_path() {
        let result = FileConfig::new(true, PathBuf::new(), true, LogFormat::Json);
        assert!(result.is_err());
    }

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("full".parse::<LogFormat>().unwrap(), LogFormat::Full);
        assert_eq!("COMPACT".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!("xml".parse::<LogFormat>().is_err());
        assert_eq!(LogFormat::default(), LogFormat::Full);
    }
}

mod writer_tests {
    use super::*;
    use tempfile::TempDir;

    fn file_config(path: PathBuf, append: bool) -> FileConfig {
        FileConfig {
            enabled: true,
            path,
            append,
            format: LogFormat::Json,
        }
    }

    #[test]
    fn test_writer_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deeper").join("notifier.log");

        let writer = AppendFileWriter::new(&file_config(path.clone(), true)).unwrap();
        writer.make_writer().write_all(b"hello\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");
    }

    #[test]
    fn test_writer_appends_to_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notifier.log");
        std::fs::write(&path, "first\n").unwrap();

        let writer = AppendFileWriter::new(&file_config(path.clone(), true)).unwrap();
        writer.make_writer().write_all(b"second\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn test_writer_truncates_without_append() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notifier.log");
        std::fs::write(&path, "stale\n").unwrap();

        let writer = AppendFileWriter::new(&file_config(path.clone(), false)).unwrap();
        writer.make_writer().write_all(b"fresh\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "fresh\n");
    }
}

mod combined_output_tests {
    use super::*;
    use crate::logger::combined_subscriber;
    use tempfile::TempDir;
    use tracing_subscriber::EnvFilter;

    #[test]
    fn test_every_file_format_combines_with_console() {
        for format in [LogFormat::Full, LogFormat::Compact, LogFormat::Json] {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("notifier.log");
            let config = LoggerConfig {
                console: ConsoleConfig::new(true, false),
                file: FileConfig {
                    enabled: true,
                    path: path.clone(),
                    append: true,
                    format,
                },
                level: "info".to_string(),
            };

            let subscriber = combined_subscriber(&config, EnvFilter::new("info")).unwrap();
            tracing::subscriber::with_default(subscriber, || {
                tracing::info!(notification_type = "sms", "combined output works");
                tracing::debug!("filtered out");
            });

            let written = std::fs::read_to_string(&path).unwrap();
            assert!(written.contains("combined output works"), "{:?}: {}", format, written);
            assert!(!written.contains("filtered out"), "{:?}: {}", format, written);
            assert!(!written.contains('\u{1b}'), "{:?} file output has ANSI codes", format);
        }
    }
}

mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn property_unknown_levels_are_rejected(level in "[a-z]{1,10}") {
            let config = LoggerConfig::default().with_level(level.clone());
            let known = LOG_LEVELS.contains(&level.as_str());
            prop_assert_eq!(config.validate().is_ok(), known);
        }
    }
}
