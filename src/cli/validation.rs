//! Value parsers for CLI arguments clap cannot check on its own

use std::fs;
use std::path::PathBuf;

const MAX_POOL_SIZE: usize = 1024;

/// Validate pool size is within 1..=1024
pub fn validate_pool_size(size_str: &str) -> Result<usize, String> {
    let size: usize = size_str.parse().map_err(|_| {
        format!(
            "Pool size must be a number between 1 and {}, got: '{}'",
            MAX_POOL_SIZE, size_str
        )
    })?;

    if size == 0 || size > MAX_POOL_SIZE {
        return Err(format!(
            "Pool size must be between 1 and {}, got: {}",
            MAX_POOL_SIZE, size
        ));
    }

    Ok(size)
}

/// Validate a NATS subject: dot separated tokens, `*` matches one token,
/// `>` matches the rest and may only appear last
pub fn validate_subject(subject_str: &str) -> Result<String, String> {
    let subject = subject_str.trim();

    if subject.is_empty() {
        return Err("Subject cannot be empty".to_string());
    }

    if subject.chars().any(char::is_whitespace) {
        return Err(format!("Subject cannot contain whitespace: '{}'", subject));
    }

    let tokens: Vec<&str> = subject.split('.').collect();
    for (index, token) in tokens.iter().enumerate() {
        if token.is_empty() {
            return Err(format!("Subject contains an empty token: '{}'", subject));
        }
        if *token == ">" && index != tokens.len() - 1 {
            return Err(format!(
                "The '>' wildcard must be the last token: '{}'",
                subject
            ));
        }
    }

    Ok(subject.to_string())
}

/// Validate that a file path is accessible (exists and is readable)
pub fn validate_config_file_path(path_str: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(format!("Configuration file does not exist: '{}'", path_str));
    }

    if !path.is_file() {
        return Err(format!("Configuration path is not a file: '{}'", path_str));
    }

    match fs::File::open(&path) {
        Ok(_) => Ok(path),
        Err(e) => Err(format!(
            "Cannot read configuration file '{}': {}",
            path_str, e
        )),
    }
}
