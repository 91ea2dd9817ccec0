use std::time::Duration;

use thiserror::Error;

/// Typed cause of a failed delivery attempt.
///
/// Every variant maps to a stable [`kind`](DeliveryError::kind) string, which
/// is what ends up in the `exception` tag of the handled-notification metric.
#[derive(Error, Debug)]
pub enum DeliveryError {
    /// Transport-level HTTP failure (connect, timeout, malformed response)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider call did not complete within its configured timeout
    #[error("Delivery timed out after {0:?}")]
    Timeout(Duration),

    /// The configured endpoint cannot be turned into a request URL
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// A recipient or sender address could not be parsed
    #[error("Invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The mail message could not be assembled
    #[error("Failed to build mail message: {0}")]
    MailBuild(#[from] lettre::error::Error),

    /// The SMTP server rejected the submission or the connection failed
    #[error("SMTP submission failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    /// Any other cause, tagged with its own kind name
    #[error("{kind}: {message}")]
    Other { kind: String, message: String },
}

impl DeliveryError {
    /// Creates a free-form cause with an explicit kind name
    pub fn other(kind: impl Into<String>, message: impl Into<String>) -> Self {
        DeliveryError::Other {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Stable name of this cause, used as the metric `exception` tag
    pub fn kind(&self) -> &str {
        match self {
            DeliveryError::Http(e) if e.is_timeout() => "HttpTimeout",
            DeliveryError::Http(e) if e.is_connect() => "HttpConnect",
            DeliveryError::Http(e) if e.is_body() || e.is_decode() => "HttpBody",
            DeliveryError::Http(_) => "HttpRequest",
            DeliveryError::Timeout(_) => "Timeout",
            DeliveryError::InvalidEndpoint(_) => "InvalidEndpoint",
            DeliveryError::Address(_) => "AddressError",
            DeliveryError::MailBuild(_) => "MailBuildError",
            DeliveryError::Smtp(_) => "SmtpError",
            DeliveryError::Other { kind, .. } => kind,
        }
    }
}
