//! Core notification provider trait and outcome types.
//!
//! Every delivery backend implements [`NotificationProvider`]; the dispatcher
//! only ever sees providers through this trait.

use crate::error::DeliveryError;
use crate::models::{Notification, NotificationKind};
use async_trait::async_trait;
use std::fmt;

/// Result of a single delivery attempt
#[derive(Debug)]
pub enum Outcome {
    Success {
        log: Option<String>,
    },
    Failure {
        cause: Option<DeliveryError>,
        log: Option<String>,
    },
}

impl Outcome {
    /// Exception tag reported when a failure carries no typed cause
    pub const UNKNOWN_EXCEPTION: &'static str = "Unknown";

    /// Exception tag reported for successful deliveries
    pub const NO_EXCEPTION: &'static str = "none";

    pub fn success() -> Self {
        Outcome::Success { log: None }
    }

    pub fn success_with_log(log: impl Into<String>) -> Self {
        Outcome::Success {
            log: Some(log.into()),
        }
    }

    pub fn failed(cause: impl Into<DeliveryError>) -> Self {
        Outcome::Failure {
            cause: Some(cause.into()),
            log: None,
        }
    }

    pub fn failed_with_log(log: impl Into<String>) -> Self {
        Outcome::Failure {
            cause: None,
            log: Some(log.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    pub fn log(&self) -> Option<&str> {
        match self {
            Outcome::Success { log } | Outcome::Failure { log, .. } => log.as_deref(),
        }
    }

    pub fn cause(&self) -> Option<&DeliveryError> {
        match self {
            Outcome::Success { .. } => None,
            Outcome::Failure { cause, .. } => cause.as_ref(),
        }
    }

    /// Metric `exception` tag: `none`, the cause kind, or `Unknown`
    pub fn exception_kind(&self) -> &str {
        match self {
            Outcome::Success { .. } => Self::NO_EXCEPTION,
            Outcome::Failure {
                cause: Some(cause), ..
            } => cause.kind(),
            Outcome::Failure { cause: None, .. } => Self::UNKNOWN_EXCEPTION,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success { log } => {
                write!(f, "Successful: {}", log.as_deref().unwrap_or("No Log"))
            }
            Outcome::Failure { cause, log } => match (cause, log) {
                (Some(cause), Some(log)) => write!(f, "Failed: {} ({})", cause, log),
                (Some(cause), None) => write!(f, "Failed: {}", cause),
                (None, Some(log)) => write!(f, "Failed: {}", log),
                (None, None) => f.write_str("Failed: No Details"),
            },
        }
    }
}

/// Trait for delivery backends (SMTP, SMS gateway, ...)
///
/// Uses `async_trait` so providers can live behind `Arc<dyn NotificationProvider>`.
/// `send` never errors: every fault, including transport errors and timeouts,
/// comes back as [`Outcome::Failure`].
///
/// # Example Implementation
/// ```ignore
/// struct ConsoleProvider;
///
/// #[async_trait]
/// impl NotificationProvider for ConsoleProvider {
///     fn name(&self) -> &'static str {
///         "console"
///     }
///
///     fn supported_kinds(&self) -> &'static [NotificationKind] {
///         &[NotificationKind::Sms]
///     }
///
///     async fn send(&self, notification: &Notification) -> Outcome {
///         println!("{:?}", notification);
///         Outcome::success()
///     }
/// }
/// ```
#[async_trait]
pub trait NotificationProvider: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &'static str;

    /// Notification variants this provider declares it can deliver
    fn supported_kinds(&self) -> &'static [NotificationKind];

    /// Capability test; must be pure and depend only on the variant
    fn can_handle(&self, notification: &Notification) -> bool {
        self.supported_kinds().contains(&notification.kind())
    }

    /// Deliver the notification. Only called after `can_handle` returned true.
    async fn send(&self, notification: &Notification) -> Outcome;
}
