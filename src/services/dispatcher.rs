//! Dispatch of one bus payload: decode, route, deliver, record.
//!
//! Every payload ends in exactly one `notifications.handled` sample and one
//! log line, whatever happens on the way.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use tracing::{Instrument, debug, error, warn};
use uuid::Uuid;

use crate::metrics::{MetricsSink, NOTIFICATIONS_HANDLED};
use crate::models::{Notification, NotificationKind, WireError};
use crate::services::notifications::{Outcome, ProviderRegistry};

/// Exception tag when no registered provider accepts a notification
pub const NO_NOTIFICATION_HANDLER: &str = "NoNotificationHandler";

/// Exception tag when routing or delivery panicked
pub const PANIC: &str = "Panic";

const STATUS_OK: &str = "ok";
const STATUS_FAILED: &str = "failed";

/// Where routing of a payload stopped
enum Resolution {
    Rejected(WireError),
    Unhandled,
    Delivered(Outcome),
}

/// Routes decoded notifications to the first capable provider
pub struct Dispatcher {
    registry: Arc<ProviderRegistry>,
    metrics: Arc<dyn MetricsSink>,
}

impl Dispatcher {
    pub fn new(registry: Arc<ProviderRegistry>, metrics: Arc<dyn MetricsSink>) -> Self {
        Self { registry, metrics }
    }

    pub fn metrics(&self) -> &Arc<dyn MetricsSink> {
        &self.metrics
    }

    /// Process one payload to completion. Never panics and never fails.
    pub async fn process(&self, payload: &[u8]) {
        let span = tracing::debug_span!("dispatch", dispatch_id = %Uuid::new_v4());

        async {
            let started = Instant::now();
            let mut kind = None;
            let result = AssertUnwindSafe(self.route(payload, &mut kind))
                .catch_unwind()
                .await;
            self.record(started.elapsed(), kind, result);
        }
        .instrument(span)
        .await
    }

    async fn route(&self, payload: &[u8], kind: &mut Option<NotificationKind>) -> Resolution {
        let notification = match Notification::from_bytes(payload) {
            Ok(notification) => notification,
            Err(e) => return Resolution::Rejected(e),
        };
        *kind = Some(notification.kind());

        let Some(provider) = self.registry.find(&notification) else {
            return Resolution::Unhandled;
        };

        debug!(provider = provider.name(), kind = %notification.kind(), "Routing notification");
        Resolution::Delivered(provider.send(&notification).await)
    }

    fn record(
        &self,
        elapsed: Duration,
        kind: Option<NotificationKind>,
        result: Result<Resolution, Box<dyn Any + Send>>,
    ) {
        let type_tag = kind.map_or(NotificationKind::INVALID, |k| k.as_str());

        match result {
            Ok(Resolution::Delivered(outcome)) if outcome.is_success() => {
                self.handled(elapsed, STATUS_OK, Outcome::NO_EXCEPTION, type_tag);
                debug!(notification_type = type_tag, "{}", outcome);
            }
            Ok(Resolution::Delivered(outcome)) => {
                self.handled(elapsed, STATUS_FAILED, outcome.exception_kind(), type_tag);
                warn!(notification_type = type_tag, "{}", outcome);
            }
            Ok(Resolution::Rejected(e)) => {
                self.handled(elapsed, STATUS_FAILED, e.kind(), NotificationKind::INVALID);
                warn!(error = %e, "Discarding notification request");
            }
            Ok(Resolution::Unhandled) => {
                self.handled(elapsed, STATUS_FAILED, NO_NOTIFICATION_HANDLER, type_tag);
                warn!(notification_type = type_tag, "No provider can handle the notification");
            }
            Err(panic) => {
                self.handled(elapsed, STATUS_FAILED, PANIC, type_tag);
                error!(
                    notification_type = type_tag,
                    panic = panic_message(panic.as_ref()),
                    "Notification dispatch panicked"
                );
            }
        }
    }

    fn handled(&self, elapsed: Duration, status: &str, exception: &str, type_tag: &str) {
        self.metrics.record_timer(
            NOTIFICATIONS_HANDLED,
            elapsed,
            &[("status", status), ("exception", exception), ("type", type_tag)],
        );
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message_variants() {
        let literal: Box<dyn Any + Send> = Box::new("boom");
        let owned: Box<dyn Any + Send> = Box::new(String::from("kaboom"));
        let other: Box<dyn Any + Send> = Box::new(42u8);

        assert_eq!(panic_message(literal.as_ref()), "boom");
        assert_eq!(panic_message(owned.as_ref()), "kaboom");
        assert_eq!(panic_message(other.as_ref()), "non-string panic payload");
    }
}
