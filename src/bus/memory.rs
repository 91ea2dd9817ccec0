//! In-process message bus.

use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;

use super::{MessageBus, PayloadHandler};
use crate::error::AppResult;

struct Subscription {
    subject: String,
    handler: PayloadHandler,
}

/// Delivers published payloads synchronously to matching subscribers
///
/// Subjects match exactly or through a trailing `*`/`>` wildcard token.
/// Queue groups are ignored since there is only one process.
#[derive(Default)]
pub struct InMemoryBus {
    subscriptions: RwLock<Vec<Subscription>>,
}

impl InMemoryBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a payload, returning how many handlers received it
    pub fn publish(&self, subject: &str, payload: impl Into<Bytes>) -> usize {
        let payload = payload.into();
        let Ok(subscriptions) = self.subscriptions.read() else {
            return 0;
        };

        subscriptions
            .iter()
            .filter(|s| subject_matches(&s.subject, subject))
            .map(|s| (s.handler)(payload.clone()))
            .count()
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.read().map_or(0, |s| s.len())
    }
}

fn subject_matches(pattern: &str, subject: &str) -> bool {
    let mut pattern_tokens = pattern.split('.');
    let mut subject_tokens = subject.split('.');

    loop {
        match (pattern_tokens.next(), subject_tokens.next()) {
            (Some(">"), Some(_)) => return true,
            (Some("*"), Some(_)) => {}
            (Some(p), Some(s)) if p == s => {}
            (None, None) => return true,
            _ => return false,
        }
    }
}

#[async_trait]
impl MessageBus for InMemoryBus {
    async fn subscribe(
        &self,
        subject: &str,
        _queue_group: &str,
        handler: PayloadHandler,
    ) -> AppResult<()> {
        if let Ok(mut subscriptions) = self.subscriptions.write() {
            subscriptions.push(Subscription {
                subject: subject.to_string(),
                handler,
            });
        }
        Ok(())
    }

    async fn close(&self) -> AppResult<()> {
        if let Ok(mut subscriptions) = self.subscriptions.write() {
            subscriptions.clear();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_subject_matching() {
        assert!(subject_matches("notifier.notifications.*", "notifier.notifications.sms"));
        assert!(!subject_matches("notifier.notifications.*", "notifier.notifications"));
        assert!(!subject_matches("notifier.notifications.*", "notifier.notifications.sms.x"));
        assert!(subject_matches("notifier.>", "notifier.notifications.sms"));
        assert!(subject_matches("exact", "exact"));
        assert!(!subject_matches("exact", "other"));
    }

    #[tokio::test]
    async fn test_publish_reaches_subscribers_until_closed() {
        let bus = InMemoryBus::new();
        let received = Arc::new(AtomicUsize::new(0));
        let counter = received.clone();

        bus.subscribe(
            "notifier.notifications.*",
            "notifier-group",
            Arc::new(move |_payload| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        )
        .await
        .unwrap();

        assert_eq!(bus.publish("notifier.notifications.sms", vec![1u8, 2, 3]), 1);
        assert_eq!(bus.publish("other.subject", Bytes::new()), 0);
        assert_eq!(received.load(Ordering::SeqCst), 1);

        bus.close().await.unwrap();
        assert_eq!(bus.subscription_count(), 0);
        assert_eq!(bus.publish("notifier.notifications.sms", Bytes::new()), 0);
    }
}
