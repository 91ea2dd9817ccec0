//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use prost::Message;

use notifier::error::DeliveryError;
use notifier::models::{Notification, NotificationKind, NotificationRequest, NotificationType};
use notifier::services::notifications::{NotificationProvider, Outcome};

/// What a [`FakeProvider`] does when asked to send
#[derive(Clone, Copy)]
pub enum Behavior {
    Succeed,
    Fail,
    /// Fail with a typed `SomeError` cause
    FailWithCause,
    Panic,
}

pub struct FakeProvider {
    name: &'static str,
    kinds: &'static [NotificationKind],
    behavior: Behavior,
    calls: AtomicUsize,
}

impl FakeProvider {
    pub fn new(
        name: &'static str,
        kinds: &'static [NotificationKind],
        behavior: Behavior,
    ) -> Arc<Self> {
        Arc::new(Self {
            name,
            kinds,
            behavior,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotificationProvider for FakeProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    fn supported_kinds(&self) -> &'static [NotificationKind] {
        self.kinds
    }

    async fn send(&self, _notification: &Notification) -> Outcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            Behavior::Succeed => Outcome::success_with_log("Delivered"),
            Behavior::Fail => Outcome::failed_with_log("Rejected"),
            Behavior::FailWithCause => Outcome::failed(DeliveryError::other("SomeError", "boom")),
            Behavior::Panic => panic!("provider exploded"),
        }
    }
}

pub fn sms_payload(message: &str, recipients: &[&str]) -> Vec<u8> {
    request(NotificationType::Sms, message, recipients)
}

pub fn call_payload(message: &str, recipients: &[&str]) -> Vec<u8> {
    request(NotificationType::Call, message, recipients)
}

pub fn email_payload(subject: &str, body: &str, recipients: &[&str]) -> Vec<u8> {
    NotificationRequest {
        notification_type: NotificationType::Email.into(),
        subject: subject.to_string(),
        body: body.to_string(),
        recipients: recipients.iter().map(|r| r.to_string()).collect(),
        ..Default::default()
    }
    .encode_to_vec()
}

fn request(notification_type: NotificationType, message: &str, recipients: &[&str]) -> Vec<u8> {
    NotificationRequest {
        notification_type: notification_type.into(),
        message: message.to_string(),
        recipients: recipients.iter().map(|r| r.to_string()).collect(),
        ..Default::default()
    }
    .encode_to_vec()
}
