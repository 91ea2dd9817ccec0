//! Notification models.
//!
//! `NotificationRequest` is the protobuf payload published on the bus;
//! `Notification` is the validated runtime value handed to providers.

use std::collections::HashSet;
use std::fmt;

use prost::Message;
use thiserror::Error;

// ============================================================================
// Wire schema
// ============================================================================

/// Inbound request as encoded by producers
#[derive(Clone, PartialEq, Message)]
pub struct NotificationRequest {
    #[prost(enumeration = "NotificationType", tag = "1")]
    pub notification_type: i32,
    #[prost(string, tag = "2")]
    pub message: String,
    #[prost(string, repeated, tag = "3")]
    pub recipients: Vec<String>,
    #[prost(string, tag = "4")]
    pub subject: String,
    #[prost(string, tag = "5")]
    pub body: String,
    /// Empty means "use the configured default sender"
    #[prost(string, tag = "6")]
    pub sender: String,
    #[prost(string, repeated, tag = "7")]
    pub cc: Vec<String>,
    #[prost(string, repeated, tag = "8")]
    pub bcc: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum NotificationType {
    Default = 0,
    Sms = 1,
    Call = 2,
    Email = 3,
}

/// Reasons a payload never becomes a [`Notification`]
#[derive(Debug, Error)]
pub enum WireError {
    #[error("Malformed notification payload: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("Invalid notification type: {0}")]
    InvalidType(i32),
}

impl WireError {
    /// Metric `exception` tag for this error
    pub fn kind(&self) -> &'static str {
        match self {
            WireError::Decode(_) => "DecodeError",
            WireError::InvalidType(_) => "InvalidNotificationType",
        }
    }
}

// ============================================================================
// Runtime model
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsNotification {
    pub message: String,
    pub recipients: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallNotification {
    pub message: String,
    pub recipients: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailNotification {
    pub subject: String,
    pub body: String,
    pub recipients: Vec<String>,
    pub sender: Option<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
}

/// A decoded request, one variant per delivery channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Sms(SmsNotification),
    Call(CallNotification),
    Mail(MailNotification),
}

/// Discriminant of [`Notification`], rendered into the metric `type` tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    Sms,
    Call,
    Email,
}

impl NotificationKind {
    /// Tag value used when no kind could be determined
    pub const INVALID: &'static str = "invalid";

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Sms => "sms",
            NotificationKind::Call => "call",
            NotificationKind::Email => "email",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Notification {
    /// Decode a bus payload straight into a runtime notification
    pub fn from_bytes(payload: &[u8]) -> Result<Self, WireError> {
        NotificationRequest::decode(payload)?.try_into()
    }

    pub fn kind(&self) -> NotificationKind {
        match self {
            Notification::Sms(_) => NotificationKind::Sms,
            Notification::Call(_) => NotificationKind::Call,
            Notification::Mail(_) => NotificationKind::Email,
        }
    }

    /// Variant name used in diagnostic messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Notification::Sms(_) => "SmsNotification",
            Notification::Call(_) => "CallNotification",
            Notification::Mail(_) => "MailNotification",
        }
    }
}

impl TryFrom<NotificationRequest> for Notification {
    type Error = WireError;

    fn try_from(request: NotificationRequest) -> Result<Self, Self::Error> {
        let NotificationRequest {
            notification_type,
            message,
            recipients,
            subject,
            body,
            sender,
            cc,
            bcc,
        } = request;

        match NotificationType::try_from(notification_type) {
            Ok(NotificationType::Sms) => Ok(Notification::Sms(SmsNotification {
                message,
                recipients: unique(recipients),
            })),
            Ok(NotificationType::Call) => Ok(Notification::Call(CallNotification {
                message,
                recipients: unique(recipients),
            })),
            Ok(NotificationType::Email) => Ok(Notification::Mail(MailNotification {
                subject,
                body,
                recipients: unique(recipients),
                sender: Some(sender).filter(|s| !s.is_empty()),
                cc: unique(cc),
                bcc: unique(bcc),
            })),
            Ok(NotificationType::Default) | Err(_) => Err(WireError::InvalidType(notification_type)),
        }
    }
}

impl From<&Notification> for NotificationRequest {
    fn from(notification: &Notification) -> Self {
        match notification {
            Notification::Sms(sms) => NotificationRequest {
                notification_type: NotificationType::Sms.into(),
                message: sms.message.clone(),
                recipients: sms.recipients.clone(),
                ..Default::default()
            },
            Notification::Call(call) => NotificationRequest {
                notification_type: NotificationType::Call.into(),
                message: call.message.clone(),
                recipients: call.recipients.clone(),
                ..Default::default()
            },
            Notification::Mail(mail) => NotificationRequest {
                notification_type: NotificationType::Email.into(),
                subject: mail.subject.clone(),
                body: mail.body.clone(),
                recipients: mail.recipients.clone(),
                sender: mail.sender.clone().unwrap_or_default(),
                cc: mail.cc.clone(),
                bcc: mail.bcc.clone(),
                ..Default::default()
            },
        }
    }
}

/// Drops repeated addresses, keeping first-seen order
fn unique(values: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(values.len());
    values
        .into_iter()
        .filter(|value| seen.insert(value.clone()))
        .collect()
}
