//! SMTP mail provider.
//!
//! Validates the request shape, assembles a plain-text message with `lettre`
//! and submits it through a [`MailTransport`].

use super::provider::{NotificationProvider, Outcome};
use crate::config::{MailConfig, MailSecurity};
use crate::error::{AppError, AppResult, DeliveryError};
use crate::models::{MailNotification, Notification, NotificationKind};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::sync::Arc;
use std::time::Duration;

/// Submission seam between the provider and the SMTP relay
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn submit(&self, message: Message) -> Result<(), DeliveryError>;
}

/// Pooled async SMTP connection to the configured relay
pub struct SmtpMailTransport {
    inner: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailTransport {
    pub fn from_config(config: &MailConfig) -> AppResult<Self> {
        let builder = match config.security {
            MailSecurity::Starttls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            }
            MailSecurity::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host),
            MailSecurity::None => Ok(AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(
                &config.host,
            )),
        }
        .map_err(|e| AppError::Configuration {
            key: "mail.host".to_string(),
            source: anyhow::Error::new(e),
        })?;

        let mut builder = builder
            .port(config.port)
            .timeout(Some(config.timeout()));

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            inner: builder.build(),
        })
    }
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn submit(&self, message: Message) -> Result<(), DeliveryError> {
        self.inner.send(message).await?;
        Ok(())
    }
}

/// Provider for e-mail notifications
pub struct MailProvider {
    transport: Arc<dyn MailTransport>,
    default_from: Option<String>,
    timeout: Duration,
}

impl MailProvider {
    pub fn new(
        transport: Arc<dyn MailTransport>,
        default_from: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            transport,
            default_from,
            timeout,
        }
    }

    /// Provider backed by the SMTP relay described in `[mail]`
    pub fn from_config(config: &MailConfig) -> AppResult<Self> {
        let transport = SmtpMailTransport::from_config(config)?;
        Ok(Self::new(
            Arc::new(transport),
            config.from.clone(),
            config.timeout(),
        ))
    }

    /// First failing shape check, in recipients > subject > body order
    fn validate(mail: &MailNotification) -> Option<&'static str> {
        if mail.recipients.is_empty() {
            Some("Email should have at least one recipient")
        } else if mail.subject.trim().is_empty() {
            Some("Email should have a valid subject")
        } else if mail.body.trim().is_empty() {
            Some("Email should have a valid body")
        } else {
            None
        }
    }

    fn build_message(&self, mail: &MailNotification) -> Result<Message, DeliveryError> {
        let mut builder = Message::builder().subject(mail.subject.as_str());

        if let Some(from) = mail.sender.as_deref().or(self.default_from.as_deref()) {
            builder = builder.from(from.parse::<Mailbox>()?);
        }
        for to in &mail.recipients {
            builder = builder.to(to.parse::<Mailbox>()?);
        }
        for cc in &mail.cc {
            builder = builder.cc(cc.parse::<Mailbox>()?);
        }
        for bcc in &mail.bcc {
            builder = builder.bcc(bcc.parse::<Mailbox>()?);
        }

        Ok(builder
            .header(ContentType::TEXT_PLAIN)
            .body(mail.body.clone())?)
    }

    async fn deliver(&self, mail: &MailNotification) -> Outcome {
        if let Some(reason) = Self::validate(mail) {
            return Outcome::failed_with_log(reason);
        }

        let message = match self.build_message(mail) {
            Ok(message) => message,
            Err(e) => return Outcome::failed(e),
        };

        match tokio::time::timeout(self.timeout, self.transport.submit(message)).await {
            Ok(Ok(())) => Outcome::success(),
            Ok(Err(e)) => Outcome::failed(e),
            Err(_) => Outcome::failed(DeliveryError::Timeout(self.timeout)),
        }
    }
}

#[async_trait]
impl NotificationProvider for MailProvider {
    fn name(&self) -> &'static str {
        "smtp"
    }

    fn supported_kinds(&self) -> &'static [NotificationKind] {
        &[NotificationKind::Email]
    }

    async fn send(&self, notification: &Notification) -> Outcome {
        match notification {
            Notification::Mail(mail) => self.deliver(mail).await,
            other => Outcome::failed_with_log(format!("{} is not supported", other.type_name())),
        }
    }
}
