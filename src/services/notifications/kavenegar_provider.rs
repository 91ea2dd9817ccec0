//! Kavenegar SMS and text-to-speech gateway provider.
//!
//! Sends `POST {base_url}/v1/{token}/sms/send.json` for SMS and
//! `POST {base_url}/v1/{token}/call/maketts.json` for voice calls. The gateway
//! status code alone decides success; the response body is passed through as
//! the outcome log.

use super::provider::{NotificationProvider, Outcome};
use crate::config::KavenegarConfig;
use crate::error::DeliveryError;
use crate::models::{Notification, NotificationKind};
use async_trait::async_trait;
use reqwest::Url;
use std::time::Duration;
use tracing::debug;

/// Provider for SMS and voice-call notifications
///
/// Shares the application's `reqwest::Client`; each request carries its own
/// timeout so a slow gateway resolves to a timeout failure.
pub struct KavenegarProvider {
    client: reqwest::Client,
    base_url: String,
    token: String,
    sender: String,
    timeout: Duration,
}

impl KavenegarProvider {
    pub fn new(client: reqwest::Client, config: &KavenegarConfig, timeout: Duration) -> Self {
        Self {
            client,
            base_url: config.base_url.clone(),
            token: config.token.clone(),
            sender: config.sender.clone(),
            timeout,
        }
    }

    /// Build `{base_url}/v1/{token}/{group}/{action}?{query}`
    ///
    /// Path segments and query pairs are percent-encoded by `Url`; a trailing
    /// slash on the base URL is tolerated.
    fn endpoint(
        &self,
        group: &str,
        action: &str,
        query: &[(&str, &str)],
    ) -> Result<Url, DeliveryError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| DeliveryError::InvalidEndpoint(format!("{}: {}", self.base_url, e)))?;

        url.path_segments_mut()
            .map_err(|_| {
                DeliveryError::InvalidEndpoint(format!("{} cannot be a base URL", self.base_url))
            })?
            .pop_if_empty()
            .extend(["v1", self.token.as_str(), group, action]);

        url.query_pairs_mut().extend_pairs(query);
        Ok(url)
    }

    fn request_url(&self, notification: &Notification) -> Option<Result<Url, DeliveryError>> {
        match notification {
            Notification::Sms(sms) => {
                let receptor = sms.recipients.join(",");
                Some(self.endpoint(
                    "sms",
                    "send.json",
                    &[
                        ("receptor", receptor.as_str()),
                        ("message", sms.message.as_str()),
                        ("sender", self.sender.as_str()),
                    ],
                ))
            }
            Notification::Call(call) => {
                let receptor = call.recipients.join(",");
                Some(self.endpoint(
                    "call",
                    "maketts.json",
                    &[
                        ("receptor", receptor.as_str()),
                        ("message", call.message.as_str()),
                    ],
                ))
            }
            Notification::Mail(_) => None,
        }
    }

    async fn post(&self, url: Url) -> Outcome {
        let response = match self.client.post(url).timeout(self.timeout).send().await {
            Ok(response) => response,
            Err(e) => return Outcome::failed(e),
        };

        let status = response.status();
        match response.text().await {
            Ok(body) if status.as_u16() < 300 => Outcome::success_with_log(body),
            Ok(body) => {
                debug!(status = status.as_u16(), "Gateway rejected notification");
                Outcome::failed_with_log(body)
            }
            Err(e) => Outcome::failed(e),
        }
    }
}

#[async_trait]
impl NotificationProvider for KavenegarProvider {
    fn name(&self) -> &'static str {
        "kavenegar"
    }

    fn supported_kinds(&self) -> &'static [NotificationKind] {
        &[NotificationKind::Sms, NotificationKind::Call]
    }

    async fn send(&self, notification: &Notification) -> Outcome {
        match self.request_url(notification) {
            Some(Ok(url)) => {
                debug!(kind = %notification.kind(), "Sending notification through Kavenegar");
                self.post(url).await
            }
            Some(Err(e)) => Outcome::failed(e),
            None => Outcome::failed_with_log(format!(
                "{} is not supported",
                notification.type_name()
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CallNotification, MailNotification, SmsNotification};

    fn provider(base_url: &str) -> KavenegarProvider {
        let config = KavenegarConfig {
            enabled: true,
            token: "token".to_string(),
            base_url: base_url.to_string(),
            sender: "sender".to_string(),
        };
        KavenegarProvider::new(reqwest::Client::new(), &config, Duration::from_secs(1))
    }

    fn sms(message: &str, recipients: &[&str]) -> Notification {
        Notification::Sms(SmsNotification {
            message: message.to_string(),
            recipients: recipients.iter().map(|r| r.to_string()).collect(),
        })
    }

    #[test]
    fn test_sms_url() {
        let url = provider("https://api.kavenegar.com/")
            .request_url(&sms("message", &["09129129123"]))
            .unwrap()
            .unwrap();

        assert_eq!(
            url.as_str(),
            "https://api.kavenegar.com/v1/token/sms/send.json?receptor=09129129123&message=message&sender=sender"
        );
    }

    #[test]
    fn test_call_url_has_no_sender() {
        let call = Notification::Call(CallNotification {
            message: "message".to_string(),
            recipients: vec!["09129129123".to_string()],
        });
        let url = provider("https://api.kavenegar.com/")
            .request_url(&call)
            .unwrap()
            .unwrap();

        assert_eq!(url.path(), "/v1/token/call/maketts.json");
        assert!(url.query_pairs().all(|(key, _)| key != "sender"));
    }

    #[test]
    fn test_url_escapes_and_joins_recipients() {
        let url = provider("http://localhost:8080/gateway")
            .request_url(&sms("سلام & bye", &["0912", "0935"]))
            .unwrap()
            .unwrap();

        assert_eq!(url.path(), "/gateway/v1/token/sms/send.json");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs[0], ("receptor".to_string(), "0912,0935".to_string()));
        assert_eq!(pairs[1], ("message".to_string(), "سلام & bye".to_string()));
    }

    #[test]
    fn test_empty_recipients_are_not_rejected() {
        let url = provider("https://api.kavenegar.com/")
            .request_url(&sms("message", &[]))
            .unwrap()
            .unwrap();
        assert!(url.query().unwrap().starts_with("receptor=&"));
    }

    #[test]
    fn test_invalid_base_url() {
        let error = provider("not a url")
            .request_url(&sms("message", &["0912"]))
            .unwrap()
            .unwrap_err();
        assert_eq!(error.kind(), "InvalidEndpoint");
    }

    #[tokio::test]
    async fn test_mail_is_not_supported() {
        let mail = Notification::Mail(MailNotification {
            subject: "Subject".to_string(),
            body: "Body".to_string(),
            recipients: vec!["a@example.com".to_string()],
            sender: None,
            cc: vec![],
            bcc: vec![],
        });

        let kavenegar = provider("https://api.kavenegar.com/");
        assert!(!kavenegar.can_handle(&mail));

        let outcome = kavenegar.send(&mail).await;
        assert!(!outcome.is_success());
        assert!(outcome.cause().is_none());
        assert_eq!(outcome.log(), Some("MailNotification is not supported"));
    }

    #[tokio::test]
    async fn test_invalid_base_url_fails_without_request() {
        let outcome = provider("mailto:ops@example.com")
            .send(&sms("message", &["0912"]))
            .await;
        assert_eq!(outcome.exception_kind(), "InvalidEndpoint");
    }
}
