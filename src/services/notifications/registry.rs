//! Ordered, read-only list of the providers enabled at startup.

use super::kavenegar_provider::KavenegarProvider;
use super::mail_provider::MailProvider;
use super::provider::NotificationProvider;
use crate::config::Settings;
use crate::error::AppResult;
use crate::models::Notification;
use std::sync::Arc;
use tracing::warn;

/// Providers in registration order; the first one that can handle a
/// notification gets it.
#[derive(Default, Clone)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn NotificationProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a provider; earlier registrations take precedence
    pub fn register(mut self, provider: Arc<dyn NotificationProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Build the registry from configuration
    ///
    /// Kavenegar is registered when `[kavenegar] enabled` is set, the SMTP
    /// provider when `[mail] host` is present. An empty registry is valid.
    pub fn from_settings(settings: &Settings, http_client: reqwest::Client) -> AppResult<Self> {
        let mut registry = Self::new();

        if settings.kavenegar.enabled {
            registry = registry.register(Arc::new(KavenegarProvider::new(
                http_client,
                &settings.kavenegar,
                settings.http.call_timeout(),
            )));
        }

        if settings.mail.is_configured() {
            registry = registry.register(Arc::new(MailProvider::from_config(&settings.mail)?));
        }

        if registry.is_empty() {
            warn!("No notification provider is enabled; every request will be unhandled");
        }

        Ok(registry)
    }

    /// First provider whose capability test accepts the notification.
    /// Each provider's `can_handle` runs at most once.
    pub fn find(&self, notification: &Notification) -> Option<&Arc<dyn NotificationProvider>> {
        self.providers.iter().find(|p| p.can_handle(notification))
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.names())
            .finish()
    }
}
