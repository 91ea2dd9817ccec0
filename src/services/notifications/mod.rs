//! Notification delivery with pluggable providers.
//!
//! The core trait `NotificationProvider` is implemented once per delivery
//! channel; `ProviderRegistry` holds the enabled providers in routing order.

mod kavenegar_provider;
mod mail_provider;
mod provider;
mod registry;

pub use kavenegar_provider::KavenegarProvider;
pub use mail_provider::{MailProvider, MailTransport, SmtpMailTransport};
pub use provider::{NotificationProvider, Outcome};
pub use registry::ProviderRegistry;
