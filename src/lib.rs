//! Notifier Library
//!
//! Message-driven notification router: decodes notification requests off the
//! message bus, routes each one to the delivery provider able to handle it and
//! records the outcome as metrics.

use shadow_rs::shadow;
shadow!(build);

pub mod bus;
pub mod cli;
pub mod config;
pub mod error;
pub mod external;
pub mod logger;
pub mod metrics;
pub mod models;
pub mod server;
pub mod services;

pub fn pkg_version() -> &'static str {
    build::PKG_VERSION
}

pub fn clap_long_version() -> &'static str {
    build::CLAP_LONG_VERSION
}
