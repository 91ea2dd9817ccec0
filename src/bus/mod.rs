//! Message bus abstraction.
//!
//! Notification requests arrive as opaque payloads on a subject. The server
//! only needs to subscribe a handler and close the connection on shutdown:
//!
//! - **NATS** ([`NatsBus`]): queue subscription shared by all instances
//! - **Memory** ([`InMemoryBus`]): in-process delivery for tests and local runs

mod memory;
mod nats;

pub use memory::InMemoryBus;
pub use nats::NatsBus;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::AppResult;

/// Callback invoked for every payload. Must return quickly.
pub type PayloadHandler = Arc<dyn Fn(Bytes) + Send + Sync>;

#[async_trait]
pub trait MessageBus: Send + Sync {
    /// Deliver payloads published on `subject` to `handler`. Instances sharing
    /// `queue_group` split the traffic between them.
    async fn subscribe(
        &self,
        subject: &str,
        queue_group: &str,
        handler: PayloadHandler,
    ) -> AppResult<()>;

    /// Stop every subscription and flush the connection
    async fn close(&self) -> AppResult<()>;
}
