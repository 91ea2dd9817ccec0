//! Notification routing and delivery.

mod dispatcher;
pub mod notifications;
mod worker_pool;

pub use dispatcher::{Dispatcher, NO_NOTIFICATION_HANDLER, PANIC};
pub use worker_pool::{WORKER_POOL_CLOSED, WorkerPool};
