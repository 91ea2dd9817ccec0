//! NATS-backed message bus.

use std::sync::Mutex;

use async_nats::{Client, ConnectOptions, Event};
use async_trait::async_trait;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{MessageBus, PayloadHandler};
use crate::config::NatsConfig;
use crate::error::{AppError, AppResult};

pub struct NatsBus {
    client: Client,
    cancellation_token: CancellationToken,
    subscriptions: Mutex<Vec<JoinHandle<()>>>,
}

impl NatsBus {
    /// Connect to the configured servers
    ///
    /// # Errors
    ///
    /// Returns an error if no server in the list accepts the connection.
    pub async fn connect(config: &NatsConfig) -> AppResult<Self> {
        info!(servers = ?config.servers, name = %config.connection_name, "Connecting to NATS");

        let client = ConnectOptions::new()
            .name(&config.connection_name)
            .event_callback(|event| async move {
                match event {
                    Event::Connected => info!("NATS connection established"),
                    Event::Disconnected => warn!("NATS connection lost, reconnecting"),
                    other => debug!(event = %other, "NATS connection event"),
                }
            })
            .connect(config.servers.as_slice())
            .await
            .map_err(|e| AppError::bus("connect", e))?;

        Ok(Self {
            client,
            cancellation_token: CancellationToken::new(),
            subscriptions: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl MessageBus for NatsBus {
    async fn subscribe(
        &self,
        subject: &str,
        queue_group: &str,
        handler: PayloadHandler,
    ) -> AppResult<()> {
        let mut subscriber = self
            .client
            .queue_subscribe(subject.to_string(), queue_group.to_string())
            .await
            .map_err(|e| AppError::bus(format!("subscribe to {}", subject), e))?;

        info!(subject, queue_group, "Subscribed to notification requests");

        let token = self.cancellation_token.clone();
        let subject = subject.to_string();
        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        if let Err(e) = subscriber.unsubscribe().await {
                            warn!(subject = %subject, error = %e, "Failed to unsubscribe");
                        }
                        break;
                    }
                    message = subscriber.next() => match message {
                        Some(message) => handler(message.payload),
                        None => {
                            warn!(subject = %subject, "NATS subscription ended");
                            break;
                        }
                    },
                }
            }
        });

        if let Ok(mut subscriptions) = self.subscriptions.lock() {
            subscriptions.push(task);
        }
        Ok(())
    }

    async fn close(&self) -> AppResult<()> {
        self.cancellation_token.cancel();

        let tasks = match self.subscriptions.lock() {
            Ok(mut subscriptions) => std::mem::take(&mut *subscriptions),
            Err(_) => Vec::new(),
        };
        for task in tasks {
            if let Err(e) = task.await {
                warn!(error = %e, "Subscription task failed");
            }
        }

        self.client
            .flush()
            .await
            .map_err(|e| AppError::bus("flush", e))?;
        info!("NATS connection closed");
        Ok(())
    }
}
