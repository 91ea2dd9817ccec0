//! Server lifecycle: wire the pipeline, subscribe, wait for shutdown, drain.

use std::future::Future;
use std::sync::Arc;

use tokio::signal;
use tracing::{error, info, warn};

use crate::bus::{MessageBus, NatsBus, PayloadHandler};
use crate::config::{Environment, settings::Settings};
use crate::external::build_http_client;
use crate::metrics::{MetricsSink, NoopMetrics, OtelMetrics};
use crate::services::notifications::ProviderRegistry;
use crate::services::{Dispatcher, WorkerPool};

pub struct Server {
    settings: Settings,
    metrics: Option<Arc<dyn MetricsSink>>,
}

impl Server {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            metrics: None,
        }
    }

    /// Record metrics into `sink` instead of the configured exporter
    pub fn with_metrics_sink(mut self, sink: Arc<dyn MetricsSink>) -> Self {
        self.metrics = Some(sink);
        self
    }

    /// Connect to NATS and serve until Ctrl+C or SIGTERM
    ///
    /// # Errors
    /// - Bus connection or subscription errors
    /// - Metrics exporter or HTTP client initialization errors
    /// - Queued notifications not drained within the shutdown timeout
    pub async fn run(self) -> anyhow::Result<()> {
        self.log_configuration();

        let bus = NatsBus::connect(&self.settings.nats).await?;
        self.serve(&bus, shutdown_signal()).await
    }

    /// Serve notification requests from `bus` until `shutdown` completes
    ///
    /// Shutdown order: the bus stops delivering, queued payloads are drained,
    /// then the metrics exporter flushes.
    pub async fn serve<B, F>(self, bus: &B, shutdown: F) -> anyhow::Result<()>
    where
        B: MessageBus + ?Sized,
        F: Future<Output = ()>,
    {
        let exporter = match (&self.metrics, self.settings.metrics.enabled) {
            (None, true) => Some(OtelMetrics::init(&self.settings.metrics)?),
            _ => None,
        };
        let metrics: Arc<dyn MetricsSink> = match (self.metrics, &exporter) {
            (Some(sink), _) => sink,
            (None, Some(exporter)) => Arc::new(exporter.clone()),
            (None, None) => Arc::new(NoopMetrics),
        };

        let http_client = build_http_client(&self.settings.http)?;
        let registry = ProviderRegistry::from_settings(&self.settings, http_client)?;
        info!(providers = ?registry.names(), "Notification providers registered");

        let dispatcher = Arc::new(Dispatcher::new(Arc::new(registry), metrics));
        let pool = Arc::new(WorkerPool::start(
            dispatcher,
            self.settings.dispatcher.pool_size,
        ));

        let handler_pool = pool.clone();
        let handler: PayloadHandler = Arc::new(move |payload| {
            handler_pool.dispatch(payload);
        });
        bus.subscribe(
            &self.settings.nats.subject,
            &self.settings.nats.queue_group,
            handler,
        )
        .await?;

        info!(subject = %self.settings.nats.subject, "Notifier started");

        shutdown.await;
        info!("Shutting down");

        if let Err(e) = bus.close().await {
            warn!(error = %e, "Failed to close message bus cleanly");
        }

        let drained = pool
            .shutdown(self.settings.dispatcher.shutdown_timeout())
            .await;

        if let Some(exporter) = exporter
            && let Err(e) = exporter.shutdown()
        {
            warn!(error = %e, "Failed to flush metrics exporter");
        }

        drained?;
        info!("Shutdown complete");
        Ok(())
    }

    fn log_configuration(&self) {
        let settings = &self.settings;

        info!(
            app_name = %settings.application.name,
            app_version = %settings.application.version,
            environment = %Environment::from_env().as_str(),
            "Application starting"
        );

        info!(
            servers = ?settings.nats.servers,
            subject = %settings.nats.subject,
            queue_group = %settings.nats.queue_group,
            "Message bus configuration loaded"
        );

        info!(
            pool_size = settings.dispatcher.pool_size,
            shutdown_timeout_secs = settings.dispatcher.shutdown_timeout_secs,
            "Dispatcher configuration loaded"
        );

        // Never log the API token or SMTP password
        info!(
            kavenegar_enabled = settings.kavenegar.enabled,
            kavenegar_token_configured = !settings.kavenegar.token.is_empty(),
            mail_configured = settings.mail.is_configured(),
            mail_host = %settings.mail.host,
            mail_security = settings.mail.security.as_str(),
            "Provider configuration loaded"
        );

        info!(
            enabled = settings.metrics.enabled,
            endpoint = %settings.metrics.endpoint,
            "Metrics configuration loaded"
        );
    }
}

/// Waits for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
