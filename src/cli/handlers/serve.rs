//! Serve command handler
//!
//! Runs the dispatch server, or only checks the configuration on `--dry-run`.

use crate::config::settings::Settings;
use crate::error::AppResult;
use crate::server::Server;

pub struct ServeCommandHandler {
    config: Settings,
}

impl ServeCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// Run the server until a shutdown signal arrives
    ///
    /// # Errors
    /// - Configuration validation errors
    /// - Bus connection, metrics exporter or provider setup errors (if not dry-run)
    pub async fn execute(self, dry_run: bool) -> AppResult<()> {
        if dry_run {
            return self.validate_only();
        }

        Server::new(self.config).run().await?;
        Ok(())
    }

    /// Validate configuration and print what the server would do
    pub fn validate_only(&self) -> AppResult<()> {
        self.config.validate()?;

        let config = &self.config;
        println!("✓ Configuration is valid");
        println!(
            "✓ Would subscribe to '{}' (queue group '{}') on {}",
            config.nats.subject,
            config.nats.queue_group,
            config.nats.servers.join(", ")
        );
        println!("✓ Dispatch workers: {}", config.dispatcher.pool_size);
        println!("✓ Providers: {}", self.provider_summary().join(", "));
        if config.metrics.enabled {
            println!("✓ Metrics exported to {}", config.metrics.endpoint);
        } else {
            println!("✓ Metrics export disabled");
        }

        println!("Dry run completed successfully - configuration is ready for deployment");
        Ok(())
    }

    fn provider_summary(&self) -> Vec<&'static str> {
        let mut providers = Vec::new();
        if self.config.kavenegar.enabled {
            providers.push("kavenegar");
        }
        if self.config.mail.is_configured() {
            providers.push("smtp");
        }
        if providers.is_empty() {
            providers.push("none");
        }
        providers
    }

    pub fn config(&self) -> &Settings {
        &self.config
    }
}
