//! Runtime orchestration.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use lynx_runtime::LynxRuntime;
//!
//! // Loads lynx.toml from the current directory plus LYNX_* variables
//! let runtime = LynxRuntime::new()?;
//!
//! runtime
//!     .run(|router| {
//!         router.on_text(|ctx, text| async move {
//!             ctx.add_text(text)?;
//!             Ok(Flow::Stop)
//!         })
//!     })
//!     .await?;
//! ```

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use lynx_core::BoxedPlatform;
use lynx_framework::Router;
use lynx_transport::{LineClient, WebhookServer};

use crate::config::{ConfigLoader, LynxConfig, validate_config};
use crate::error::RuntimeResult;
use crate::logging;

/// Owns the configuration, the platform client and the shutdown signal.
pub struct LynxRuntime {
    config: LynxConfig,
    platform: BoxedPlatform,
    shutdown: CancellationToken,
}

impl LynxRuntime {
    /// Loads configuration from the current directory and environment.
    pub fn new() -> RuntimeResult<Self> {
        Self::builder().build()
    }

    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Validates `config`, initializes logging and creates the API client.
    pub fn from_config(config: LynxConfig) -> RuntimeResult<Self> {
        validate_config(&config)?;
        logging::init_from_config(&config.logging);

        let client = LineClient::new(config.channel.to_client_config())?;
        info!(
            log_level = %config.logging.level,
            api = %config.channel.api_endpoint,
            "Runtime initialized from configuration"
        );

        Ok(Self::from_parts(config, Arc::new(client)))
    }

    /// Uses `platform` instead of an API client built from `config`.
    ///
    /// Neither validates the configuration nor initializes logging.
    pub fn from_parts(config: LynxConfig, platform: BoxedPlatform) -> Self {
        Self {
            config,
            platform,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn config(&self) -> &LynxConfig {
        &self.config
    }

    pub fn platform(&self) -> &BoxedPlatform {
        &self.platform
    }

    /// A fresh router bound to this runtime's platform.
    pub fn router(&self) -> Router {
        Router::new(Arc::clone(&self.platform))
            .message_capacity(self.config.messages.max_per_reply)
    }

    /// Cancelling this token stops a running server.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Serves webhooks until Ctrl+C, SIGTERM or the shutdown token fires.
    pub async fn run<F>(&self, configure: F) -> RuntimeResult<()>
    where
        F: FnOnce(Router) -> Router,
    {
        info!("Lynx runtime is starting. Press Ctrl+C to stop.");
        self.run_until(configure, wait_for_shutdown()).await
    }

    /// Serves webhooks until `shutdown` completes or the shutdown token fires.
    pub async fn run_until<F, S>(&self, configure: F, shutdown: S) -> RuntimeResult<()>
    where
        F: FnOnce(Router) -> Router,
        S: Future<Output = ()>,
    {
        let router = configure(self.router());
        debug!(handlers = router.handler_count(), "Router configured");

        let server = &self.config.server;
        let server = WebhookServer::bind(&server.addr(), &server.path, router).await?;

        let token = self.shutdown.clone();
        let serve = async {
            let result = server.run(token.clone()).await;
            token.cancel();
            result
        };
        let watch = async {
            tokio::select! {
                _ = shutdown => {
                    info!("Shutdown requested");
                    token.cancel();
                }
                _ = token.cancelled() => {}
            }
        };

        let (result, ()) = tokio::join!(serve, watch);
        result?;

        info!("Runtime stopped");
        Ok(())
    }
}

/// Waits for Ctrl+C or, on Unix, SIGTERM.
async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = signal::ctrl_c() => {
                        info!("Received Ctrl+C, shutting down");
                    }
                    _ = sigterm.recv() => {
                        info!("Received SIGTERM, shutting down");
                    }
                }
                return;
            }
            Err(e) => warn!(error = %e, "Failed to register SIGTERM handler"),
        }
    }

    match signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down"),
        Err(e) => error!(error = %e, "Failed to listen for Ctrl+C"),
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for a [`LynxRuntime`] with custom configuration sources.
///
/// ```rust,ignore
/// let runtime = LynxRuntime::builder()
///     .config_file("deploy/lynx.toml")
///     .profile("production")
///     .build()?;
/// ```
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new(),
        }
    }

    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.config_loader = self.config_loader.profile(profile.into());
        self
    }

    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Merges configuration set in code beneath files and environment.
    pub fn merge(mut self, config: LynxConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    pub fn build(self) -> RuntimeResult<LynxRuntime> {
        let config = self.config_loader.load()?;
        LynxRuntime::from_config(config)
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
