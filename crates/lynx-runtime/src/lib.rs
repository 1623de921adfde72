//! Lynx Runtime - orchestration layer for the Lynx bot framework.
//!
//! This crate provides:
//! - Layered configuration loading (`ConfigLoader`, `LynxConfig`)
//! - Logging configuration (`LoggingBuilder`)
//! - Runtime orchestration (`LynxRuntime`): API client, webhook server and
//!   graceful shutdown
//!
//! ```ignore
//! use lynx_runtime::LynxRuntime;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = LynxRuntime::new()?;
//!     runtime.run(|router| router.on_follow(greet)).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

// Re-exports
pub use config::{ConfigError, ConfigLoader, ConfigResult, LynxConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use runtime::{LynxRuntime, RuntimeBuilder};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Logging macros in one import.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
