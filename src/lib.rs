//! # active-config
//!
//! Live-reloading configuration for long-running processes: a
//! configuration object backing an application component is kept in sync
//! with an on-disk file, without restarting the process.
//!
//! ## Overview
//!
//! Three pieces cooperate:
//!
//! - [`LiveConfig<T>`](core::LiveConfig) — a cloneable handle to the live
//!   configuration instance; reads are lock-free snapshots and clones
//!   share identity, so every holder observes a reload.
//! - [`FileWatcher`](watch::FileWatcher) — detects writes to one specific
//!   file (sibling files in the same directory are ignored) on a
//!   dedicated background task.
//! - [`ConfigMerger`](core::ConfigMerger) — copies a freshly decoded
//!   document onto the live instance, all-or-nothing: readers see wholly
//!   old or wholly new values, never a mix.
//!
//! [`ReloadOrchestrator`](orchestrator::ReloadOrchestrator) wires them
//! together: registration performs one initial merge and then keeps the
//! instance in sync with the file. A malformed file never crashes the
//! hosting application — the previous values are retained and the
//! failure is reported through the [hook registry](watch::HookRegistry).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use active_config::prelude::*;
//! use serde::Deserialize;
//!
//! #[derive(Debug, Clone, Deserialize)]
//! struct AppConfig {
//!     timeout: u64,
//!     host: String,
//! }
//!
//! # async fn example() -> active_config::error::Result<()> {
//! let config = LiveConfig::new(AppConfig {
//!     timeout: 10,
//!     host: "localhost".to_string(),
//! });
//!
//! let mut orchestrator = ReloadOrchestrator::new();
//! orchestrator.register(&config, "config/app.json")?;
//!
//! // Hand clones of `config` to the rest of the application; writing
//! // new contents to config/app.json refreshes them in place.
//! let cfg = config.get();
//! println!("timeout: {}", cfg.timeout);
//! # Ok(())
//! # }
//! ```
//!
//! ## File formats
//!
//! JSON is decoded out of the box. Enable the `yaml` and `toml` cargo
//! features (or `all-formats`) for the other formats, or implement
//! [`Decoder`](decode::Decoder) for anything else.

#![warn(missing_docs, rust_2024_compatibility)]
#![deny(unsafe_code)]

pub mod core;
pub mod decode;
pub mod error;
pub mod orchestrator;
pub mod watch;

/// Convenient re-exports for common usage patterns.
pub mod prelude {
    pub use crate::core::{ConfigMerger, LiveConfig};
    pub use crate::decode::{Decoder, FileDecoder};
    pub use crate::error::{ConfigError, Result};
    pub use crate::orchestrator::ReloadOrchestrator;
    pub use crate::watch::{FileWatcher, HookRegistry, WatchHandle, WatchOptions};
}
