//! Change detection and reload observability.
//!
//! Provides the per-file watch loop and the hook registry through which
//! reload outcomes are reported.

pub mod hooks;
pub mod watcher;

pub use hooks::{HookHandle, HookRegistry};
pub use watcher::{FileWatcher, WatchHandle, WatchOptions};
