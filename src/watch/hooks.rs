//! Observer hooks for reload outcomes.
//!
//! Every failure inside a watch loop or a merge is handled where it is
//! detected; the hook registry is how those outcomes stay observable to
//! the hosting application instead of being swallowed.

use crate::error::ConfigError;
use std::path::Path;
use std::sync::{Arc, RwLock};
use tracing::{error, info};

type ErrorHook = Box<dyn Fn(&ConfigError) + Send + Sync>;
type ReloadHook = Box<dyn Fn(&Path) + Send + Sync>;

/// Handle for a registered hook; dropping it unregisters the hook.
pub struct HookHandle {
    id: usize,
    registry: Arc<RwLock<HookRegistryInner>>,
}

impl Drop for HookHandle {
    fn drop(&mut self) {
        if let Ok(mut inner) = self.registry.write() {
            inner.on_error.retain(|(id, _)| *id != self.id);
            inner.on_reload.retain(|(id, _)| *id != self.id);
        }
    }
}

struct HookRegistryInner {
    on_error: Vec<(usize, ErrorHook)>,
    on_reload: Vec<(usize, ReloadHook)>,
    next_id: usize,
}

/// Registry of reload and error observers.
///
/// Reload failures never propagate up to crash the hosting application;
/// callers that need stricter behavior than "log and keep the previous
/// configuration" subscribe here. All outcomes are additionally emitted
/// as `tracing` events, so nothing is lost when no hook is registered.
///
/// Clones share the same set of hooks.
///
/// # Examples
///
/// ```rust
/// use active_config::watch::HookRegistry;
///
/// let hooks = HookRegistry::new();
/// let _guard = hooks.on_error(|err| {
///     eprintln!("reload failed: {err}");
/// });
/// ```
pub struct HookRegistry {
    inner: Arc<RwLock<HookRegistryInner>>,
}

impl HookRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HookRegistryInner {
                on_error: Vec::new(),
                on_reload: Vec::new(),
                next_id: 0,
            })),
        }
    }

    /// Register a callback invoked for every reported error.
    ///
    /// Returns a handle that unregisters the callback when dropped.
    pub fn on_error<F>(&self, callback: F) -> HookHandle
    where
        F: Fn(&ConfigError) + Send + Sync + 'static,
    {
        let mut inner = self.inner.write().expect("hook registry poisoned");
        let id = inner.next_id;
        inner.next_id += 1;
        inner.on_error.push((id, Box::new(callback)));
        HookHandle {
            id,
            registry: Arc::clone(&self.inner),
        }
    }

    /// Register a callback invoked after every successful reload, with
    /// the path that was reloaded.
    ///
    /// Returns a handle that unregisters the callback when dropped.
    pub fn on_reload<F>(&self, callback: F) -> HookHandle
    where
        F: Fn(&Path) + Send + Sync + 'static,
    {
        let mut inner = self.inner.write().expect("hook registry poisoned");
        let id = inner.next_id;
        inner.next_id += 1;
        inner.on_reload.push((id, Box::new(callback)));
        HookHandle {
            id,
            registry: Arc::clone(&self.inner),
        }
    }

    /// Report an error to every subscriber and the log.
    pub fn report_error(&self, err: &ConfigError) {
        error!(error = %err, "configuration reload error");
        let inner = self.inner.read().expect("hook registry poisoned");
        for (_id, callback) in &inner.on_error {
            callback(err);
        }
    }

    /// Announce a successful reload to every subscriber and the log.
    pub fn notify_reload(&self, path: &Path) {
        info!(path = %path.display(), "configuration reloaded");
        let inner = self.inner.read().expect("hook registry poisoned");
        for (_id, callback) in &inner.on_reload {
            callback(path);
        }
    }

    /// Get the number of registered hooks.
    pub fn hook_count(&self) -> usize {
        let inner = self.inner.read().expect("hook registry poisoned");
        inner.on_error.len() + inner.on_reload.len()
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for HookRegistry {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_error_hook_invoked() {
        let hooks = HookRegistry::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let counter_clone = Arc::clone(&counter);
        let _handle = hooks.on_error(move |_err| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        hooks.report_error(&ConfigError::ShapeMismatch("missing field".to_string()));
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        hooks.report_error(&ConfigError::ShapeMismatch("missing field".to_string()));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_reload_hook_receives_path() {
        let hooks = HookRegistry::new();
        let seen = Arc::new(RwLock::new(Vec::<PathBuf>::new()));

        let seen_clone = Arc::clone(&seen);
        let _handle = hooks.on_reload(move |path| {
            seen_clone.write().unwrap().push(path.to_path_buf());
        });

        hooks.notify_reload(Path::new("/etc/app.json"));
        assert_eq!(seen.read().unwrap().as_slice(), [PathBuf::from("/etc/app.json")]);
    }

    #[test]
    fn test_drop_unregisters() {
        let hooks = HookRegistry::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let counter_clone = Arc::clone(&counter);
        let handle = hooks.on_error(move |_err| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(hooks.hook_count(), 1);

        drop(handle);
        assert_eq!(hooks.hook_count(), 0);

        hooks.report_error(&ConfigError::ShapeMismatch("x".to_string()));
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_clone_shares_hooks() {
        let hooks = HookRegistry::new();
        let clone = hooks.clone();
        let counter = Arc::new(AtomicUsize::new(0));

        let counter_clone = Arc::clone(&counter);
        let _handle = hooks.on_error(move |_err| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        clone.report_error(&ConfigError::ShapeMismatch("x".to_string()));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
