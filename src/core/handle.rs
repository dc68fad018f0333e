//! The shared handle to a live configuration instance.

use arc_swap::ArcSwap;
use std::sync::Arc;

/// A cloneable handle to a live configuration instance.
///
/// Application code holds clones of the handle for the lifetime of the
/// process; every clone shares the same underlying instance, so a merge
/// performed through any clone is observed by all of them without
/// re-fetching anything. Reads are lock-free snapshots: a reader gets an
/// `Arc<T>` that is either wholly the pre-merge or wholly the post-merge
/// configuration, never a mix.
///
/// # Examples
///
/// ```rust
/// use active_config::prelude::*;
///
/// #[derive(Debug, Clone)]
/// struct AppConfig {
///     timeout: u64,
/// }
///
/// let config = LiveConfig::new(AppConfig { timeout: 10 });
/// let shared = config.clone();
///
/// ConfigMerger::merge(&config, AppConfig { timeout: 45 });
/// assert_eq!(shared.get().timeout, 45);
/// ```
pub struct LiveConfig<T> {
    current: Arc<ArcSwap<T>>,
}

impl<T> LiveConfig<T> {
    /// Create a handle around an initial configuration value.
    ///
    /// The initial value stays in effect until the first merge replaces
    /// it, which also makes it the fallback whenever a reload fails.
    pub fn new(initial: T) -> Self {
        Self {
            current: Arc::new(ArcSwap::new(Arc::new(initial))),
        }
    }

    /// Get a reference-counted snapshot of the current configuration.
    ///
    /// Lock-free; readers never block a merge and a merge never blocks
    /// readers. The snapshot stays valid (and unchanged) for as long as
    /// the caller holds it, even across later merges.
    pub fn get(&self) -> Arc<T> {
        self.current.load_full()
    }

    /// Atomically replace the current configuration.
    ///
    /// All mutation funnels through here so a replacement is always a
    /// single pointer swap.
    pub(crate) fn replace(&self, next: T) {
        self.current.store(Arc::new(next));
    }
}

impl<T> Clone for LiveConfig<T> {
    fn clone(&self) -> Self {
        Self {
            current: Arc::clone(&self.current),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct TestConfig {
        value: i32,
    }

    #[test]
    fn test_create_and_read() {
        let config = LiveConfig::new(TestConfig { value: 42 });
        assert_eq!(config.get().value, 42);
    }

    #[test]
    fn test_clones_share_identity() {
        let config = LiveConfig::new(TestConfig { value: 42 });
        let clone = config.clone();

        config.replace(TestConfig { value: 7 });

        assert_eq!(clone.get().value, 7);
        assert_eq!(config.get().value, 7);
    }

    #[test]
    fn test_snapshot_outlives_replacement() {
        let config = LiveConfig::new(TestConfig { value: 1 });
        let snapshot = config.get();

        config.replace(TestConfig { value: 2 });

        // Held snapshots keep the value they were taken with.
        assert_eq!(snapshot.value, 1);
        assert_eq!(config.get().value, 2);
    }
}
