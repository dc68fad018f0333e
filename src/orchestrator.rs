//! Wiring bindings, watches and merges into one owned lifecycle.

use crate::core::{ConfigMerger, LiveConfig};
use crate::decode::{Decoder, FileDecoder};
use crate::error::Result;
use crate::watch::{FileWatcher, HookRegistry, WatchHandle, WatchOptions};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::Arc;

type ReloadFn = Arc<dyn Fn() -> Result<()> + Send + Sync>;

/// One live configuration instance bound to one file.
///
/// Created by [`ReloadOrchestrator::register`] and owned by the
/// orchestrator for the rest of its life.
pub struct ConfigBinding {
    path: PathBuf,
    reload: ReloadFn,
}

impl ConfigBinding {
    /// The file this binding reloads from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decode the bound file and merge it into the live instance.
    ///
    /// # Errors
    ///
    /// Returns the decode or shape error of the failed reload; the live
    /// instance is left unmodified in that case.
    pub fn reload(&self) -> Result<()> {
        (self.reload)()
    }
}

/// Owns every file-to-configuration binding and its watch loop.
///
/// Application startup code registers each configuration-backed object
/// explicitly; registration performs one initial merge and then starts
/// watching, so the live instance tracks the file from that point on.
/// The orchestrator is started and stopped deterministically by the host
/// application — dropping it (or calling [`stop`](Self::stop)) ends every
/// watch loop.
///
/// # Examples
///
/// ```rust,no_run
/// use active_config::prelude::*;
/// use serde::Deserialize;
///
/// #[derive(Debug, Clone, Deserialize)]
/// struct AppConfig {
///     timeout: u64,
/// }
///
/// # async fn example() -> active_config::error::Result<()> {
/// let config = LiveConfig::new(AppConfig { timeout: 10 });
///
/// let mut orchestrator = ReloadOrchestrator::new();
/// orchestrator.register(&config, "/etc/app/app.json")?;
///
/// // Any clone of `config` now tracks /etc/app/app.json.
/// println!("timeout = {}", config.get().timeout);
/// # Ok(())
/// # }
/// ```
pub struct ReloadOrchestrator {
    decoder: Arc<dyn Decoder>,
    hooks: HookRegistry,
    watch_options: WatchOptions,
    bindings: Vec<ConfigBinding>,
    handles: Vec<WatchHandle>,
}

impl ReloadOrchestrator {
    /// Create an orchestrator decoding files with [`FileDecoder`].
    pub fn new() -> Self {
        Self::with_decoder(FileDecoder)
    }

    /// Create an orchestrator with a custom [`Decoder`].
    pub fn with_decoder(decoder: impl Decoder + 'static) -> Self {
        Self {
            decoder: Arc::new(decoder),
            hooks: HookRegistry::new(),
            watch_options: WatchOptions::default(),
            bindings: Vec::new(),
            handles: Vec::new(),
        }
    }

    /// Override the watch options used for bindings registered after
    /// this call.
    pub fn watch_options(mut self, options: WatchOptions) -> Self {
        self.watch_options = options;
        self
    }

    /// The registry reload outcomes are reported through.
    ///
    /// Clones share the underlying hooks, so a handle obtained before
    /// registration observes every binding.
    pub fn hooks(&self) -> HookRegistry {
        self.hooks.clone()
    }

    /// Bind a live configuration instance to a file.
    ///
    /// Performs one merge from the file's current contents, then starts
    /// watching: every subsequent write to the file is decoded and merged
    /// into `target`. The initial merge is fail-safe — if the file is
    /// missing or malformed the error is reported through the hooks and
    /// `target` keeps the values it was constructed with; the watch still
    /// starts so the binding recovers as soon as a valid file appears.
    ///
    /// Registering the same path twice creates two independent watch
    /// loops that both fire on each change.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::WatchSetup`](crate::error::ConfigError::WatchSetup)
    /// when the watch cannot be established; the binding is not kept in
    /// that case and previously registered bindings are unaffected.
    pub fn register<T>(&mut self, target: &LiveConfig<T>, path: impl Into<PathBuf>) -> Result<()>
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        let path = path.into();

        let reload: ReloadFn = {
            let decoder = Arc::clone(&self.decoder);
            let target = target.clone();
            let hooks = self.hooks.clone();
            let path = path.clone();
            Arc::new(move || {
                let document = decoder.decode(&path)?;
                ConfigMerger::merge_value(&target, document)?;
                hooks.notify_reload(&path);
                Ok(())
            })
        };

        if let Err(err) = reload() {
            self.hooks.report_error(&err);
        }

        let watcher = FileWatcher::new()
            .with_hooks(self.hooks.clone())
            .with_options(self.watch_options.clone());
        let handle = watcher.watch(&path, {
            let reload = Arc::clone(&reload);
            move || reload()
        })?;

        self.handles.push(handle);
        self.bindings.push(ConfigBinding { path, reload });
        Ok(())
    }

    /// The registered bindings, in registration order.
    pub fn bindings(&self) -> &[ConfigBinding] {
        &self.bindings
    }

    /// Reload every binding from its file right now.
    ///
    /// Failures are reported through the hooks, binding by binding; a
    /// broken file does not keep the remaining bindings from reloading.
    pub fn reload_all(&self) {
        for binding in &self.bindings {
            if let Err(err) = binding.reload() {
                self.hooks.report_error(&err);
            }
        }
    }

    /// Stop every watch loop and wait for each to exit.
    ///
    /// After this returns no binding receives further file-change
    /// merges. Idempotent.
    pub async fn stop(&mut self) {
        for handle in &mut self.handles {
            handle.stop().await;
        }
        self.handles.clear();
    }
}

impl Default for ReloadOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use serde::Deserialize;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    #[derive(Debug, Clone, Deserialize, PartialEq)]
    struct AppConfig {
        timeout: u64,
    }

    #[tokio::test]
    async fn test_register_performs_initial_merge() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("app.json");
        fs::write(&config_path, r#"{"timeout": 30}"#).unwrap();

        let config = LiveConfig::new(AppConfig { timeout: 10 });
        let mut orchestrator = ReloadOrchestrator::new();
        orchestrator.register(&config, &config_path).unwrap();

        assert_eq!(config.get().timeout, 30);
        assert_eq!(orchestrator.bindings().len(), 1);

        orchestrator.stop().await;
    }

    #[tokio::test]
    async fn test_register_missing_directory_fails() {
        let config = LiveConfig::new(AppConfig { timeout: 10 });
        let mut orchestrator = ReloadOrchestrator::new();

        let result = orchestrator.register(&config, "/nonexistent/dir/app.json");

        assert!(matches!(result, Err(ConfigError::WatchSetup { .. })));
        assert!(orchestrator.bindings().is_empty());
    }

    #[tokio::test]
    async fn test_initial_merge_is_fail_safe() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("app.json");
        fs::write(&config_path, "{broken").unwrap();

        let config = LiveConfig::new(AppConfig { timeout: 10 });
        let mut orchestrator = ReloadOrchestrator::new();
        let errors = Arc::new(AtomicUsize::new(0));
        let errors_clone = Arc::clone(&errors);
        let _hook = orchestrator.hooks().on_error(move |_err| {
            errors_clone.fetch_add(1, Ordering::SeqCst);
        });

        orchestrator.register(&config, &config_path).unwrap();

        // Decode failed, constructor values retained, error observable.
        assert_eq!(config.get().timeout, 10);
        assert_eq!(errors.load(Ordering::SeqCst), 1);

        orchestrator.stop().await;
    }

    #[tokio::test]
    async fn test_reload_all_refreshes_bindings() {
        let temp_dir = TempDir::new().unwrap();
        let first_path = temp_dir.path().join("first.json");
        let second_path = temp_dir.path().join("second.json");
        fs::write(&first_path, r#"{"timeout": 1}"#).unwrap();
        fs::write(&second_path, r#"{"timeout": 2}"#).unwrap();

        let first = LiveConfig::new(AppConfig { timeout: 0 });
        let second = LiveConfig::new(AppConfig { timeout: 0 });
        let mut orchestrator = ReloadOrchestrator::new();
        orchestrator.register(&first, &first_path).unwrap();
        orchestrator.register(&second, &second_path).unwrap();

        fs::write(&first_path, r#"{"timeout": 11}"#).unwrap();
        fs::write(&second_path, r#"{"timeout": 22}"#).unwrap();
        orchestrator.reload_all();

        assert_eq!(first.get().timeout, 11);
        assert_eq!(second.get().timeout, 22);

        orchestrator.stop().await;
    }

    #[tokio::test]
    async fn test_reload_hook_fires_per_binding() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("app.json");
        fs::write(&config_path, r#"{"timeout": 30}"#).unwrap();

        let config = LiveConfig::new(AppConfig { timeout: 10 });
        let mut orchestrator = ReloadOrchestrator::new();
        let reloads = Arc::new(AtomicUsize::new(0));
        let reloads_clone = Arc::clone(&reloads);
        let _hook = orchestrator.hooks().on_reload(move |_path| {
            reloads_clone.fetch_add(1, Ordering::SeqCst);
        });

        orchestrator.register(&config, &config_path).unwrap();
        assert_eq!(reloads.load(Ordering::SeqCst), 1);

        orchestrator.reload_all();
        assert_eq!(reloads.load(Ordering::SeqCst), 2);

        orchestrator.stop().await;
    }
}
