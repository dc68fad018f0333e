//! File watching for automatic configuration reloads.

use crate::error::{ConfigError, Result};
use crate::watch::HookRegistry;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Tuning knobs for a watch loop.
#[derive(Debug, Clone)]
pub struct WatchOptions {
    /// How many times a failed event backend is re-armed before the loop
    /// gives up. Defaults to 0: a backend failure terminates the loop.
    pub restart_attempts: u32,
    /// Delay before each re-arm attempt.
    pub restart_backoff: Duration,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            restart_attempts: 0,
            restart_backoff: Duration::from_secs(1),
        }
    }
}

/// What the notify event handler forwards into the watch loop.
enum RawEvent {
    Fs(Event),
    Backend(notify::Error),
}

/// Watches a single configuration file and invokes a callback on change.
///
/// Platform file-event APIs watch directories, so the watcher registers
/// interest in the file's parent directory and filters the delivered
/// events down to the one file by base name; sibling files changing in
/// the same directory never invoke the callback.
///
/// Each call to [`watch`](FileWatcher::watch) runs its own background
/// loop. Watching the same path twice is allowed and yields two
/// independent loops that fire independently.
///
/// # Examples
///
/// ```rust,no_run
/// use active_config::watch::FileWatcher;
///
/// # async fn example() -> active_config::error::Result<()> {
/// let watcher = FileWatcher::new();
/// let mut handle = watcher.watch("/etc/app/app.json", || {
///     println!("app.json changed");
///     Ok(())
/// })?;
///
/// // ... later
/// handle.stop().await;
/// # Ok(())
/// # }
/// ```
pub struct FileWatcher {
    options: WatchOptions,
    hooks: HookRegistry,
}

impl FileWatcher {
    /// Create a watcher with default options and a private hook registry.
    pub fn new() -> Self {
        Self {
            options: WatchOptions::default(),
            hooks: HookRegistry::new(),
        }
    }

    /// Report loop and callback errors through `hooks` instead of a
    /// private registry.
    pub fn with_hooks(mut self, hooks: HookRegistry) -> Self {
        self.hooks = hooks;
        self
    }

    /// Override the loop's restart behavior.
    pub fn with_options(mut self, options: WatchOptions) -> Self {
        self.options = options;
        self
    }

    /// Start watching `path` and invoke `on_change` for every write to it.
    ///
    /// Returns immediately; detection runs on a dedicated background task
    /// until the returned handle is stopped or dropped. The callback runs
    /// synchronously on that task; an error it returns is reported through
    /// the hook registry and the loop continues.
    ///
    /// The file itself does not have to exist yet — its parent directory
    /// does. Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::WatchSetup`] when the parent directory is
    /// missing or the event backend refuses the watch; no loop is started
    /// in that case.
    pub fn watch<F>(&self, path: impl AsRef<Path>, on_change: F) -> Result<WatchHandle>
    where
        F: FnMut() -> Result<()> + Send + 'static,
    {
        let path = path.as_ref().to_path_buf();
        let file_name = path
            .file_name()
            .map(OsString::from)
            .ok_or_else(|| ConfigError::watch_setup(&path, "path has no file name"))?;

        let parent = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let dir = parent
            .canonicalize()
            .map_err(|e| ConfigError::watch_setup(&path, e))?;

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let backend = Self::arm(&path, &dir, event_tx.clone())?;
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let task = tokio::spawn(Self::run_loop(
            path.clone(),
            dir,
            file_name,
            backend,
            event_tx,
            event_rx,
            shutdown_rx,
            on_change,
            self.options.clone(),
            self.hooks.clone(),
        ));

        debug!(path = %path.display(), "watch started");
        Ok(WatchHandle {
            path,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        })
    }

    /// Create an event backend watching `dir` and forwarding into `tx`.
    fn arm(
        path: &Path,
        dir: &Path,
        tx: mpsc::UnboundedSender<RawEvent>,
    ) -> Result<RecommendedWatcher> {
        let mut backend = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                    let _ = tx.send(RawEvent::Fs(event));
                }
            }
            Err(err) => {
                let _ = tx.send(RawEvent::Backend(err));
            }
        })
        .map_err(|e| ConfigError::watch_setup(path, e))?;

        backend
            .watch(dir, RecursiveMode::NonRecursive)
            .map_err(|e| ConfigError::watch_setup(path, e))?;

        Ok(backend)
    }

    /// The watch loop: wait for the next event batch, filter to the
    /// target file, invoke the callback, re-arm, repeat.
    #[allow(clippy::too_many_arguments)]
    async fn run_loop<F>(
        path: PathBuf,
        dir: PathBuf,
        file_name: OsString,
        mut backend: RecommendedWatcher,
        event_tx: mpsc::UnboundedSender<RawEvent>,
        mut event_rx: mpsc::UnboundedReceiver<RawEvent>,
        mut shutdown_rx: mpsc::Receiver<()>,
        mut on_change: F,
        options: WatchOptions,
        hooks: HookRegistry,
    ) where
        F: FnMut() -> Result<()> + Send + 'static,
    {
        // The backend must stay alive for as long as the loop runs; a
        // failed backend is replaced in place on re-arm.
        let mut restarts = 0u32;

        loop {
            tokio::select! {
                received = event_rx.recv() => match received {
                    Some(RawEvent::Fs(event)) => {
                        let matches_target = event
                            .paths
                            .iter()
                            .any(|p| p.file_name() == Some(file_name.as_os_str()));
                        if !matches_target {
                            continue;
                        }
                        if let Err(err) = on_change() {
                            hooks.report_error(&err);
                        }
                    }
                    Some(RawEvent::Backend(err)) => {
                        hooks.report_error(&ConfigError::watch_loop(&path, &err));
                        if restarts >= options.restart_attempts {
                            warn!(path = %path.display(), "watch loop terminated");
                            break;
                        }
                        restarts += 1;
                        sleep(options.restart_backoff).await;
                        match Self::arm(&path, &dir, event_tx.clone()) {
                            Ok(rearmed) => {
                                backend = rearmed;
                                debug!(path = %path.display(), restarts, "watch backend re-armed");
                            }
                            Err(err) => {
                                hooks.report_error(&err);
                                break;
                            }
                        }
                    }
                    None => break,
                },
                _ = shutdown_rx.recv() => {
                    debug!(path = %path.display(), "watch stopped");
                    break;
                }
            }
        }

        drop(backend);
    }
}

impl Default for FileWatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to one active watch loop.
///
/// Dropping the handle ends the loop; [`stop`](WatchHandle::stop) ends it
/// gracefully, returning only once the loop has exited so no further
/// callback invocation can happen afterwards.
pub struct WatchHandle {
    path: PathBuf,
    shutdown: Option<mpsc::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl WatchHandle {
    /// The file this handle is watching.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stop the watch loop and wait for it to exit.
    ///
    /// Idempotent; after the first call returns, the callback is never
    /// invoked again for this handle, even if new events are generated.
    pub async fn stop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(()).await;
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}
