//! In-place merging of freshly decoded configuration onto live instances.

use crate::core::LiveConfig;
use crate::error::{ConfigError, Result};
use serde::de::DeserializeOwned;

/// Copies a freshly decoded configuration onto a live instance.
///
/// The merge never replaces the identity of the [`LiveConfig`] handle:
/// application code holding a clone taken before the merge observes the
/// new field values afterwards. Updates are all-or-nothing — the incoming
/// document is staged into a complete instance first and swapped in with
/// a single atomic store, so a concurrent reader sees either every old
/// field or every new field.
pub struct ConfigMerger;

impl ConfigMerger {
    /// Merge an already-typed configuration into the live instance.
    ///
    /// Every field of the shared schema takes the value from `source`.
    /// Idempotent: merging the same `source` twice leaves the same final
    /// state as merging it once.
    pub fn merge<T>(target: &LiveConfig<T>, source: T) {
        target.replace(source);
    }

    /// Merge a decoded document into the live instance.
    ///
    /// The document is staged into a fresh `T` before the live instance
    /// is touched. A document that is missing a field the schema
    /// declares, or carries a value of the wrong type, fails with
    /// [`ConfigError::ShapeMismatch`] and leaves the live instance fully
    /// unmodified.
    ///
    /// Unknown keys in the document are rejected only if `T` opts in
    /// with `#[serde(deny_unknown_fields)]`; otherwise serde's default
    /// of ignoring them applies.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ShapeMismatch`] when the document does not
    /// deserialize into `T`.
    pub fn merge_value<T>(target: &LiveConfig<T>, source: serde_json::Value) -> Result<()>
    where
        T: DeserializeOwned,
    {
        let staged: T =
            serde_json::from_value(source).map_err(|e| ConfigError::ShapeMismatch(e.to_string()))?;
        target.replace(staged);
        Ok(())
    }
}
