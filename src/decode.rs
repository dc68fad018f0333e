//! Decoding configuration files into documents ready to merge.

use crate::error::{ConfigError, Result};
use config::File;
use std::path::Path;

/// Turns a configuration file into a decoded document.
///
/// The orchestrator is generic over this seam so applications can supply
/// their own parsing (a custom format, in-memory fixtures in tests)
/// without touching the watch or merge machinery.
pub trait Decoder: Send + Sync {
    /// Decode the file at `path` into a document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Decode`] when the file is missing,
    /// unreadable, or not valid in its format.
    fn decode(&self, path: &Path) -> Result<serde_json::Value>;
}

/// Format-detecting file decoder.
///
/// Decodes JSON out of the box; YAML and TOML are available behind the
/// `yaml` and `toml` cargo features. The format is detected from the
/// file extension.
///
/// # Examples
///
/// ```rust,no_run
/// use active_config::decode::{Decoder, FileDecoder};
/// use std::path::Path;
///
/// # fn example() -> active_config::error::Result<()> {
/// let document = FileDecoder.decode(Path::new("config/app.json"))?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct FileDecoder;

impl FileDecoder {
    /// Validate that the file extension names a supported format.
    fn validate_extension(path: &Path) -> Result<()> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| {
                ConfigError::decode(path, "unable to determine file format from extension")
            })?;

        match extension {
            "json" | "yaml" | "yml" | "toml" => Ok(()),
            _ => Err(ConfigError::decode(
                path,
                format!(
                    "unsupported file extension: {}. Supported: .json, .yaml, .yml, .toml",
                    extension
                ),
            )),
        }
    }
}

impl Decoder for FileDecoder {
    fn decode(&self, path: &Path) -> Result<serde_json::Value> {
        Self::validate_extension(path)?;

        if !path.exists() {
            return Err(ConfigError::decode(path, "configuration file not found"));
        }

        let loaded = config::Config::builder()
            .add_source(File::from(path.to_path_buf()).required(true))
            .build()
            .map_err(|e| ConfigError::decode(path, e))?;

        loaded
            .try_deserialize::<serde_json::Value>()
            .map_err(|e| ConfigError::decode(path, e))
    }
}
