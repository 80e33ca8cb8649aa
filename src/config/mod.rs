// ── Coordinator configuration ─────────────────────────────────────────────────
//
// Tunables for the slot table and the web surface's virtual directories.
// Stored as JSON so hosts can ship a config file next to their assets; every
// field is optional and falls back to the documented default.
// No `unsafe`: pure safe Rust + serde_json.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::{PickError, Result};

// ── Defaults ──────────────────────────────────────────────────────────────────

/// Default number of requests that may be in flight at once.
pub const DEFAULT_MAX_REQUESTS: usize = 64;

/// Default directory that the web surface imports picked files into.
pub const DEFAULT_PICKED_DIR: &str = "/picked";

/// Default directory that the web surface creates save targets in.
pub const DEFAULT_SAVED_DIR: &str = "/saved";

// ── Config ────────────────────────────────────────────────────────────────────

/// Settings for one [`Coordinator`](crate::Coordinator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Capacity of the request slot table.  Requests beyond this many
    /// in-flight ones are cancelled immediately.
    pub max_requests: usize,
    /// Import directory for files chosen through the web surface.
    pub picked_dir: String,
    /// Directory the web surface creates save targets in.
    pub saved_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_requests: DEFAULT_MAX_REQUESTS,
            picked_dir: DEFAULT_PICKED_DIR.to_owned(),
            saved_dir: DEFAULT_SAVED_DIR.to_owned(),
        }
    }
}

impl Config {
    /// Default configuration with a different slot-table capacity.
    pub fn with_max_requests(max_requests: usize) -> Self {
        Self {
            max_requests,
            ..Self::default()
        }
    }

    /// Parse a configuration from JSON text.
    ///
    /// Missing fields take their defaults; a zero `max_requests` is rejected
    /// because the table would cancel every request.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text).map_err(PickError::Config)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    fn validate(&self) -> Result<()> {
        if self.max_requests == 0 {
            return Err(PickError::ConfigValue("max_requests must be at least 1"));
        }
        if self.max_requests > u32::MAX as usize {
            return Err(PickError::ConfigValue("max_requests does not fit a request id"));
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = Config::default();
        assert_eq!(c.max_requests, 64);
        assert_eq!(c.picked_dir, "/picked");
        assert_eq!(c.saved_dir, "/saved");
    }

    /// A file that only overrides one field must still parse; the rest fall
    /// back to defaults via `#[serde(default)]`.
    #[test]
    fn partial_json_uses_defaults() {
        let c = Config::from_json(r#"{"max_requests":8}"#).expect("parse");
        assert_eq!(c.max_requests, 8);
        assert_eq!(c.picked_dir, DEFAULT_PICKED_DIR);
        assert_eq!(c.saved_dir, DEFAULT_SAVED_DIR);
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let err = Config::from_json(r#"{"max_requests":0}"#).unwrap_err();
        assert!(matches!(err, PickError::ConfigValue(_)));
    }

    #[test]
    fn garbage_is_a_config_error() {
        let err = Config::from_json("not json").unwrap_err();
        assert!(matches!(err, PickError::Config(_)));
    }

    #[test]
    fn load_reads_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        write!(file, r#"{{"picked_dir":"/in","saved_dir":"/out"}}"#).expect("write");
        let c = Config::load(file.path()).expect("load");
        assert_eq!(c.max_requests, DEFAULT_MAX_REQUESTS);
        assert_eq!(c.picked_dir, "/in");
        assert_eq!(c.saved_dir, "/out");
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = Config::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, PickError::Io(_)));
    }
}
