//! Application configuration types.
//!
//! The top-level [`Config`] struct is deserialized from JSON and carries the
//! server and object-store sections. Every section defaults sensibly so a
//! completely empty `{}` file is valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;
use crate::Error;

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
}

impl Config {
    /// Deserialize a `Config` from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str)
            .map_err(|e| Error::Internal(format!("config parse error: {e}")))
    }

    /// Load configuration from a file path, falling back to defaults if the
    /// path is `None` or the file does not exist.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file {}: {e}", path.display());
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {}; using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Load configuration strictly: a missing or unparsable file is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.server.port == 0 {
            warnings.push("server.port is 0; a random port will be assigned".into());
        }

        if self.server.request_timeout_secs == 0 {
            warnings.push("server.request_timeout_secs is 0; every transform will time out".into());
        }

        match &self.store {
            StoreConfig::Local { root } => {
                if !root.exists() {
                    warnings.push(format!(
                        "store.root {} does not exist; every fetch will 404",
                        root.display()
                    ));
                }
            }
            StoreConfig::Http { base_url, .. } => {
                if base_url.is_empty() {
                    warnings.push("store.base_url is empty".into());
                } else if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
                    warnings.push(format!("store.base_url '{base_url}' is not an http(s) URL"));
                }
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on fetch + transform + encode for one request.
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            request_timeout_secs: 30,
        }
    }
}

/// Where source objects come from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StoreConfig {
    /// Objects are files below a directory.
    Local { root: PathBuf },
    /// Objects are fetched from an S3-compatible HTTP origin.
    Http {
        base_url: String,
        /// Answer untransformed requests with a direct-access signal instead
        /// of proxying the bytes.
        #[serde(default = "default_true")]
        bypass: bool,
        #[serde(default = "default_store_timeout")]
        timeout_secs: u64,
    },
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Local {
            root: PathBuf::from("./images"),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_store_timeout() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_is_valid() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.request_timeout_secs, 30);
        assert!(matches!(config.store, StoreConfig::Local { .. }));
    }

    #[test]
    fn http_store_defaults() {
        let config = Config::from_json(
            r#"{"store": {"kind": "http", "base_url": "https://bucket.example.com"}}"#,
        )
        .unwrap();
        match config.store {
            StoreConfig::Http {
                base_url,
                bypass,
                timeout_secs,
            } => {
                assert_eq!(base_url, "https://bucket.example.com");
                assert!(bypass);
                assert_eq!(timeout_secs, 10);
            }
            other => panic!("expected http store, got {other:?}"),
        }
    }

    #[test]
    fn invalid_json_is_error() {
        let err = Config::from_json("{ not json").unwrap_err();
        assert!(err.to_string().contains("config parse error"));
    }

    #[test]
    fn load_or_default_missing_file() {
        let config = Config::load_or_default(Some(Path::new("/nonexistent/ih.json")));
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"server": {"port": 9000}}"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn validate_warnings() {
        let mut config = Config::default();
        config.server.port = 0;
        config.store = StoreConfig::Http {
            base_url: "ftp://origin".into(),
            bypass: true,
            timeout_secs: 10,
        };
        let warnings = config.validate();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("port"));
        assert!(warnings[1].contains("http(s)"));
    }
}
