//! Application configuration types.
//!
//! The top-level [`Config`] struct is deserialized from JSON and carries
//! sub-configs for the server, worker pool, recognition engine, and job
//! retention. Every section defaults sensibly so a completely empty `{}`
//! file is valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::Error;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub workers: WorkerConfig,
    pub engine: EngineConfig,
    pub retention: RetentionConfig,
}

impl Config {
    /// Deserialize a `Config` from a JSON string.
    ///
    /// This is intentionally string-based so the caller can read the file
    /// however it sees fit (async, embedded, etc.).
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str)
            .map_err(|e| Error::Validation(format!("config parse error: {e}")))
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

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.server.port == 0 {
            warnings.push("server.port is 0; a random port will be assigned".into());
        }

        if self.workers.count == 0 {
            warnings.push("workers.count is 0; no conversions will ever run".into());
        }

        if self.engine.timeout_secs == 0 {
            warnings.push("engine.timeout_secs is 0; conversions will fail immediately".into());
        }

        if self.retention.enabled && self.retention.ttl_secs == 0 {
            warnings.push(
                "retention is enabled with ttl_secs = 0; finished jobs are evicted on the next sweep"
                    .into(),
            );
        }

        if let Some(ref path) = self.engine.audiveris_path {
            if !path.exists() {
                warnings.push(format!(
                    "engine.audiveris_path {} does not exist; falling back to PATH lookup",
                    path.display()
                ));
            }
        }

        warnings
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Directory for uploaded documents and produced artifacts.
    /// Defaults to a `staffline` subdirectory of the system temp dir.
    pub temp_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8081,
            temp_dir: None,
        }
    }
}

impl ServerConfig {
    /// Resolve the working directory for job files.
    pub fn resolve_temp_dir(&self) -> PathBuf {
        self.temp_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("staffline"))
    }
}

/// Worker pool settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Number of conversions that may run concurrently.
    pub count: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self { count: 4 }
    }
}

/// Recognition engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Explicit path to the Audiveris executable. When unset (or missing),
    /// the binary is looked up on `PATH`; when that fails too, the stub
    /// engine is used.
    pub audiveris_path: Option<PathBuf>,
    /// Deadline for a single conversion, applied on both the synchronous and
    /// asynchronous paths.
    pub timeout_secs: u64,
    /// Simulated processing time of the stub engine.
    pub stub_delay_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            audiveris_path: None,
            timeout_secs: 300,
            stub_delay_ms: 2000,
        }
    }
}

/// Retention policy for finished jobs and their temp files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    /// Whether the background sweeper runs at all.
    pub enabled: bool,
    /// How long completed/failed jobs are kept after finishing.
    pub ttl_secs: u64,
    /// Interval between eviction sweeps.
    pub sweep_interval_secs: u64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: 3600,
            sweep_interval_secs: 60,
        }
    }
}
