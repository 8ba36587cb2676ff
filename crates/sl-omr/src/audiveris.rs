//! Audiveris CLI engine.
//!
//! Wraps an installed Audiveris binary in the [`OmrEngine`] contract: run a
//! batch export into the output directory, then collect the exported MusicXML
//! into the requested output path.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;

use crate::command::EngineCommand;
use crate::engine::OmrEngine;

/// Engine backed by the Audiveris batch CLI.
#[derive(Debug, Clone)]
pub struct AudiverisEngine {
    path: PathBuf,
    timeout: Duration,
}

impl AudiverisEngine {
    /// Create an engine for a known binary path.
    pub fn new(path: PathBuf, timeout: Duration) -> Self {
        Self { path, timeout }
    }

    /// Locate an Audiveris installation.
    ///
    /// A configured path is used when it exists; otherwise `PATH` is
    /// searched. Returns `None` when no binary can be found.
    pub fn discover(config: &sl_core::config::EngineConfig) -> Option<Self> {
        let resolved = match config.audiveris_path {
            Some(ref p) if p.exists() => Some(p.clone()),
            // Configured path missing (or none configured); fall back to PATH.
            _ => which::which("audiveris").ok(),
        };

        resolved.map(|path| Self::new(path, Duration::from_secs(config.timeout_secs)))
    }

    /// Resolved path to the binary.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Candidate locations of the export for `input` under `export_dir`.
    ///
    /// Audiveris writes `<stem>/<stem>.musicxml` for multi-sheet books and
    /// `<stem>.musicxml` for single sheets, depending on version.
    fn export_candidates(input: &Path, export_dir: &Path) -> Vec<PathBuf> {
        let stem = input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("score");

        vec![
            export_dir.join(stem).join(format!("{stem}.musicxml")),
            export_dir.join(format!("{stem}.musicxml")),
            export_dir.join(stem).join(format!("{stem}.xml")),
            export_dir.join(format!("{stem}.xml")),
        ]
    }
}

#[async_trait]
impl OmrEngine for AudiverisEngine {
    fn name(&self) -> &'static str {
        "audiveris"
    }

    async fn convert(&self, input: &Path, output: &Path) -> sl_core::Result<Vec<u8>> {
        let export_dir = output
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let result = EngineCommand::new(self.path.clone())
            .arg("-batch")
            .arg("-export")
            // Uncompressed .musicxml rather than a zipped .mxl archive.
            .arg("-option")
            .arg("org.audiveris.omr.sheet.BookManager.useCompression=false")
            .arg("-output")
            .arg(export_dir.to_string_lossy())
            .arg("--")
            .arg(input.to_string_lossy())
            .timeout(self.timeout)
            .execute()
            .await?;

        tracing::debug!(
            input = %input.display(),
            "Audiveris batch export finished: {}",
            result.stdout.lines().last().unwrap_or(""),
        );

        // Collect the export into the path the caller asked for.
        let exported = Self::export_candidates(input, &export_dir)
            .into_iter()
            .find(|p| p.exists())
            .ok_or_else(|| {
                sl_core::Error::engine(format!(
                    "audiveris produced no MusicXML export for {}",
                    input.display()
                ))
            })?;

        if exported != output {
            if tokio::fs::rename(&exported, output).await.is_err() {
                // Rename can fail across filesystems; fall back to a copy.
                tokio::fs::copy(&exported, output).await?;
            }
        }

        Ok(tokio::fs::read(output).await?)
    }
}
