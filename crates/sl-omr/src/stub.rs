//! Placeholder recognition engine.
//!
//! Stands in for Audiveris when no binary is installed: waits a configurable
//! simulated processing time, then writes a minimal MusicXML score. The delay
//! keeps the asynchronous job lifecycle observable (pending and processing
//! states actually occur) even without a real engine.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use crate::engine::OmrEngine;
use crate::musicxml;

/// Engine that produces a placeholder score instead of running recognition.
#[derive(Debug, Clone)]
pub struct StubEngine {
    delay: Duration,
}

impl StubEngine {
    /// Create a stub engine with the given simulated processing time.
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl OmrEngine for StubEngine {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn convert(&self, input: &Path, output: &Path) -> sl_core::Result<Vec<u8>> {
        // The input must at least exist, as it would for a real engine.
        tokio::fs::metadata(input).await?;

        tokio::time::sleep(self.delay).await;

        let title = input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Converted Sheet Music");
        let xml = musicxml::placeholder_score(title);

        tokio::fs::write(output, xml.as_bytes()).await?;
        Ok(xml.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn converts_and_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("page.png");
        let output = dir.path().join("page.musicxml");
        std::fs::write(&input, b"fake image data").unwrap();

        let engine = StubEngine::new(Duration::from_millis(10));
        let bytes = engine.convert(&input, &output).await.unwrap();

        assert!(!bytes.is_empty());
        let written = std::fs::read(&output).unwrap();
        assert_eq!(bytes, written);
        let xml = String::from_utf8(bytes).unwrap();
        assert!(xml.contains("<measure"));
        assert!(xml.contains("<note>"));
    }

    #[tokio::test]
    async fn title_comes_from_input_stem() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("moonlight-sonata.pdf");
        let output = dir.path().join("out.musicxml");
        std::fs::write(&input, b"pdf bytes").unwrap();

        let engine = StubEngine::new(Duration::from_millis(1));
        let bytes = engine.convert(&input, &output).await.unwrap();
        let xml = String::from_utf8(bytes).unwrap();
        assert!(xml.contains("<work-title>moonlight-sonata</work-title>"));
    }

    #[tokio::test]
    async fn missing_input_errors() {
        let dir = tempfile::tempdir().unwrap();
        let engine = StubEngine::new(Duration::from_millis(1));
        let result = engine
            .convert(&dir.path().join("absent.png"), &dir.path().join("out.musicxml"))
            .await;
        assert!(matches!(result, Err(sl_core::Error::Io { .. })));
    }
}
