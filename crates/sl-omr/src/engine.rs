//! The recognition engine contract.

use std::path::Path;

use async_trait::async_trait;

/// Input formats the service accepts, by file extension (lowercase).
///
/// Matches what Audiveris can load: raster images and PDFs.
pub const SUPPORTED_EXTENSIONS: &[&str] =
    &["png", "jpg", "jpeg", "tif", "tiff", "bmp", "gif", "pdf"];

/// Whether the given extension (without the dot, any case) is a supported
/// input format.
pub fn is_supported_extension(ext: &str) -> bool {
    SUPPORTED_EXTENSIONS
        .iter()
        .any(|s| s.eq_ignore_ascii_case(ext))
}

/// An optical-music-recognition engine.
///
/// The contract is file-in/file-out: `convert` reads the document at `input`,
/// writes a MusicXML artifact to `output`, and returns the artifact bytes.
/// Implementations hold no per-call mutable state and are safe to invoke from
/// any number of worker tasks concurrently.
#[async_trait]
pub trait OmrEngine: Send + Sync {
    /// Short engine name for logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Run recognition on `input`, producing a MusicXML document at `output`.
    ///
    /// # Errors
    ///
    /// Returns [`sl_core::Error::Engine`] when recognition itself fails and
    /// [`sl_core::Error::Io`] when the input cannot be read or the output
    /// cannot be written.
    async fn convert(&self, input: &Path, output: &Path) -> sl_core::Result<Vec<u8>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_image_formats_supported() {
        for ext in ["png", "jpg", "jpeg", "tiff", "pdf"] {
            assert!(is_supported_extension(ext), "{ext} should be supported");
        }
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        assert!(is_supported_extension("PNG"));
        assert!(is_supported_extension("Pdf"));
    }

    #[test]
    fn unsupported_formats_rejected() {
        for ext in ["mp3", "docx", "musicxml", ""] {
            assert!(!is_supported_extension(ext), "{ext} should be rejected");
        }
    }
}
