//! Backend interfaces for the remote analysis service.
//!
//! The core never talks to the network directly; it goes through the
//! `AnalysisBackend` trait so tests can substitute a scripted backend.

pub mod http;

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::Operation;

// Re-export the HTTP backend
pub use http::HttpAnalysisBackend;

/// Capabilities the core needs from the analysis service.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Human-readable backend name
    fn name(&self) -> &str;

    /// Begin remote processing of one document. Returns the operation
    /// handle to poll.
    async fn submit(&self, bytes: &[u8], content_type: &str, profile: &str) -> Result<String>;

    /// Fetch a fresh snapshot of a previously submitted operation.
    /// May fail transiently; callers decide whether to retry.
    async fn fetch_status(&self, handle: &str) -> Result<Operation>;
}

/// MIME type to submit a document under, from its file extension.
pub fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("tif") | Some("tiff") => "image/tiff",
        Some("bmp") => "image/bmp",
        Some("heif") => "image/heif",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        Some("pptx") => {
            "application/vnd.openxmlformats-officedocument.presentationml.presentation"
        }
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_for_common_extensions() {
        assert_eq!(content_type_for(Path::new("a.pdf")), "application/pdf");
        assert_eq!(content_type_for(Path::new("a.JPG")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("scan.tiff")), "image/tiff");
    }

    #[test]
    fn test_content_type_fallback() {
        assert_eq!(
            content_type_for(Path::new("mystery.bin")),
            "application/octet-stream"
        );
        assert_eq!(
            content_type_for(Path::new("no_extension")),
            "application/octet-stream"
        );
    }
}
