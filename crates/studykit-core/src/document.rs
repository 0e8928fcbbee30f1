//! The uploaded PDF.

use std::path::Path;

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Largest document accepted for generation.
pub const MAX_DOCUMENT_BYTES: usize = 5 * 1024 * 1024;

pub const PDF_MIME_TYPE: &str = "application/pdf";

const PDF_MAGIC: &[u8] = b"%PDF";

/// A PDF held as base64, the form both providers and the state file use.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdfDocument {
    pub file_name: String,
    pub base64: String,
}

impl std::fmt::Debug for PdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfDocument")
            .field("file_name", &self.file_name)
            .field("base64_len", &self.base64.len())
            .finish()
    }
}

impl PdfDocument {
    /// Read a PDF from disk. Only PDF files under 5 MiB are accepted.
    pub fn from_path(path: &Path) -> Result<Self> {
        let is_pdf_name = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        anyhow::ensure!(
            is_pdf_name,
            "only PDF files are allowed: {}",
            path.display()
        );

        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read document: {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string());

        Self::from_bytes(file_name, &bytes)
    }

    /// Wrap raw PDF bytes.
    pub fn from_bytes(file_name: impl Into<String>, bytes: &[u8]) -> Result<Self> {
        anyhow::ensure!(
            bytes.len() <= MAX_DOCUMENT_BYTES,
            "only PDF files under 5MB are allowed ({} bytes)",
            bytes.len()
        );
        anyhow::ensure!(
            bytes.starts_with(PDF_MAGIC),
            "file does not look like a PDF"
        );

        Ok(Self {
            file_name: file_name.into(),
            base64: BASE64.encode(bytes),
        })
    }

    /// Accept either bare base64 or a `data:application/pdf;base64,` URL.
    pub fn from_base64(file_name: impl Into<String>, data: &str) -> Result<Self> {
        let encoded = data
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(";base64,"))
            .map(|(_, payload)| payload)
            .unwrap_or(data);
        let bytes = BASE64
            .decode(encoded.trim())
            .context("document is not valid base64")?;
        Self::from_bytes(file_name, &bytes)
    }

    pub fn data_url(&self) -> String {
        format!("data:{PDF_MIME_TYPE};base64,{}", self.base64)
    }
}
