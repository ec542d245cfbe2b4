use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use thiserror::Error;

/// Text of one PDF page, as produced by the decoder (1-based numbering).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPage {
    pub page_number: usize,
    pub raw_text: String,
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot decode PDF: {0}")]
    Pdf(String),
    #[error("PDF decoder panicked: {0}")]
    Panicked(String),
    #[error("document has no extractable text (scanned or empty)")]
    NoText,
}

/// Page texts in page order. Consumed once; there is no way to rewind.
/// `pdf-extract` decodes the whole document in one call, so every page is
/// already in memory here; only the hand-off to the pipeline is incremental.
#[derive(Debug)]
pub struct Pages {
    inner: std::iter::Enumerate<std::vec::IntoIter<String>>,
}

impl Pages {
    /// Wrap decoded page texts. A document without any non-blank page is a
    /// whole-document failure rather than an empty result.
    pub fn from_texts(texts: Vec<String>) -> Result<Self, ExtractError> {
        if texts.iter().all(|t| t.trim().is_empty()) {
            return Err(ExtractError::NoText);
        }
        Ok(Pages {
            inner: texts.into_iter().enumerate(),
        })
    }
}

impl Iterator for Pages {
    type Item = RawPage;

    fn next(&mut self) -> Option<RawPage> {
        self.inner.next().map(|(i, raw_text)| RawPage {
            page_number: i + 1,
            raw_text,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Source of per-page text for one document.
pub trait PageExtractor {
    fn extract(&self, path: &Path) -> Result<Pages, ExtractError>;
}

/// Text-layer extraction through `pdf-extract`. No OCR.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfPageExtractor;

impl PageExtractor for PdfPageExtractor {
    fn extract(&self, path: &Path) -> Result<Pages, ExtractError> {
        let bytes = std::fs::read(path).map_err(|source| ExtractError::Io {
            path: path.display().to_string(),
            source,
        })?;
        extract_pdf_pages(&bytes)
    }
}

pub fn extract_pdf_pages(bytes: &[u8]) -> Result<Pages, ExtractError> {
    // pdf-extract panics on some malformed font tables instead of erroring
    let decoded = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
    }));

    match decoded {
        Ok(Ok(texts)) => Pages::from_texts(texts),
        Ok(Err(e)) => Err(ExtractError::Pdf(e.to_string())),
        Err(payload) => {
            let msg = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(ExtractError::Panicked(msg))
        }
    }
}

// ── Tests ──
