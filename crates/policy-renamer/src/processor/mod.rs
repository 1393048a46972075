pub mod pdf;

pub use pdf::PdfTextExtractor;

use crate::error::ProcessError;

/// Extracts the first page of text from a document's raw bytes.
///
/// Implementations are synchronous; the worker runs them on the blocking
/// thread pool.
pub trait TextExtractor: Send + Sync {
    fn first_page_text(&self, content: &[u8]) -> Result<String, ProcessError>;
}

impl<F> TextExtractor for F
where
    F: Fn(&[u8]) -> Result<String, ProcessError> + Send + Sync,
{
    fn first_page_text(&self, content: &[u8]) -> Result<String, ProcessError> {
        self(content)
    }
}
