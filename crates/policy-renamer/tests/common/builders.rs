//! Builders and stub collaborators for tests.

#![allow(dead_code)]

use std::sync::{Arc, Condvar, Mutex};

use lopdf::{dictionary, Document, Object, Stream};

use policy_renamer::collector::{ArchiveBuilder, ArchiveEntry};
use policy_renamer::{ArchiveError, ProcessError, TextExtractor};

/// Builds single-font PDFs where each page shows the given text.
pub struct PdfBuilder {
    pages: Vec<Vec<u8>>,
    win_ansi: bool,
}

impl PdfBuilder {
    pub fn new() -> Self {
        Self {
            pages: Vec::new(),
            win_ansi: false,
        }
    }

    /// Adds a page whose content stream draws `text` with one `Tj`.
    ///
    /// Non-ASCII characters are written as single WinAnsi bytes, so they only
    /// decode correctly together with [`PdfBuilder::win_ansi`].
    pub fn page(self, text: &str) -> Self {
        self.page_runs(&[text])
    }

    /// Adds a page with a single text block showing each run with its own
    /// `Tj`, moved along the baseline like separately styled words.
    pub fn page_runs(mut self, runs: &[&str]) -> Self {
        let mut content = b"BT /F1 12 Tf 50 700 Td".to_vec();
        for (i, run) in runs.iter().enumerate() {
            if i > 0 {
                content.extend_from_slice(b" 80 0 Td");
            }
            content.extend_from_slice(b" (");
            push_pdf_string(&mut content, run);
            content.extend_from_slice(b") Tj");
        }
        content.extend_from_slice(b" ET");
        self.pages.push(content);
        self
    }

    /// Declares the font as `WinAnsiEncoding`.
    pub fn win_ansi(mut self) -> Self {
        self.win_ansi = true;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut font = dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        };
        if self.win_ansi {
            font.set("Encoding", "WinAnsiEncoding");
        }
        let font_id = doc.add_object(font);
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let mut kids = Vec::new();
        for content in self.pages {
            let content_id = doc.add_object(Object::Stream(Stream::new(dictionary! {}, content)));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Resources" => resources_id,
                "Contents" => content_id,
            });
            kids.push(Object::from(page_id));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).expect("Failed to serialize test PDF");
        bytes
    }
}

/// Writes `text` as the body of a PDF literal string.
fn push_pdf_string(out: &mut Vec<u8>, text: &str) {
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push(b'\\');
                out.push(c as u8);
            }
            c if (c as u32) < 256 => out.push(c as u32 as u8),
            _ => out.push(b'?'),
        }
    }
}

/// Extractor that returns the uploaded bytes as text. Content `FAIL` fails.
pub fn echo_extractor() -> Arc<dyn TextExtractor> {
    Arc::new(|bytes: &[u8]| -> Result<String, ProcessError> {
        let text = String::from_utf8_lossy(bytes).into_owned();
        if text == "FAIL" {
            Err(ProcessError::PdfProcessing("Invalid PDF structure".to_string()))
        } else {
            Ok(text)
        }
    })
}

/// A latch that blocks callers until opened.
#[derive(Clone, Default)]
pub struct Gate {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl Gate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self) {
        let (lock, cvar) = &*self.inner;
        *lock.lock().unwrap() = true;
        cvar.notify_all();
    }

    pub fn wait(&self) {
        let (lock, cvar) = &*self.inner;
        let mut open = lock.lock().unwrap();
        while !*open {
            open = cvar.wait(open).unwrap();
        }
    }
}

/// Echo extractor that blocks until the gate opens.
pub fn gated_extractor(gate: Gate) -> Arc<dyn TextExtractor> {
    let echo = echo_extractor();
    Arc::new(move |bytes: &[u8]| -> Result<String, ProcessError> {
        gate.wait();
        echo.first_page_text(bytes)
    })
}

/// Archive builder that always fails.
pub struct FailingArchiveBuilder;

impl ArchiveBuilder for FailingArchiveBuilder {
    fn build(&self, _entries: &[ArchiveEntry]) -> Result<Vec<u8>, ArchiveError> {
        Err(ArchiveError::Build("disk quota exceeded".to_string()))
    }
}

/// Archive builder that blocks until the gate opens, then writes nothing.
pub struct GatedArchiveBuilder {
    pub gate: Gate,
}

impl ArchiveBuilder for GatedArchiveBuilder {
    fn build(&self, _entries: &[ArchiveEntry]) -> Result<Vec<u8>, ArchiveError> {
        self.gate.wait();
        Ok(Vec::new())
    }
}
