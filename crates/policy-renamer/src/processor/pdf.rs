use std::collections::BTreeMap;

use lopdf::content::Content;
use lopdf::{Document, Encoding, Object, ObjectId};
use tracing::{debug, warn};

use crate::error::ProcessError;
use crate::processor::TextExtractor;

/// Kerning inside a `TJ` array below this value (thousandths of an em) is
/// read as a word gap.
const TJ_SPACE_THRESHOLD: f32 = -100.0;

/// First-page text extraction backed by `lopdf`.
///
/// Every text-showing operator (`Tj`, `TJ`, `'`, `"`) on the page yields one
/// fragment. Fragments are joined with a single space, so separate runs never
/// fuse into one word.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for PdfTextExtractor {
    fn first_page_text(&self, content: &[u8]) -> Result<String, ProcessError> {
        let _span = tracing::info_span!("processor.pdf", bytes = content.len()).entered();

        let doc =
            Document::load_mem(content).map_err(|e| ProcessError::PdfProcessing(e.to_string()))?;

        // Page numbers are keys of an ordered map; the smallest is the first page.
        let first_page = doc
            .get_pages()
            .values()
            .next()
            .copied()
            .ok_or(ProcessError::NoPages)?;

        let text = page_fragments(&doc, first_page)?.join(" ");
        debug!(chars = text.chars().count(), "Extracted first page text");
        Ok(text)
    }
}

/// Decodes the text runs of one page, in content-stream order.
fn page_fragments(doc: &Document, page_id: ObjectId) -> Result<Vec<String>, ProcessError> {
    let encodings: BTreeMap<Vec<u8>, Encoding> = doc
        .get_page_fonts(page_id)
        .map_err(|e| ProcessError::TextExtraction(e.to_string()))?
        .into_iter()
        .filter_map(|(name, font)| match font.get_font_encoding(doc) {
            Ok(encoding) => Some((name, encoding)),
            Err(e) => {
                warn!(font = %String::from_utf8_lossy(&name), "Unsupported font encoding: {}", e);
                None
            }
        })
        .collect();

    let data = doc
        .get_page_content(page_id)
        .map_err(|e| ProcessError::TextExtraction(e.to_string()))?;
    let content =
        Content::decode(&data).map_err(|e| ProcessError::TextExtraction(e.to_string()))?;

    let mut fragments = Vec::new();
    let mut first_error = None;
    let mut current: Option<&Encoding> = None;

    for operation in &content.operations {
        match operation.operator.as_str() {
            "Tf" => {
                current = operation
                    .operands
                    .first()
                    .and_then(|o| o.as_name().ok())
                    .and_then(|name| encodings.get(name));
            }
            "Tj" | "TJ" | "'" | "\"" => {
                let Some(encoding) = current else {
                    debug!("Skipping text run without a usable font");
                    continue;
                };
                let mut run = String::new();
                match decode_run(&mut run, encoding, &operation.operands) {
                    Ok(()) => {
                        let run = run.trim();
                        if !run.is_empty() {
                            fragments.push(run.to_string());
                        }
                    }
                    Err(e) => {
                        debug!("Could not decode text run: {}", e);
                        first_error.get_or_insert(e);
                    }
                }
            }
            _ => {}
        }
    }

    match first_error {
        Some(e) if fragments.is_empty() => Err(ProcessError::TextExtraction(e.to_string())),
        _ => Ok(fragments),
    }
}

/// Appends the strings among `operands` to `out`. Inside `TJ` arrays a large
/// negative adjustment becomes a space.
fn decode_run(out: &mut String, encoding: &Encoding, operands: &[Object]) -> lopdf::Result<()> {
    for operand in operands {
        match operand {
            Object::String(bytes, _) => out.push_str(&Document::decode_text(encoding, bytes)?),
            Object::Array(items) => {
                for item in items {
                    match item {
                        Object::String(bytes, _) => {
                            out.push_str(&Document::decode_text(encoding, bytes)?)
                        }
                        other => {
                            if other.as_float().is_ok_and(|k| k < TJ_SPACE_THRESHOLD) {
                                out.push(' ');
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Document, Object, Stream};

    fn build_pdf(page_contents: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let mut kids = Vec::new();
        for content in page_contents {
            let content_id = doc.add_object(Object::Stream(Stream::new(
                dictionary! {},
                content.as_bytes().to_vec(),
            )));
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
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_extracts_first_page_only() {
        let pdf = build_pdf(&[
            "BT /F1 12 Tf 50 700 Td (Policy Summary) Tj ET",
            "BT /F1 12 Tf 50 700 Td (Second Page) Tj ET",
        ]);

        let text = PdfTextExtractor::new().first_page_text(&pdf).unwrap();
        assert!(text.contains("Policy Summary"), "got: {:?}", text);
        assert!(!text.contains("Second Page"), "got: {:?}", text);
    }

    #[test]
    fn test_result_is_single_line() {
        let pdf = build_pdf(&[
            "BT /F1 12 Tf 50 700 Td (Line one) Tj ET BT /F1 12 Tf 50 680 Td (Line two) Tj ET",
        ]);

        let text = PdfTextExtractor::new().first_page_text(&pdf).unwrap();
        assert_eq!(text, "Line one Line two");
    }

    #[test]
    fn test_corrupted_pdf_error() {
        let result = PdfTextExtractor::new().first_page_text(b"not a valid pdf content");
        match result {
            Err(ProcessError::PdfProcessing(_)) => {}
            other => panic!("Expected PdfProcessing error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_input_error() {
        assert!(PdfTextExtractor::new().first_page_text(b"").is_err());
    }

    #[test]
    fn test_runs_in_one_text_block_are_space_separated() {
        let pdf = build_pdf(&[
            "BT /F1 12 Tf 50 700 Td (Poliza de) Tj 80 0 Td (Auto Flex) Tj 70 0 Td (correspondiente) Tj ET",
        ]);

        let text = PdfTextExtractor::new().first_page_text(&pdf).unwrap();
        assert_eq!(text, "Poliza de Auto Flex correspondiente");
    }

    #[test]
    fn test_tj_array_is_one_fragment() {
        let pdf = build_pdf(&[
            "BT /F1 12 Tf 50 700 Td [(Au) 20 (to) -250 (Flex)] TJ (al periodo) Tj ET",
        ]);

        let text = PdfTextExtractor::new().first_page_text(&pdf).unwrap();
        assert_eq!(text, "Auto Flex al periodo");
    }

    #[test]
    fn test_whitespace_runs_are_dropped() {
        let pdf = build_pdf(&["BT /F1 12 Tf 50 700 Td (a) Tj ( ) Tj (b) Tj ET"]);

        let text = PdfTextExtractor::new().first_page_text(&pdf).unwrap();
        assert_eq!(text, "a b");
    }

    #[test]
    fn test_page_without_text() {
        let pdf = build_pdf(&["0 0 m 100 100 l S"]);
        assert_eq!(PdfTextExtractor::new().first_page_text(&pdf).unwrap(), "");
    }
}
