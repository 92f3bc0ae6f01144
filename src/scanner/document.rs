//! Document text extraction.
//!
//! This module recovers plain text from the document types the classifier
//! routes to the scan phase:
//! - PDF documents (via pdf-extract)
//! - Word documents (via docx-rs)
//! - Plain text files
//!
//! Every failure is reported as a [`DocumentError`]; the pipeline treats any
//! of them as "no report for this document".

use std::cell::Cell;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Once;
use thiserror::Error;

use super::ContentType;

/// Errors that can occur during document text extraction.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// An error occurred during PDF extraction.
    #[error("Failed to extract text from PDF {path}: {message}")]
    PdfError {
        /// Path to the PDF file
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// An error occurred during DOCX extraction.
    #[error("Failed to extract text from DOCX {path}: {message}")]
    DocxError {
        /// Path to the DOCX file
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// The renderer panicked on malformed input.
    #[error("Text extraction panicked for {path}: {message}")]
    Panicked {
        /// Path to the document
        path: PathBuf,
        /// Panic payload, if it was a string
        message: String,
    },

    /// The content type is not a document.
    #[error("Unsupported document type '{kind}': {path}")]
    UnsupportedFormat {
        /// Path to the file
        path: PathBuf,
        /// Detected content type
        kind: ContentType,
    },
}

/// Extractor for document text.
pub struct DocumentExtractor;

impl DocumentExtractor {
    /// Extract text from a document of the given content type.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the document file
    /// * `kind` - Content type reported by the classifier
    ///
    /// # Errors
    ///
    /// Returns a [`DocumentError`] if the file cannot be read or rendered, or
    /// if `kind` is not a document type.
    pub fn extract_text(path: &Path, kind: ContentType) -> Result<String, DocumentError> {
        match kind {
            ContentType::Pdf => Self::extract_pdf(path),
            ContentType::Docx => Self::extract_docx(path),
            ContentType::PlainText => Self::extract_plain_text(path),
            _ => Err(DocumentError::UnsupportedFormat {
                path: path.to_path_buf(),
                kind,
            }),
        }
    }

    /// Extract text from a PDF file.
    fn extract_pdf(path: &Path) -> Result<String, DocumentError> {
        let result = catch_renderer_panic(|| pdf_extract::extract_text(path));

        match result {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(DocumentError::PdfError {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(payload) => Err(DocumentError::Panicked {
                path: path.to_path_buf(),
                message: panic_message(payload.as_ref()),
            }),
        }
    }

    /// Extract text from a DOCX file.
    fn extract_docx(path: &Path) -> Result<String, DocumentError> {
        let bytes = fs::read(path).map_err(|e| DocumentError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let docx = docx_rs::read_docx(&bytes).map_err(|e| DocumentError::DocxError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut text = String::new();
        for child in &docx.document.children {
            Self::extract_text_from_child(child, &mut text);
        }

        Ok(text)
    }

    /// Recursively extract text from DOCX document children.
    fn extract_text_from_child(child: &docx_rs::DocumentChild, text: &mut String) {
        match child {
            docx_rs::DocumentChild::Paragraph(p) => Self::push_paragraph(p, text),
            docx_rs::DocumentChild::Table(t) => Self::push_table(t, text),
            docx_rs::DocumentChild::StructuredDataTag(sdt) => Self::push_sdt(sdt, text),
            _ => {}
        }
    }

    fn push_paragraph(p: &docx_rs::Paragraph, text: &mut String) {
        Self::push_paragraph_children(&p.children, text);
        text.push('\n');
    }

    /// Runs, including those nested in hyperlinks, tracked insertions and
    /// inline content controls. Tracked deletions are not part of the text.
    fn push_paragraph_children(children: &[docx_rs::ParagraphChild], text: &mut String) {
        for child in children {
            match child {
                docx_rs::ParagraphChild::Run(r) => Self::push_run(r, text),
                docx_rs::ParagraphChild::Hyperlink(h) => {
                    Self::push_paragraph_children(&h.children, text);
                }
                docx_rs::ParagraphChild::Insert(ins) => {
                    for child in &ins.children {
                        if let docx_rs::InsertChild::Run(r) = child {
                            Self::push_run(r, text);
                        }
                    }
                }
                docx_rs::ParagraphChild::StructuredDataTag(sdt) => Self::push_sdt(sdt, text),
                _ => {}
            }
        }
    }

    fn push_run(r: &docx_rs::Run, text: &mut String) {
        for child in &r.children {
            if let docx_rs::RunChild::Text(t) = child {
                text.push_str(&t.text);
            }
        }
    }

    fn push_sdt(sdt: &docx_rs::StructuredDataTag, text: &mut String) {
        for child in &sdt.children {
            match child {
                docx_rs::StructuredDataTagChild::Run(r) => Self::push_run(r, text),
                docx_rs::StructuredDataTagChild::Paragraph(p) => Self::push_paragraph(p, text),
                docx_rs::StructuredDataTagChild::Table(t) => Self::push_table(t, text),
                _ => {}
            }
        }
    }

    fn push_table(t: &docx_rs::Table, text: &mut String) {
        for row_child in &t.rows {
            let docx_rs::TableChild::TableRow(tr) = row_child;
            for cell_child in &tr.cells {
                let docx_rs::TableRowChild::TableCell(tc) = cell_child;
                for child in &tc.children {
                    match child {
                        docx_rs::TableCellContent::Paragraph(p) => Self::push_paragraph(p, text),
                        docx_rs::TableCellContent::Table(t) => Self::push_table(t, text),
                        _ => {}
                    }
                }
                // Cells on one row are separate tokens
                text.push('\t');
            }
            text.push('\n');
        }
    }

    /// Extract text from a plain text file.
    fn extract_plain_text(path: &Path) -> Result<String, DocumentError> {
        fs::read_to_string(path).map_err(|e| DocumentError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

thread_local! {
    static IN_RENDERER: Cell<bool> = const { Cell::new(false) };
}

static QUIET_HOOK: Once = Once::new();

/// Run `f`, turning a panic into an `Err`.
///
/// Panics raised inside `f` go to the debug log instead of stderr. Panics
/// elsewhere still reach the previously installed hook.
fn catch_renderer_panic<T>(f: impl FnOnce() -> T) -> std::thread::Result<T> {
    QUIET_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if IN_RENDERER.with(Cell::get) {
                log::debug!("Renderer panicked: {}", info);
            } else {
                previous(info);
            }
        }));
    });

    IN_RENDERER.with(|flag| flag.set(true));
    let result = panic::catch_unwind(AssertUnwindSafe(f));
    IN_RENDERER.with(|flag| flag.set(false));
    result
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
