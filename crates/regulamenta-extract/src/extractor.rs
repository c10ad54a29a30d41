//! Batch extraction over the raw-document directories.

use std::path::{Path, PathBuf};

use regulamenta_core::{Document, DocumentKind, ExtractedText, ExtractionMethod, Law, TerritoryType};
use regulamenta_store::{Layout, decode_text};
use tracing::{debug, info, warn};

use crate::ExtractError;
use crate::coverage::{ExtractionDecision, coverage_ratio, decide};
use crate::html::html_to_text;
use crate::ocr::{OcrEngine, ocr_document};
use crate::pdf::PdfDocument;

#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutcome {
    /// Output already present; nothing was read or written.
    Skipped { output: PathBuf },
    Written {
        output: PathBuf,
        method: ExtractionMethod,
        /// Text-coverage ratio, for PDFs.
        coverage: Option<f64>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionReport {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub embedded: usize,
    pub ocr: usize,
    pub passthrough: usize,
    pub html: usize,
}

impl ExtractionReport {
    pub fn written(&self) -> usize {
        self.embedded + self.ocr + self.passthrough + self.html
    }

    fn record(&mut self, outcome: &ExtractionOutcome) {
        match outcome {
            ExtractionOutcome::Skipped { .. } => self.skipped += 1,
            ExtractionOutcome::Written { method, .. } => match method {
                ExtractionMethod::EmbeddedText => self.embedded += 1,
                ExtractionMethod::Ocr => self.ocr += 1,
                ExtractionMethod::Passthrough => self.passthrough += 1,
                ExtractionMethod::HtmlStrip => self.html += 1,
            },
        }
    }
}

/// Converts raw documents into `.txt` files beside them in `dados_extraidos`.
pub struct Extractor<E: OcrEngine> {
    layout: Layout,
    min_coverage: f64,
    ocr: E,
}

impl<E: OcrEngine> Extractor<E> {
    pub fn new(layout: Layout, min_coverage: f64, ocr: E) -> Self {
        Self {
            layout,
            min_coverage,
            ocr,
        }
    }

    pub fn ocr_engine(&self) -> &E {
        &self.ocr
    }

    /// Extract every raw document of the given laws. Per-document failures are
    /// logged and counted; they never stop the batch.
    pub fn run(&self, laws: &[Law]) -> ExtractionReport {
        let mut report = ExtractionReport::default();
        for &law in laws {
            for tt in TerritoryType::ALL {
                let docs = match self.layout.raw_documents(law, tt) {
                    Ok(docs) => docs,
                    Err(e) => {
                        warn!(law = %law, territory_type = %tt, error = %e, "cannot list raw documents");
                        continue;
                    }
                };
                for doc in &docs {
                    report.processed += 1;
                    match self.extract_document(doc) {
                        Ok(outcome) => report.record(&outcome),
                        Err(e) => {
                            report.failed += 1;
                            warn!(path = %doc.path.display(), error = %e, "extraction failed");
                        }
                    }
                }
            }
        }
        info!(
            processed = report.processed,
            written = report.written(),
            skipped = report.skipped,
            failed = report.failed,
            "extraction finished"
        );
        report
    }

    /// Extract one document unless its output already exists.
    pub fn extract_document(&self, doc: &Document) -> Result<ExtractionOutcome, ExtractError> {
        let output = self.layout.extracted_path_for(doc);
        if output.exists() {
            debug!(path = %doc.path.display(), "already extracted");
            return Ok(ExtractionOutcome::Skipped { output });
        }

        let (extracted, coverage) = self.extract_text(doc)?;
        write_atomically(&output, &extracted.content)?;
        info!(
            path = %doc.path.display(),
            method = extracted.method.as_str(),
            coverage = ?coverage,
            chars = extracted.content.chars().count(),
            "extracted"
        );
        Ok(ExtractionOutcome::Written {
            output,
            method: extracted.method,
            coverage,
        })
    }

    fn extract_text(&self, doc: &Document) -> Result<(ExtractedText, Option<f64>), ExtractError> {
        let text = |content: String, method| ExtractedText {
            document_stem: doc.stem.clone(),
            content,
            method,
        };
        match &doc.kind {
            DocumentKind::Text => {
                let content = decode_text(&read(&doc.path)?);
                Ok((text(content, ExtractionMethod::Passthrough), None))
            }
            DocumentKind::Html => {
                let content = html_to_text(&decode_text(&read(&doc.path)?));
                Ok((text(content, ExtractionMethod::HtmlStrip), None))
            }
            DocumentKind::Pdf => {
                let (content, method, ratio) = self.extract_pdf(&doc.path)?;
                Ok((text(content, method), Some(ratio)))
            }
            DocumentKind::Unknown(_) => Err(ExtractError::UnsupportedType(doc.path.clone())),
        }
    }

    /// Embedded text when coverage reaches the minimum, OCR otherwise.
    pub fn extract_pdf(&self, path: &Path) -> Result<(String, ExtractionMethod, f64), ExtractError> {
        let pdf = PdfDocument::load(path)?;
        let ratio = coverage_ratio(&pdf.page_layouts());
        debug!(path = %path.display(), pages = pdf.page_count(), ratio, "text coverage");
        match decide(ratio, self.min_coverage) {
            ExtractionDecision::Embedded => {
                Ok((pdf.embedded_text(), ExtractionMethod::EmbeddedText, ratio))
            }
            ExtractionDecision::NeedsOcr => {
                info!(path = %path.display(), ratio, min = self.min_coverage, "falling back to OCR");
                let content = ocr_document(&self.ocr, path, &pdf.page_numbers())?;
                Ok((content, ExtractionMethod::Ocr, ratio))
            }
        }
    }
}

fn read(path: &Path) -> Result<Vec<u8>, ExtractError> {
    std::fs::read(path).map_err(|e| ExtractError::io(path, e))
}

/// Write through a `.part` file so an interrupted run never leaves a
/// truncated output that later runs would treat as done.
fn write_atomically(output: &Path, content: &str) -> Result<(), ExtractError> {
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ExtractError::io(parent, e))?;
    }
    let partial = output.with_extension("txt.part");
    std::fs::write(&partial, content).map_err(|e| ExtractError::io(&partial, e))?;
    std::fs::rename(&partial, output).map_err(|e| ExtractError::io(output, e))
}
