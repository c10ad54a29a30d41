//! Extractor: turns raw PDF/HTML/TXT documents into plain text.
//!
//! PDFs whose embedded text covers too little of the page area are treated
//! as scans and sent through OCR instead.

mod error;
pub use error::ExtractError;

pub mod coverage;
pub mod extractor;
pub mod html;
pub mod ocr;
pub mod pdf;

pub use coverage::{ExtractionDecision, PageLayout, Rect, coverage_ratio, decide};
pub use extractor::{ExtractionOutcome, ExtractionReport, Extractor};
pub use html::html_to_text;
pub use ocr::{OcrEngine, TesseractOcr, ocr_document};
pub use pdf::PdfDocument;
