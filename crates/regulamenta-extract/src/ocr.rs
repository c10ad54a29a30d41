//! OCR fallback for PDFs without usable embedded text.
//!
//! Pages are rasterised with Poppler's `pdftoppm` and recognised with
//! Tesseract, one page at a time. A failed page is logged and skipped; the
//! document only fails when no page could be recognised.

use std::path::Path;
use std::process::Command;

use tracing::{debug, info, warn};

use crate::ExtractError;

/// Recognises the text of a single PDF page.
pub trait OcrEngine {
    fn name(&self) -> &'static str;

    /// `page_number` is 1-based.
    fn recognize_page(&self, pdf: &Path, page_number: u32) -> Result<String, ExtractError>;
}

/// `pdftoppm` + `tesseract` command-line tools.
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    language: String,
    dpi: u32,
}

impl TesseractOcr {
    pub fn new(language: impl Into<String>, dpi: u32) -> Self {
        Self {
            language: language.into(),
            dpi,
        }
    }

    fn run(pdf: &Path, command: &mut Command, tool: &str) -> Result<Vec<u8>, ExtractError> {
        let output = command
            .output()
            .map_err(|e| ExtractError::ocr(pdf, format!("cannot run {tool}: {e}")))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractError::ocr(
                pdf,
                format!("{tool} exited with {}: {}", output.status, stderr.trim()),
            ));
        }
        Ok(output.stdout)
    }
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self::new("por", 300)
    }
}

impl OcrEngine for TesseractOcr {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn recognize_page(&self, pdf: &Path, page_number: u32) -> Result<String, ExtractError> {
        let scratch = tempfile::tempdir().map_err(|e| ExtractError::io(pdf, e))?;
        let prefix = scratch.path().join("page");
        let page = page_number.to_string();
        let dpi = self.dpi.to_string();

        Self::run(
            pdf,
            Command::new("pdftoppm")
                .args(["-r", dpi.as_str(), "-f", page.as_str(), "-l", page.as_str()])
                .args(["-png", "-singlefile"])
                .arg(pdf)
                .arg(&prefix),
            "pdftoppm",
        )?;

        let image = prefix.with_extension("png");
        let stdout = Self::run(
            pdf,
            Command::new("tesseract")
                .arg(&image)
                .arg("stdout")
                .args(["-l", self.language.as_str()]),
            "tesseract",
        )?;
        debug!(pdf = %pdf.display(), page = page_number, bytes = stdout.len(), "page recognised");
        Ok(String::from_utf8_lossy(&stdout).into_owned())
    }
}

/// OCR every page and join the results with page separators.
///
/// Pages that fail are logged and left out.
pub fn ocr_document<E: OcrEngine + ?Sized>(
    engine: &E,
    pdf: &Path,
    pages: &[u32],
) -> Result<String, ExtractError> {
    if pages.is_empty() {
        return Err(ExtractError::ocr(pdf, "document has no pages"));
    }

    let mut parts = Vec::with_capacity(pages.len());
    let mut failed = 0usize;
    for &page in pages {
        match engine.recognize_page(pdf, page) {
            Ok(text) => parts.push(format!("--- página {page} ---\n{}", text.trim_end())),
            Err(e) => {
                failed += 1;
                warn!(pdf = %pdf.display(), page, engine = engine.name(), error = %e, "OCR failed on page");
            }
        }
    }

    if parts.is_empty() {
        return Err(ExtractError::ocr(
            pdf,
            format!("all {} pages failed", pages.len()),
        ));
    }
    info!(pdf = %pdf.display(), pages = parts.len(), failed, "OCR complete");
    Ok(parts.join("\n\n"))
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::RefCell;

    use super::*;

    /// Records every page it is asked to recognise; fails on listed pages.
    #[derive(Default)]
    pub(crate) struct RecordingOcr {
        pub calls: RefCell<Vec<u32>>,
        pub fail_on: Vec<u32>,
    }

    impl OcrEngine for RecordingOcr {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn recognize_page(&self, pdf: &Path, page_number: u32) -> Result<String, ExtractError> {
            self.calls.borrow_mut().push(page_number);
            if self.fail_on.contains(&page_number) {
                return Err(ExtractError::ocr(pdf, "simulated failure"));
            }
            Ok(format!("Decreto nº {page_number}.000 reconhecido\n"))
        }
    }

    #[test]
    fn pages_joined_with_separators() {
        let engine = RecordingOcr::default();
        let text = ocr_document(&engine, Path::new("scan.pdf"), &[1, 2]).unwrap();
        assert_eq!(
            text,
            "--- página 1 ---\nDecreto nº 1.000 reconhecido\n\n--- página 2 ---\nDecreto nº 2.000 reconhecido"
        );
        assert_eq!(*engine.calls.borrow(), vec![1, 2]);
    }

    #[test]
    fn failed_pages_are_skipped() {
        let engine = RecordingOcr {
            fail_on: vec![2],
            ..Default::default()
        };
        let text = ocr_document(&engine, Path::new("scan.pdf"), &[1, 2, 3]).unwrap();
        assert!(text.contains("página 1"));
        assert!(!text.contains("página 2"));
        assert!(text.contains("página 3"));
        assert_eq!(engine.calls.borrow().len(), 3);
    }

    #[test]
    fn all_pages_failing_is_an_error() {
        let engine = RecordingOcr {
            fail_on: vec![1],
            ..Default::default()
        };
        assert!(matches!(
            ocr_document(&engine, Path::new("scan.pdf"), &[1]),
            Err(ExtractError::Ocr { .. })
        ));
    }

    #[test]
    fn zero_pages_is_an_error() {
        let engine = RecordingOcr::default();
        assert!(ocr_document(&engine, Path::new("empty.pdf"), &[]).is_err());
        assert!(engine.calls.borrow().is_empty());
    }

    #[test]
    fn missing_tools_reported_as_ocr_error() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("none.pdf");
        let mut cmd = Command::new("regulamenta-no-such-tool");
        let err = TesseractOcr::run(&pdf, &mut cmd, "regulamenta-no-such-tool").unwrap_err();
        assert!(matches!(err, ExtractError::Ocr { .. }));
    }
}
