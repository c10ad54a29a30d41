//! Records flowing between the batch jobs.
//!
//! Documents are created by the downloader, turned into extracted text once,
//! and never mutated afterwards. Regulation records and match results are
//! derived purely from spreadsheets and already-extracted text.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::law::{Law, TerritoryType};
use crate::snippet::SearchOutcome;

/// File type of a raw document, derived from its extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentKind {
    Pdf,
    Html,
    Text,
    Unknown(String),
}

impl DocumentKind {
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "pdf" => Self::Pdf,
            "html" | "htm" => Self::Html,
            "txt" => Self::Text,
            _ => Self::Unknown(ext),
        }
    }
}

/// A raw file stored under `<LAW>/<territory-type>/dados_brutos`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub law: Law,
    pub territory_type: TerritoryType,
    /// File stem; mirrors the extracted `.txt` name.
    pub stem: String,
    pub path: PathBuf,
    pub kind: DocumentKind,
}

impl Document {
    pub fn new(law: Law, territory_type: TerritoryType, path: PathBuf) -> Self {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let kind = DocumentKind::from_path(&path);
        Self {
            law,
            territory_type,
            stem,
            path,
            kind,
        }
    }
}

/// How the plain text of a document was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    EmbeddedText,
    Ocr,
    Passthrough,
    HtmlStrip,
}

impl ExtractionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmbeddedText => "embedded_text",
            Self::Ocr => "ocr",
            Self::Passthrough => "passthrough",
            Self::HtmlStrip => "html_strip",
        }
    }
}

/// Plain-text result of processing one [`Document`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedText {
    pub document_stem: String,
    pub content: String,
    pub method: ExtractionMethod,
}

/// One spreadsheet row after schema mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegulationRecord {
    pub law: Law,
    pub territory_type: Option<TerritoryType>,
    /// Territory name as written in the sheet, e.g. "São Paulo".
    pub territory: String,
    /// Free-text regulation reference, e.g. "Decreto nº 35.606, de 2019".
    pub regulation_text: String,
    /// Canonical decree number derived from `regulation_text`.
    pub decree_number: Option<String>,
    pub source_link: Option<String>,
}

/// Result of searching one record's decree inside one extracted text file.
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub txt_file: String,
    pub txt_path: PathBuf,
    pub territory: String,
    pub original_value: String,
    pub extracted_value: String,
    pub outcome: SearchOutcome,
}

impl MatchResult {
    pub fn is_found(&self) -> bool {
        matches!(self.outcome, SearchOutcome::Found(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_from_extension() {
        assert_eq!(DocumentKind::from_path(Path::new("a/Rio_LAI.PDF")), DocumentKind::Pdf);
        assert_eq!(DocumentKind::from_path(Path::new("x.htm")), DocumentKind::Html);
        assert_eq!(DocumentKind::from_path(Path::new("x.txt")), DocumentKind::Text);
        assert_eq!(
            DocumentKind::from_path(Path::new("x.docx")),
            DocumentKind::Unknown("docx".into())
        );
    }

    #[test]
    fn document_stem_mirrors_file_name() {
        let doc = Document::new(
            Law::Lai,
            TerritoryType::Capital,
            PathBuf::from("LAI/capital/dados_brutos/Recife_LAI.pdf"),
        );
        assert_eq!(doc.stem, "Recife_LAI");
        assert_eq!(doc.kind, DocumentKind::Pdf);
    }
}
