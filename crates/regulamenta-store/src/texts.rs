//! The extracted-text corpus searched by the decree identifier.

use std::path::PathBuf;

use regulamenta_core::{Law, TerritoryType};
use tracing::{info, warn};

use crate::layout::Layout;
use crate::table::decode_text;

/// One `.txt` file from a `dados_extraidos` directory.
#[derive(Debug, Clone)]
pub struct TextFile {
    /// File name without extension, original case preserved.
    pub stem: String,
    pub path: PathBuf,
    pub content: String,
}

/// Load every extracted text under the given laws, sorted by path.
///
/// Unreadable files are logged and skipped.
pub fn load_corpus(layout: &Layout, laws: &[Law]) -> Vec<TextFile> {
    let mut paths = Vec::new();
    for &law in laws {
        for tt in TerritoryType::ALL {
            let dir = layout.extracted_dir(law, tt);
            let Ok(entries) = std::fs::read_dir(&dir) else {
                continue;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                let is_txt = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("txt"));
                if is_txt && path.is_file() {
                    paths.push(path);
                }
            }
        }
    }
    paths.sort();

    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        match std::fs::read(&path) {
            Ok(bytes) => {
                let stem = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                files.push(TextFile {
                    stem,
                    content: decode_text(&bytes),
                    path,
                });
            }
            Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable text"),
        }
    }
    info!(count = files.len(), "loaded extracted texts");
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_txt_files_across_laws_and_territories() {
        let dir = tempfile::tempdir().unwrap();
        let layout = Layout::new(dir.path());

        let lai = layout.extracted_dir(Law::Lai, TerritoryType::Capital);
        let lgpd = layout.extracted_dir(Law::Lgpd, TerritoryType::Estado);
        std::fs::create_dir_all(&lai).unwrap();
        std::fs::create_dir_all(&lgpd).unwrap();
        std::fs::write(lai.join("Recife_LAI.txt"), "Decreto nº 28.527").unwrap();
        std::fs::write(lai.join("notas.md"), "ignored").unwrap();
        std::fs::write(lgpd.join("Bahia_LGPD.TXT"), b"Decreto n\xba 1").unwrap();

        let corpus = load_corpus(&layout, &Law::ALL);
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus[0].stem, "Recife_LAI");
        assert_eq!(corpus[1].stem, "Bahia_LGPD");
        assert_eq!(corpus[1].content, "Decreto nº 1");

        let only_lai = load_corpus(&layout, &[Law::Lai]);
        assert_eq!(only_lai.len(), 1);
    }
}
