//! Directory convention shared by every batch job.
//!
//! ```text
//! <root>/<LAW>/validado_<LAW>.csv
//! <root>/<LAW>/<capital|estado>/dados_brutos/<Territory>_<LAW>.<ext>
//! <root>/<LAW>/<capital|estado>/dados_extraidos/<Territory>_<LAW>.txt
//! <root>/identificador/identificado/identificado_<LAW>.csv
//! <root>/identificador/resultados/decretos_identificados_por_arquivo_<LAW>.csv
//! ```

use std::path::{Path, PathBuf};

use regulamenta_core::{Document, Law, TerritoryType};
use tracing::warn;

use crate::StoreError;

pub const RAW_DIR: &str = "dados_brutos";
pub const EXTRACTED_DIR: &str = "dados_extraidos";

#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn law_dir(&self, law: Law) -> PathBuf {
        self.root.join(law.code())
    }

    pub fn raw_dir(&self, law: Law, tt: TerritoryType) -> PathBuf {
        self.law_dir(law).join(tt.dir_name()).join(RAW_DIR)
    }

    pub fn extracted_dir(&self, law: Law, tt: TerritoryType) -> PathBuf {
        self.law_dir(law).join(tt.dir_name()).join(EXTRACTED_DIR)
    }

    /// Where the plain text of `doc` lives once extracted.
    pub fn extracted_path_for(&self, doc: &Document) -> PathBuf {
        self.extracted_dir(doc.law, doc.territory_type)
            .join(format!("{}.txt", doc.stem))
    }

    pub fn validated_csv(&self, law: Law) -> PathBuf {
        self.law_dir(law).join(format!("validado_{}.csv", law.code()))
    }

    pub fn identified_csv(&self, law: Law) -> PathBuf {
        self.root
            .join("identificador")
            .join("identificado")
            .join(format!("identificado_{}.csv", law.code()))
    }

    pub fn results_csv(&self, law: Law) -> PathBuf {
        self.root
            .join("identificador")
            .join("resultados")
            .join(format!("decretos_identificados_por_arquivo_{}.csv", law.code()))
    }

    /// Path a downloaded document is saved to.
    pub fn raw_path(&self, law: Law, tt: TerritoryType, territory: &str, ext: &str) -> PathBuf {
        self.raw_dir(law, tt).join(raw_file_name(territory, law, ext))
    }

    /// Raw documents for one (law, territory type), sorted by path.
    ///
    /// A missing directory is an empty listing, not an error.
    pub fn raw_documents(&self, law: Law, tt: TerritoryType) -> Result<Vec<Document>, StoreError> {
        let dir = self.raw_dir(law, tt);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let entries = std::fs::read_dir(&dir).map_err(|e| StoreError::io(&dir, e))?;
        let mut paths = Vec::new();
        for entry in entries {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    let partial = path.extension().is_some_and(|e| e == "part");
                    if path.is_file() && !partial {
                        paths.push(path);
                    }
                }
                Err(e) => warn!(dir = %dir.display(), error = %e, "skipping unreadable entry"),
            }
        }
        paths.sort();
        Ok(paths
            .into_iter()
            .map(|p| Document::new(law, tt, p))
            .collect())
    }
}

/// `<territory, ASCII words joined by _>_<LAW>.<ext>`, e.g. "São Paulo" →
/// `Sao_Paulo_LAI.pdf`.
///
/// The whole name is kept: territories sharing a first word ("Rio de
/// Janeiro", "Rio Grande do Sul") must not share a file.
pub fn raw_file_name(territory: &str, law: Law, ext: &str) -> String {
    let ascii = deunicode::deunicode(territory);
    let words: Vec<&str> = ascii
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
        .filter(|w| !w.is_empty())
        .collect();
    let stem = if words.is_empty() {
        "desconhecido".to_string()
    } else {
        words.join("_")
    };
    format!("{stem}_{}.{}", law.code(), ext.trim_start_matches('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_convention() {
        let layout = Layout::new("/data");
        assert_eq!(
            layout.raw_dir(Law::Lai, TerritoryType::Capital),
            PathBuf::from("/data/LAI/capital/dados_brutos")
        );
        assert_eq!(
            layout.extracted_dir(Law::Lgpd, TerritoryType::Estado),
            PathBuf::from("/data/LGPD/estado/dados_extraidos")
        );
        assert_eq!(
            layout.validated_csv(Law::Mrosc),
            PathBuf::from("/data/MROSC/validado_MROSC.csv")
        );
        assert_eq!(
            layout.results_csv(Law::Lgd),
            PathBuf::from("/data/identificador/resultados/decretos_identificados_por_arquivo_LGD.csv")
        );
    }

    #[test]
    fn extracted_path_mirrors_raw_stem() {
        let layout = Layout::new("/data");
        let doc = Document::new(
            Law::Lai,
            TerritoryType::Estado,
            PathBuf::from("/data/LAI/estado/dados_brutos/Bahia_LAI.html"),
        );
        assert_eq!(
            layout.extracted_path_for(&doc),
            PathBuf::from("/data/LAI/estado/dados_extraidos/Bahia_LAI.txt")
        );
    }

    #[test]
    fn raw_file_names_are_ascii() {
        assert_eq!(raw_file_name("São Paulo", Law::Lai, "pdf"), "Sao_Paulo_LAI.pdf");
        assert_eq!(raw_file_name("Goiânia", Law::Lgpd, ".html"), "Goiania_LGPD.html");
        assert_eq!(raw_file_name("  Recife (PE) ", Law::Mrosc, "pdf"), "Recife_PE_MROSC.pdf");
        assert_eq!(raw_file_name("", Law::Lgd, "pdf"), "desconhecido_LGD.pdf");
    }

    #[test]
    fn territories_sharing_a_first_word_get_distinct_paths() {
        let layout = Layout::new("/data");
        let names = [
            "Rio de Janeiro",
            "Rio Grande do Sul",
            "Rio Grande do Norte",
            "Mato Grosso",
            "Mato Grosso do Sul",
            "São Paulo",
            "São Luís",
            "Porto Alegre",
            "Porto Velho",
        ];
        let mut paths: Vec<PathBuf> = names
            .iter()
            .map(|n| layout.raw_path(Law::Lai, TerritoryType::Estado, n, "pdf"))
            .collect();
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), names.len());
        assert_eq!(
            layout.raw_path(Law::Lai, TerritoryType::Estado, "Rio Grande do Sul", "pdf"),
            PathBuf::from("/data/LAI/estado/dados_brutos/Rio_Grande_do_Sul_LAI.pdf")
        );
    }

    #[test]
    fn full_names_keep_the_law_detectable() {
        let name = raw_file_name("Mato Grosso do Sul", Law::Lgpd, "pdf");
        let stem = name.trim_end_matches(".pdf");
        assert_eq!(Law::detect_in(stem), Some(Law::Lgpd));
    }

    #[test]
    fn raw_documents_lists_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let layout = Layout::new(dir.path());
        let raw = layout.raw_dir(Law::Lai, TerritoryType::Capital);
        std::fs::create_dir_all(&raw).unwrap();
        std::fs::write(raw.join("Recife_LAI.pdf"), b"%PDF").unwrap();
        std::fs::write(raw.join("Belem_LAI.html"), b"<p>").unwrap();
        std::fs::write(raw.join("Natal_LAI.pdf.part"), b"").unwrap();

        let docs = layout.raw_documents(Law::Lai, TerritoryType::Capital).unwrap();
        let stems: Vec<_> = docs.iter().map(|d| d.stem.as_str()).collect();
        assert_eq!(stems, vec!["Belem_LAI", "Recife_LAI"]);

        assert!(layout.raw_documents(Law::Lgd, TerritoryType::Estado).unwrap().is_empty());
    }
}
