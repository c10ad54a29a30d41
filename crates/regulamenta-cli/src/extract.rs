use regulamenta_extract::{Extractor, TesseractOcr};

use crate::context::RunContext;
use crate::report::Summary;

pub fn run(ctx: &RunContext) -> Summary {
    let ocr = TesseractOcr::new(ctx.config.ocr_language.clone(), ctx.config.ocr_dpi);
    let extractor = Extractor::new(ctx.layout.clone(), ctx.config.min_text_coverage, ocr);
    Summary::from_extraction(&extractor.run(ctx.laws()))
}

#[cfg(test)]
mod tests {
    use regulamenta_core::{Law, TerritoryType};

    use super::*;
    use crate::context::test_context;

    #[test]
    fn text_documents_need_no_external_tools() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = test_context(dir.path());
        let raw = ctx.layout.raw_dir(Law::Lgd, TerritoryType::Estado);
        std::fs::create_dir_all(&raw).unwrap();
        std::fs::write(raw.join("Bahia_LGD.txt"), "Decreto nº 19.001").unwrap();
        std::fs::write(raw.join("Acre_LGD.html"), "<p>Decreto 10.100</p>").unwrap();

        let summary = run(&ctx);
        assert_eq!(summary.processed, 2);
        assert_eq!(summary.written, 2);
        assert_eq!(summary.failed, 0);
        let out = ctx.layout.extracted_dir(Law::Lgd, TerritoryType::Estado);
        assert_eq!(std::fs::read_to_string(out.join("Acre_LGD.txt")).unwrap(), "Decreto 10.100");
    }
}
