//! Downloads every regulation linked from the validated sheets.

use regulamenta_core::RegulationRecord;
use regulamenta_fetch::DownloadOutcome;
use regulamenta_store::load_records;
use tracing::{debug, info, warn};

use crate::context::RunContext;
use crate::report::Summary;

/// First `http(s)://` token of a link cell. Sheets sometimes hold several
/// links, or a note before the URL.
fn first_url(cell: &str) -> Option<&str> {
    cell.split_whitespace()
        .map(|tok| tok.trim_matches(|c| matches!(c, ',' | ';' | '"' | '(' | ')')))
        .find(|tok| tok.starts_with("http://") || tok.starts_with("https://"))
}

pub async fn run(ctx: &RunContext) -> Summary {
    let mut summary = Summary::new("download");
    for &law in ctx.laws() {
        let sheet = ctx.layout.validated_csv(law);
        if !sheet.exists() {
            info!(law = %law, path = %sheet.display(), "no validated sheet, ignored");
            continue;
        }
        let records = match load_records(&sheet, law, ctx.config.decree_pattern) {
            Ok(records) => records,
            Err(e) => {
                warn!(law = %law, error = %e, "cannot read sheet");
                summary.failed += 1;
                continue;
            }
        };
        for record in &records {
            download_record(ctx, record, &mut summary).await;
        }
    }
    summary
}

async fn download_record(ctx: &RunContext, record: &RegulationRecord, summary: &mut Summary) {
    let Some(link) = record.source_link.as_deref() else {
        return;
    };
    summary.processed += 1;
    let Some(url) = first_url(link) else {
        warn!(territory = %record.territory, link, "link cell holds no URL");
        summary.skipped += 1;
        return;
    };
    let Some(tt) = record.territory_type else {
        warn!(territory = %record.territory, "row has no capital/estado value");
        summary.skipped += 1;
        return;
    };

    let result = ctx
        .fetcher
        .download(url, |ext| {
            ctx.layout.raw_path(record.law, tt, &record.territory, ext)
        })
        .await;
    match result {
        Ok(DownloadOutcome::Downloaded { .. }) => summary.written += 1,
        Ok(DownloadOutcome::Skipped { path }) => {
            debug!(path = %path.display(), "already present");
            summary.skipped += 1;
        }
        Err(e) => {
            warn!(territory = %record.territory, url, error = %e, "download failed");
            summary.failed += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use regulamenta_core::{Law, TerritoryType};

    use super::*;
    use crate::context::test_context;

    #[test]
    fn url_is_picked_out_of_the_cell() {
        assert_eq!(first_url("https://a.gov.br/d.pdf"), Some("https://a.gov.br/d.pdf"));
        assert_eq!(
            first_url("ver: (http://a.gov.br/x.html), https://b.gov.br"),
            Some("http://a.gov.br/x.html")
        );
        assert_eq!(first_url("não encontrado"), None);
    }

    #[tokio::test]
    async fn rows_without_link_or_type_are_not_fetched() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = test_context(dir.path());
        let sheet = ctx.layout.validated_csv(Law::Lgd);
        std::fs::create_dir_all(sheet.parent().unwrap()).unwrap();
        std::fs::write(
            &sheet,
            "Capital / Estado,Nome,Regulamentação,Link\n\
             Capital,Recife,Decreto 1.000,\n\
             ,Natal,Decreto 2.000,https://natal.rn.gov.br/d.pdf\n\
             Capital,Maceió,Decreto 3.000,sem link\n",
        )
        .unwrap();

        let summary = run(&ctx).await;
        assert_eq!(summary.processed, 2);
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.written + summary.failed, 0);
    }

    #[tokio::test]
    async fn existing_files_are_not_downloaded_again() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = test_context(dir.path());
        let sheet = ctx.layout.validated_csv(Law::Lai);
        std::fs::create_dir_all(sheet.parent().unwrap()).unwrap();
        std::fs::write(
            &sheet,
            "Capital / Estado,Nome,Regulamentação,Link\n\
             Capital,São Paulo,Decreto 53.623,http://invalid.invalid/53623.pdf\n",
        )
        .unwrap();
        let existing = ctx.layout.raw_path(Law::Lai, TerritoryType::Capital, "São Paulo", "pdf");
        std::fs::create_dir_all(existing.parent().unwrap()).unwrap();
        std::fs::write(&existing, b"%PDF").unwrap();

        let summary = run(&ctx).await;
        assert_eq!(summary.processed, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 0);
    }

    #[tokio::test]
    async fn states_sharing_a_first_word_are_fetched_separately() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = test_context(dir.path());
        let sheet = ctx.layout.validated_csv(Law::Lai);
        std::fs::create_dir_all(sheet.parent().unwrap()).unwrap();
        std::fs::write(
            &sheet,
            "Capital / Estado,Nome,Regulamentação,Link\n\
             Estado,Rio de Janeiro,Decreto 46.475,http://invalid.invalid/rj.pdf\n\
             Estado,Rio Grande do Sul,Decreto 49.111,http://invalid.invalid/rs.pdf\n",
        )
        .unwrap();
        let rj = ctx.layout.raw_path(Law::Lai, TerritoryType::Estado, "Rio de Janeiro", "pdf");
        let rs = ctx.layout.raw_path(Law::Lai, TerritoryType::Estado, "Rio Grande do Sul", "pdf");
        assert_ne!(rj, rs);
        std::fs::create_dir_all(rj.parent().unwrap()).unwrap();
        std::fs::write(&rj, b"%PDF").unwrap();

        // RJ is already on disk; RS is attempted and fails on the unroutable host.
        let summary = run(&ctx).await;
        assert_eq!(summary.processed, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 1);
        assert!(!rs.exists());
    }
}
