//! Gazette search: looks decree numbers up in the Querido Diário archive.

use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::Args;
use regulamenta_fetch::GazetteClient;
use regulamenta_store::{Table, read_table};
use tracing::{info, warn};

use crate::context::RunContext;
use crate::report::Summary;

#[derive(Args, Debug, Clone)]
pub struct GazetteArgs {
    /// `;`-separated sheet with `Número` and `Município (UF)` columns.
    #[arg(long)]
    pub csv: PathBuf,
    /// Law number every hit must also cite.
    #[arg(long, default_value = "13.019")]
    pub reference: String,
    #[arg(long, default_value = "2014-01-01")]
    pub since: NaiveDate,
    #[arg(long, default_value = "2025-01-01")]
    pub until: NaiveDate,
    /// Also fetch each gazette's PDF.
    #[arg(long)]
    pub download_pdf: bool,
    /// Output directory [default: <root>/diarios].
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GazetteRow {
    pub number: String,
    pub territory: String,
}

fn column(headers: &[String], names: &[&str]) -> Option<usize> {
    headers.iter().position(|h| {
        let h = h.trim().to_lowercase();
        names.contains(&h.as_str())
    })
}

/// Rows with both a number and a municipality.
pub fn gazette_rows(table: &Table) -> anyhow::Result<Vec<GazetteRow>> {
    let number = column(&table.headers, &["número", "numero"])
        .context("sheet has no `Número` column")?;
    let territory = column(&table.headers, &["município (uf)", "municipio (uf)"])
        .context("sheet has no `Município (UF)` column")?;
    let cell = |row: &[String], i: usize| row.get(i).map(|s| s.trim().to_string()).unwrap_or_default();
    Ok(table
        .rows
        .iter()
        .map(|row| GazetteRow {
            number: cell(row, number),
            territory: cell(row, territory),
        })
        .filter(|r| !r.number.is_empty() && !r.territory.is_empty())
        .collect())
}

pub async fn run(ctx: &RunContext, args: &GazetteArgs) -> anyhow::Result<Summary> {
    let table = read_table(&args.csv, b';')
        .with_context(|| format!("reading {}", args.csv.display()))?;
    let rows = gazette_rows(&table)?;
    let out = args
        .out
        .clone()
        .unwrap_or_else(|| ctx.layout.root().join("diarios"));
    let client = GazetteClient::new(&ctx.fetcher);

    let mut summary = Summary::new("gazettes");
    for row in &rows {
        summary.processed += 1;
        let search = match client
            .search_capital(&row.territory, &args.reference, &row.number, args.since, args.until)
            .await
        {
            Ok(search) => search,
            Err(e) => {
                warn!(territory = %row.territory, number = %row.number, error = %e, "gazette search failed");
                summary.failed += 1;
                continue;
            }
        };
        if search.gazettes.is_empty() {
            info!(territory = %row.territory, number = %row.number, "no gazette mentions this decree");
            summary.skipped += 1;
            continue;
        }

        let dir = out.join(&row.territory);
        let mut saved = 0usize;
        for gazette in &search.gazettes {
            match client.save(gazette, &dir, args.download_pdf).await {
                Ok(_) => saved += 1,
                Err(e) => warn!(date = %gazette.date, error = %e, "cannot save gazette"),
            }
        }
        if saved > 0 {
            summary.written += 1;
        } else {
            summary.failed += 1;
        }
    }
    Ok(summary)
}
