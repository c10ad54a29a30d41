//! Decree identification: find each sheet row's decree inside the extracted
//! texts of the same law.

use std::collections::BTreeMap;

use regulamenta_core::{Law, MatchResult, RegulationRecord, SearchOutcome, SnippetOptions, find_snippet};
use regulamenta_store::table::{read_identified, write_matches};
use regulamenta_store::{TextFile, load_corpus};
use tracing::{debug, info, warn};

use crate::context::RunContext;
use crate::report::Summary;

/// Search the regulation text as written first, then the derived number.
fn search_record(text: &str, record: &RegulationRecord, opts: &SnippetOptions) -> SearchOutcome {
    let original = record.regulation_text.trim();
    if !original.is_empty()
        && let found @ SearchOutcome::Found(_) = find_snippet(text, original, opts)
    {
        return found;
    }
    match record.decree_number.as_deref().map(str::trim) {
        Some(number) if !number.is_empty() => find_snippet(text, number, opts),
        _ => SearchOutcome::NotFound,
    }
}

/// One result per (text file, sheet row) pair of the law the file name names.
///
/// Files naming no law, or a law without a sheet, are skipped.
pub fn identify(
    corpus: &[TextFile],
    sheets: &BTreeMap<Law, Vec<RegulationRecord>>,
    opts: &SnippetOptions,
) -> BTreeMap<Law, Vec<MatchResult>> {
    let mut results: BTreeMap<Law, Vec<MatchResult>> = BTreeMap::new();
    for file in corpus {
        let Some(law) = Law::detect_in(&file.stem) else {
            debug!(file = %file.stem, "no law code in file name, skipped");
            continue;
        };
        let Some(records) = sheets.get(&law) else {
            debug!(file = %file.stem, law = %law, "no identified sheet for law, skipped");
            continue;
        };

        let matches = results.entry(law).or_default();
        for record in records {
            matches.push(MatchResult {
                txt_file: file.stem.clone(),
                txt_path: file.path.clone(),
                territory: record.territory.clone(),
                original_value: record.regulation_text.clone(),
                extracted_value: record.decree_number.clone().unwrap_or_default(),
                outcome: search_record(&file.content, record, opts),
            });
        }
        info!(file = %file.stem, law = %law, rows = records.len(), "searched");
    }
    results
}

pub fn run(ctx: &RunContext) -> Summary {
    let mut summary = Summary::new("identify");
    let corpus = load_corpus(&ctx.layout, ctx.laws());
    summary.processed = corpus.len();

    let mut sheets = BTreeMap::new();
    for &law in ctx.laws() {
        let path = ctx.layout.identified_csv(law);
        if !path.exists() {
            info!(law = %law, path = %path.display(), "no identified sheet, ignored");
            continue;
        }
        match read_identified(&path, law) {
            Ok(records) => {
                sheets.insert(law, records);
            }
            Err(e) => warn!(law = %law, error = %e, "cannot read identified sheet"),
        }
    }

    let results = identify(&corpus, &sheets, &ctx.config.snippet_options());
    for &law in ctx.laws() {
        let matches = results.get(&law).map(Vec::as_slice).unwrap_or_default();
        if matches.is_empty() {
            warn!(law = %law, "no results, nothing written");
            summary.skipped += 1;
            continue;
        }
        let found = matches.iter().filter(|m| m.is_found()).count();
        match write_matches(&ctx.layout.results_csv(law), matches) {
            Ok(_) => {
                info!(law = %law, rows = matches.len(), found, "results written");
                summary.written += 1;
            }
            Err(e) => {
                warn!(law = %law, error = %e, "cannot write results");
                summary.failed += 1;
            }
        }
    }
    summary
}
