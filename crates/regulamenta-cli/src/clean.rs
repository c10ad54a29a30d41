//! Survey sheet cleaning: `validado_<LAW>.csv` → `identificado_<LAW>.csv`.

use regulamenta_core::{DecreePattern, Law};
use regulamenta_store::table::write_identified;
use regulamenta_store::{Layout, StoreError, load_records};
use tracing::{info, warn};

use crate::context::RunContext;
use crate::report::Summary;

pub fn run(ctx: &RunContext) -> Summary {
    let mut summary = Summary::new("clean");
    for &law in ctx.laws() {
        let input = ctx.layout.validated_csv(law);
        if !input.exists() {
            info!(law = %law, path = %input.display(), "no validated sheet, ignored");
            summary.skipped += 1;
            continue;
        }
        summary.processed += 1;
        match clean_law(&ctx.layout, law, ctx.config.decree_pattern) {
            Ok(_) => summary.written += 1,
            Err(e) => {
                summary.failed += 1;
                warn!(law = %law, error = %e, "cleaning failed");
            }
        }
    }
    summary
}

fn clean_law(layout: &Layout, law: Law, pattern: DecreePattern) -> Result<usize, StoreError> {
    let records = load_records(&layout.validated_csv(law), law, pattern)?;
    let numbered = records.iter().filter(|r| r.decree_number.is_some()).count();
    info!(law = %law, rows = records.len(), numbered, "sheet cleaned");
    write_identified(&layout.identified_csv(law), &records)
}
