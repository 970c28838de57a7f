use super::exit_codes;
use crate::cli::args::BackfillArgs;
use pbpef_core::config::{BackfillConfig, TxScope};
use pbpef_core::{BackfillReport, Store};

pub fn run(args: BackfillArgs) -> anyhow::Result<i32> {
    // All configuration problems surface before the trace dir is touched.
    let tx_scope: TxScope = args.tx_scope.parse()?;
    let cfg = BackfillConfig::new(args.store.database_url.clone(), args.trace_dir.clone())?
        .with_tx_scope(tx_scope)
        .with_dry_run(args.dry_run);
    let store = Store::connect(&cfg.store_location()?)?;
    store.init_schema()?;

    let report = pbpef_core::backfill(&store, &cfg)?;

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_text(&report));
    }
    Ok(exit_codes::OK)
}

fn render_text(r: &BackfillReport) -> String {
    let mut s = String::new();
    s.push_str(&format!(
        "Found {} summaries in {}\n",
        r.summaries_found,
        r.trace_dir.display()
    ));
    s.push_str(&format!(
        "runs:        inserted {}, skipped {}\n",
        r.runs.inserted, r.runs.skipped
    ));
    s.push_str(&format!(
        "spans:       inserted {} ({} rows), skipped {}, absent {}\n",
        r.spans.inserted, r.span_rows, r.spans.skipped, r.spans.absent
    ));
    s.push_str(&format!(
        "sensitivity: inserted {}, skipped {}, absent {}\n",
        r.sensitivity.inserted, r.sensitivity.skipped, r.sensitivity.absent
    ));
    s.push_str(&format!(
        "evidence:    inserted {}, skipped {}, absent {}\n",
        r.evidence.inserted, r.evidence.skipped, r.evidence.absent
    ));
    if r.committed {
        s.push_str("Backfill complete.\n");
    } else {
        s.push_str("Dry run: nothing committed.\n");
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use pbpef_core::ingest::backfill::KindCounts;
    use std::path::PathBuf;

    #[test]
    fn text_report_lists_every_kind() {
        let report = BackfillReport {
            trace_dir: PathBuf::from("/t"),
            summaries_found: 2,
            runs: KindCounts {
                inserted: 1,
                skipped: 1,
                absent: 0,
            },
            span_rows: 7,
            spans: KindCounts {
                inserted: 1,
                skipped: 1,
                absent: 0,
            },
            committed: true,
            ..Default::default()
        };
        let text = render_text(&report);
        assert!(text.starts_with("Found 2 summaries in /t\n"));
        assert!(text.contains("spans:       inserted 1 (7 rows), skipped 1, absent 0"));
        assert!(text.contains("evidence:    inserted 0, skipped 0, absent 0"));
        assert!(text.ends_with("Backfill complete.\n"));
    }
}
