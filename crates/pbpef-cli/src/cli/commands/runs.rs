use super::{exit_codes, open_store};
use crate::cli::args::{RunsArgs, ShowArgs};
use serde_json::{json, Map, Value};

pub fn list(args: RunsArgs) -> anyhow::Result<i32> {
    let store = open_store(&args.store)?;
    let items = store.list_runs(args.limit, args.offset)?;
    println!("{}", serde_json::to_string_pretty(&json!({ "items": items }))?);
    Ok(exit_codes::OK)
}

pub fn show(args: ShowArgs) -> anyhow::Result<i32> {
    let parts: &[&str] = match args.part.as_str() {
        "all" => &["run", "trace", "sensitivity", "evidence"],
        "run" => &["run"],
        "trace" => &["trace"],
        "sensitivity" => &["sensitivity"],
        "evidence" => &["evidence"],
        other => anyhow::bail!("unknown part: {}", other),
    };

    let store = open_store(&args.store)?;
    let run_id = args.run_id.as_str();

    let Some(run) = store.get_run(run_id)? else {
        eprintln!("run not found: {}", run_id);
        return Ok(exit_codes::NOT_FOUND);
    };

    let mut out = Map::new();
    for part in parts {
        let value = match *part {
            "run" => serde_json::to_value(&run)?,
            "trace" => json!({ "spans": store.list_spans(run_id)? }),
            "sensitivity" => serde_json::to_value(store.get_sensitivity(run_id)?)?,
            // Absent bundle renders as an empty object.
            _ => match store.get_evidence(run_id)? {
                Some(ev) => serde_json::to_value(ev)?,
                None => json!({}),
            },
        };
        out.insert(part.to_string(), value);
    }

    println!("{}", serde_json::to_string_pretty(&Value::Object(out))?);
    Ok(exit_codes::OK)
}
