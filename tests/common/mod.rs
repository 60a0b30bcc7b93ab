//! Shared scaffolding for the scenario and property tests: build an
//! in-memory table from `(key, value)` pairs and run a diff against the
//! reference driver end to end.

use std::sync::Arc;

use futures::StreamExt;
use table_diff::testutil::InMemoryDatabase;
use table_diff::value::Value;
use table_diff::{DiffConfig, DiffError, DiffEvent, Differ, TablePath, TableSegment};

/// Build an in-memory table with columns `(id, v)` from `(key, value)` pairs.
pub fn table_with_rows(rows: &[(i64, &str)]) -> Arc<InMemoryDatabase> {
    let db = Arc::new(InMemoryDatabase::new(TablePath::new(["t"])));
    for (id, v) in rows {
        db.insert_row(&[("id", Value::Int(*id)), ("v", Value::Text((*v).to_string()))]);
    }
    db
}

pub fn segment_over(db: Arc<InMemoryDatabase>) -> TableSegment {
    TableSegment::new(
        db,
        TablePath::new(["t"]),
        "id",
        None,
        vec!["v".to_string()],
        None,
        None,
        None,
        None,
    )
    .unwrap()
}

/// Diff two row sets end to end with the given config, returning the
/// emitted events (or the first error encountered).
pub async fn diff_rows(
    left: &[(i64, &str)],
    right: &[(i64, &str)],
    config: DiffConfig,
) -> Result<(Vec<DiffEvent>, Differ), DiffError> {
    // Best-effort: surface the crate's tracing output (advisory diagnostics,
    // recursion structure) when a test is run with `--nocapture`. Ignored if
    // a subscriber is already installed.
    let _ = tracing_subscriber::fmt::try_init();

    let differ = Differ::new(config).expect("valid config");
    let left_seg = segment_over(table_with_rows(left));
    let right_seg = segment_over(table_with_rows(right));
    let events: Vec<DiffEvent> = differ
        .diff(left_seg, right_seg)
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;
    Ok((events, differ))
}
