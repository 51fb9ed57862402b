//! JSON record-store adapter.
//!
//! The engine consumes records through a read-only snapshot interface; the
//! production store behind it is a spreadsheet owned by the surrounding
//! application. This adapter stands in for that collaborator: it reads a
//! JSON array of flat record rows and validates every row before handing
//! the batch to the archive.

use anyhow::Context;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use reflectx_core::Record;

/// Load and validate a record snapshot from a JSON file.
///
/// The file holds an array of flat rows, each with a `type` tag selecting
/// the record kind, e.g.:
///
/// ```json
/// [
///   {
///     "id": "robotics-club",
///     "type": "activity",
///     "leadership": 8.0, "affinity": 6.0, "flow": 90.0,
///     "achievement": 85.0, "interest": 95.0,
///     "tags": ["team", "stem"],
///     "timestamp": "2024-11-02T09:30:00Z",
///     "free_text": "led the drivetrain team"
///   }
/// ]
/// ```
pub fn load_records(path: &Path) -> anyhow::Result<Vec<Record>> {
    let file = File::open(path)
        .with_context(|| format!("cannot open record snapshot {}", path.display()))?;
    let records: Vec<Record> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("cannot parse record snapshot {}", path.display()))?;
    for record in &records {
        record
            .validate()
            .with_context(|| format!("record {} fails ingestion validation", record.id()))?;
    }
    Ok(records)
}
