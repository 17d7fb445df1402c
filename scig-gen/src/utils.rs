//! Output sinks for the generation pipeline.
//!
//! Artifacts for one run land together in a timestamped directory under
//! `runs/`, alongside a small metadata file recording when and how the run
//! was invoked.

use std::fs::File;
use std::io::Write;
use std::path::{
    Path,
    PathBuf,
};
use std::time::SystemTime;

use anyhow::Result;
use chrono::{
    DateTime,
    Utc,
};
use serde_json::json;
use tracing::{
    debug,
    instrument,
};

/// Create a timestamped output directory under `runs/` and write basic run
/// metadata into it.
#[instrument]
pub fn create_timestamped_output_dir() -> Result<PathBuf> {
    let base_dir = PathBuf::from("runs");
    std::fs::create_dir_all(&base_dir)?;

    let now: DateTime<Utc> = SystemTime::now().into();
    let timestamp = now.to_rfc3339().replace([':', '.'], "-"); // make filesystem-friendly
    let output_dir = base_dir.join(timestamp);
    std::fs::create_dir_all(&output_dir)?;

    let metadata = json!({
        "timestamp": now.to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "command_args": std::env::args().collect::<Vec<_>>(),
    });
    write_json_file(&output_dir, "metadata.json", &metadata)?;

    Ok(output_dir)
}

/// Write a serializable value as pretty-printed JSON within `output_dir`
/// and return the path.
#[instrument(skip(value))]
pub fn write_json_file<T: serde::Serialize>(output_dir: &Path, filename: &str, value: &T) -> Result<PathBuf> {
    let file_path = output_dir.join(filename);
    let file = File::create(&file_path)?;
    serde_json::to_writer_pretty(&file, value)?;

    debug!("JSON written to: {}", file_path.display());
    Ok(file_path)
}

/// Write plain text within `output_dir` and return the path.
#[instrument(skip(contents))]
pub fn write_text_file(output_dir: &Path, filename: &str, contents: &str) -> Result<PathBuf> {
    let file_path = output_dir.join(filename);
    let mut file = File::create(&file_path)?;
    write!(file, "{contents}")?;

    debug!("Text written to: {}", file_path.display());
    Ok(file_path)
}

/// Write a rectangular table (header row included) as CSV within
/// `output_dir` and return the path.
#[instrument(skip(rows))]
pub fn write_csv_file(output_dir: &Path, filename: &str, rows: &[Vec<String>]) -> Result<PathBuf> {
    let file_path = output_dir.join(filename);
    let mut writer = csv::Writer::from_path(&file_path)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;

    debug!("Table written to: {}", file_path.display());
    Ok(file_path)
}
