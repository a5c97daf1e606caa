//! JSON Lines export of generated examples.
//!
//! One line per example, keyed by its manifest identifier:
//!
//! ```text
//! {"id":"a1","image":"data/images/a1.png","image/filename":"a1.png","objects":[{"label":"adult","bbox":[0.1,0.1,0.3,0.2]}],"labels":["adult"]}
//! ```
//!
//! This is an inspection format for debugging a build and diffing runs; it
//! is not a training record format.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::model::Example;
use crate::error::LanternflyError;

/// An example paired with the identifier it was generated from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExampleRecord {
    pub id: String,

    #[serde(flatten)]
    pub example: Example,
}

impl ExampleRecord {
    pub fn new(id: impl Into<String>, example: Example) -> Self {
        Self {
            id: id.into(),
            example,
        }
    }
}

impl From<(String, Example)> for ExampleRecord {
    fn from((id, example): (String, Example)) -> Self {
        Self { id, example }
    }
}

/// Writes one record as a single JSON line.
pub fn write_record<W: Write>(writer: &mut W, record: &ExampleRecord) -> Result<(), serde_json::Error> {
    serde_json::to_writer(&mut *writer, record)?;
    writer.write_all(b"\n").map_err(serde_json::Error::io)
}

/// Writes records to a JSON Lines file, returning how many were written.
///
/// Records are pulled one at a time. If any record fails, the file is removed
/// and the error returned, so a failed write leaves nothing behind.
pub fn write_examples_jsonl<I>(path: &Path, records: I) -> Result<usize, LanternflyError>
where
    I: IntoIterator<Item = Result<ExampleRecord, LanternflyError>>,
{
    let file = File::create(path).map_err(LanternflyError::Io)?;
    let mut writer = BufWriter::new(file);

    let result = write_all_records(&mut writer, path, records);
    drop(writer);
    if result.is_err() {
        let _ = fs::remove_file(path);
    }
    result
}

fn write_all_records<W, I>(writer: &mut W, path: &Path, records: I) -> Result<usize, LanternflyError>
where
    W: Write,
    I: IntoIterator<Item = Result<ExampleRecord, LanternflyError>>,
{
    let mut written = 0;
    for record in records {
        write_record(writer, &record?).map_err(|source| LanternflyError::JsonWrite {
            path: path.to_path_buf(),
            source,
        })?;
        written += 1;
    }

    writer.flush().map_err(LanternflyError::Io)?;
    Ok(written)
}

/// Reads records back from a JSON Lines file. Blank lines are skipped.
pub fn read_examples_jsonl(path: &Path) -> Result<Vec<ExampleRecord>, LanternflyError> {
    let file = File::open(path).map_err(LanternflyError::Io)?;
    let reader = BufReader::new(file);

    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(LanternflyError::Io)?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|source| LanternflyError::JsonlParse {
            path: path.to_path_buf(),
            line: idx + 1,
            source,
        })?;
        records.push(record);
    }
    Ok(records)
}

/// Serializes one record to a JSON string without a trailing newline.
///
/// Useful for testing without file I/O.
pub fn to_json_line(record: &ExampleRecord) -> Result<String, serde_json::Error> {
    serde_json::to_string(record)
}
