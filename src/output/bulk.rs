//! Bulk-index document writer
//!
//! Each record becomes two lines: an action line `{"index":{"_id":"<id>"}}`
//! followed by the record's JSON document. Records keep the order they are
//! given in.
//!
//! Files are written to a uniquely named hidden sibling
//! (`.<name>.<random>.tmp`) and renamed over the destination only once fully
//! flushed, so a failed write never leaves a truncated document behind and
//! concurrent runs never share a temp file.

use crate::output::{OutputError, OutputResult};
use crate::record::Record;
use serde_json::json;
use std::ffi::{OsStr, OsString};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Builds the action line for one document
pub fn action_line(identifier: &str) -> OutputResult<String> {
    Ok(serde_json::to_string(&json!({ "index": { "_id": identifier } }))?)
}

/// Writes records in bulk format to any writer
///
/// Returns the number of records written.
pub fn write_bulk<W: Write>(records: &[Record], writer: &mut W) -> OutputResult<usize> {
    for record in records {
        writer.write_all(action_line(record.identifier())?.as_bytes())?;
        writer.write_all(b"\n")?;
        serde_json::to_writer(&mut *writer, record)?;
        writer.write_all(b"\n")?;
    }
    Ok(records.len())
}

/// Persists records to a bulk document on disk
#[derive(Debug, Clone)]
pub struct BulkWriter {
    path: PathBuf,
    retries: u32,
}

impl BulkWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            retries: 0,
        }
    }

    /// Extra attempts after a failed write
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the whole document, replacing any previous file
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Number of records written
    /// * `Err(OutputError)` - Every attempt failed; the destination is untouched
    pub fn write(&self, records: &[Record]) -> OutputResult<usize> {
        let mut attempt = 0;
        loop {
            match self.write_once(records) {
                Ok(count) => {
                    tracing::info!("Wrote {} records to {}", count, self.path.display());
                    return Ok(count);
                }
                Err(e) if attempt < self.retries => {
                    attempt += 1;
                    tracing::warn!(
                        "Writing {} failed ({}), retrying ({}/{})",
                        self.path.display(),
                        e,
                        attempt,
                        self.retries
                    );
                }
                Err(e) => {
                    tracing::error!("Writing {} failed: {}", self.path.display(), e);
                    return Err(e);
                }
            }
        }
    }

    fn write_once(&self, records: &[Record]) -> OutputResult<usize> {
        let (dir, name) = self.split_path()?;

        let mut prefix = OsString::from(".");
        prefix.push(name);
        prefix.push(".");

        // Dropping the temp file on any early return removes it
        let mut temp = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(".tmp")
            .tempfile_in(dir)?;

        let count = {
            let mut writer = BufWriter::new(temp.as_file_mut());
            let count = write_bulk(records, &mut writer)?;
            writer.flush()?;
            count
        };
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| e.error)?;

        Ok(count)
    }

    /// Directory the temp file is created in, and the destination file name
    fn split_path(&self) -> OutputResult<(&Path, &OsStr)> {
        let name = self
            .path
            .file_name()
            .ok_or_else(|| OutputError::InvalidPath(self.path.display().to_string()))?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        Ok((dir, name))
    }
}
