/*!
Stack ids are kept in a JSON object of region to stack id. The same format is written after
create and update runs and read back as the input of a delete run.

Writes merge into whatever the file already holds, so regions recorded by earlier runs survive, and
go through a temporary file in the same directory that is renamed over the target.
*/
use crate::error::{self, Result};
use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use snafu::ResultExt;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Region to stack id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StackResults(BTreeMap<String, String>);

impl StackResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads an existing stack id file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).context(error::ReadStackFile { path })?;
        serde_json::from_str(&contents).context(error::ParseStackFile { path })
    }

    /// Like `from_path`, but a missing or empty file is an empty record.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(contents) if contents.trim().is_empty() => Ok(Self::new()),
            Ok(contents) => serde_json::from_str(&contents).context(error::ParseStackFile { path }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::new()),
            Err(e) => Err(e).context(error::ReadStackFile { path }),
        }
    }

    pub fn get(&self, region: &str) -> Option<&str> {
        self.0.get(region).map(String::as_str)
    }

    /// Records the stack id of a region, replacing an earlier one.
    pub fn insert<R, S>(&mut self, region: R, stack_id: S)
    where
        R: Into<String>,
        S: Into<String>,
    {
        self.0.insert(region.into(), stack_id.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(r, s)| (r.as_str(), s.as_str()))
    }

    /// Replaces the file at `path` with this record.
    pub fn save(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = NamedTempFile::new_in(dir).context(error::WriteStackFile { path })?;
        serde_json::to_writer_pretty(&mut file, &self.0).context(error::SerializeStackFile)?;
        file.write_all(b"\n")
            .context(error::WriteStackFile { path })?;
        file.persist(path)
            .map_err(|e| e.error)
            .context(error::WriteStackFile { path })?;
        Ok(())
    }
}

/// Read-merge-write of a single `region -> stack_id` entry into the file at `path`. Returns the
/// record as written.
pub fn record_stack(path: &Path, region: &str, stack_id: &str) -> Result<StackResults> {
    let mut results = StackResults::load_or_default(path)?;
    results.insert(region, stack_id);
    results.save(path)?;
    Ok(results)
}

/// `s3-buckets-<YYYY-MM-DD_HH_MM_SS>.json`, stamped with the start time of the run.
pub fn default_output_file<Tz>(started: DateTime<Tz>) -> PathBuf
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    PathBuf::from(format!(
        "s3-buckets-{}.json",
        started.format("%Y-%m-%d_%H_%M_%S")
    ))
}
