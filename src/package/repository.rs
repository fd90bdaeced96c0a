//! Record store for installed tooths.
//!
//! One JSON record per tooth lives in the records directory. The file name is
//! derived from the tooth path, so lookups never need to scan the directory.

use anyhow::{Context, Result};
use log::warn;
use std::path::{Path, PathBuf};

use super::InstalledRecord;
use crate::error::LipError;
use crate::runtime::Runtime;

const RECORD_EXTENSION: &str = "json";

/// Percent-encode every byte outside `[A-Za-z0-9._-]`.
///
/// The mapping is injective, so distinct tooth paths never share a file.
pub fn escape_file_name(name: &str) -> String {
    let mut escaped = String::with_capacity(name.len());
    for byte in name.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'.' | b'_' | b'-') {
            escaped.push(byte as char);
        } else {
            escaped.push_str(&format!("%{:02X}", byte));
        }
    }
    escaped
}

/// Store of installed-tooth records.
pub struct RecordStore<'a, R: Runtime> {
    runtime: &'a R,
    records_dir: PathBuf,
}

impl<'a, R: Runtime> RecordStore<'a, R> {
    pub fn new(runtime: &'a R, records_dir: PathBuf) -> Self {
        Self {
            runtime,
            records_dir,
        }
    }

    pub fn records_dir(&self) -> &Path {
        &self.records_dir
    }

    /// Returns: `<records_dir>/<escaped tooth>.json`
    pub fn record_path(&self, tooth: &str) -> PathBuf {
        self.records_dir
            .join(format!("{}.{}", escape_file_name(tooth), RECORD_EXTENSION))
    }

    pub fn is_installed(&self, tooth: &str) -> bool {
        self.runtime.exists(&self.record_path(tooth))
    }

    /// Load a record, returning `None` if the tooth is not installed.
    pub fn find(&self, tooth: &str) -> Result<Option<InstalledRecord>> {
        let path = self.record_path(tooth);
        if !self.runtime.exists(&path) {
            return Ok(None);
        }
        read_record(self.runtime, &path).map(Some)
    }

    /// Load a record, failing with `NotInstalled` if absent.
    pub fn load(&self, tooth: &str) -> Result<InstalledRecord> {
        self.find(tooth)?.ok_or_else(|| {
            LipError::NotInstalled {
                tooth: tooth.to_string(),
            }
            .into()
        })
    }

    /// Write or overwrite the record for `record.tooth()`.
    ///
    /// The content goes to a sibling temp file first and is renamed into place.
    pub fn save(&self, record: &InstalledRecord) -> Result<()> {
        if !self.runtime.exists(&self.records_dir) {
            self.runtime.create_dir_all(&self.records_dir)?;
        }

        let path = self.record_path(record.tooth());
        let temp_path = path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(record)?;

        self.runtime
            .write(&temp_path, content.as_bytes())
            .with_context(|| format!("Failed to write record {:?}", temp_path))?;
        self.runtime
            .rename(&temp_path, &path)
            .with_context(|| format!("Failed to commit record {:?}", path))
    }

    /// Remove the record; removing an absent record is a no-op.
    pub fn delete(&self, tooth: &str) -> Result<()> {
        let path = self.record_path(tooth);
        if self.runtime.exists(&path) {
            self.runtime.remove_file(&path)?;
        }
        Ok(())
    }

    /// Flag an installed tooth as explicitly requested.
    ///
    /// Returns true when the flag changed.
    pub fn mark_manual(&self, tooth: &str) -> Result<bool> {
        let mut record = self.load(tooth)?;
        if record.is_manually_installed {
            return Ok(false);
        }
        record.is_manually_installed = true;
        self.save(&record)?;
        Ok(true)
    }

    /// Load every record. Unreadable records are skipped with a warning.
    pub fn list_all(&self) -> Result<Vec<InstalledRecord>> {
        if !self.runtime.exists(&self.records_dir) {
            return Ok(vec![]);
        }

        let mut records = Vec::new();
        for path in self.runtime.read_dir(&self.records_dir)? {
            if path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            match read_record(self.runtime, &path) {
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping unreadable record {:?}: {:#}", path, e),
            }
        }

        records.sort_by(|a, b| a.tooth().cmp(b.tooth()));
        Ok(records)
    }
}

fn read_record<R: Runtime>(runtime: &R, path: &Path) -> Result<InstalledRecord> {
    let content = runtime.read_to_string(path)?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse record {:?}", path))
}
