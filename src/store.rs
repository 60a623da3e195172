use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::models::Record;

/// Prior records plus everything accepted this run, deduplicated by link.
pub struct MergeStore {
    records: Vec<Record>,
    seen_links: HashSet<String>,
    prior_len: usize,
}

impl MergeStore {
    pub fn new(prior: Vec<Record>) -> Self {
        let seen_links = prior
            .iter()
            .filter_map(|r| r.identity().map(str::to_string))
            .collect();
        let prior_len = prior.len();
        Self {
            records: prior,
            seen_links,
            prior_len,
        }
    }

    /// Append `candidate` unless its link is already known. Returns whether it was kept.
    ///
    /// Records without a link have no identity and are always appended.
    pub fn offer(&mut self, candidate: Record) -> bool {
        if let Some(link) = candidate.identity() {
            if !self.seen_links.insert(link.to_string()) {
                debug!(link, "duplicate record skipped");
                return false;
            }
        }
        self.records.push(candidate);
        true
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Records appended during this run, in acceptance order.
    pub fn added(&self) -> &[Record] {
        &self.records[self.prior_len..]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

/// JSON file holding the persisted record list.
pub struct Dataset {
    path: PathBuf,
}

impl Dataset {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Previously persisted records.
    ///
    /// Missing or malformed files load as an empty list so a run can always proceed.
    pub fn load(&self) -> Vec<Record> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "cannot read dataset, starting empty"
                );
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Record>>(&raw) {
            Ok(records) => {
                info!(
                    count = records.len(),
                    path = %self.path.display(),
                    "loaded existing records"
                );
                records
            }
            Err(e) => {
                // Link-less records from the unreadable file may be re-added later.
                warn!(path = %self.path.display(), error = %e, "malformed dataset, starting empty");
                Vec::new()
            }
        }
    }

    /// Write all records, replacing the file only once the new content is complete.
    pub fn save(&self, records: &[Record]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(records)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|source| self.io_error(source))?;
        if let Err(source) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(self.io_error(source));
        }
        Ok(())
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
