//! Trusted identifier lists (PAN, Aadhaar) used for the authenticity gate.
//!
//! A reference list is a CSV file with a header row and one named identifier
//! column. Two lookups are provided: [`CsvReferenceList`] scans the file on
//! every check, [`CachedReferenceList`] keeps the column in memory and
//! reloads it once it is older than its refresh interval.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::{Duration, Instant};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReferenceError {
    #[error("Reference list error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Reference list {path} has no '{column}' column")]
    MissingColumn { column: String, path: String },

    #[error("Reference cache lock poisoned")]
    LockPoisoned,
}

/// How identifiers are compared after trimming both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    CaseInsensitive,
    Exact,
}

impl MatchMode {
    fn key(&self, value: &str) -> String {
        match self {
            Self::CaseInsensitive => value.trim().to_uppercase(),
            Self::Exact => value.trim().to_string(),
        }
    }
}

/// Read-only membership check against a trusted list.
pub trait ReferenceLookup: Send + Sync {
    fn contains(&self, id: &str) -> Result<bool, ReferenceError>;
}

// ──────────────────────────────────────────────
// Streaming CSV lookup
// ──────────────────────────────────────────────

/// Linear scan of the CSV file per lookup. No index, no caching.
pub struct CsvReferenceList {
    path: PathBuf,
    column: String,
    mode: MatchMode,
}

impl CsvReferenceList {
    pub fn new(path: &Path, column: &str, mode: MatchMode) -> Self {
        Self {
            path: path.to_path_buf(),
            column: column.to_string(),
            mode,
        }
    }

    /// PAN list: `pan` column, case-insensitive.
    pub fn pan(path: &Path) -> Self {
        Self::new(path, "pan", MatchMode::CaseInsensitive)
    }

    /// Aadhaar list: `aadhaar` column, exact.
    pub fn aadhaar(path: &Path) -> Self {
        Self::new(path, "aadhaar", MatchMode::Exact)
    }

    fn open(&self) -> Result<(csv::Reader<std::fs::File>, usize), ReferenceError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)?;
        let index = column_index(reader.headers()?, &self.column).ok_or_else(|| {
            ReferenceError::MissingColumn {
                column: self.column.clone(),
                path: self.path.display().to_string(),
            }
        })?;
        Ok((reader, index))
    }

    /// Every identifier in the file, keyed for this list's match mode.
    fn load_keys(&self) -> Result<HashSet<String>, ReferenceError> {
        let (mut reader, index) = self.open()?;
        let mut keys = HashSet::new();
        for record in reader.records() {
            if let Some(value) = record?.get(index) {
                let key = self.mode.key(value);
                if !key.is_empty() {
                    keys.insert(key);
                }
            }
        }
        Ok(keys)
    }
}

impl ReferenceLookup for CsvReferenceList {
    fn contains(&self, id: &str) -> Result<bool, ReferenceError> {
        let wanted = self.mode.key(id);
        if wanted.is_empty() {
            return Ok(false);
        }

        let (mut reader, index) = self.open()?;
        for record in reader.records() {
            let record = record?;
            if record.get(index).is_some_and(|v| self.mode.key(v) == wanted) {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

fn column_index(headers: &csv::StringRecord, column: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(column))
}

// ──────────────────────────────────────────────
// Cached lookup with periodic refresh
// ──────────────────────────────────────────────

struct Snapshot {
    keys: HashSet<String>,
    loaded_at: Instant,
}

/// In-memory copy of a CSV list, reloaded when stale.
///
/// A reload builds a complete new set before replacing the old one, so
/// concurrent lookups see either the previous list or the new one. A failed
/// reload is an error and leaves the previous snapshot in place.
pub struct CachedReferenceList {
    source: CsvReferenceList,
    refresh: Duration,
    snapshot: RwLock<Option<Snapshot>>,
}

impl CachedReferenceList {
    pub fn new(source: CsvReferenceList, refresh: Duration) -> Self {
        Self {
            source,
            refresh,
            snapshot: RwLock::new(None),
        }
    }

    /// Force a reload from disk.
    pub fn reload(&self) -> Result<usize, ReferenceError> {
        let keys = self.source.load_keys()?;
        let count = keys.len();
        let mut guard = self
            .snapshot
            .write()
            .map_err(|_| ReferenceError::LockPoisoned)?;
        *guard = Some(Snapshot {
            keys,
            loaded_at: Instant::now(),
        });
        tracing::info!(
            path = %self.source.path.display(),
            entries = count,
            "Reference list loaded"
        );
        Ok(count)
    }

    fn is_fresh(&self) -> Result<bool, ReferenceError> {
        let guard = self
            .snapshot
            .read()
            .map_err(|_| ReferenceError::LockPoisoned)?;
        Ok(guard
            .as_ref()
            .is_some_and(|s| s.loaded_at.elapsed() < self.refresh))
    }
}

impl ReferenceLookup for CachedReferenceList {
    fn contains(&self, id: &str) -> Result<bool, ReferenceError> {
        if !self.is_fresh()? {
            self.reload()?;
        }
        let wanted = self.source.mode.key(id);
        let guard = self
            .snapshot
            .read()
            .map_err(|_| ReferenceError::LockPoisoned)?;
        Ok(guard.as_ref().is_some_and(|s| s.keys.contains(&wanted)))
    }
}

// ──────────────────────────────────────────────
// Static list (tests, fixtures)
// ──────────────────────────────────────────────

/// Fixed in-memory list.
pub struct StaticReferenceList {
    keys: HashSet<String>,
    mode: MatchMode,
}

impl StaticReferenceList {
    pub fn new(ids: &[&str], mode: MatchMode) -> Self {
        Self {
            keys: ids.iter().map(|id| mode.key(id)).collect(),
            mode,
        }
    }

    pub fn empty() -> Self {
        Self::new(&[], MatchMode::Exact)
    }
}

impl ReferenceLookup for StaticReferenceList {
    fn contains(&self, id: &str) -> Result<bool, ReferenceError> {
        Ok(self.keys.contains(&self.mode.key(id)))
    }
}
