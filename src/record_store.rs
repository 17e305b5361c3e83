use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use chrono::{DateTime, Local};
use log::{info, error};
use thiserror::Error;

const USERNAME_HEADER: &str = "Username";
const FOLLOWERS_HEADER: &str = "Followers";

/// Reserved cell value for a username whose scrape exhausted all retries.
/// Stored as data so a failed username still counts as processed on resume.
pub const FAILURE_MARKER: &str = "Error";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store format error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Followers {
    Count(i64),
    Failed,
}

impl Followers {
    pub fn count(&self) -> Option<i64> {
        match self {
            Followers::Count(n) => Some(*n),
            Followers::Failed => None,
        }
    }

    pub fn to_cell(&self) -> String {
        match self {
            Followers::Count(n) => n.to_string(),
            Followers::Failed => FAILURE_MARKER.to_string(),
        }
    }

    /// Numeric cells become counts; anything else (the failure marker
    /// included) is treated as a failed scrape.
    pub fn from_cell(cell: &str) -> Followers {
        match cell.trim().parse::<i64>() {
            Ok(n) => Followers::Count(n),
            Err(_) => Followers::Failed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowerRecord {
    pub username: String,
    pub followers: Followers,
}

/// Durable table of scraped results, one CSV row per username.
///
/// Rows are written once and never updated in place; duplicate avoidance is
/// the pipeline's job (it pre-filters against [`RecordStore::load_processed_usernames`]),
/// not the store's.
pub struct RecordStore {
    path: PathBuf,
}

impl RecordStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        RecordStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn read_all(&self) -> Result<Vec<FollowerRecord>, StoreError> {
        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            records.push(FollowerRecord {
                username: row.get(0).unwrap_or("").to_string(),
                followers: Followers::from_cell(row.get(1).unwrap_or("")),
            });
        }
        Ok(records)
    }

    /// Snapshot of usernames already persisted, for resume skipping.
    ///
    /// A corrupt or unreadable table returns the empty set: re-scraping a few
    /// usernames beats refusing to run at all.
    pub fn load_processed_usernames(&self) -> HashSet<String> {
        if !self.exists() {
            info!("No results file found at {:?}. Starting fresh.", self.path);
            return HashSet::new();
        }
        match self.read_all() {
            Ok(records) => {
                let set: HashSet<String> =
                    records.into_iter().map(|r| r.username).collect();
                info!("Resuming: {} usernames already in {:?}", set.len(), self.path);
                set
            }
            Err(e) => {
                error!(
                    "Error reading {:?}: {}. Continuing as if no prior results exist.",
                    self.path, e
                );
                HashSet::new()
            }
        }
    }

    /// Append one row, rewriting the whole table.
    ///
    /// Read-modify-rewrite keeps the file a complete, spreadsheet-openable
    /// table after every single append. O(n) per append is the accepted cost
    /// of that contract; do not swap in an append-only log here without
    /// changing the external format deliberately.
    pub fn append(&self, record: &FollowerRecord) -> Result<(), StoreError> {
        let mut records = if self.exists() {
            self.read_all()?
        } else {
            Vec::new()
        };
        records.push(record.clone());

        let mut writer = csv::Writer::from_path(&self.path)?;
        writer.write_record([USERNAME_HEADER, FOLLOWERS_HEADER])?;
        for r in &records {
            let cell = r.followers.to_cell();
            writer.write_record([r.username.as_str(), cell.as_str()])?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Copy the table to a timestamped sibling file. Best effort: a failed
    /// copy is logged and the run continues.
    pub fn backup(&self) {
        if !self.exists() {
            return;
        }
        let target = backup_path(&self.path, Local::now());
        match fs::copy(&self.path, &target) {
            Ok(_) => info!("Backup created: {:?}", target),
            Err(e) => error!("Error creating backup of {:?}: {}", self.path, e),
        }
    }
}

/// `<stem>_backup_<YYYYMMDD_HHMMSS>.<ext>` beside the original.
pub fn backup_path(path: &Path, timestamp: DateTime<Local>) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("results");
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("csv");
    let name = format!(
        "{}_backup_{}.{}",
        stem,
        timestamp.format("%Y%m%d_%H%M%S"),
        ext
    );
    path.with_file_name(name)
}
