//! Whole-file JSON store for complaint records.
//!
//! Every operation reads the entire file, mutates in memory and writes the
//! entire file back. There is no locking: two overlapping `transact` calls
//! race and the later write wins, discarding the other's change. All
//! read-mutate-write spans go through `ComplaintStore::transact`, so a lock
//! file or versioned write only has to be added there.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use crate::models::ComplaintRecord;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store serialisation error: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct ComplaintStore {
    path: PathBuf,
}

impl ComplaintStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every record. A missing file is an empty store. Unreadable
    /// content is recovered record by record: a file that is not a JSON
    /// array counts as empty, and array elements that do not decode are
    /// skipped. Whenever anything is dropped the file is first copied to
    /// [`ComplaintStore::backup_path`], so the next write cannot destroy it.
    pub async fn load(&self) -> Result<Vec<ComplaintRecord>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(b) => b,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Io { path: self.path.clone(), source });
            }
        };

        let items = match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Array(items)) => items,
            Ok(_) => {
                tracing::warn!(path = %self.path.display(), "complaint store is not a JSON array, treating it as empty");
                self.back_up(&bytes).await?;
                return Ok(Vec::new());
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "complaint store is malformed, treating it as empty"
                );
                self.back_up(&bytes).await?;
                return Ok(Vec::new());
            }
        };

        let total = items.len();
        let mut records = Vec::with_capacity(total);
        for (index, item) in items.into_iter().enumerate() {
            match serde_json::from_value::<ComplaintRecord>(item) {
                Ok(r) => records.push(r),
                Err(e) => tracing::warn!(index, error = %e, "skipping unreadable complaint record"),
            }
        }
        if records.len() < total {
            tracing::warn!(kept = records.len(), total, "complaint store partially recovered");
            self.back_up(&bytes).await?;
        }
        Ok(records)
    }

    /// Where the raw file is copied before a lossy load.
    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".unreadable");
        PathBuf::from(name)
    }

    async fn back_up(&self, bytes: &[u8]) -> Result<(), StoreError> {
        let target = self.backup_path();
        tokio::fs::write(&target, bytes)
            .await
            .map_err(|source| StoreError::Io { path: target.clone(), source })?;
        tracing::warn!(backup = %target.display(), "unreadable store content preserved");
        Ok(())
    }

    /// Overwrites the file with the full, pretty-printed record list.
    pub async fn save(&self, records: &[ComplaintRecord]) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(records)?;
        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(|source| StoreError::Io { path: self.path.clone(), source })?;
        tracing::debug!(path = %self.path.display(), count = records.len(), "store written");
        Ok(())
    }

    /// The single read-mutate-write boundary. `f` sees the whole store and
    /// returns a value plus whether anything changed; the file is rewritten
    /// only on change.
    pub async fn transact<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Vec<ComplaintRecord>) -> (T, bool),
    {
        let mut records = self.load().await?;
        let (out, dirty) = f(&mut records);
        if dirty {
            self.save(&records).await?;
        }
        Ok(out)
    }

    pub async fn append(&self, record: ComplaintRecord) -> Result<(), StoreError> {
        self.transact(|records| {
            records.push(record);
            ((), true)
        })
        .await
    }

    /// First record with a matching id.
    pub async fn find(&self, complaint_id: &str) -> Result<Option<ComplaintRecord>, StoreError> {
        let records = self.load().await?;
        Ok(records.into_iter().find(|r| r.complaint_id == complaint_id))
    }
}
