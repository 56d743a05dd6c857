//! Durable stores for processed emails and drafts
//!
//! Two stores, both owned exclusively by the processing pipeline:
//!
//! - the record store, an append-only `emails.csv` with one row per processed
//!   email (rows are appended, never rewritten);
//! - the draft store, one JSON file per draft named by the originating email
//!   id, with a `sent/` partition that drafts move into after a confirmed
//!   send. A draft in the sent partition is terminal.

use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{AssistantError, Result};
use crate::models::{EmailCategory, ProcessedEmail, StoredDraft};

const RECORDS_FILE: &str = "emails.csv";
const SENT_DIR: &str = "sent";

/// Append-only tabular store of processed emails.
pub struct RecordStore {
    dir: PathBuf,
}

impl RecordStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn file_path(&self) -> PathBuf {
        self.dir.join(RECORDS_FILE)
    }

    /// Whether any records have been persisted yet.
    pub fn exists(&self) -> bool {
        self.file_path().exists()
    }

    /// Append one record. The header row is written only when the file is
    /// first created.
    pub fn append(&self, record: &ProcessedEmail) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.file_path();
        let write_headers = !path.exists();

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(write_headers)
            .from_writer(file);
        writer.serialize(record)?;
        writer.flush()?;

        debug!("Appended record for email {} to {:?}", record.id, path);
        Ok(())
    }

    /// Scan the store's category column and count every row.
    ///
    /// Returns the total row count and a map holding only the categories that
    /// actually occur in history (no zero-fill; that policy belongs to live
    /// processing). Errors if the store does not exist; callers check
    /// [`RecordStore::exists`] first.
    pub fn category_counts(&self) -> Result<(u64, BTreeMap<EmailCategory, u64>)> {
        let mut reader = csv::Reader::from_path(self.file_path())?;
        let mut total = 0u64;
        let mut counts: BTreeMap<EmailCategory, u64> = BTreeMap::new();

        for row in reader.deserialize::<ProcessedEmail>() {
            let record = row?;
            total += 1;
            *counts.entry(record.category).or_insert(0) += 1;
        }

        Ok((total, counts))
    }
}

/// One-file-per-draft store keyed by the originating email id.
pub struct DraftStore {
    dir: PathBuf,
}

impl DraftStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn draft_path(&self, email_id: &str) -> PathBuf {
        self.dir.join(format!("draft_{}.json", email_id))
    }

    fn sent_path(&self, email_id: &str) -> PathBuf {
        self.dir.join(SENT_DIR).join(format!("sent_{}.json", email_id))
    }

    /// Persist a draft into the active partition.
    pub async fn save(&self, draft: &StoredDraft) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let json = serde_json::to_string_pretty(draft)?;
        let path = self.draft_path(&draft.email_id);
        tokio::fs::write(&path, json).await?;
        debug!("Saved draft for email {} to {:?}", draft.email_id, path);
        Ok(())
    }

    /// Load a draft from the active partition. Drafts already moved to the
    /// sent partition are not eligible and resolve to `None`.
    pub async fn load(&self, email_id: &str) -> Result<Option<StoredDraft>> {
        let path = self.draft_path(email_id);
        if !path.exists() {
            return Ok(None);
        }
        let json = tokio::fs::read_to_string(&path).await?;
        let draft = serde_json::from_str(&json)?;
        Ok(Some(draft))
    }

    /// Move a draft from the active partition into the sent partition, after
    /// which it can no longer be loaded or sent again.
    pub async fn mark_sent(&self, email_id: &str) -> Result<()> {
        let from = self.draft_path(email_id);
        if !from.exists() {
            return Err(AssistantError::DraftNotFound(email_id.to_string()));
        }
        let to = self.sent_path(email_id);
        if let Some(parent) = to.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::rename(&from, &to).await?;
        debug!("Moved draft for email {} to sent partition", email_id);
        Ok(())
    }
}
