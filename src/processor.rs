//! Email processing pipeline
//!
//! Orchestrates one batch: fetch, classify, generate a reply, clean it,
//! persist the processed record and the reviewable draft, create the
//! provider-side draft, accumulate category counters. Strictly sequential:
//! one email at a time, in fetch order.
//!
//! Failure policy: a degraded classification, an empty generated reply, or a
//! failed draft creation never aborts the batch; each email's draft status is
//! reported individually and processing moves on to the next message.

use chrono::Utc;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::cleaner::clean_reply;
use crate::client::{DraftOutcome, Mailbox, SendOutcome};
use crate::error::{AssistantError, Result};
use crate::generation::GenerationClient;
use crate::models::{EmailCategory, ProcessedEmail, ProcessingStats, StoredDraft};
use crate::storage::{DraftStore, RecordStore};

/// Result of reviewing or sending a stored draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendDraftOutcome {
    /// Dry run: what would be sent. Nothing was mutated and no send happened.
    Preview {
        to: String,
        subject: String,
        body: String,
    },
    /// Confirmed send succeeded; the draft moved to the sent partition.
    Sent { id: String, thread_id: String },
    /// Confirmed send failed; the draft stays in the active partition.
    Failed { error: String },
}

pub struct EmailProcessor<M, G> {
    mailbox: M,
    generation: G,
    records: RecordStore,
    drafts: DraftStore,
}

impl<M: Mailbox, G: GenerationClient> EmailProcessor<M, G> {
    pub fn new(
        mailbox: M,
        generation: G,
        records_dir: impl Into<PathBuf>,
        drafts_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            mailbox,
            generation,
            records: RecordStore::new(records_dir),
            drafts: DraftStore::new(drafts_dir),
        }
    }

    /// Process up to `limit` recent emails and return batch statistics.
    ///
    /// The returned category map always carries all three buckets, including
    /// the ones no email landed in. (Historical stats differ; see
    /// [`EmailProcessor::get_daily_stats`].)
    pub async fn process_emails(&self, limit: usize) -> Result<ProcessingStats> {
        let emails = self.mailbox.fetch_emails(limit).await?;
        info!("Fetched {} emails", emails.len());

        let mut stats = ProcessingStats::zeroed(now_iso8601());

        for email in &emails {
            let classification = self
                .generation
                .classify(&email.subject, &email.body, &email.sender)
                .await;
            *stats.categories.entry(classification.category).or_insert(0) += 1;

            let reply = self
                .generation
                .generate_reply(&email.subject, &email.body, classification.category)
                .await;
            let cleaned_reply = clean_reply(&reply);

            let outcome = self
                .mailbox
                .create_draft(
                    &email.sender,
                    &format!("Re: {}", email.subject),
                    &cleaned_reply,
                )
                .await;

            let processed_at = now_iso8601();
            let record = ProcessedEmail {
                id: email.id.clone(),
                subject: email.subject.clone(),
                sender: email.sender.clone(),
                date: email.date.clone(),
                body: email.body.clone(),
                category: classification.category,
                confidence: classification.confidence,
                rationale: classification.rationale.clone(),
                draft_reply: cleaned_reply.clone(),
                draft_id: outcome.draft_id(),
                processed_at: processed_at.clone(),
            };
            self.records.append(&record)?;

            self.drafts
                .save(&StoredDraft {
                    email_id: email.id.clone(),
                    subject: email.subject.clone(),
                    draft_reply: cleaned_reply,
                    category: classification.category,
                    confidence: classification.confidence,
                    rationale: classification.rationale,
                    created_at: processed_at,
                })
                .await?;

            // Non-fatal either way; the next email still gets processed.
            match &outcome {
                DraftOutcome::Created { id, .. } => {
                    info!("Created draft {} for email: {}", id, email.subject);
                }
                DraftOutcome::Failed { error } => {
                    warn!("Error creating draft for email {}: {}", email.subject, error);
                }
            }

            stats.total_emails += 1;
        }

        Ok(stats)
    }

    /// Preview or send a stored draft.
    ///
    /// The dry run is the default: with `confirm` false the draft store is
    /// not touched and no send happens. With `confirm` true a successful send
    /// relocates the draft to the sent partition so it cannot be sent twice;
    /// a failed send leaves the draft in place.
    pub async fn send_drafted_email(
        &self,
        draft_id: &str,
        recipient: &str,
        confirm: bool,
    ) -> Result<SendDraftOutcome> {
        let draft = self
            .drafts
            .load(draft_id)
            .await?
            .ok_or_else(|| AssistantError::DraftNotFound(draft_id.to_string()))?;

        // Re-clean the stored text; cleaning an already-clean draft is a no-op.
        let body = clean_reply(&draft.draft_reply);

        if !confirm {
            return Ok(SendDraftOutcome::Preview {
                to: recipient.to_string(),
                subject: draft.subject,
                body,
            });
        }

        match self.mailbox.send_email(recipient, &draft.subject, &body).await {
            SendOutcome::Sent { id, thread_id } => {
                self.drafts.mark_sent(draft_id).await?;
                info!("Sent draft {} to {}", draft_id, recipient);
                Ok(SendDraftOutcome::Sent { id, thread_id })
            }
            SendOutcome::Failed { error } => {
                warn!("Send failed for draft {}: {}", draft_id, error);
                Ok(SendDraftOutcome::Failed { error })
            }
        }
    }

    /// Recompute aggregate statistics from stored history.
    ///
    /// With no record store yet, all three categories are reported at zero.
    /// Otherwise the map holds only the categories present in history, a
    /// deliberately different shape from the zero-initialized map live
    /// processing returns.
    pub async fn get_daily_stats(&self) -> Result<ProcessingStats> {
        compute_daily_stats(&self.records)
    }

    /// AI-generated digest of the current aggregate statistics.
    pub async fn generate_digest(&self) -> Result<String> {
        let stats = self.get_daily_stats().await?;
        Ok(self.generation.generate_digest(&stats).await)
    }

    /// Generate a standalone draft with the model, clean it, and create it as
    /// a provider draft addressed to `to`.
    pub async fn compose_draft(
        &self,
        to: &str,
        subject: &str,
        message: &str,
        category: EmailCategory,
    ) -> DraftOutcome {
        let generated = self.generation.generate_draft(subject, message, category).await;
        let body = clean_reply(&generated);
        self.mailbox.create_draft(to, subject, &body).await
    }
}

/// Historical stats from the record store. Reports only the categories that
/// actually occur in history; a store that does not exist yet reports all
/// three at zero.
pub fn compute_daily_stats(records: &RecordStore) -> Result<ProcessingStats> {
    if !records.exists() {
        return Ok(ProcessingStats::zeroed(now_iso8601()));
    }

    let (total_emails, categories) = records.category_counts()?;
    Ok(ProcessingStats {
        total_emails,
        categories,
        processed_at: now_iso8601(),
    })
}

fn now_iso8601() -> String {
    Utc::now().to_rfc3339()
}
