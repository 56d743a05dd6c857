use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Urgency buckets assigned by the generation service.
///
/// Serialized with the literal tokens the model is prompted to emit, which are
/// also the values persisted in the record store.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EmailCategory {
    #[serde(rename = "URGENT")]
    Urgent,
    #[serde(rename = "IMPORTANT")]
    Important,
    #[serde(rename = "LOW_PRIORITY")]
    LowPriority,
}

impl EmailCategory {
    /// All categories, in display order.
    pub const ALL: [EmailCategory; 3] = [
        EmailCategory::Urgent,
        EmailCategory::Important,
        EmailCategory::LowPriority,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmailCategory::Urgent => "URGENT",
            EmailCategory::Important => "IMPORTANT",
            EmailCategory::LowPriority => "LOW_PRIORITY",
        }
    }

    /// Case-insensitive parse of a category token. Returns None for anything
    /// that is not one of the three literal labels.
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_uppercase().as_str() {
            "URGENT" => Some(EmailCategory::Urgent),
            "IMPORTANT" => Some(EmailCategory::Important),
            "LOW_PRIORITY" => Some(EmailCategory::LowPriority),
            _ => None,
        }
    }
}

impl fmt::Display for EmailCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EmailCategory {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        EmailCategory::parse(s)
            .ok_or_else(|| format!("expected URGENT, IMPORTANT, or LOW_PRIORITY, got '{}'", s))
    }
}

/// One fetched message, read-only within the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailMessage {
    pub id: String,
    pub subject: String,
    pub sender: String,
    pub date: String,
    pub body: String,
}

/// Outcome of classifying one email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    pub category: EmailCategory,
    pub confidence: u8,
    pub rationale: String,
}

impl Classification {
    /// The safe default used when model output cannot be parsed.
    pub fn fallback() -> Self {
        Self {
            category: EmailCategory::LowPriority,
            confidence: 0,
            rationale: String::new(),
        }
    }
}

/// Email record plus processing outcome. One row per email in the record
/// store; appended once, never updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedEmail {
    pub id: String,
    pub subject: String,
    pub sender: String,
    pub date: String,
    pub body: String,
    pub category: EmailCategory,
    pub confidence: u8,
    pub rationale: String,
    pub draft_reply: String,
    pub draft_id: Option<String>,
    pub processed_at: String,
}

/// A reviewable, sendable draft derived from a processed email. Keyed by the
/// originating email id; moved to the sent partition after a confirmed send.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredDraft {
    pub email_id: String,
    pub subject: String,
    pub draft_reply: String,
    pub category: EmailCategory,
    pub confidence: u8,
    pub rationale: String,
    pub created_at: String,
}

/// Aggregate counters for one batch or for stored history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingStats {
    pub total_emails: u64,
    pub categories: BTreeMap<EmailCategory, u64>,
    pub processed_at: String,
}

impl ProcessingStats {
    /// Stats with every category bucket present at zero. This is the shape
    /// used by live processing; historical stats only report categories that
    /// actually occur in the store.
    pub fn zeroed(processed_at: String) -> Self {
        let mut categories = BTreeMap::new();
        for category in EmailCategory::ALL {
            categories.insert(category, 0);
        }
        Self {
            total_emails: 0,
            categories,
            processed_at,
        }
    }
}
