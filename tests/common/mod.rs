//! Common test utilities and fixtures

use async_trait::async_trait;
use gmail_assistant::client::{DraftOutcome, Mailbox, SendOutcome};
use gmail_assistant::error::Result;
use gmail_assistant::generation::GenerationClient;
use gmail_assistant::models::{Classification, EmailCategory, EmailMessage, ProcessingStats};
use mockall::mock;

mock! {
    pub MailboxClient {}

    #[async_trait]
    impl Mailbox for MailboxClient {
        async fn fetch_emails(&self, limit: usize) -> Result<Vec<EmailMessage>>;
        async fn create_draft(&self, to: &str, subject: &str, body: &str) -> DraftOutcome;
        async fn send_email(&self, to: &str, subject: &str, body: &str) -> SendOutcome;
    }
}

mock! {
    pub Generation {}

    #[async_trait]
    impl GenerationClient for Generation {
        async fn classify(&self, subject: &str, body: &str, sender: &str) -> Classification;
        async fn generate_reply(&self, subject: &str, body: &str, category: EmailCategory) -> String;
        async fn generate_digest(&self, stats: &ProcessingStats) -> String;
        async fn generate_draft(&self, subject: &str, message: &str, category: EmailCategory) -> String;
    }
}

/// Create a test email with default values
pub fn create_test_email(id: &str, sender: &str, subject: &str) -> EmailMessage {
    EmailMessage {
        id: id.to_string(),
        subject: subject.to_string(),
        sender: sender.to_string(),
        date: "Mon, 4 Aug 2025 09:00:00 +0000".to_string(),
        body: format!("Body of {}", subject),
    }
}

/// Create a classification with a fixed rationale
pub fn create_classification(category: EmailCategory, confidence: u8) -> Classification {
    Classification {
        category,
        confidence,
        rationale: "test rationale".to_string(),
    }
}
