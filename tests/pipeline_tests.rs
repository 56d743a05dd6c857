//! Pipeline behavior tests with mocked collaborators

mod common;

use common::{create_classification, create_test_email, MockGeneration, MockMailboxClient};
use gmail_assistant::client::{DraftOutcome, SendOutcome};
use gmail_assistant::models::{EmailCategory, StoredDraft};
use gmail_assistant::processor::{EmailProcessor, SendDraftOutcome};
use gmail_assistant::storage::DraftStore;
use gmail_assistant::AssistantError;
use tempfile::tempdir;

fn sample_draft(email_id: &str, reply: &str) -> StoredDraft {
    StoredDraft {
        email_id: email_id.to_string(),
        subject: "Re: status".to_string(),
        draft_reply: reply.to_string(),
        category: EmailCategory::Important,
        confidence: 70,
        rationale: "needs a response".to_string(),
        created_at: "2025-08-04T09:01:00+00:00".to_string(),
    }
}

#[tokio::test]
async fn process_emails_counts_every_category_bucket() {
    let records_dir = tempdir().unwrap();
    let drafts_dir = tempdir().unwrap();

    let emails = vec![
        create_test_email("m1", "a@example.com", "server down"),
        create_test_email("m2", "b@example.com", "quarterly review"),
        create_test_email("m3", "c@example.com", "newsletter"),
    ];

    let mut mailbox = MockMailboxClient::new();
    let fetched = emails.clone();
    mailbox
        .expect_fetch_emails()
        .returning(move |_| Ok(fetched.clone()));
    mailbox
        .expect_create_draft()
        .times(3)
        .returning(|_, _, _| DraftOutcome::Created {
            id: "d-1".to_string(),
            message_id: "dm-1".to_string(),
        });

    let mut generation = MockGeneration::new();
    generation.expect_classify().returning(|subject, _, _| {
        let category = match subject {
            "server down" => EmailCategory::Urgent,
            "quarterly review" => EmailCategory::Important,
            _ => EmailCategory::LowPriority,
        };
        create_classification(category, 80)
    });
    generation
        .expect_generate_reply()
        .returning(|_, _, _| "<think>reasoning</think>Dear Sender,\n\nThanks.".to_string());

    let processor = EmailProcessor::new(mailbox, generation, records_dir.path(), drafts_dir.path());
    let stats = processor.process_emails(10).await.unwrap();

    assert_eq!(stats.total_emails, 3);
    assert_eq!(stats.categories.len(), 3);
    assert_eq!(stats.categories[&EmailCategory::Urgent], 1);
    assert_eq!(stats.categories[&EmailCategory::Important], 1);
    assert_eq!(stats.categories[&EmailCategory::LowPriority], 1);
    let sum: u64 = stats.categories.values().sum();
    assert_eq!(sum, stats.total_emails);

    // Replies are cleaned before persistence.
    let drafts = DraftStore::new(drafts_dir.path());
    let stored = drafts.load("m1").await.unwrap().unwrap();
    assert_eq!(stored.draft_reply, "Dear Sender,\n\nThanks.");
    assert!(!stored.draft_reply.contains("think"));
}

#[tokio::test]
async fn process_emails_empty_batch_reports_zeroed_buckets() {
    let records_dir = tempdir().unwrap();
    let drafts_dir = tempdir().unwrap();

    let mut mailbox = MockMailboxClient::new();
    mailbox.expect_fetch_emails().returning(|_| Ok(Vec::new()));
    let generation = MockGeneration::new();

    let processor = EmailProcessor::new(mailbox, generation, records_dir.path(), drafts_dir.path());
    let stats = processor.process_emails(10).await.unwrap();

    assert_eq!(stats.total_emails, 0);
    // Live processing always reports all three buckets, even when empty.
    assert_eq!(stats.categories.len(), 3);
    for count in stats.categories.values() {
        assert_eq!(*count, 0);
    }
}

#[tokio::test]
async fn draft_creation_failure_does_not_abort_the_batch() {
    let records_dir = tempdir().unwrap();
    let drafts_dir = tempdir().unwrap();

    let emails = vec![
        create_test_email("m1", "a@example.com", "first"),
        create_test_email("m2", "b@example.com", "second"),
    ];

    let mut mailbox = MockMailboxClient::new();
    let fetched = emails.clone();
    mailbox
        .expect_fetch_emails()
        .returning(move |_| Ok(fetched.clone()));
    mailbox
        .expect_create_draft()
        .times(2)
        .returning(|to, _, _| {
            if to == "a@example.com" {
                DraftOutcome::Failed {
                    error: "quota exceeded".to_string(),
                }
            } else {
                DraftOutcome::Created {
                    id: "d-2".to_string(),
                    message_id: "dm-2".to_string(),
                }
            }
        });

    let mut generation = MockGeneration::new();
    generation
        .expect_classify()
        .returning(|_, _, _| create_classification(EmailCategory::Important, 60));
    generation
        .expect_generate_reply()
        .returning(|_, _, _| "Dear Sender,\n\nThanks.".to_string());

    let processor = EmailProcessor::new(mailbox, generation, records_dir.path(), drafts_dir.path());
    let stats = processor.process_emails(10).await.unwrap();

    // Both emails processed despite the first draft failing.
    assert_eq!(stats.total_emails, 2);

    // The failed email's record has no draft id; drafts exist for both.
    let drafts = DraftStore::new(drafts_dir.path());
    assert!(drafts.load("m1").await.unwrap().is_some());
    assert!(drafts.load("m2").await.unwrap().is_some());

    let stats_again = processor.get_daily_stats().await.unwrap();
    assert_eq!(stats_again.total_emails, 2);
}

#[tokio::test]
async fn process_subject_gets_reply_prefix() {
    let records_dir = tempdir().unwrap();
    let drafts_dir = tempdir().unwrap();

    let emails = vec![create_test_email("m1", "a@example.com", "budget approval")];

    let mut mailbox = MockMailboxClient::new();
    let fetched = emails.clone();
    mailbox
        .expect_fetch_emails()
        .returning(move |_| Ok(fetched.clone()));
    mailbox
        .expect_create_draft()
        .withf(|to, subject, _| to == "a@example.com" && subject == "Re: budget approval")
        .returning(|_, _, _| DraftOutcome::Created {
            id: "d-1".to_string(),
            message_id: "dm-1".to_string(),
        });

    let mut generation = MockGeneration::new();
    generation
        .expect_classify()
        .returning(|_, _, _| create_classification(EmailCategory::Urgent, 90));
    generation
        .expect_generate_reply()
        .returning(|_, _, _| "Dear A,\n\nApproved.".to_string());

    let processor = EmailProcessor::new(mailbox, generation, records_dir.path(), drafts_dir.path());
    processor.process_emails(1).await.unwrap();
}

#[tokio::test]
async fn preview_never_sends_and_never_mutates_the_store() {
    let records_dir = tempdir().unwrap();
    let drafts_dir = tempdir().unwrap();

    let drafts = DraftStore::new(drafts_dir.path());
    drafts
        .save(&sample_draft("m1", "Dear Sam,\n\nThanks."))
        .await
        .unwrap();

    // No send expectation: any call to send_email would fail the test.
    let mut mailbox = MockMailboxClient::new();
    mailbox.expect_send_email().never();
    let generation = MockGeneration::new();

    let processor = EmailProcessor::new(mailbox, generation, records_dir.path(), drafts_dir.path());
    let outcome = processor
        .send_drafted_email("m1", "sam@example.com", false)
        .await
        .unwrap();

    match outcome {
        SendDraftOutcome::Preview { to, subject, body } => {
            assert_eq!(to, "sam@example.com");
            assert_eq!(subject, "Re: status");
            assert_eq!(body, "Dear Sam,\n\nThanks.");
        }
        other => panic!("expected preview, got {:?}", other),
    }

    // Draft is still in the active partition.
    assert!(drafts.load("m1").await.unwrap().is_some());
}

#[tokio::test]
async fn preview_recleans_stored_text() {
    let records_dir = tempdir().unwrap();
    let drafts_dir = tempdir().unwrap();

    let drafts = DraftStore::new(drafts_dir.path());
    drafts
        .save(&sample_draft(
            "m1",
            "<think>hmm</think>Here's the email.\nDear Sam,\n\nThanks.",
        ))
        .await
        .unwrap();

    let mut mailbox = MockMailboxClient::new();
    mailbox.expect_send_email().never();
    let generation = MockGeneration::new();

    let processor = EmailProcessor::new(mailbox, generation, records_dir.path(), drafts_dir.path());
    let outcome = processor
        .send_drafted_email("m1", "sam@example.com", false)
        .await
        .unwrap();

    match outcome {
        SendDraftOutcome::Preview { body, .. } => assert_eq!(body, "Dear Sam,\n\nThanks."),
        other => panic!("expected preview, got {:?}", other),
    }
}

#[tokio::test]
async fn confirmed_send_is_terminal_for_the_draft() {
    let records_dir = tempdir().unwrap();
    let drafts_dir = tempdir().unwrap();

    let drafts = DraftStore::new(drafts_dir.path());
    drafts
        .save(&sample_draft("m1", "Dear Sam,\n\nThanks."))
        .await
        .unwrap();

    let mut mailbox = MockMailboxClient::new();
    mailbox
        .expect_send_email()
        .times(1)
        .returning(|_, _, _| SendOutcome::Sent {
            id: "sent-1".to_string(),
            thread_id: "t-1".to_string(),
        });
    let generation = MockGeneration::new();

    let processor = EmailProcessor::new(mailbox, generation, records_dir.path(), drafts_dir.path());

    let outcome = processor
        .send_drafted_email("m1", "sam@example.com", true)
        .await
        .unwrap();
    assert!(matches!(outcome, SendDraftOutcome::Sent { .. }));

    // Gone from the active partition; a second attempt is DraftNotFound.
    assert!(drafts.load("m1").await.unwrap().is_none());
    let err = processor
        .send_drafted_email("m1", "sam@example.com", true)
        .await
        .unwrap_err();
    assert!(matches!(err, AssistantError::DraftNotFound(_)));
}

#[tokio::test]
async fn failed_send_leaves_the_draft_in_place() {
    let records_dir = tempdir().unwrap();
    let drafts_dir = tempdir().unwrap();

    let drafts = DraftStore::new(drafts_dir.path());
    drafts
        .save(&sample_draft("m1", "Dear Sam,\n\nThanks."))
        .await
        .unwrap();

    let mut mailbox = MockMailboxClient::new();
    mailbox
        .expect_send_email()
        .returning(|_, _, _| SendOutcome::Failed {
            error: "network unreachable".to_string(),
        });
    let generation = MockGeneration::new();

    let processor = EmailProcessor::new(mailbox, generation, records_dir.path(), drafts_dir.path());
    let outcome = processor
        .send_drafted_email("m1", "sam@example.com", true)
        .await
        .unwrap();

    match outcome {
        SendDraftOutcome::Failed { error } => assert_eq!(error, "network unreachable"),
        other => panic!("expected failure, got {:?}", other),
    }

    // Still retryable later.
    assert!(drafts.load("m1").await.unwrap().is_some());
}

#[tokio::test]
async fn send_unknown_draft_is_not_found() {
    let records_dir = tempdir().unwrap();
    let drafts_dir = tempdir().unwrap();

    let mailbox = MockMailboxClient::new();
    let generation = MockGeneration::new();

    let processor = EmailProcessor::new(mailbox, generation, records_dir.path(), drafts_dir.path());
    let err = processor
        .send_drafted_email("missing", "sam@example.com", false)
        .await
        .unwrap_err();
    assert!(matches!(err, AssistantError::DraftNotFound(_)));
}

#[tokio::test]
async fn daily_stats_on_empty_store_zero_fills_all_categories() {
    let records_dir = tempdir().unwrap();
    let drafts_dir = tempdir().unwrap();

    let mailbox = MockMailboxClient::new();
    let generation = MockGeneration::new();

    let processor = EmailProcessor::new(mailbox, generation, records_dir.path(), drafts_dir.path());
    let stats = processor.get_daily_stats().await.unwrap();

    assert_eq!(stats.total_emails, 0);
    assert_eq!(stats.categories.len(), 3);
    for category in EmailCategory::ALL {
        assert_eq!(stats.categories[&category], 0);
    }
}

#[tokio::test]
async fn daily_stats_reports_only_categories_present_in_history() {
    let records_dir = tempdir().unwrap();
    let drafts_dir = tempdir().unwrap();

    let emails = vec![
        create_test_email("m1", "a@example.com", "outage"),
        create_test_email("m2", "b@example.com", "still down"),
    ];

    let mut mailbox = MockMailboxClient::new();
    let fetched = emails.clone();
    mailbox
        .expect_fetch_emails()
        .returning(move |_| Ok(fetched.clone()));
    mailbox
        .expect_create_draft()
        .returning(|_, _, _| DraftOutcome::Created {
            id: "d".to_string(),
            message_id: "dm".to_string(),
        });

    let mut generation = MockGeneration::new();
    generation
        .expect_classify()
        .returning(|_, _, _| create_classification(EmailCategory::Urgent, 95));
    generation
        .expect_generate_reply()
        .returning(|_, _, _| "Dear Sender,\n\nOn it.".to_string());

    let processor = EmailProcessor::new(mailbox, generation, records_dir.path(), drafts_dir.path());
    processor.process_emails(10).await.unwrap();

    // Historical stats: no zero-fill, only URGENT occurs in history.
    let stats = processor.get_daily_stats().await.unwrap();
    assert_eq!(stats.total_emails, 2);
    assert_eq!(stats.categories.len(), 1);
    assert_eq!(stats.categories[&EmailCategory::Urgent], 2);
}

#[tokio::test]
async fn compose_draft_cleans_generated_text_before_creating() {
    let records_dir = tempdir().unwrap();
    let drafts_dir = tempdir().unwrap();

    let mut mailbox = MockMailboxClient::new();
    mailbox
        .expect_create_draft()
        .withf(|to, subject, body| {
            to == "sam@example.com" && subject == "catch up" && body == "Dear Sam,\n\nCoffee?"
        })
        .returning(|_, _, _| DraftOutcome::Created {
            id: "d-9".to_string(),
            message_id: "dm-9".to_string(),
        });

    let mut generation = MockGeneration::new();
    generation
        .expect_generate_draft()
        .returning(|_, _, _| "<think>drafting</think>Dear Sam,\n\nCoffee?".to_string());

    let processor = EmailProcessor::new(mailbox, generation, records_dir.path(), drafts_dir.path());
    let outcome = processor
        .compose_draft("sam@example.com", "catch up", "ask about coffee", EmailCategory::LowPriority)
        .await;
    assert!(outcome.is_created());
}
