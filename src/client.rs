//! Gmail mailbox client
//!
//! Narrow interface over the Gmail API: fetch recent messages with decoded
//! plain-text bodies, create reply drafts, send confirmed drafts. Draft and
//! send operations report failures as structured outcomes instead of errors,
//! so one failed email never aborts a processing batch.

use async_trait::async_trait;
use google_gmail1::api::{Draft, Message, MessagePart};
use mime::Mime;
use std::io::Cursor;
use tracing::{debug, warn};

use crate::auth::GmailHub;
use crate::error::{AssistantError, Result};
use crate::models::EmailMessage;

const READONLY_SCOPE: &str = "https://www.googleapis.com/auth/gmail.readonly";
const COMPOSE_SCOPE: &str = "https://www.googleapis.com/auth/gmail.compose";
const SEND_SCOPE: &str = "https://www.googleapis.com/auth/gmail.send";

fn rfc822_mime() -> Mime {
    "message/rfc822".parse().expect("static mime type")
}

/// Result of a draft-creation attempt. Never surfaced as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftOutcome {
    Created { id: String, message_id: String },
    Failed { error: String },
}

impl DraftOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, DraftOutcome::Created { .. })
    }

    /// Draft id when creation succeeded.
    pub fn draft_id(&self) -> Option<String> {
        match self {
            DraftOutcome::Created { id, .. } => Some(id.clone()),
            DraftOutcome::Failed { .. } => None,
        }
    }
}

/// Result of a send attempt. Never surfaced as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Sent { id: String, thread_id: String },
    Failed { error: String },
}

impl SendOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, SendOutcome::Sent { .. })
    }
}

/// Mailbox operations the pipeline depends on.
#[async_trait]
pub trait Mailbox: Send + Sync {
    /// Fetch up to `limit` most-recent messages with decoded plain-text
    /// bodies, in the order the provider lists them.
    async fn fetch_emails(&self, limit: usize) -> Result<Vec<EmailMessage>>;

    /// Create a draft addressed to `to`.
    async fn create_draft(&self, to: &str, subject: &str, body: &str) -> DraftOutcome;

    /// Send an email to `to`.
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> SendOutcome;
}

/// Production mailbox client over an authenticated Gmail hub.
///
/// The hub is authenticated before construction (see [`crate::auth`]); there
/// is no lazy session establishment here.
pub struct GmailMailbox {
    hub: GmailHub,
    user_email: String,
}

impl GmailMailbox {
    pub fn new(hub: GmailHub, user_email: impl Into<String>) -> Self {
        Self {
            hub,
            user_email: user_email.into(),
        }
    }

    pub fn user_email(&self) -> &str {
        &self.user_email
    }

    /// Build the RFC 822 payload Gmail expects for drafts and sends.
    fn rfc822_payload(&self, to: &str, subject: &str, body: &str) -> Vec<u8> {
        format!(
            "To: {to}\r\n\
             From: {from}\r\n\
             Subject: {subject}\r\n\
             Content-Type: text/plain; charset=\"UTF-8\"\r\n\
             \r\n\
             {body}",
            to = to,
            from = self.user_email,
            subject = subject,
            body = body,
        )
        .into_bytes()
    }
}

#[async_trait]
impl Mailbox for GmailMailbox {
    async fn fetch_emails(&self, limit: usize) -> Result<Vec<EmailMessage>> {
        let (_, list) = self
            .hub
            .users()
            .messages_list("me")
            .max_results(limit as u32)
            .add_scope(READONLY_SCOPE)
            .doit()
            .await
            .map_err(AssistantError::from)?;

        let ids: Vec<String> = list
            .messages
            .unwrap_or_default()
            .into_iter()
            .filter_map(|m| m.id)
            .collect();

        let mut emails = Vec::with_capacity(ids.len());
        for id in ids {
            let (_, message) = self
                .hub
                .users()
                .messages_get("me", &id)
                .format("full")
                .add_scope(READONLY_SCOPE)
                .doit()
                .await
                .map_err(AssistantError::from)?;

            emails.push(parse_email_message(message)?);
        }

        debug!("Fetched {} messages", emails.len());
        Ok(emails)
    }

    async fn create_draft(&self, to: &str, subject: &str, body: &str) -> DraftOutcome {
        let payload = self.rfc822_payload(to, subject, body);
        let request = Draft {
            message: Some(Message::default()),
            ..Default::default()
        };

        let result = self
            .hub
            .users()
            .drafts_create(request, "me")
            .add_scope(COMPOSE_SCOPE)
            .upload(Cursor::new(payload), rfc822_mime())
            .await;

        match result {
            Ok((_, draft)) => {
                let id = draft.id.unwrap_or_default();
                let message_id = draft.message.and_then(|m| m.id).unwrap_or_default();
                debug!("Created draft {} for {}", id, to);
                DraftOutcome::Created { id, message_id }
            }
            Err(e) => {
                let error = AssistantError::from(e).to_string();
                warn!("Draft creation failed for {}: {}", to, error);
                DraftOutcome::Failed { error }
            }
        }
    }

    async fn send_email(&self, to: &str, subject: &str, body: &str) -> SendOutcome {
        let payload = self.rfc822_payload(to, subject, body);

        let result = self
            .hub
            .users()
            .messages_send(Message::default(), "me")
            .add_scope(SEND_SCOPE)
            .upload(Cursor::new(payload), rfc822_mime())
            .await;

        match result {
            Ok((_, message)) => {
                let id = message.id.unwrap_or_default();
                let thread_id = message.thread_id.unwrap_or_default();
                debug!("Sent message {} to {}", id, to);
                SendOutcome::Sent { id, thread_id }
            }
            Err(e) => {
                let error = AssistantError::from(e).to_string();
                warn!("Send failed for {}: {}", to, error);
                SendOutcome::Failed { error }
            }
        }
    }
}

/// Parse a Gmail API message into an [`EmailMessage`].
///
/// Missing headers degrade to placeholder values; only the message id is
/// required.
pub fn parse_email_message(message: Message) -> Result<EmailMessage> {
    let id = message
        .id
        .ok_or_else(|| AssistantError::InvalidMessageFormat("Missing message ID".to_string()))?;

    let mut subject = None;
    let mut sender = None;
    let mut date = None;

    if let Some(headers) = message.payload.as_ref().and_then(|p| p.headers.as_ref()) {
        for header in headers {
            if let (Some(name), Some(value)) = (&header.name, &header.value) {
                match name.to_lowercase().as_str() {
                    "subject" => subject = Some(value.clone()),
                    "from" => sender = Some(value.clone()),
                    "date" => date = Some(value.clone()),
                    _ => {}
                }
            }
        }
    }

    let body = message
        .payload
        .as_ref()
        .map(extract_plain_text)
        .unwrap_or_default();

    Ok(EmailMessage {
        id,
        subject: subject.unwrap_or_else(|| "(No Subject)".to_string()),
        sender: sender.unwrap_or_else(|| "(Unknown Sender)".to_string()),
        date: date.unwrap_or_else(|| "(No Date)".to_string()),
        body,
    })
}

/// Extract the plain-text body from a message payload.
///
/// Multipart messages contribute every `text/plain` part, concatenated in
/// order; single-part messages contribute their one body.
pub fn extract_plain_text(payload: &MessagePart) -> String {
    match payload.parts.as_ref() {
        Some(parts) => {
            let mut body = String::new();
            for part in parts {
                if part.mime_type.as_deref() == Some("text/plain") {
                    if let Some(data) = part.body.as_ref().and_then(|b| b.data.as_ref()) {
                        body.push_str(&String::from_utf8_lossy(data));
                    }
                }
            }
            body
        }
        None => payload
            .body
            .as_ref()
            .and_then(|b| b.data.as_ref())
            .map(|data| String::from_utf8_lossy(data).into_owned())
            .unwrap_or_default(),
    }
}
