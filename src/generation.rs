//! Generation service client
//!
//! Wraps the Ollama completion endpoint behind the [`GenerationClient`] trait.
//! Every task operation shares one synchronous-style transport call: send the
//! prompt, receive the full (non-streamed) completion, strip the echoed prompt
//! prefix if the server includes it verbatim, trim whitespace.
//!
//! Failure policy: transport and server errors are logged and degraded to an
//! empty string at the task surface, so callers treat "" as "no result". The
//! classify parser then falls back to its safe default. Only the private
//! transport primitive distinguishes failure from an empty completion.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{AssistantError, Result};
use crate::models::{Classification, EmailCategory, ProcessingStats};

/// Text-generation operations the pipeline depends on.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Categorize an email into one of the three urgency buckets, with a
    /// confidence score and a short rationale. Unparseable model output
    /// yields the LOW_PRIORITY / 0 / "" fallback.
    async fn classify(&self, subject: &str, body: &str, sender: &str) -> Classification;

    /// Generate a professional reply for an email. Empty string on failure.
    async fn generate_reply(&self, subject: &str, body: &str, category: EmailCategory) -> String;

    /// Generate a formatted digest report from aggregate statistics.
    async fn generate_digest(&self, stats: &ProcessingStats) -> String;

    /// Generate a raw draft with no explanatory wrapper.
    async fn generate_draft(&self, subject: &str, message: &str, category: EmailCategory)
        -> String;
}

static CATEGORY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Category:\s*(URGENT|IMPORTANT|LOW_PRIORITY)").unwrap());

static CONFIDENCE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"Confidence:\s*(\d+)").unwrap());

static RATIONALE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"Rationale:\s*(.*)").unwrap());

/// Lenient parse of a categorize completion.
///
/// Policy: the category token must match one of the three literal labels
/// (case-insensitive), otherwise LOW_PRIORITY; confidence is the first
/// integer after "Confidence:", otherwise 0; rationale is the remainder of
/// the "Rationale:" line, otherwise empty. This is deliberate safe-default
/// parsing, not schema validation.
pub fn parse_classification(text: &str) -> Classification {
    let category = CATEGORY_RE
        .captures(text)
        .and_then(|caps| EmailCategory::parse(caps.get(1).map_or("", |m| m.as_str())))
        .unwrap_or(EmailCategory::LowPriority);

    let confidence = CONFIDENCE_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u8>().ok())
        .unwrap_or(0);

    let rationale = RATIONALE_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map_or(String::new(), |m| m.as_str().trim().to_string());

    Classification {
        category,
        confidence,
        rationale,
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Client for a local or remote Ollama server.
pub struct OllamaClient {
    host: String,
    model: String,
    http: reqwest::Client,
}

impl OllamaClient {
    pub fn new(host: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            model: model.into(),
            http: reqwest::Client::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one prompt and return the full completion.
    async fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.host.trim_end_matches('/'));
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AssistantError::GenerationError(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AssistantError::GenerationError(format!(
                "server returned HTTP {}",
                response.status()
            )));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AssistantError::GenerationError(format!("invalid response body: {}", e)))?;

        // Some backends echo the prompt verbatim ahead of the completion;
        // keep only the text after the last occurrence.
        let text = match body.response.rfind(prompt) {
            Some(idx) => &body.response[idx + prompt.len()..],
            None => body.response.as_str(),
        };
        Ok(text.trim().to_string())
    }

    /// Run one task prompt, degrading any failure to an empty string.
    async fn complete_or_empty(&self, task: &str, prompt: &str) -> String {
        match self.complete(prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!("{} generation failed: {}", task, e);
                String::new()
            }
        }
    }
}

fn categorize_prompt(subject: &str, body: &str, sender: &str) -> String {
    format!(
        "You are an expert email assistant. Analyze the following email and:\n\
         1. Categorize it as one of: URGENT, IMPORTANT, or LOW_PRIORITY.\n\
         2. Give a confidence score (0-100) for your choice.\n\
         3. Briefly explain your reasoning.\n\
         \n\
         Criteria:\n\
         - URGENT: Requires immediate action, has severe consequences if delayed, or uses urgent language.\n\
         - IMPORTANT: Needs action but not immediately, or is from a key stakeholder, but not an emergency.\n\
         - LOW_PRIORITY: Can be handled later, is informational, or not time-sensitive.\n\
         \n\
         Email Subject: {subject}\n\
         Email Body: {body}\n\
         Sender: {sender}\n\
         \n\
         Respond in this format:\n\
         Category: <category>\n\
         Confidence: <number>\n\
         Rationale: <short explanation>"
    )
}

fn reply_prompt(subject: &str, category: EmailCategory) -> String {
    format!(
        "Generate a professional email reply for:\n\
         Subject: {subject}\n\
         Category: {category}\n\
         \n\
         Format the response as a clean email with:\n\
         - Subject line\n\
         - Professional greeting\n\
         - Clear body\n\
         - Professional signature\n\
         \n\
         Do not include any thinking process or <think> tags."
    )
}

fn digest_prompt(stats: &ProcessingStats) -> String {
    let stats_json = serde_json::to_string_pretty(stats).unwrap_or_default();
    format!(
        "Generate a daily email digest report based on these statistics:\n\
         {stats_json}\n\
         \n\
         Include:\n\
         - Summary of emails received\n\
         - Categorization breakdown\n\
         - Key action items\n\
         - Reply status\n\
         \n\
         Format as a clear, concise report:"
    )
}

fn draft_prompt(subject: &str, message: &str, category: EmailCategory) -> String {
    format!(
        "Write ONLY the email draft, no explanations or reasoning:\n\
         \n\
         Subject: {subject}\n\
         Message: {message}\n\
         Category: {category}\n\
         \n\
         Output format:\n\
         Dear [recipient's name],\n\
         \n\
         [body]\n\
         \n\
         Best regards,\n\
         [your name]"
    )
}

#[async_trait]
impl GenerationClient for OllamaClient {
    async fn classify(&self, subject: &str, body: &str, sender: &str) -> Classification {
        let prompt = categorize_prompt(subject, body, sender);
        let response = self.complete_or_empty("classify", &prompt).await;
        parse_classification(&response)
    }

    async fn generate_reply(&self, subject: &str, _body: &str, category: EmailCategory) -> String {
        let prompt = reply_prompt(subject, category);
        self.complete_or_empty("reply", &prompt).await
    }

    async fn generate_digest(&self, stats: &ProcessingStats) -> String {
        let prompt = digest_prompt(stats);
        self.complete_or_empty("digest", &prompt).await
    }

    async fn generate_draft(
        &self,
        subject: &str,
        message: &str,
        category: EmailCategory,
    ) -> String {
        let prompt = draft_prompt(subject, message, category);
        self.complete_or_empty("draft", &prompt).await
    }
}
