//! Transactional email.
//!
//! Production sends through the Resend HTTP API. Without an API key the
//! server falls back to [`LogMailer`], which only records the message in
//! the log.

use std::sync::Arc;

use async_trait::async_trait;
use homestay_core::models::application::Application;
use homestay_core::models::review::Review;
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub api_key: Option<String>,
    pub from: String,
    pub endpoint: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            from: "English Homestay Vietnam <no-reply@englishhomestayvietnam.com>".into(),
            endpoint: "https://api.resend.com/emails".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("mail provider rejected message ({status}): {body}")]
    Rejected { status: u16, body: String },
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: Email) -> Result<(), MailError>;
}

/// Pick the mailer for `config`.
pub fn from_config(config: &MailConfig) -> Arc<dyn Mailer> {
    match &config.api_key {
        Some(key) => Arc::new(ResendMailer::new(key.clone(), config)),
        None => {
            warn!("RESEND_API_KEY not set, emails will only be logged");
            Arc::new(LogMailer)
        }
    }
}

pub struct ResendMailer {
    client: reqwest::Client,
    api_key: String,
    from: String,
    endpoint: String,
}

impl ResendMailer {
    pub fn new(api_key: String, config: &MailConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            from: config.from.clone(),
            endpoint: config.endpoint.clone(),
        }
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, email: Email) -> Result<(), MailError> {
        let body = json!({
            "from": self.from,
            "to": [email.to],
            "subject": email.subject,
            "html": email.html,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: Email) -> Result<(), MailError> {
        info!(to = %email.to, subject = %email.subject, "Email not sent (no provider configured)");
        Ok(())
    }
}

/// Send in the background. Failure is logged and never reaches the
/// caller.
pub fn send_in_background(mailer: Arc<dyn Mailer>, email: Email) {
    tokio::spawn(async move {
        let to = email.to.clone();
        let subject = email.subject.clone();
        if let Err(e) = mailer.send(email).await {
            warn!(%to, %subject, error = %e, "Failed to send email");
        }
    });
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn stars(rating: u32) -> String {
    "★".repeat(rating as usize) + &"☆".repeat(5usize.saturating_sub(rating as usize))
}

fn layout(heading: &str, body: &str) -> String {
    format!(
        "<html><body style=\"font-family:sans-serif;background:#eefbf3;padding:24px\">\
         <div style=\"max-width:560px;margin:0 auto;background:#fff;padding:32px;border-radius:8px\">\
         <h1 style=\"color:#3a9959\">{heading}</h1>{body}\
         <hr/><p style=\"color:#888;font-size:12px\">English Homestay Vietnam</p>\
         </div></body></html>"
    )
}

/// Sent after a review is submitted and on explicit request.
pub fn review_thank_you(to: &str, user_name: &str, review: &Review) -> Email {
    let title = review
        .title
        .as_deref()
        .unwrap_or("Amazing volunteer experience!");
    let body = format!(
        "<p>Hi <strong>{name}</strong>,</p>\
         <p>We truly appreciate you taking the time to share your experience. \
         Your feedback helps future volunteers make informed decisions.</p>\
         <p><strong>{title}</strong> {stars}</p>\
         <blockquote>{text}</blockquote>\
         <p>Your review will appear on our site once it has been approved.</p>",
        name = escape_html(user_name),
        title = escape_html(title),
        stars = stars(review.rating),
        text = escape_html(&review.review_text),
    );

    Email {
        to: to.into(),
        subject: "Thank you for sharing your story!".into(),
        html: layout("Thank you for your review!", &body),
    }
}

/// Sent when a moderator approves a review.
pub fn review_approved(to: &str, user_name: &str, review: &Review) -> Email {
    let body = format!(
        "<p>Hi <strong>{name}</strong>,</p>\
         <p>Good news: your review has been approved and is now visible to \
         future volunteers.</p>\
         <p>{stars}</p>",
        name = escape_html(user_name),
        stars = stars(review.rating),
    );

    Email {
        to: to.into(),
        subject: "Your review is now live!".into(),
        html: layout("Your review has been published", &body),
    }
}

/// Sent after an application is received.
pub fn application_received(application: &Application) -> Email {
    let body = format!(
        "<p>Hi <strong>{name}</strong>,</p>\
         <p>Thank you for applying to the <strong>{program}</strong> program. \
         Our team will review your application and get back to you soon.</p>",
        name = escape_html(&application.full_name),
        program = escape_html(&application.program),
    );

    Email {
        to: application.email.clone(),
        subject: "We received your application!".into(),
        html: layout("Application received", &body),
    }
}
