//! Outbound adapters for the hosted services the site reads from and writes to.

use std::time::Duration;

use async_trait::async_trait;
use chessclub_events::{
    forms::{ValidContact, ValidEmail},
    Announcement, CommunityCard, ContactSubmission, Event, EventPatch, NewEvent,
    NewsletterSubscriber,
};
use chrono::NaiveDate;
use reqwest::{Client, Response, StatusCode, Url};
use thiserror::Error;

mod airtable;
mod google;

pub use airtable::AirtableClient;
pub use google::GoogleCalendarSource;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream answered {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("no answer within {0:?}")]
    Timeout(Duration),

    #[error("source is read-only")]
    ReadOnly,

    #[error("upstream returned no usable record")]
    Missing,

    #[error("event cannot be represented upstream")]
    Unrepresentable,
}

pub type SourceResult<T> = Result<T, SourceError>;

/// Where club events come from.
///
/// `list_events` hands back every event the source knows about from `today`
/// on, already mapped but neither filtered nor sorted.
#[async_trait]
pub trait EventSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn list_events(&self, today: NaiveDate) -> SourceResult<Vec<Event>>;

    async fn create_event(&self, event: &NewEvent) -> SourceResult<Event>;

    async fn update_event(&self, id: &str, patch: &EventPatch) -> SourceResult<Event>;

    async fn delete_event(&self, id: &str) -> SourceResult<()>;
}

/// Editable home page content.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn announcements(&self) -> SourceResult<Vec<Announcement>>;

    async fn community_cards(&self) -> SourceResult<Vec<CommunityCard>>;
}

/// Append-only storage for form submissions.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn add_contact_submission(
        &self,
        contact: &ValidContact,
        source: &str,
    ) -> SourceResult<ContactSubmission>;

    async fn add_newsletter_subscriber(
        &self,
        email: &ValidEmail,
        source: &str,
    ) -> SourceResult<NewsletterSubscriber>;
}

pub fn http_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()
}

/// `base` with `segments` appended as percent-encoded path segments.
fn endpoint(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

async fn ensure_success(response: Response) -> SourceResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(SourceError::Status { status, body })
}
