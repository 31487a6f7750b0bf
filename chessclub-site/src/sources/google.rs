use async_trait::async_trait;
use chessclub_events::{
    google::{convert_events, EventList, GoogleEvent},
    time, Event, EventPatch, NewEvent,
};
use chrono::NaiveDate;
use log::{debug, warn};
use reqwest::{Client, RequestBuilder, StatusCode, Url};

use super::{endpoint, ensure_success, EventSource, SourceError, SourceResult};
use crate::config::GoogleConfig;

const MAX_RESULTS: &str = "50";
/// Upper bound on followed `nextPageToken` links for a single listing.
const MAX_PAGES: usize = 10;

pub struct GoogleCalendarSource {
    client: Client,
    config: GoogleConfig,
    default_location: String,
}

impl GoogleCalendarSource {
    pub fn new(client: Client, config: GoogleConfig, default_location: String) -> Self {
        Self {
            client,
            config,
            default_location,
        }
    }

    fn events_url(&self, event_id: Option<&str>) -> Url {
        let calendar_id = self.config.calendar_id.as_str();
        match event_id {
            Some(event_id) => endpoint(
                &self.config.api_url,
                &["calendars", calendar_id, "events", event_id],
            ),
            None => endpoint(&self.config.api_url, &["calendars", calendar_id, "events"]),
        }
    }

    /// Writes go through OAuth; the API key alone only grants reads.
    fn authorized(&self, request: RequestBuilder) -> SourceResult<RequestBuilder> {
        let token = self
            .config
            .access_token
            .as_deref()
            .ok_or(SourceError::ReadOnly)?;
        Ok(request.bearer_auth(token))
    }

    fn to_event(&self, resource: &GoogleEvent) -> SourceResult<Event> {
        resource
            .to_event(&self.default_location)
            .ok_or(SourceError::Missing)
    }

    async fn get_event(&self, id: &str) -> SourceResult<GoogleEvent> {
        let request = self.authorized(self.client.get(self.events_url(Some(id))))?;
        let response = ensure_success(request.send().await?).await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl EventSource for GoogleCalendarSource {
    fn name(&self) -> &'static str {
        "Google Calendar"
    }

    async fn list_events(&self, today: NaiveDate) -> SourceResult<Vec<Event>> {
        let time_min = time::start_of_day(today)
            .ok_or(SourceError::Unrepresentable)?
            .to_rfc3339();

        let query = [
            ("key", self.config.api_key.as_str()),
            ("timeMin", time_min.as_str()),
            ("maxResults", MAX_RESULTS),
            ("singleEvents", "true"),
            ("orderBy", "startTime"),
            ("showDeleted", "false"),
        ];

        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        for _ in 0..MAX_PAGES {
            let mut request = self.client.get(self.events_url(None)).query(&query);
            if let Some(page_token) = &page_token {
                request = request.query(&[("pageToken", page_token)]);
            }

            let response = ensure_success(request.send().await?).await?;
            let list: EventList = response.json().await?;
            let page = convert_events(&list, &self.default_location);

            debug!(
                "Google Calendar returned {} items, {} usable",
                list.items.len(),
                page.len()
            );
            events.extend(page);

            match list.next_page_token {
                Some(next) => page_token = Some(next),
                None => return Ok(events),
            }
        }

        warn!("Google Calendar has more than {MAX_PAGES} pages of events, truncating");
        Ok(events)
    }

    async fn create_event(&self, event: &NewEvent) -> SourceResult<Event> {
        let body = GoogleEvent::from_new_event(event).ok_or(SourceError::Unrepresentable)?;
        let request = self.authorized(self.client.post(self.events_url(None)))?;

        let response = ensure_success(request.json(&body).send().await?).await?;
        self.to_event(&response.json().await?)
    }

    async fn update_event(&self, id: &str, patch: &EventPatch) -> SourceResult<Event> {
        let current = self.get_event(id).await?;
        let current = self.to_event(&current)?;
        let body = GoogleEvent::from_patch(patch, &current).ok_or(SourceError::Unrepresentable)?;

        let request = self.authorized(self.client.patch(self.events_url(Some(id))))?;
        let response = ensure_success(request.json(&body).send().await?).await?;
        self.to_event(&response.json().await?)
    }

    async fn delete_event(&self, id: &str) -> SourceResult<()> {
        let request = self.authorized(self.client.delete(self.events_url(Some(id))))?;
        match ensure_success(request.send().await?).await {
            Ok(_) => Ok(()),
            // already gone
            Err(SourceError::Status { status, .. }) if status == StatusCode::GONE => Ok(()),
            Err(err) => Err(err),
        }
    }
}
