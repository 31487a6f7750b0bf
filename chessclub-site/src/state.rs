use std::{sync::Arc, time::Duration};

use crate::config::Config;
use crate::sources::{
    http_client, AirtableClient, ContentSource, EventSource, GoogleCalendarSource,
    SubmissionStore,
};

/// Everything the handlers share. Cloned per request, so only `Arc`s live here.
#[derive(Clone)]
pub struct AppState {
    pub events: Arc<dyn EventSource>,
    pub content: Arc<dyn ContentSource>,
    pub submissions: Arc<dyn SubmissionStore>,
    pub location: Arc<str>,
    pub fetch_timeout: Duration,
}

impl AppState {
    pub fn from_config(config: &Config) -> reqwest::Result<Self> {
        let client = http_client(config.fetch_timeout)?;

        let airtable = Arc::new(AirtableClient::new(
            client.clone(),
            config.airtable.clone(),
            config.location.clone(),
        ));

        // `Config` only carries Google settings when Google is the event source.
        let events: Arc<dyn EventSource> = match &config.google {
            Some(google) => Arc::new(GoogleCalendarSource::new(
                client,
                google.clone(),
                config.location.clone(),
            )),
            None => airtable.clone(),
        };

        Ok(Self {
            events,
            content: airtable.clone(),
            submissions: airtable,
            location: Arc::from(config.location.as_str()),
            fetch_timeout: config.fetch_timeout,
        })
    }
}
