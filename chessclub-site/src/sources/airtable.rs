use async_trait::async_trait;
use chessclub_events::{
    airtable::{
        convert_events, AnnouncementFields, CardFields, ContactFields, CreateRecords,
        EventFields, Record, RecordList, SubscriberFields, UpdateRecords, ACTIVE_FORMULA,
    },
    fallback,
    forms::{ValidContact, ValidEmail},
    Announcement, CommunityCard, ContactSubmission, Event, EventPatch, NewEvent,
    NewsletterSubscriber,
};
use chrono::{NaiveDate, Utc};
use log::{debug, warn};
use reqwest::{Client, RequestBuilder, Url};
use serde::{de::DeserializeOwned, Serialize};

use super::{
    endpoint, ensure_success, ContentSource, EventSource, SourceError, SourceResult,
    SubmissionStore,
};
use crate::config::AirtableConfig;

/// Upper bound on followed `offset` links for a single listing.
const MAX_PAGES: usize = 20;

pub struct AirtableClient {
    client: Client,
    config: AirtableConfig,
    default_location: String,
}

impl AirtableClient {
    pub fn new(client: Client, config: AirtableConfig, default_location: String) -> Self {
        Self {
            client,
            config,
            default_location,
        }
    }

    fn table_url(&self, table: &str, record_id: Option<&str>) -> Url {
        let base_id = self.config.base_id.as_str();
        match record_id {
            Some(record_id) => endpoint(&self.config.api_url, &[base_id, table, record_id]),
            None => endpoint(&self.config.api_url, &[base_id, table]),
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(&self.config.api_key)
    }

    /// Every record of `table`, following `offset` across pages.
    async fn list_records<F>(
        &self,
        table: &str,
        query: &[(&str, &str)],
    ) -> SourceResult<Vec<Record<F>>>
    where
        F: DeserializeOwned,
    {
        let mut records = Vec::new();
        let mut offset: Option<String> = None;

        for _ in 0..MAX_PAGES {
            let mut request = self
                .authorized(self.client.get(self.table_url(table, None)))
                .query(query);
            if let Some(offset) = &offset {
                request = request.query(&[("offset", offset)]);
            }

            let response = ensure_success(request.send().await?).await?;
            let page: RecordList<F> = response.json().await?;
            records.extend(page.records);

            match page.offset {
                Some(next) => offset = Some(next),
                None => return Ok(records),
            }
        }

        warn!("Airtable table {table} has more than {MAX_PAGES} pages, truncating");
        Ok(records)
    }

    async fn create_record<F>(&self, table: &str, fields: F) -> SourceResult<Record<F>>
    where
        F: Serialize + DeserializeOwned + Send,
    {
        let request = self.authorized(self.client.post(self.table_url(table, None)));
        let response = ensure_success(
            request
                .json(&CreateRecords::single(fields))
                .send()
                .await?,
        )
        .await?;
        first_record(response.json().await?)
    }
}

fn first_record<F>(list: RecordList<F>) -> SourceResult<Record<F>> {
    list.records.into_iter().next().ok_or(SourceError::Missing)
}

#[async_trait]
impl EventSource for AirtableClient {
    fn name(&self) -> &'static str {
        "Airtable"
    }

    async fn list_events(&self, _today: NaiveDate) -> SourceResult<Vec<Event>> {
        let records: Vec<Record<EventFields>> = self
            .list_records(
                &self.config.events_table,
                &[
                    ("filterByFormula", ACTIVE_FORMULA),
                    ("sort[0][field]", "Date"),
                    ("sort[0][direction]", "asc"),
                ],
            )
            .await?;

        let events = convert_events(&records, &self.default_location);
        debug!(
            "Airtable returned {} event records, {} usable",
            records.len(),
            events.len()
        );
        Ok(events)
    }

    async fn create_event(&self, event: &NewEvent) -> SourceResult<Event> {
        let record = self
            .create_record(&self.config.events_table, EventFields::from_new_event(event))
            .await?;
        record
            .to_event(&self.default_location)
            .ok_or(SourceError::Missing)
    }

    async fn update_event(&self, id: &str, patch: &EventPatch) -> SourceResult<Event> {
        let body = UpdateRecords::single(id.to_string(), EventFields::from_patch(patch));
        let request = self.authorized(
            self.client
                .patch(self.table_url(&self.config.events_table, None)),
        );

        let response = ensure_success(request.json(&body).send().await?).await?;
        let record: Record<EventFields> = first_record(response.json().await?)?;
        record
            .to_event(&self.default_location)
            .ok_or(SourceError::Missing)
    }

    async fn delete_event(&self, id: &str) -> SourceResult<()> {
        let request = self.authorized(
            self.client
                .delete(self.table_url(&self.config.events_table, Some(id))),
        );
        ensure_success(request.send().await?).await?;
        Ok(())
    }
}

#[async_trait]
impl ContentSource for AirtableClient {
    async fn announcements(&self) -> SourceResult<Vec<Announcement>> {
        let Some(table) = &self.config.announcements_table else {
            return Ok(fallback::fallback_announcements());
        };
        let records: Vec<Record<AnnouncementFields>> = self.list_records(table, &[]).await?;
        Ok(records.iter().filter_map(|record| record.to_announcement()).collect())
    }

    async fn community_cards(&self) -> SourceResult<Vec<CommunityCard>> {
        let Some(table) = &self.config.cards_table else {
            return Ok(fallback::fallback_community_cards());
        };
        let records: Vec<Record<CardFields>> = self.list_records(table, &[]).await?;
        Ok(records.iter().filter_map(|record| record.to_card()).collect())
    }
}

#[async_trait]
impl SubmissionStore for AirtableClient {
    async fn add_contact_submission(
        &self,
        contact: &ValidContact,
        source: &str,
    ) -> SourceResult<ContactSubmission> {
        let fields = ContactFields::new(contact, Some(source), Utc::now());
        let record = self
            .create_record(&self.config.contacts_table, fields)
            .await?;
        Ok(record.into())
    }

    async fn add_newsletter_subscriber(
        &self,
        email: &ValidEmail,
        source: &str,
    ) -> SourceResult<NewsletterSubscriber> {
        let fields = SubscriberFields::new(email, Some(source), Utc::now());
        let record = self
            .create_record(&self.config.newsletter_table, fields)
            .await?;
        Ok(record.into())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, Query},
        http::{HeaderMap, StatusCode},
        routing::get,
        Json, Router,
    };
    use chessclub_events::{Category, SubmissionStatus, DEFAULT_LOCATION};
    use serde_json::{json, Value};

    use super::*;
    use crate::sources::testing::spawn_upstream;

    fn client(api_url: Url) -> AirtableClient {
        AirtableClient::new(
            Client::new(),
            AirtableConfig {
                api_key: "pat-test".into(),
                base_id: "appClub".into(),
                api_url,
                events_table: "Events".into(),
                contacts_table: "Contact Submissions".into(),
                newsletter_table: "Newsletter Subscribers".into(),
                announcements_table: None,
                cards_table: Some("Community Cards".into()),
            },
            DEFAULT_LOCATION.into(),
        )
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()
    }

    #[tokio::test]
    async fn follows_pagination_and_drops_bad_records() {
        let queries = Arc::new(Mutex::new(Vec::<HashMap<String, String>>::new()));
        let queries_clone = Arc::clone(&queries);

        let router = Router::new().route(
            "/v0/appClub/Events",
            get(move |headers: HeaderMap, Query(query): Query<HashMap<String, String>>| {
                let queries = Arc::clone(&queries_clone);
                async move {
                    assert_eq!(headers["authorization"], "Bearer pat-test");
                    let second_page = query.contains_key("offset");
                    queries.lock().unwrap().push(query);

                    if second_page {
                        Json(json!({ "records": [
                            { "id": "rec3", "fields": { "Title": "Blitz", "Date": "2030-01-09", "Time": "7 o'clock" } }
                        ]}))
                    } else {
                        Json(json!({ "offset": "itrNext", "records": [
                            { "id": "rec1", "fields": { "Title": "Quad", "Date": "2030-01-04", "Time": "10:00 AM", "Category": "tournament" } },
                            { "id": "rec2", "fields": { "Date": "2030-01-05" } }
                        ]}))
                    }
                }
            }),
        );
        let url = spawn_upstream(router).await;

        let events = client(url).list_events(today()).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, "rec1");
        assert_eq!(events[0].category, Category::Tournament);
        assert_eq!(events[0].display_time(), "10:00 AM");
        assert_eq!(events[0].location, DEFAULT_LOCATION);

        let queries = queries.lock().unwrap();
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[0]["filterByFormula"], ACTIVE_FORMULA);
        assert_eq!(queries[0]["sort[0][field]"], "Date");
        assert_eq!(queries[1]["offset"], "itrNext");
    }

    #[tokio::test]
    async fn event_writes() {
        let router = Router::new()
            .route(
                "/v0/appClub/Events",
                axum::routing::post(|Json(body): Json<Value>| async move {
                    let fields = body["records"][0]["fields"].clone();
                    assert_eq!(fields["Status"], "active");
                    assert_eq!(fields["Time"], "18:00");
                    assert_eq!(fields["Category"], "special");
                    Json(json!({ "records": [{ "id": "recNew", "fields": fields }] }))
                })
                .patch(|Json(body): Json<Value>| async move {
                    assert_eq!(
                        body,
                        json!({ "records": [{ "id": "recQ", "fields": { "Category": "classes" } }] })
                    );
                    Json(json!({ "records": [{ "id": "recQ", "fields": {
                        "Title": "Beginner lesson",
                        "Date": "2030-01-08",
                        "Category": "classes",
                        "Status": "active"
                    }}]}))
                }),
            )
            .route(
                "/v0/appClub/Events/:id",
                axum::routing::delete(|Path(id): Path<String>| async move {
                    if id == "recQ" {
                        (StatusCode::OK, Json(json!({ "id": id, "deleted": true })))
                    } else {
                        (StatusCode::NOT_FOUND, Json(json!({ "error": "NOT_FOUND" })))
                    }
                }),
            );
        let client = client(spawn_upstream(router).await);

        let created = client
            .create_event(&NewEvent {
                title: "Simul".into(),
                date: NaiveDate::from_ymd_opt(2030, 1, 10).unwrap(),
                time: chrono::NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
                category: Category::Special,
                description: "Special guest".into(),
                location: DEFAULT_LOCATION.into(),
            })
            .await
            .unwrap();
        assert_eq!(created.id, "recNew");
        assert_eq!(created.title, "Simul");
        assert_eq!(created.display_time(), "6:00 PM");

        let updated = client
            .update_event(
                "recQ",
                &EventPatch {
                    category: Some(Category::Classes),
                    ..EventPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.id, "recQ");
        assert_eq!(updated.category, Category::Classes);
        assert_eq!(updated.date, NaiveDate::from_ymd_opt(2030, 1, 8).unwrap());

        client.delete_event("recQ").await.unwrap();
        let err = client.delete_event("recGone").await.unwrap_err();
        assert!(matches!(err, SourceError::Status { status, .. } if status == StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let router = Router::new().route(
            "/v0/appClub/Events",
            get(|| async { (StatusCode::UNAUTHORIZED, r#"{"error":"AUTHENTICATION_REQUIRED"}"#) }),
        );
        let url = spawn_upstream(router).await;

        let err = client(url).list_events(today()).await.unwrap_err();
        assert!(matches!(err, SourceError::Status { status, .. } if status == StatusCode::UNAUTHORIZED));
    }

    #[tokio::test]
    async fn unconfigured_content_uses_fallback() {
        let router = Router::new().route(
            "/v0/appClub/:table",
            get(|Path(table): Path<String>| async move {
                assert_eq!(table, "Community Cards");
                Json(json!({ "records": [
                    { "id": "recB", "fields": { "Title": "Later", "Order": 2, "Status": "active" } },
                    { "id": "recA", "fields": { "Title": "First", "Order": 1 } }
                ]}))
            }),
        );
        let client = client(spawn_upstream(router).await);

        let announcements = client.announcements().await.unwrap();
        assert_eq!(announcements, fallback::fallback_announcements());

        let cards = client.community_cards().await.unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].title, "Later");
        assert_eq!(cards[0].order, 2);
    }

    #[tokio::test]
    async fn contact_submission_is_created() {
        let router = Router::new().route(
            "/v0/appClub/:table",
            axum::routing::post(|Path(table): Path<String>, Json(body): Json<Value>| async move {
                assert_eq!(table, "Contact Submissions");
                let fields = body["records"][0]["fields"].clone();
                assert_eq!(fields["Status"], "new");
                assert_eq!(fields["Source"], "website");
                Json(json!({ "records": [{
                    "id": "recContact",
                    "createdTime": "2030-01-01T12:00:00.000Z",
                    "fields": fields
                }]}))
            }),
        );
        let client = client(spawn_upstream(router).await);

        let contact = ValidContact {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            message: "Do you run a ladder?".into(),
        };
        let submission = client
            .add_contact_submission(&contact, "website")
            .await
            .unwrap();
        assert_eq!(submission.id, "recContact");
        assert_eq!(submission.email, "ada@example.com");
        assert_eq!(submission.status, SubmissionStatus::New);
        assert_eq!(submission.source.as_deref(), Some("website"));
    }

    #[tokio::test]
    async fn empty_create_response_is_missing() {
        let router = Router::new().route(
            "/v0/appClub/:table",
            axum::routing::post(|| async { Json(json!({ "records": [] })) }),
        );
        let client = client(spawn_upstream(router).await);

        let err = client
            .add_newsletter_subscriber(&ValidEmail("ada@example.com".into()), "website")
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Missing));
    }
}
