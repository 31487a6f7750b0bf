use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chessclub_events::{
    forms::{ContactForm, NewsletterForm},
    in_category, time, to_ics, within_days, Announcement, Category, CommunityCard, Event,
};
use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, error};
use serde::{Deserialize, Serialize};

use crate::aggregate::{fetch_home, fetch_upcoming_events};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Recorded as the `Source` of every form submission.
const SUBMISSION_SOURCE: &str = "website";
const CALENDAR_NAME: &str = "Rockland Chess Club Events";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/events", get(handle_events))
        .route("/api/home", get(handle_home))
        .route("/api/contact-form", post(handle_contact_form))
        .route("/api/newsletter-signup", post(handle_newsletter_signup))
        .fallback(|| async { ApiError::NotFound })
        .with_state(state)
}

/// An [`Event`] with the strings the pages display next to it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonEvent<'a> {
    id: &'a str,
    title: &'a str,
    date: NaiveDate,
    time: String,
    category: Category,
    category_label: &'static str,
    description: &'a str,
    location: &'a str,
    display_date: String,
    display_time: String,
}

impl<'a> From<&'a Event> for JsonEvent<'a> {
    fn from(event: &'a Event) -> Self {
        Self {
            id: &event.id,
            title: &event.title,
            date: event.date,
            time: event.time.format("%H:%M").to_string(),
            category: event.category,
            category_label: event.category.label(),
            description: &event.description,
            location: &event.location,
            display_date: event.display_date(),
            display_time: event.display_time(),
        }
    }
}

fn json_events(events: &[Event]) -> Vec<JsonEvent<'_>> {
    events.iter().map(JsonEvent::from).collect()
}

#[derive(Debug, Serialize)]
struct CategoryOption {
    value: Category,
    label: &'static str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Format {
    #[default]
    Json,
    Ics,
}

#[derive(Debug, Deserialize)]
struct EventsQuery {
    category: Option<String>,
    days: Option<u32>,
    #[serde(default)]
    format: Format,
}

#[derive(Serialize)]
struct EventsResponse<'a> {
    data: Vec<JsonEvent<'a>>,
    categories: Vec<CategoryOption>,
}

async fn handle_events(
    State(state): State<AppState>,
    query: Result<Query<EventsQuery>, QueryRejection>,
) -> ApiResult<Response> {
    let Query(query) = query.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

    let category = query
        .category
        .as_deref()
        .filter(|raw| !raw.is_empty() && *raw != "all")
        .map(str::parse::<Category>)
        .transpose()
        .map_err(|err| ApiError::bad_request(err.to_string()))?;

    let now = Utc::now();
    let mut events =
        fetch_upcoming_events(state.events.as_ref(), now, &state.location, state.fetch_timeout)
            .await;
    if let Some(category) = category {
        events = in_category(events, category);
    }
    if let Some(days) = query.days {
        events = within_days(events, time::today(now), days);
    }

    let response = match query.format {
        Format::Json => Json(EventsResponse {
            data: json_events(&events),
            categories: Category::ALL
                .into_iter()
                .map(|category| CategoryOption {
                    value: category,
                    label: category.label(),
                })
                .collect(),
        })
        .into_response(),
        Format::Ics => (
            [(header::CONTENT_TYPE, "text/calendar; charset=utf-8")],
            to_ics(CALENDAR_NAME, &events).to_string(),
        )
            .into_response(),
    };

    Ok(response)
}

#[derive(Serialize)]
struct HomeResponse<'a> {
    events: Vec<JsonEvent<'a>>,
    announcements: &'a [Announcement],
    cards: &'a [CommunityCard],
}

async fn handle_home(State(state): State<AppState>) -> Response {
    let home = fetch_home(&state, Utc::now()).await;
    Json(HomeResponse {
        events: json_events(&home.events),
        announcements: &home.announcements,
        cards: &home.cards,
    })
    .into_response()
}

fn body_rejected(rejection: JsonRejection) -> ApiError {
    debug!("Rejected request body: {rejection}");
    ApiError::bad_request("Invalid request body")
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmissionSummary {
    id: String,
    name: String,
    email: String,
    submitted_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct ContactResponse {
    success: bool,
    message: &'static str,
    submission: SubmissionSummary,
}

async fn handle_contact_form(
    State(state): State<AppState>,
    payload: Result<Json<ContactForm>, JsonRejection>,
) -> ApiResult<Json<ContactResponse>> {
    let Json(form) = payload.map_err(body_rejected)?;

    let contact = form.validate().map_err(|err| {
        debug!("Rejected contact form: {err}");
        ApiError::bad_request(err.to_string())
    })?;

    let submission = state
        .submissions
        .add_contact_submission(&contact, SUBMISSION_SOURCE)
        .await
        .map_err(|err| {
            error!("Failed to save contact submission: {err}");
            ApiError::internal("Failed to save contact submission")
        })?;

    Ok(Json(ContactResponse {
        success: true,
        message: "Contact form submitted successfully",
        submission: SubmissionSummary {
            id: submission.id,
            name: submission.name,
            email: submission.email,
            submitted_at: submission.submitted_at,
        },
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubscriberSummary {
    id: String,
    email: String,
    subscribed_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct NewsletterResponse {
    success: bool,
    message: &'static str,
    subscriber: SubscriberSummary,
}

async fn handle_newsletter_signup(
    State(state): State<AppState>,
    payload: Result<Json<NewsletterForm>, JsonRejection>,
) -> ApiResult<Json<NewsletterResponse>> {
    let Json(form) = payload.map_err(body_rejected)?;

    let email = form.validate().map_err(|err| {
        debug!("Rejected newsletter signup: {err}");
        ApiError::bad_request(err.to_string())
    })?;

    let subscriber = state
        .submissions
        .add_newsletter_subscriber(&email, SUBMISSION_SOURCE)
        .await
        .map_err(|err| {
            error!("Failed to add newsletter subscriber: {err}");
            ApiError::internal("Failed to add subscriber to database")
        })?;

    Ok(Json(NewsletterResponse {
        success: true,
        message: "Successfully subscribed to newsletter",
        subscriber: SubscriberSummary {
            id: subscriber.id,
            email: subscriber.email,
            subscribed_at: subscriber.subscribed_at,
        },
    }))
}
