//! Agenda and calendar-file endpoints

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;

use famcal_core::ics::{self, ICS_CONTENT_TYPE};
use famcal_core::store::export_timezone;
use famcal_core::{DateWindow, Occurrence, expand_window};

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/families/{family_id}/occurrences", get(list_occurrences))
        .route("/families/{family_id}/events/{event_id}/ics", get(download_ics))
}

#[derive(Deserialize)]
pub struct WindowQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

/// GET /families/:family_id/occurrences - Expanded agenda for a date window
async fn list_occurrences(
    State(state): State<AppState>,
    Path(family_id): Path<String>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<Vec<Occurrence>>, AppError> {
    let window = DateWindow::from_args(query.from.as_deref(), query.to.as_deref(), state.window_days)?;
    let events = state.store.family_events(&family_id)?;
    let occurrences = expand_window(&events, &window)?;

    Ok(Json(occurrences))
}

#[derive(Deserialize)]
pub struct ExportQuery {
    pub profile: Option<String>,
    pub tz: Option<String>,
}

/// GET /families/:family_id/events/:event_id/ics - Single event as a .ics download
async fn download_ics(
    State(state): State<AppState>,
    Path((family_id, event_id)): Path<(String, String)>,
    Query(query): Query<ExportQuery>,
) -> Result<impl IntoResponse, AppError> {
    let event = state.store.find_event(&family_id, &event_id)?;
    let timezone = export_timezone(&*state.store, query.tz.as_deref(), query.profile.as_deref())?
        .unwrap_or_else(|| state.default_timezone.clone());

    let body = ics::serialize(&event, &timezone)?;
    tracing::info!(family = %family_id, event = %event_id, %timezone, "exported event");

    Ok((
        [
            (header::CONTENT_TYPE, ICS_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, ics::content_disposition(&event)),
        ],
        body,
    ))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use famcal_core::store::StoreDocument;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::routes::app;
    use crate::state::AppState;

    const FIXTURE: &str = r##"{
        "families": [
            {
                "id": "smiths",
                "events": [
                    { "id": "piano", "title": "Piano Lesson", "event_date": "2026-01-20",
                      "schedule_data": { "start_time": "16:00", "end_time": "17:00" },
                      "recurrence_data": { "is_recurring": true, "pattern": "weekly" },
                      "participants": [{ "name": "Ada" }] },
                    { "id": "dentist", "title": "Dentist", "event_date": "2026-02-03" },
                    { "id": "broken", "title": "Broken", "event_date": "someday" }
                ]
            },
            { "id": "joneses", "events": [] },
            {
                "id": "parkers",
                "events": [
                    { "id": "bake", "title": "Bake sale", "event_date": "2026-03-07" },
                    { "id": "soccer", "title": "Soccer", "event_date": "2026-03-07",
                      "schedule_data": { "start_time": "09:00", "end_time": "10:00" } },
                    { "id": "swim", "title": "Swim", "event_date": "2026-02-28",
                      "schedule_data": { "start_time": "08:00" },
                      "recurrence_data": { "is_recurring": true, "pattern": "weekly" },
                      "participants": [{ "id": "p1", "name": "Ada" }],
                      "metadata": { "emoji": "🏊", "color": "#0000ff" } },
                    { "id": "trip", "title": "Lake trip", "event_date": "2026-03-06",
                      "schedule_data": { "all_day": true, "duration_days": 3 } }
                ]
            }
        ],
        "profiles": [
            { "id": "mom", "timezone": "America/New_York" }
        ]
    }"##;

    fn test_app() -> axum::Router {
        let document: StoreDocument = serde_json::from_str(FIXTURE).unwrap();
        app(AppState::with_source(Arc::new(document), "UTC"))
    }

    async fn get(uri: &str) -> (StatusCode, axum::http::HeaderMap, String) {
        let response = test_app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn health_check() {
        let (status, _, body) = get("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn occurrences_in_window() {
        let (status, _, body) =
            get("/families/joneses/occurrences?from=2026-01-01&to=2026-01-31").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "[]");
    }

    #[tokio::test]
    async fn occurrences_are_sorted_and_annotated() {
        let (status, _, body) =
            get("/families/parkers/occurrences?from=2026-03-06&to=2026-03-08").await;
        assert_eq!(status, StatusCode::OK);

        let json: Value = serde_json::from_str(&body).unwrap();
        let list = json.as_array().unwrap();
        let keys: Vec<(&str, &str)> = list
            .iter()
            .map(|o| (o["display_date"].as_str().unwrap(), o["id"].as_str().unwrap()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("2026-03-06", "trip"),
                ("2026-03-07", "trip"),
                ("2026-03-07", "swim"),
                ("2026-03-07", "soccer"),
                ("2026-03-07", "bake"),
                ("2026-03-08", "trip"),
            ]
        );

        let trip_day_two = &list[1];
        assert_eq!(trip_day_two["title"], "Lake trip");
        assert_eq!(trip_day_two["event_date"], "2026-03-06");
        assert_eq!(trip_day_two["display_suffix"], " (Day 2 of 3)");
        assert_eq!(trip_day_two["day_index"], 2);
        assert_eq!(trip_day_two["total_days"], 3);
        assert!(trip_day_two.get("is_recurring_instance").is_none());
        assert_eq!(list[5]["display_suffix"], " (Day 3 of 3)");

        let swim = &list[2];
        assert_eq!(swim["is_recurring_instance"], true);
        assert_eq!(swim["event_date"], "2026-02-28");
        assert_eq!(swim["metadata"]["emoji"], "🏊");
        assert_eq!(swim["metadata"]["color"], "#0000ff");
        assert_eq!(swim["participants"][0]["name"], "Ada");
        assert!(swim.get("display_suffix").is_none());

        let soccer = &list[3];
        assert_eq!(soccer["schedule_data"]["start_time"], "09:00");
        assert!(soccer.get("is_recurring_instance").is_none());
        assert!(soccer.get("day_index").is_none());
    }

    #[tokio::test]
    async fn invalid_stored_date_is_unprocessable() {
        let (status, _, body) =
            get("/families/smiths/occurrences?from=2026-01-20&to=2026-02-10").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert!(json["error"].as_str().unwrap().contains("someday"));
    }

    #[tokio::test]
    async fn bad_window_argument_is_unprocessable() {
        let (status, _, _) = get("/families/joneses/occurrences?from=tomorrow").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn unknown_family_is_not_found() {
        let (status, _, body) = get("/families/nobody/occurrences").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert!(json["error"].as_str().unwrap().contains("nobody"));
    }

    #[tokio::test]
    async fn ics_download_headers_and_body() {
        let (status, headers, body) =
            get("/families/smiths/events/piano/ics?profile=mom").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            headers[axum::http::header::CONTENT_TYPE],
            "text/calendar; charset=utf-8"
        );
        assert_eq!(
            headers[axum::http::header::CONTENT_DISPOSITION],
            "attachment; filename=\"piano-lesson.ics\""
        );
        assert!(body.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(body.contains("DTSTART;TZID=America/New_York:20260120T160000\r\n"));
        assert!(body.contains("RRULE:FREQ=WEEKLY\r\n"));
    }

    #[tokio::test]
    async fn explicit_tz_overrides_profile() {
        let (status, _, body) =
            get("/families/smiths/events/piano/ics?profile=mom&tz=Asia/Tokyo").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("TZID:Asia/Tokyo\r\n"));
    }

    #[tokio::test]
    async fn all_day_export_falls_back_to_server_zone() {
        let (status, _, body) = get("/families/smiths/events/dentist/ics").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("DTSTART;VALUE=DATE:20260203\r\n"));
        assert!(!body.contains("BEGIN:VTIMEZONE"));
    }

    #[tokio::test]
    async fn unknown_event_is_not_found() {
        let (status, _, _) = get("/families/smiths/events/nope/ics").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unknown_timezone_is_unprocessable() {
        let (status, _, _) = get("/families/smiths/events/piano/ics?tz=Mars/Olympus").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
