use crate::errors::{AppError, StoreError};
use crate::models::{
    is_challenge_day, toggle_prepared, ChecklistMap, ChecklistView, DayToggleResponse, Goal,
    Mutation, NavigateResponse, PersonalGoalRequest, PhotoEntry, PhotoUploadRequest, Supplement,
    ToggleFieldRequest, ToggleItemRequest, CHALLENGE_DAYS,
};
use crate::photos::{self, Direction};
use crate::schema::RecordName;
use crate::state::AppState;
use crate::stats::{
    checkin_overview, color_bucket, completion_percent, day_just_completed, CheckinOverview,
    ProgressSummary,
};
use crate::store::{reset_checklist as reset_items, toggle_checklist_item, ProgressStore};
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    Json,
};
use chrono::Local;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

pub async fn get_record(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Value>, AppError> {
    let name = parse_record(&name)?;
    let mut store = state.store.lock().await;
    Ok(Json(store.read_record(name)))
}

pub async fn put_record(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(value): Json<Value>,
) -> Result<Json<Mutation<Value>>, AppError> {
    let name = parse_record(&name)?;
    let mut store = state.store.lock().await;
    let notice = settle(store.write_record(name, value))?;
    Ok(Json(Mutation::new(store.read_record(name), notice)))
}

pub async fn delete_record(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, AppError> {
    let name = parse_record(&name)?;
    let mut store = state.store.lock().await;
    store.remove_record(name)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn toggle_checklist(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(payload): Json<ToggleItemRequest>,
) -> Result<Json<Mutation<ChecklistView>>, AppError> {
    let name = parse_checklist(&name)?;
    let item = payload.item.trim();
    if item.is_empty() {
        return Err(AppError::bad_request("item must not be empty"));
    }

    let mut store = state.store.lock().await;
    let current: ChecklistMap = store.read_as(name)?;
    let updated = toggle_checklist_item(current, item);
    save_checklist(&mut store, name, updated)
}

pub async fn reset_checklist(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Mutation<ChecklistView>>, AppError> {
    let name = parse_checklist(&name)?;
    let mut store = state.store.lock().await;
    let current: ChecklistMap = store.read_as(name)?;
    save_checklist(&mut store, name, reset_items(current))
}

fn save_checklist(
    store: &mut ProgressStore,
    name: RecordName,
    items: ChecklistMap,
) -> Result<Json<Mutation<ChecklistView>>, AppError> {
    let notice = settle(store.write_as(name, &items))?;
    let percent = completion_percent(&items);
    Ok(Json(Mutation::new(
        ChecklistView {
            items,
            percent,
            bucket: color_bucket(percent),
        },
        notice,
    )))
}

pub async fn get_checkin(State(state): State<AppState>) -> Json<CheckinOverview> {
    let mut store = state.store.lock().await;
    Json(checkin_overview(&store.checkins(), CHALLENGE_DAYS))
}

pub async fn toggle_checkin(
    State(state): State<AppState>,
    Path(day): Path<u32>,
    Json(payload): Json<ToggleFieldRequest>,
) -> Result<Json<Mutation<DayToggleResponse>>, AppError> {
    if !is_challenge_day(day) {
        return Err(StoreError::DayOutOfRange(day).into());
    }
    let day = day as u8;

    let mut store = state.store.lock().await;
    let checkins = store.checkins();
    let before = checkins.day(day);
    let after = before.toggled(payload.field);
    let updated = checkins.with_day(day, after)?;
    let notice = settle(store.write_as(RecordName::DailyCheckin, &updated))?;

    let completed_now = day_just_completed(&before, &after);
    if completed_now {
        info!("day {day} completed");
    }
    let percent = completion_percent(&after);
    Ok(Json(Mutation::new(
        DayToggleResponse {
            day,
            checklist: after,
            percent,
            bucket: color_bucket(percent),
            completed_now,
        },
        notice,
    )))
}

pub async fn toggle_supplement(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Mutation<Vec<Supplement>>>, AppError> {
    let today = Local::now().date_naive();
    let mut store = state.store.lock().await;
    let log: Vec<Supplement> = store.read_as(RecordName::Supplements)?;
    let updated = toggle_prepared(log, &id, today);
    let notice = settle(store.write_as(RecordName::Supplements, &updated))?;
    Ok(Json(Mutation::new(updated, notice)))
}

pub async fn put_personal_goal(
    State(state): State<AppState>,
    Json(payload): Json<PersonalGoalRequest>,
) -> Result<Json<Mutation<Goal>>, AppError> {
    let mut store = state.store.lock().await;
    let goal: Goal = store.read_as(RecordName::Goals)?;
    let updated = goal.with_personal_goal(payload.personal_goal);
    let notice = settle(store.write_as(RecordName::Goals, &updated))?;
    Ok(Json(Mutation::new(updated, notice)))
}

pub async fn list_photos(State(state): State<AppState>) -> Result<Json<Vec<PhotoEntry>>, AppError> {
    let mut store = state.store.lock().await;
    Ok(Json(store.read_as(RecordName::Photos)?))
}

/// Accepts either `{"image": "<text>"}` or the raw bytes of an `image/*` body.
pub async fn upload_photo(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Mutation<PhotoEntry>>, AppError> {
    let image = image_from_body(&headers, &body)?;

    let mut store = state.store.lock().await;
    let existing: Vec<PhotoEntry> = store.read_as(RecordName::Photos)?;
    let (updated, entry) = photos::add_photo(&existing, image);
    let notice = settle(store.write_as(RecordName::Photos, &updated))?;
    info!("stored photo {} for day {}", entry.id, entry.day);
    Ok(Json(Mutation::new(entry, notice)))
}

fn image_from_body(headers: &HeaderMap, body: &[u8]) -> Result<String, AppError> {
    if body.is_empty() {
        return Err(AppError::bad_request("photo body is empty"));
    }
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    let mime = content_type.split(';').next().unwrap_or_default().trim();

    if mime == "application/json" {
        let request: PhotoUploadRequest = serde_json::from_slice(body)
            .map_err(|err| AppError::bad_request(format!("invalid photo payload: {err}")))?;
        if request.image.is_empty() {
            return Err(AppError::bad_request("image must not be empty"));
        }
        return Ok(request.image);
    }
    if mime.starts_with("image/") {
        return Ok(photos::encode_image(body, mime));
    }
    Err(AppError::bad_request(
        "photo must be sent as application/json or image/*",
    ))
}

pub async fn delete_photo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Mutation<Vec<PhotoEntry>>>, AppError> {
    let mut store = state.store.lock().await;
    let existing: Vec<PhotoEntry> = store.read_as(RecordName::Photos)?;
    let updated = photos::delete_photo(&existing, &id);
    let notice = settle(store.write_as(RecordName::Photos, &updated))?;
    Ok(Json(Mutation::new(updated, notice)))
}

#[derive(Debug, Deserialize)]
pub struct NavigateQuery {
    pub index: usize,
    pub direction: Direction,
}

pub async fn navigate_photos(
    State(state): State<AppState>,
    Query(query): Query<NavigateQuery>,
) -> Result<Json<NavigateResponse>, AppError> {
    let mut store = state.store.lock().await;
    let existing: Vec<PhotoEntry> = store.read_as(RecordName::Photos)?;
    let index = photos::navigate(&existing, query.index, query.direction);
    Ok(Json(NavigateResponse {
        index,
        photo: existing.get(index).cloned(),
    }))
}

pub async fn get_progress(State(state): State<AppState>) -> Result<Json<ProgressSummary>, AppError> {
    let mut store = state.store.lock().await;
    Ok(Json(store.read_as(RecordName::ComputedProgress)?))
}

fn parse_record(name: &str) -> Result<RecordName, AppError> {
    Ok(name.parse::<RecordName>()?)
}

fn parse_checklist(name: &str) -> Result<RecordName, AppError> {
    let name = parse_record(name)?;
    if !name.is_checklist() {
        return Err(AppError::bad_request(format!("{name} is not a checklist")));
    }
    Ok(name)
}

/// A rejected write is reported as a notice, never as a failed request.
fn settle(result: Result<(), StoreError>) -> Result<Option<String>, AppError> {
    match result {
        Ok(()) => Ok(None),
        Err(StoreError::Persistence(err)) => Ok(Some(format!("progress not saved: {err}"))),
        Err(err) => Err(err.into()),
    }
}
