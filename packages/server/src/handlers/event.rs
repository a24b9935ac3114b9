use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::Utc;
use common::UploadedAsset;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{event, event_file};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::form::FormPayload;
use crate::media::{
    AttachmentKind, discard_uploads, purge_remote_asset, purge_remote_assets, upload_files,
};
use crate::models::event::*;
use crate::state::AppState;

async fn find_event<C: ConnectionTrait>(db: &C, id: i32) -> Result<event::Model, AppError> {
    event::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".into()))
}

async fn photos_by_event<C: ConnectionTrait>(
    db: &C,
    event_ids: Vec<i32>,
) -> Result<HashMap<i32, Vec<event_file::Model>>, DbErr> {
    let mut grouped: HashMap<i32, Vec<event_file::Model>> = HashMap::new();
    if event_ids.is_empty() {
        return Ok(grouped);
    }
    for photo in event_file::Entity::find()
        .filter(event_file::Column::EventId.is_in(event_ids))
        .order_by_asc(event_file::Column::Id)
        .all(db)
        .await?
    {
        grouped.entry(photo.event_id).or_default().push(photo);
    }
    Ok(grouped)
}

async fn to_response(state: &AppState, model: event::Model) -> Result<EventResponse, AppError> {
    let photos = photos_by_event(&state.db, vec![model.id])
        .await?
        .remove(&model.id)
        .unwrap_or_default();
    Ok(EventResponse::from_parts(model, photos, state.media.as_ref()))
}

async fn upload_photos(
    state: &AppState,
    form: &mut FormPayload,
) -> Result<Vec<UploadedAsset>, AppError> {
    upload_files(
        state.media.as_ref(),
        form.take_files(UPLOAD_FIELD),
        &state.config.media.folders.event_photos,
        AttachmentKind::EventFile,
    )
    .await
}

async fn insert_photos<C: ConnectionTrait>(
    db: &C,
    event_id: i32,
    assets: &[UploadedAsset],
) -> Result<(), DbErr> {
    for asset in assets {
        event_file::ActiveModel {
            event_id: Set(event_id),
            file: Set(asset.secure_url.clone()),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Events",
    operation_id = "listEvents",
    summary = "List events",
    description = "Returns every event with its photos, newest first.",
    responses(
        (status = 200, description = "Events", body = Vec<EventResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_events(
    State(state): State<AppState>,
) -> Result<Json<Vec<EventResponse>>, AppError> {
    let events = event::Entity::find()
        .order_by_desc(event::Column::Timestamp)
        .order_by_desc(event::Column::Id)
        .all(&state.db)
        .await?;

    let mut photos = photos_by_event(&state.db, events.iter().map(|e| e.id).collect()).await?;
    let store = state.media.as_ref();

    let data = events
        .into_iter()
        .map(|e| {
            let own = photos.remove(&e.id).unwrap_or_default();
            EventResponse::from_parts(e, own, store)
        })
        .collect();
    Ok(Json(data))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Events",
    operation_id = "createEvent",
    summary = "Create an event",
    description = "Accepts JSON or `multipart/form-data`. Every `uploaded_images` part is uploaded \
        and attached as an event photo.",
    request_body = EventRequest,
    responses(
        (status = 201, description = "Event created", body = EventResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 502, description = "Upload rejected (MEDIA_UPLOAD_FAILED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, form), fields(user_id = auth_user.user_id))]
pub async fn create_event(
    auth_user: AuthUser,
    State(state): State<AppState>,
    mut form: FormPayload,
) -> Result<(StatusCode, Json<EventResponse>), AppError> {
    let request: EventRequest = form.parse()?;
    validate_event(&request, false)?;

    let uploaded = upload_photos(&state, &mut form).await?;

    let saved: Result<event::Model, DbErr> = async {
        let txn = state.db.begin().await?;
        let model = event::ActiveModel {
            title: Set(request.title.unwrap_or_default()),
            highlights: Set(request.highlights.unwrap_or_default()),
            description: Set(request.description.unwrap_or_default()),
            location: Set(request.location.unwrap_or_default()),
            timestamp: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        insert_photos(&txn, model.id, &uploaded).await?;
        txn.commit().await?;
        Ok(model)
    }
    .await;

    match saved {
        Ok(model) => Ok((StatusCode::CREATED, Json(to_response(&state, model).await?))),
        Err(e) => {
            discard_uploads(state.media.as_ref(), AttachmentKind::EventFile, &uploaded).await;
            Err(e.into())
        }
    }
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Events",
    operation_id = "getEvent",
    summary = "Get an event",
    params(("id" = i32, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event", body = EventResponse),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<EventResponse>, AppError> {
    let model = find_event(&state.db, id).await?;
    Ok(Json(to_response(&state, model).await?))
}

async fn apply_update(
    state: &AppState,
    id: i32,
    mut form: FormPayload,
    partial: bool,
) -> Result<event::Model, AppError> {
    let request: EventRequest = form.parse()?;
    validate_event(&request, partial)?;
    let existing = find_event(&state.db, id).await?;

    let uploaded = upload_photos(state, &mut form).await?;

    let saved: Result<event::Model, DbErr> = async {
        let txn = state.db.begin().await?;
        let unchanged = existing.clone();
        let mut active: event::ActiveModel = existing.into();
        if let Some(title) = request.title {
            active.title = Set(title);
        }
        if let Some(highlights) = request.highlights {
            active.highlights = Set(highlights);
        }
        if let Some(description) = request.description {
            active.description = Set(description);
        }
        if let Some(location) = request.location {
            active.location = Set(location);
        }
        // A request carrying only new photos leaves the row itself untouched.
        let model = if active.is_changed() {
            active.update(&txn).await?
        } else {
            unchanged
        };
        insert_photos(&txn, model.id, &uploaded).await?;
        txn.commit().await?;
        Ok(model)
    }
    .await;

    match saved {
        Ok(model) => Ok(model),
        Err(e) => {
            discard_uploads(state.media.as_ref(), AttachmentKind::EventFile, &uploaded).await;
            Err(e.into())
        }
    }
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Events",
    operation_id = "replaceEvent",
    summary = "Update an event",
    description = "Full update: `title`, `highlights`, `description` and `location` are required. \
        New `uploaded_images` parts are added to the existing photos.",
    params(("id" = i32, Path, description = "Event ID")),
    request_body = EventRequest,
    responses(
        (status = 200, description = "Event updated", body = EventResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, form), fields(user_id = auth_user.user_id))]
pub async fn replace_event(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    form: FormPayload,
) -> Result<Json<EventResponse>, AppError> {
    let model = apply_update(&state, id, form, false).await?;
    Ok(Json(to_response(&state, model).await?))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Events",
    operation_id = "updateEvent",
    summary = "Partially update an event",
    description = "Only provided fields are modified. Photos are only ever added here; remove \
        one through the photo endpoint.",
    params(("id" = i32, Path, description = "Event ID")),
    request_body = EventRequest,
    responses(
        (status = 200, description = "Event updated", body = EventResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, form), fields(user_id = auth_user.user_id))]
pub async fn update_event(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    form: FormPayload,
) -> Result<Json<EventResponse>, AppError> {
    let model = apply_update(&state, id, form, true).await?;
    Ok(Json(to_response(&state, model).await?))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Events",
    operation_id = "deleteEvent",
    summary = "Delete an event",
    description = "Deletes the event and its photos. Each photo is then removed from the media \
        store; remote failures are logged only.",
    params(("id" = i32, Path, description = "Event ID")),
    responses(
        (status = 204, description = "Event deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn delete_event(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let model = find_event(&state.db, id).await?;

    let txn = state.db.begin().await?;
    let photos = event_file::Entity::find()
        .filter(event_file::Column::EventId.eq(model.id))
        .all(&txn)
        .await?;
    event_file::Entity::delete_many()
        .filter(event_file::Column::EventId.eq(model.id))
        .exec(&txn)
        .await?;
    event::Entity::delete_by_id(model.id).exec(&txn).await?;
    txn.commit().await?;

    purge_remote_assets(
        state.media.as_ref(),
        AttachmentKind::EventFile,
        photos.into_iter().map(|p| p.file),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/{id}/files/{file_id}",
    tag = "Events",
    operation_id = "deleteEventPhoto",
    summary = "Remove one event photo",
    params(
        ("id" = i32, Path, description = "Event ID"),
        ("file_id" = i32, Path, description = "Photo ID"),
    ),
    responses(
        (status = 204, description = "Photo deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn delete_event_photo(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((id, file_id)): Path<(i32, i32)>,
) -> Result<StatusCode, AppError> {
    let photo = event_file::Entity::find_by_id(file_id)
        .filter(event_file::Column::EventId.eq(id))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Photo not found".into()))?;

    event_file::Entity::delete_by_id(photo.id).exec(&state.db).await?;

    purge_remote_asset(state.media.as_ref(), AttachmentKind::EventFile, &photo.file).await;

    Ok(StatusCode::NO_CONTENT)
}
