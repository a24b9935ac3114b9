use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::Utc;
use common::UploadedAsset;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{live_update, live_update_file};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::form::FormPayload;
use crate::media::{
    AttachmentKind, discard_uploads, purge_remote_asset, purge_remote_assets, upload_files,
};
use crate::models::live_update::*;
use crate::state::AppState;

const KIND: AttachmentKind = AttachmentKind::LiveUpdateFile;

async fn find_post<C: ConnectionTrait>(db: &C, id: i32) -> Result<live_update::Model, AppError> {
    live_update::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Live update not found".into()))
}

async fn files_of<C: ConnectionTrait>(
    db: &C,
    ids: Vec<i32>,
) -> Result<HashMap<i32, Vec<live_update_file::Model>>, DbErr> {
    let mut grouped: HashMap<i32, Vec<live_update_file::Model>> = HashMap::new();
    if ids.is_empty() {
        return Ok(grouped);
    }
    let files = live_update_file::Entity::find()
        .filter(live_update_file::Column::LiveUpdateId.is_in(ids))
        .order_by_asc(live_update_file::Column::Id)
        .all(db)
        .await?;
    for file in files {
        grouped.entry(file.live_update_id).or_default().push(file);
    }
    Ok(grouped)
}

async fn respond(state: &AppState, model: live_update::Model) -> Result<LiveUpdateResponse, AppError> {
    let files = files_of(&state.db, vec![model.id])
        .await?
        .remove(&model.id)
        .unwrap_or_default();
    Ok(LiveUpdateResponse::from_parts(model, files, state.media.as_ref()))
}

async fn upload_attachments(
    state: &AppState,
    form: &mut FormPayload,
) -> Result<Vec<UploadedAsset>, AppError> {
    upload_files(
        state.media.as_ref(),
        form.take_files(UPLOAD_FIELD),
        &state.config.media.folders.live_update_files,
        KIND,
    )
    .await
}

async fn attach<C: ConnectionTrait>(
    db: &C,
    live_update_id: i32,
    assets: &[UploadedAsset],
) -> Result<(), DbErr> {
    for asset in assets {
        live_update_file::ActiveModel {
            live_update_id: Set(live_update_id),
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
    tag = "Live Updates",
    operation_id = "listLiveUpdates",
    summary = "List live updates",
    description = "Returns every post with its attachments, newest first.",
    responses(
        (status = 200, description = "Live updates", body = Vec<LiveUpdateResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_live_updates(
    State(state): State<AppState>,
) -> Result<Json<Vec<LiveUpdateResponse>>, AppError> {
    let posts = live_update::Entity::find()
        .order_by_desc(live_update::Column::Timestamp)
        .order_by_desc(live_update::Column::Id)
        .all(&state.db)
        .await?;

    let mut files = files_of(&state.db, posts.iter().map(|p| p.id).collect()).await?;
    let store = state.media.as_ref();

    Ok(Json(
        posts
            .into_iter()
            .map(|p| {
                let attached = files.remove(&p.id).unwrap_or_default();
                LiveUpdateResponse::from_parts(p, attached, store)
            })
            .collect(),
    ))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Live Updates",
    operation_id = "createLiveUpdate",
    summary = "Publish a live update",
    description = "Accepts JSON or `multipart/form-data`. Every `uploaded_files` part is uploaded \
        as a raw asset and attached to the post.",
    request_body = LiveUpdateRequest,
    responses(
        (status = 201, description = "Post created", body = LiveUpdateResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 502, description = "Upload rejected (MEDIA_UPLOAD_FAILED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, form), fields(user_id = auth_user.user_id))]
pub async fn create_live_update(
    auth_user: AuthUser,
    State(state): State<AppState>,
    mut form: FormPayload,
) -> Result<(StatusCode, Json<LiveUpdateResponse>), AppError> {
    let request: LiveUpdateRequest = form.parse()?;
    validate_live_update(&request, false)?;

    let uploaded = upload_attachments(&state, &mut form).await?;

    let result: Result<live_update::Model, DbErr> = async {
        let txn = state.db.begin().await?;
        let now = Utc::now();
        let post = live_update::ActiveModel {
            subject: Set(request.subject.unwrap_or_default()),
            description: Set(request.description.unwrap_or_default()),
            timestamp: Set(now),
            last_modified: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        attach(&txn, post.id, &uploaded).await?;
        txn.commit().await?;
        Ok(post)
    }
    .await;

    let post = match result {
        Ok(post) => post,
        Err(e) => {
            discard_uploads(state.media.as_ref(), KIND, &uploaded).await;
            return Err(e.into());
        }
    };

    Ok((StatusCode::CREATED, Json(respond(&state, post).await?)))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Live Updates",
    operation_id = "getLiveUpdate",
    summary = "Get a live update",
    params(("id" = i32, Path, description = "Live update ID")),
    responses(
        (status = 200, description = "Live update", body = LiveUpdateResponse),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_live_update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<LiveUpdateResponse>, AppError> {
    let post = find_post(&state.db, id).await?;
    Ok(Json(respond(&state, post).await?))
}

/// Apply text changes and append any new attachments. Existing
/// attachments are never removed here.
async fn apply_update(
    state: &AppState,
    id: i32,
    mut form: FormPayload,
    partial: bool,
) -> Result<live_update::Model, AppError> {
    let request: LiveUpdateRequest = form.parse()?;
    validate_live_update(&request, partial)?;
    let existing = find_post(&state.db, id).await?;

    let uploaded = upload_attachments(state, &mut form).await?;

    let result: Result<live_update::Model, DbErr> = async {
        let txn = state.db.begin().await?;
        let mut active: live_update::ActiveModel = existing.into();
        if let Some(subject) = request.subject {
            active.subject = Set(subject);
        }
        if let Some(description) = request.description {
            active.description = Set(description);
        }
        active.last_modified = Set(Utc::now());
        let post = active.update(&txn).await?;
        attach(&txn, post.id, &uploaded).await?;
        txn.commit().await?;
        Ok(post)
    }
    .await;

    match result {
        Ok(post) => Ok(post),
        Err(e) => {
            discard_uploads(state.media.as_ref(), KIND, &uploaded).await;
            Err(e.into())
        }
    }
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Live Updates",
    operation_id = "replaceLiveUpdate",
    summary = "Update a live update",
    description = "Full update: `subject` and `description` are required. New `uploaded_files` \
        parts are appended to the existing attachments.",
    params(("id" = i32, Path, description = "Live update ID")),
    request_body = LiveUpdateRequest,
    responses(
        (status = 200, description = "Post updated", body = LiveUpdateResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, form), fields(user_id = auth_user.user_id))]
pub async fn replace_live_update(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    form: FormPayload,
) -> Result<Json<LiveUpdateResponse>, AppError> {
    let post = apply_update(&state, id, form, false).await?;
    Ok(Json(respond(&state, post).await?))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Live Updates",
    operation_id = "updateLiveUpdate",
    summary = "Partially update a live update",
    description = "Only provided fields are modified. New `uploaded_files` parts are appended.",
    params(("id" = i32, Path, description = "Live update ID")),
    request_body = LiveUpdateRequest,
    responses(
        (status = 200, description = "Post updated", body = LiveUpdateResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, form), fields(user_id = auth_user.user_id))]
pub async fn update_live_update(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    form: FormPayload,
) -> Result<Json<LiveUpdateResponse>, AppError> {
    let post = apply_update(&state, id, form, true).await?;
    Ok(Json(respond(&state, post).await?))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Live Updates",
    operation_id = "deleteLiveUpdate",
    summary = "Delete a live update",
    description = "Deletes the post and its attachments, then deletes each attachment from the \
        media store.",
    params(("id" = i32, Path, description = "Live update ID")),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn delete_live_update(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let post = find_post(&state.db, id).await?;

    let txn = state.db.begin().await?;
    let files = live_update_file::Entity::find()
        .filter(live_update_file::Column::LiveUpdateId.eq(post.id))
        .all(&txn)
        .await?;
    live_update_file::Entity::delete_many()
        .filter(live_update_file::Column::LiveUpdateId.eq(post.id))
        .exec(&txn)
        .await?;
    live_update::Entity::delete_by_id(post.id).exec(&txn).await?;
    txn.commit().await?;

    let references: Vec<&str> = files.iter().map(|f| f.file.as_str()).collect();
    purge_remote_assets(state.media.as_ref(), KIND, references).await;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/{id}/files/{file_id}",
    tag = "Live Updates",
    operation_id = "deleteLiveUpdateFile",
    summary = "Remove one attachment",
    params(
        ("id" = i32, Path, description = "Live update ID"),
        ("file_id" = i32, Path, description = "Attachment ID"),
    ),
    responses(
        (status = 204, description = "Attachment deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn delete_live_update_file(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((id, file_id)): Path<(i32, i32)>,
) -> Result<StatusCode, AppError> {
    let file = live_update_file::Entity::find_by_id(file_id)
        .filter(live_update_file::Column::LiveUpdateId.eq(id))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Attachment not found".into()))?;

    live_update_file::Entity::delete_by_id(file.id)
        .exec(&state.db)
        .await?;

    purge_remote_asset(state.media.as_ref(), KIND, &file.file).await;

    Ok(StatusCode::NO_CONTENT)
}
