use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use sea_orm::*;
use tracing::instrument;

use crate::entity::gym_gallery;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::form::FormPayload;
use crate::media::{AttachmentKind, discard_uploads, purge_remote_asset, upload_files};
use crate::models::gallery::*;
use crate::state::AppState;

/// Multipart field that may carry the image itself.
const IMAGE_FIELD: &str = "image";

async fn find_entry<C: ConnectionTrait>(db: &C, id: i32) -> Result<gym_gallery::Model, AppError> {
    gym_gallery::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Gallery entry not found".into()))
}

/// Parse the request and, when an image file part is present, upload it and
/// substitute its delivery URL for the `image` field.
async fn read_request(
    state: &AppState,
    mut form: FormPayload,
) -> Result<(GalleryRequest, Vec<common::UploadedAsset>), AppError> {
    let mut request: GalleryRequest = form.parse()?;
    validate_gallery(&request)?;

    let uploaded = match form.take_file(IMAGE_FIELD) {
        Some(file) => {
            upload_files(
                state.media.as_ref(),
                vec![file],
                &state.config.media.folders.gallery,
                AttachmentKind::GalleryImage,
            )
            .await?
        }
        None => Vec::new(),
    };
    if let Some(asset) = uploaded.first() {
        request.image = Some(Some(asset.secure_url.clone()));
    }

    Ok((request, uploaded))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Gallery",
    operation_id = "listGallery",
    summary = "List gallery entries",
    description = "Returns every gallery entry, highest ID first.",
    responses(
        (status = 200, description = "Gallery entries", body = Vec<GalleryResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_gallery(
    State(state): State<AppState>,
) -> Result<Json<Vec<GalleryResponse>>, AppError> {
    let rows = gym_gallery::Entity::find()
        .order_by_desc(gym_gallery::Column::Id)
        .all(&state.db)
        .await?;

    let store = state.media.as_ref();
    Ok(Json(
        rows.into_iter()
            .map(|m| GalleryResponse::from_model(m, store))
            .collect(),
    ))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Gallery",
    operation_id = "createGalleryEntry",
    summary = "Create a gallery entry",
    description = "Accepts JSON with an `image` URL from a direct upload, or `multipart/form-data` \
        with an `image` file part which is uploaded to the gallery folder first.",
    request_body = GalleryRequest,
    responses(
        (status = 201, description = "Entry created", body = GalleryResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 502, description = "Upload rejected (MEDIA_UPLOAD_FAILED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, form), fields(user_id = auth_user.user_id))]
pub async fn create_entry(
    auth_user: AuthUser,
    State(state): State<AppState>,
    form: FormPayload,
) -> Result<(StatusCode, Json<GalleryResponse>), AppError> {
    let (request, uploaded) = read_request(&state, form).await?;

    let inserted = gym_gallery::ActiveModel {
        image: Set(request.image.flatten()),
        title: Set(request.title.flatten()),
        description: Set(request.description.flatten()),
        ..Default::default()
    }
    .insert(&state.db)
    .await;

    let model = match inserted {
        Ok(model) => model,
        Err(e) => {
            discard_uploads(state.media.as_ref(), AttachmentKind::GalleryImage, &uploaded).await;
            return Err(e.into());
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(GalleryResponse::from_model(model, state.media.as_ref())),
    ))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Gallery",
    operation_id = "getGalleryEntry",
    summary = "Get a gallery entry",
    params(("id" = i32, Path, description = "Gallery entry ID")),
    responses(
        (status = 200, description = "Gallery entry", body = GalleryResponse),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_entry(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<GalleryResponse>, AppError> {
    let model = find_entry(&state.db, id).await?;
    Ok(Json(GalleryResponse::from_model(model, state.media.as_ref())))
}

async fn apply_update(
    state: &AppState,
    id: i32,
    form: FormPayload,
) -> Result<gym_gallery::Model, AppError> {
    let existing = find_entry(&state.db, id).await?;
    let (request, uploaded) = read_request(state, form).await?;

    let mut active: gym_gallery::ActiveModel = existing.into();
    if let Some(image) = request.image {
        active.image = Set(image);
    }
    if let Some(title) = request.title {
        active.title = Set(title);
    }
    if let Some(description) = request.description {
        active.description = Set(description);
    }

    match active.update(&state.db).await {
        Ok(model) => Ok(model),
        Err(e) => {
            discard_uploads(state.media.as_ref(), AttachmentKind::GalleryImage, &uploaded).await;
            Err(e.into())
        }
    }
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Gallery",
    operation_id = "replaceGalleryEntry",
    summary = "Update a gallery entry",
    description = "Every field is optional, so a full update behaves like a partial one. \
        Replacing the image does not delete the previous asset.",
    params(("id" = i32, Path, description = "Gallery entry ID")),
    request_body = GalleryRequest,
    responses(
        (status = 200, description = "Entry updated", body = GalleryResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, form), fields(user_id = auth_user.user_id))]
pub async fn replace_entry(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    form: FormPayload,
) -> Result<Json<GalleryResponse>, AppError> {
    let model = apply_update(&state, id, form).await?;
    Ok(Json(GalleryResponse::from_model(model, state.media.as_ref())))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Gallery",
    operation_id = "updateGalleryEntry",
    summary = "Partially update a gallery entry",
    params(("id" = i32, Path, description = "Gallery entry ID")),
    request_body = GalleryRequest,
    responses(
        (status = 200, description = "Entry updated", body = GalleryResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, form), fields(user_id = auth_user.user_id))]
pub async fn update_entry(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    form: FormPayload,
) -> Result<Json<GalleryResponse>, AppError> {
    let model = apply_update(&state, id, form).await?;
    Ok(Json(GalleryResponse::from_model(model, state.media.as_ref())))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Gallery",
    operation_id = "deleteGalleryEntry",
    summary = "Delete a gallery entry",
    description = "Deletes the row, then asks the media store to delete the referenced image. \
        A failed remote delete is logged and does not fail the request.",
    params(("id" = i32, Path, description = "Gallery entry ID")),
    responses(
        (status = 204, description = "Entry deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn delete_entry(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let existing = find_entry(&state.db, id).await?;
    let image = existing.image.clone();

    gym_gallery::Entity::delete_by_id(existing.id)
        .exec(&state.db)
        .await?;

    if let Some(image) = image {
        purge_remote_asset(state.media.as_ref(), AttachmentKind::GalleryImage, &image).await;
    }

    Ok(StatusCode::NO_CONTENT)
}
