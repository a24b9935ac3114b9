use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use sea_orm::*;
use tracing::instrument;

use crate::entity::site_info;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::form::FormPayload;
use crate::media::{AttachmentKind, discard_uploads, upload_files};
use crate::models::site_info::*;
use crate::state::AppState;

async fn find_site_info<C: ConnectionTrait>(db: &C, id: i32) -> Result<site_info::Model, AppError> {
    site_info::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Site info not found".into()))
}

/// The row the public site renders: the one with the lowest ID.
async fn first_site_info<C: ConnectionTrait>(db: &C) -> Result<site_info::Model, AppError> {
    site_info::Entity::find()
        .order_by_asc(site_info::Column::Id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Site info has not been set up yet".into()))
}

/// Validate the body and upload a background file part if one was sent.
async fn read_changes(
    state: &AppState,
    mut form: FormPayload,
    partial: bool,
) -> Result<(SiteInfoChanges, Vec<common::UploadedAsset>), AppError> {
    let background = form.take_file(IMAGE_FIELD);
    let request: SiteInfoRequest = form.parse()?;
    let mut changes = request.into_changes(partial, background.is_some())?;

    let uploaded = match background {
        Some(file) => {
            upload_files(
                state.media.as_ref(),
                vec![file],
                &state.config.media.folders.site_info,
                AttachmentKind::SiteBackground,
            )
            .await?
        }
        None => Vec::new(),
    };
    if let Some(asset) = uploaded.first() {
        changes.main_bg_image = Some(asset.secure_url.clone());
    }

    Ok((changes, uploaded))
}

fn apply_changes(active: &mut site_info::ActiveModel, changes: SiteInfoChanges) {
    if let Some(v) = changes.main_bg_image {
        active.main_bg_image = Set(v);
    }
    if let Some(v) = changes.membership_plan {
        active.membership_plan = Set(v);
    }
    if let Some(v) = changes.phone1 {
        active.phone1 = Set(v);
    }
    if let Some(v) = changes.phone2 {
        active.phone2 = Set(v);
    }
    if let Some(v) = changes.email {
        active.email = Set(v);
    }
    if let Some(v) = changes.gym_address {
        active.gym_address = Set(v);
    }
    if let Some(v) = changes.instagram {
        active.instagram = Set(v);
    }
    if let Some(v) = changes.facebook {
        active.facebook = Set(v);
    }
    if let Some(v) = changes.twitter {
        active.twitter = Set(v);
    }
    if let Some(v) = changes.youtube {
        active.youtube = Set(v);
    }
    if let Some(v) = changes.footer_description {
        active.footer_description = Set(v);
    }
}

async fn save_update(
    state: &AppState,
    existing: site_info::Model,
    form: FormPayload,
    partial: bool,
) -> Result<site_info::Model, AppError> {
    let (changes, uploaded) = read_changes(state, form, partial).await?;

    let unchanged = existing.clone();
    let mut active: site_info::ActiveModel = existing.into();
    apply_changes(&mut active, changes);
    if !active.is_changed() {
        return Ok(unchanged);
    }

    match active.update(&state.db).await {
        Ok(model) => Ok(model),
        Err(e) => {
            discard_uploads(state.media.as_ref(), AttachmentKind::SiteBackground, &uploaded).await;
            Err(e.into())
        }
    }
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Site Info",
    operation_id = "listSiteInfo",
    summary = "List site settings rows",
    description = "Normally a single row. The public site uses the one with the lowest ID.",
    responses(
        (status = 200, description = "Site settings", body = Vec<SiteInfoResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_site_info(
    State(state): State<AppState>,
) -> Result<Json<Vec<SiteInfoResponse>>, AppError> {
    let rows = site_info::Entity::find()
        .order_by_asc(site_info::Column::Id)
        .all(&state.db)
        .await?;

    let store = state.media.as_ref();
    Ok(Json(
        rows.into_iter()
            .map(|m| SiteInfoResponse::from_model(m, store))
            .collect(),
    ))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Site Info",
    operation_id = "createSiteInfo",
    summary = "Create the site settings",
    description = "Accepts JSON or `multipart/form-data`. The background may be given as a \
        `main_bg_image` URL or uploaded as a `main_bg_image` file part. Numeric and JSON fields \
        may be sent as strings.",
    request_body = SiteInfoRequest,
    responses(
        (status = 201, description = "Site settings created", body = SiteInfoResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 502, description = "Upload rejected (MEDIA_UPLOAD_FAILED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, form), fields(user_id = auth_user.user_id))]
pub async fn create_site_info(
    auth_user: AuthUser,
    State(state): State<AppState>,
    form: FormPayload,
) -> Result<(StatusCode, Json<SiteInfoResponse>), AppError> {
    let (changes, uploaded) = read_changes(&state, form, false).await?;

    let inserted = site_info::ActiveModel {
        main_bg_image: Set(changes.main_bg_image.unwrap_or_default()),
        membership_plan: Set(changes.membership_plan.unwrap_or_default()),
        phone1: Set(changes.phone1.unwrap_or_default()),
        phone2: Set(changes.phone2.flatten()),
        email: Set(changes.email.unwrap_or_else(|| DEFAULT_EMAIL.to_string())),
        gym_address: Set(changes.gym_address.unwrap_or_default()),
        instagram: Set(changes.instagram.flatten()),
        facebook: Set(changes.facebook.flatten()),
        twitter: Set(changes.twitter.flatten()),
        youtube: Set(changes.youtube.flatten()),
        footer_description: Set(changes.footer_description.flatten()),
        ..Default::default()
    }
    .insert(&state.db)
    .await;

    match inserted {
        Ok(model) => Ok((
            StatusCode::CREATED,
            Json(SiteInfoResponse::from_model(model, state.media.as_ref())),
        )),
        Err(e) => {
            discard_uploads(state.media.as_ref(), AttachmentKind::SiteBackground, &uploaded).await;
            Err(e.into())
        }
    }
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Site Info",
    operation_id = "getSiteInfo",
    summary = "Get a site settings row",
    params(("id" = i32, Path, description = "Site info ID")),
    responses(
        (status = 200, description = "Site settings", body = SiteInfoResponse),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_site_info(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<SiteInfoResponse>, AppError> {
    let model = find_site_info(&state.db, id).await?;
    Ok(Json(SiteInfoResponse::from_model(model, state.media.as_ref())))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Site Info",
    operation_id = "replaceSiteInfo",
    summary = "Replace a site settings row",
    description = "Full update: every required field must be present.",
    params(("id" = i32, Path, description = "Site info ID")),
    request_body = SiteInfoRequest,
    responses(
        (status = 200, description = "Site settings updated", body = SiteInfoResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, form), fields(user_id = auth_user.user_id))]
pub async fn replace_site_info(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    form: FormPayload,
) -> Result<Json<SiteInfoResponse>, AppError> {
    let existing = find_site_info(&state.db, id).await?;
    let model = save_update(&state, existing, form, false).await?;
    Ok(Json(SiteInfoResponse::from_model(model, state.media.as_ref())))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Site Info",
    operation_id = "updateSiteInfo",
    summary = "Partially update a site settings row",
    params(("id" = i32, Path, description = "Site info ID")),
    request_body = SiteInfoRequest,
    responses(
        (status = 200, description = "Site settings updated", body = SiteInfoResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, form), fields(user_id = auth_user.user_id))]
pub async fn update_site_info(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    form: FormPayload,
) -> Result<Json<SiteInfoResponse>, AppError> {
    let existing = find_site_info(&state.db, id).await?;
    let model = save_update(&state, existing, form, true).await?;
    Ok(Json(SiteInfoResponse::from_model(model, state.media.as_ref())))
}

#[utoipa::path(
    get,
    path = "/edit",
    tag = "Site Info",
    operation_id = "getEditableSiteInfo",
    summary = "Get the live site settings for editing",
    responses(
        (status = 200, description = "Site settings", body = SiteInfoResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "No settings row exists (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn get_edit(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<SiteInfoResponse>, AppError> {
    let model = first_site_info(&state.db).await?;
    Ok(Json(SiteInfoResponse::from_model(model, state.media.as_ref())))
}

#[utoipa::path(
    put,
    path = "/edit",
    tag = "Site Info",
    operation_id = "editSiteInfo",
    summary = "Edit the live site settings",
    description = "Partially updates the row with the lowest ID. Only provided fields change.",
    request_body = SiteInfoRequest,
    responses(
        (status = 200, description = "Site settings updated", body = SiteInfoResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "No settings row exists (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, form), fields(user_id = auth_user.user_id))]
pub async fn put_edit(
    auth_user: AuthUser,
    State(state): State<AppState>,
    form: FormPayload,
) -> Result<Json<SiteInfoResponse>, AppError> {
    let existing = first_site_info(&state.db).await?;
    let model = save_update(&state, existing, form, true).await?;
    Ok(Json(SiteInfoResponse::from_model(model, state.media.as_ref())))
}
