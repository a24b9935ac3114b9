use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use sea_orm::*;
use tracing::instrument;

use crate::entity::testimonial;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::testimonial::*;
use crate::state::AppState;

async fn find_testimonial<C: ConnectionTrait>(db: &C, id: i32) -> Result<testimonial::Model, AppError> {
    testimonial::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Testimonial not found".into()))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Testimonials",
    operation_id = "listTestimonials",
    summary = "List testimonials",
    description = "Returns all testimonials, newest first.",
    responses(
        (status = 200, description = "Testimonials", body = Vec<TestimonialResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_testimonials(
    State(state): State<AppState>,
) -> Result<Json<Vec<TestimonialResponse>>, AppError> {
    let rows = testimonial::Entity::find()
        .order_by_desc(testimonial::Column::Created)
        .order_by_desc(testimonial::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Testimonials",
    operation_id = "createTestimonial",
    summary = "Create a testimonial",
    description = "Requires a staff account. `rating` defaults to 5.",
    request_body = TestimonialRequest,
    responses(
        (status = 201, description = "Testimonial created", body = TestimonialResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn create_testimonial(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<TestimonialRequest>,
) -> Result<(StatusCode, Json<TestimonialResponse>), AppError> {
    auth_user.require_staff()?;
    validate_testimonial(&payload, false)?;

    let model = testimonial::ActiveModel {
        name: Set(payload.name.unwrap_or_default().trim().to_string()),
        text: Set(payload.text.unwrap_or_default()),
        rating: Set(payload.rating.unwrap_or(DEFAULT_RATING)),
        created: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(model.into())))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Testimonials",
    operation_id = "getTestimonial",
    summary = "Get a testimonial",
    params(("id" = i32, Path, description = "Testimonial ID")),
    responses(
        (status = 200, description = "Testimonial", body = TestimonialResponse),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_testimonial(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<TestimonialResponse>, AppError> {
    Ok(Json(find_testimonial(&state.db, id).await?.into()))
}

async fn apply_update(
    state: &AppState,
    id: i32,
    payload: TestimonialRequest,
    partial: bool,
) -> Result<testimonial::Model, AppError> {
    validate_testimonial(&payload, partial)?;

    let existing = find_testimonial(&state.db, id).await?;
    let mut active: testimonial::ActiveModel = existing.into();

    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(text) = payload.text {
        active.text = Set(text);
    }
    match payload.rating {
        Some(rating) => active.rating = Set(rating),
        None if !partial => active.rating = Set(DEFAULT_RATING),
        None => {}
    }

    Ok(active.update(&state.db).await?)
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Testimonials",
    operation_id = "replaceTestimonial",
    summary = "Replace a testimonial",
    description = "Full update: `name` and `text` are required. Requires a staff account.",
    params(("id" = i32, Path, description = "Testimonial ID")),
    request_body = TestimonialRequest,
    responses(
        (status = 200, description = "Testimonial updated", body = TestimonialResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn replace_testimonial(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<TestimonialRequest>,
) -> Result<Json<TestimonialResponse>, AppError> {
    auth_user.require_staff()?;
    let model = apply_update(&state, id, payload, false).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Testimonials",
    operation_id = "updateTestimonial",
    summary = "Update a testimonial",
    description = "Partial update: only provided fields are modified. Requires a staff account.",
    params(("id" = i32, Path, description = "Testimonial ID")),
    request_body = TestimonialRequest,
    responses(
        (status = 200, description = "Testimonial updated", body = TestimonialResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn update_testimonial(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<TestimonialRequest>,
) -> Result<Json<TestimonialResponse>, AppError> {
    auth_user.require_staff()?;
    let model = apply_update(&state, id, payload, true).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Testimonials",
    operation_id = "deleteTestimonial",
    summary = "Delete a testimonial",
    description = "Requires a staff account.",
    params(("id" = i32, Path, description = "Testimonial ID")),
    responses(
        (status = 204, description = "Testimonial deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn delete_testimonial(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    auth_user.require_staff()?;

    let result = testimonial::Entity::delete_by_id(id).exec(&state.db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Testimonial not found".into()));
    }

    Ok(StatusCode::NO_CONTENT)
}
