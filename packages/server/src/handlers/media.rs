use std::time::Duration;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::media::*;
use crate::services::{media as media_service, upload};
use crate::services::upload::{UploadCredential, UploadRequest};
use crate::state::AppState;
use crate::utils::lookup::{find_recipe, require_key_unclaimed};

impl From<UploadCredential> for UploadUrlResponse {
    fn from(cred: UploadCredential) -> Self {
        Self {
            url: cred.url,
            file_name: cred.file_name,
            expires_in: cred.expires_in.as_secs(),
        }
    }
}

fn presign_expiry(state: &AppState) -> Duration {
    Duration::from_secs(state.config.storage.presign_expiry_secs)
}

#[utoipa::path(
    post,
    path = "/media/upload-url",
    tag = "Media",
    operation_id = "createUploadUrl",
    summary = "Get a pre-signed URL for a new recipe image",
    description = "Validates type and size against the recipe-creation policy and signs a PUT for a freshly generated key. The client uploads directly to `url`; nothing is stored until the key is registered with `POST /media`.",
    request_body = UploadUrlRequest,
    responses(
        (status = 200, description = "Upload credential issued", body = UploadUrlResponse),
        (status = 400, description = "Empty file (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 413, description = "File too large (FILE_TOO_LARGE)", body = ErrorBody),
        (status = 415, description = "Not an accepted image type (UNSUPPORTED_MEDIA_TYPE)", body = ErrorBody),
        (status = 502, description = "Signing failed (STORAGE_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = %auth_user.user_id, mime_type = %payload.mime_type, size = payload.size))]
pub async fn create_upload_url(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<UploadUrlRequest>,
) -> Result<Json<UploadUrlResponse>, AppError> {
    let credential = upload::issue_upload_credential(
        state.store.as_ref(),
        &state.config.upload.create_policy(),
        presign_expiry(&state),
        UploadRequest {
            owner_id: &auth_user.user_id,
            mime_type: &payload.mime_type,
            size: payload.size,
            existing_key: None,
        },
    )
    .await?;

    Ok(Json(credential.into()))
}

#[utoipa::path(
    post,
    path = "/recipes/{id}/media/upload-url",
    tag = "Media",
    operation_id = "replaceUploadUrl",
    summary = "Get a pre-signed URL to replace a recipe's image",
    description = "Owner only. Signs a PUT for the recipe's current media key (or the recipe ID when it has no image), so the upload overwrites the existing object. Repeated calls always return the same `file_name`.",
    params(("id" = String, Path, description = "Recipe ID")),
    request_body = UploadUrlRequest,
    responses(
        (status = 200, description = "Upload credential issued", body = UploadUrlResponse),
        (status = 400, description = "Empty file (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the recipe owner, or the key belongs to another user (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Recipe not found (NOT_FOUND)", body = ErrorBody),
        (status = 413, description = "File too large (FILE_TOO_LARGE)", body = ErrorBody),
        (status = 415, description = "Not an accepted image type (UNSUPPORTED_MEDIA_TYPE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = %auth_user.user_id, recipe_id = %id))]
pub async fn replace_upload_url(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UploadUrlRequest>,
) -> Result<Json<UploadUrlResponse>, AppError> {
    let recipe = find_recipe(&state.db, &id).await?;
    auth_user.require_owner(&recipe.user_id)?;

    let existing_key = recipe.media_id.as_deref().unwrap_or(&recipe.id);
    require_key_unclaimed(&state.db, existing_key, &auth_user.user_id).await?;
    let credential = upload::issue_upload_credential(
        state.store.as_ref(),
        &state.config.upload.replace_policy(),
        presign_expiry(&state),
        UploadRequest {
            owner_id: &auth_user.user_id,
            mime_type: &payload.mime_type,
            size: payload.size,
            existing_key: Some(existing_key),
        },
    )
    .await?;

    Ok(Json(credential.into()))
}

#[utoipa::path(
    post,
    path = "/media",
    tag = "Media",
    operation_id = "registerMedia",
    summary = "Register an uploaded image",
    description = "Creates a media row owned by the caller for an object uploaded through a pre-signed URL. The object is not read back unless `storage.verify_uploads` is enabled.",
    request_body = RegisterMediaRequest,
    responses(
        (status = 201, description = "Media registered", body = MediaResponse),
        (status = 400, description = "Invalid file name or object missing (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Key is another user's recipe ID (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Already registered (CONFLICT)", body = ErrorBody),
        (status = 415, description = "Not an accepted image type (UNSUPPORTED_MEDIA_TYPE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = %auth_user.user_id, file_name = %payload.file_name))]
pub async fn register_media(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterMediaRequest>,
) -> Result<impl IntoResponse, AppError> {
    let model = media_service::register_media(&state, &auth_user, payload).await?;
    Ok((StatusCode::CREATED, Json(MediaResponse::from(model))))
}

#[utoipa::path(
    delete,
    path = "/media/{id}",
    tag = "Media",
    operation_id = "deleteMedia",
    summary = "Delete an image",
    description = "Owner only. Deletes the stored object, then unlinks every recipe using it and deletes the row in one transaction. Any failure after the ownership check is reported as `MEDIA_DELETE_FAILED`.",
    params(("id" = String, Path, description = "Media ID (object key)")),
    responses(
        (status = 200, description = "Media deleted", body = DeleteMediaResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the media owner (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Media not found (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "Deletion failed (MEDIA_DELETE_FAILED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id, media_id = %id))]
pub async fn delete_media(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteMediaResponse>, AppError> {
    media_service::delete_media(&state, &auth_user, &id).await?;
    Ok(Json(DeleteMediaResponse {
        message: "Your image has successfully been deleted".into(),
    }))
}
