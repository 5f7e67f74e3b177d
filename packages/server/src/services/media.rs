use chrono::Utc;
use common::storage::{ObjectStore, object_key_from_url, object_url, validate_object_key};
use sea_orm::prelude::Expr;
use sea_orm::*;
use tracing::{info, warn};

use crate::entity::{media, recipe};
use crate::error::AppError;
use crate::extractors::auth::AuthUser;
use crate::models::media::RegisterMediaRequest;
use crate::state::AppState;
use crate::utils::lookup::require_key_unclaimed;

/// Record an object the caller uploaded through a pre-signed URL.
///
/// Without `storage.verify_uploads` the object is not read back: a row may
/// exist for an upload that never completed and renders as a broken image.
pub async fn register_media(
    state: &AppState,
    caller: &AuthUser,
    payload: RegisterMediaRequest,
) -> Result<media::Model, AppError> {
    let key = validate_object_key(payload.file_name.trim())?;
    if !state.config.upload.accepts(&payload.mime_type) {
        return Err(AppError::UnsupportedType(payload.mime_type));
    }

    if media::Entity::find_by_id(key).one(&state.db).await?.is_some() {
        return Err(AppError::Conflict(
            "Media with this file name is already registered".into(),
        ));
    }
    require_key_unclaimed(&state.db, key, &caller.user_id).await?;

    if state.config.storage.verify_uploads && !state.store.exists(key).await? {
        return Err(AppError::Validation(format!(
            "No uploaded object found for {key}"
        )));
    }

    let row = media::ActiveModel {
        id: Set(key.to_string()),
        url: Set(object_url(&state.config.storage.public_base_url, key)),
        mime_type: Set(payload.mime_type),
        user_id: Set(caller.user_id.clone()),
        created_at: Set(Utc::now()),
    };

    match row.insert(&state.db).await {
        Ok(model) => Ok(model),
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => Err(
            AppError::Conflict("Media with this file name is already registered".into()),
        ),
        Err(e) => Err(e.into()),
    }
}

fn delete_failed(err: impl ToString) -> AppError {
    AppError::MediaDeleteFailed(err.to_string())
}

/// Delete a media object and its row.
///
/// Storage goes first. If it fails the rows are left untouched; if it
/// succeeds, unlinking every recipe and deleting the row commit together.
/// Success is reported only once all three steps are done.
pub async fn delete_media(state: &AppState, caller: &AuthUser, id: &str) -> Result<(), AppError> {
    let row = media::Entity::find_by_id(id)
        .one(&state.db)
        .await
        .map_err(delete_failed)?
        .ok_or_else(|| AppError::NotFound("Media not found".into()))?;
    caller.require_owner(&row.user_id)?;

    let key = object_key_from_url(&row.url)
        .ok_or_else(|| delete_failed(format!("no object key in url {}", row.url)))?;
    state.store.delete(key).await.map_err(delete_failed)?;

    let txn = state.db.begin().await.map_err(delete_failed)?;
    let unlinked = recipe::Entity::update_many()
        .col_expr(recipe::Column::MediaId, Expr::value(Option::<String>::None))
        .filter(recipe::Column::MediaId.eq(row.id.as_str()))
        .exec(&txn)
        .await
        .map_err(delete_failed)?;
    media::Entity::delete_by_id(row.id.as_str())
        .exec(&txn)
        .await
        .map_err(delete_failed)?;
    txn.commit().await.map_err(delete_failed)?;

    info!(
        media_id = %row.id,
        recipes_unlinked = unlinked.rows_affected,
        "Deleted media"
    );
    Ok(())
}

/// Delete the object behind a media row that has already been removed.
///
/// Failures are logged and swallowed; a leftover object is unreachable but harmless.
pub async fn remove_object_best_effort(store: &dyn ObjectStore, row: &media::Model) {
    let key = object_key_from_url(&row.url).unwrap_or(&row.id);
    if let Err(e) = store.delete(key).await {
        warn!(media_id = %row.id, key, error = %e, "Failed to delete stored object");
    }
}
