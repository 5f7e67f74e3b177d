use sea_orm::*;

use crate::entity::{category, media, recipe};
use crate::error::AppError;

/// Look up a recipe by ID, returning 404 if not found.
pub async fn find_recipe<C: ConnectionTrait>(db: &C, id: &str) -> Result<recipe::Model, AppError> {
    recipe::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Recipe not found".into()))
}

/// Look up a media row by ID (its object key), returning 404 if not found.
pub async fn find_media<C: ConnectionTrait>(db: &C, id: &str) -> Result<media::Model, AppError> {
    media::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Media not found".into()))
}

/// A referenced category must exist; reported as a validation error, not 404.
pub async fn require_category<C: ConnectionTrait>(
    db: &C,
    id: &str,
) -> Result<category::Model, AppError> {
    category::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::Validation(format!("Category {id} does not exist")))
}

/// Number of recipes other than `except_recipe` that link to `media_id`.
pub async fn count_other_links<C: ConnectionTrait>(
    db: &C,
    media_id: &str,
    except_recipe: &str,
) -> Result<u64, AppError> {
    Ok(recipe::Entity::find()
        .filter(recipe::Column::MediaId.eq(media_id))
        .filter(recipe::Column::Id.ne(except_recipe))
        .count(db)
        .await?)
}

/// Object keys double as recipe IDs, and a recipe's ID is the key its replace
/// flow uploads to. A key already taken by another user's recipe or media row
/// cannot be claimed by `user_id`.
pub async fn require_key_unclaimed<C: ConnectionTrait>(
    db: &C,
    key: &str,
    user_id: &str,
) -> Result<(), AppError> {
    if let Some(row) = media::Entity::find_by_id(key).one(db).await?
        && row.user_id != user_id
    {
        return Err(AppError::PermissionDenied);
    }
    if let Some(row) = recipe::Entity::find_by_id(key).one(db).await?
        && row.user_id != user_id
    {
        return Err(AppError::PermissionDenied);
    }
    Ok(())
}
