//! Keeps a recipe's media link and the `media` table consistent when the
//! recipe is saved.
//!
//! Planning is pure ([`plan_media_change`]); [`update_recipe`] fetches what the
//! plan needs, checks ownership, and applies plan and field changes in one
//! transaction. Objects orphaned by the save are removed from storage only
//! after commit.

use chrono::Utc;
use common::storage::{object_url, validate_object_key};
use sea_orm::*;
use tracing::{debug, info};

use crate::entity::{category, media, recipe};
use crate::error::AppError;
use crate::extractors::auth::AuthUser;
use crate::models::recipe::{MediaChange, UpdateRecipeRequest, validate_update_recipe};
use crate::services::media::remove_object_best_effort;
use crate::state::AppState;
use crate::utils::lookup::{
    count_other_links, find_media, find_recipe, require_category, require_key_unclaimed,
};

/// What happens to a recipe's media slot on save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaPlan {
    /// Leave the link and the media table alone.
    Keep,
    /// The new upload overwrote the linked object; refresh its row.
    UpdateInPlace { id: String, mime_type: String },
    /// Create a row for the new key and link it.
    Insert {
        id: String,
        mime_type: String,
        previous: Option<String>,
    },
    /// A row for the new key already exists; link it without inserting.
    Relink { id: String, previous: Option<String> },
    /// Unlink the current row.
    Clear { previous: String },
}

impl MediaPlan {
    /// Media ID the recipe no longer links to after this plan runs.
    pub fn superseded(&self) -> Option<&str> {
        match self {
            MediaPlan::Keep | MediaPlan::UpdateInPlace { .. } => None,
            MediaPlan::Insert { previous, .. } | MediaPlan::Relink { previous, .. } => {
                previous.as_deref()
            }
            MediaPlan::Clear { previous } => Some(previous),
        }
    }

    /// The recipe's `media_id` after this plan runs.
    pub fn linked_id<'a>(&'a self, current: Option<&'a str>) -> Option<&'a str> {
        match self {
            MediaPlan::Keep => current,
            MediaPlan::UpdateInPlace { id, .. }
            | MediaPlan::Insert { id, .. }
            | MediaPlan::Relink { id, .. } => Some(id),
            MediaPlan::Clear { .. } => None,
        }
    }
}

/// Decide the media transition for a save.
///
/// `current` is the recipe's linked media ID, `change` the requested change
/// (`None` keeps the image), and `row_exists` whether a media row is already
/// registered under the replacement key.
pub fn plan_media_change(
    current: Option<&str>,
    change: Option<&MediaChange>,
    row_exists: bool,
) -> MediaPlan {
    match (current, change) {
        (_, None) => MediaPlan::Keep,
        (None, Some(MediaChange::Remove)) => MediaPlan::Keep,
        (Some(old), Some(MediaChange::Remove)) => MediaPlan::Clear {
            previous: old.to_string(),
        },
        (Some(old), Some(MediaChange::Replace { file_name, mime_type })) if file_name == old => {
            MediaPlan::UpdateInPlace {
                id: old.to_string(),
                mime_type: mime_type.clone(),
            }
        }
        (current, Some(MediaChange::Replace { file_name, .. })) if row_exists => MediaPlan::Relink {
            id: file_name.clone(),
            previous: current.map(str::to_string),
        },
        (current, Some(MediaChange::Replace { file_name, mime_type })) => MediaPlan::Insert {
            id: file_name.clone(),
            mime_type: mime_type.clone(),
            previous: current.map(str::to_string),
        },
    }
}

/// A saved recipe with the rows its response is built from.
pub struct SavedRecipe {
    pub recipe: recipe::Model,
    pub category: category::Model,
    pub media: Option<media::Model>,
}

/// Replace a recipe's editable fields and reconcile its image.
///
/// Ownership is verified before anything is written. Field and media changes
/// commit together or not at all.
pub async fn update_recipe(
    state: &AppState,
    caller: &AuthUser,
    id: &str,
    payload: UpdateRecipeRequest,
) -> Result<SavedRecipe, AppError> {
    let fields = validate_update_recipe(&payload)?;
    let change = normalize_change(state, payload.media)?;

    let txn = state.db.begin().await?;

    let existing = find_recipe(&txn, id).await?;
    caller.require_owner(&existing.user_id)?;
    let category = require_category(&txn, &fields.category_id).await?;

    let registered = match &change {
        Some(MediaChange::Replace { file_name, .. })
            if existing.media_id.as_deref() != Some(file_name.as_str()) =>
        {
            require_key_unclaimed(&txn, file_name, &caller.user_id).await?;
            media::Entity::find_by_id(file_name.as_str()).one(&txn).await?
        }
        _ => None,
    };

    let plan = plan_media_change(
        existing.media_id.as_deref(),
        change.as_ref(),
        registered.is_some(),
    );
    debug!(?plan, "Planned media change");

    let now = Utc::now();
    let linked = match &plan {
        MediaPlan::Keep => match &existing.media_id {
            Some(media_id) => media::Entity::find_by_id(media_id.as_str()).one(&txn).await?,
            None => None,
        },
        MediaPlan::UpdateInPlace { id, mime_type } => {
            let mut row: media::ActiveModel = find_media(&txn, id).await?.into();
            row.url = Set(object_url(&state.config.storage.public_base_url, id));
            row.mime_type = Set(mime_type.clone());
            Some(row.update(&txn).await?)
        }
        MediaPlan::Insert { id, mime_type, .. } => {
            let row = media::ActiveModel {
                id: Set(id.clone()),
                url: Set(object_url(&state.config.storage.public_base_url, id)),
                mime_type: Set(mime_type.clone()),
                user_id: Set(existing.user_id.clone()),
                created_at: Set(now),
            };
            Some(row.insert(&txn).await?)
        }
        MediaPlan::Relink { .. } => registered,
        MediaPlan::Clear { .. } => None,
    };

    let media_id = plan
        .linked_id(existing.media_id.as_deref())
        .map(str::to_string);
    let mut active: recipe::ActiveModel = existing.into();
    active.title = Set(fields.title);
    active.ingredients = Set(fields.ingredients);
    active.steps = Set(fields.steps);
    active.category_id = Set(fields.category_id);
    active.media_id = Set(media_id);
    active.updated_at = Set(now);
    let updated = active.update(&txn).await?;

    let mut orphaned = None;
    if let Some(old) = plan.superseded()
        && count_other_links(&txn, old, &updated.id).await? == 0
        && let Some(row) = media::Entity::find_by_id(old).one(&txn).await?
    {
        media::Entity::delete_by_id(old).exec(&txn).await?;
        orphaned = Some(row);
    }

    txn.commit().await?;

    if let Some(row) = orphaned {
        info!(media_id = %row.id, recipe_id = %updated.id, "Removed superseded media");
        remove_object_best_effort(state.store.as_ref(), &row).await;
    }

    Ok(SavedRecipe {
        recipe: updated,
        category,
        media: linked,
    })
}

/// Trim the replacement key and check it and its type before the transaction opens.
fn normalize_change(
    state: &AppState,
    change: Option<MediaChange>,
) -> Result<Option<MediaChange>, AppError> {
    match change {
        Some(MediaChange::Replace {
            file_name,
            mime_type,
        }) => {
            let file_name = validate_object_key(file_name.trim())?.to_string();
            if !state.config.upload.accepts(&mime_type) {
                return Err(AppError::UnsupportedType(mime_type));
            }
            Ok(Some(MediaChange::Replace {
                file_name,
                mime_type,
            }))
        }
        other => Ok(other),
    }
}
