use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use common::storage::{generate_object_key, validate_object_key};
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::{category, media, recipe};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::recipe::*;
use crate::models::shared::escape_like;
use crate::services::media::remove_object_best_effort;
use crate::services::reconcile::{self, SavedRecipe};
use crate::state::AppState;
use crate::utils::lookup::{count_other_links, find_recipe, require_category};

/// Attach image URLs to recipe rows with one batched media query.
pub(crate) async fn recipe_responses<C: ConnectionTrait>(
    db: &C,
    rows: Vec<(recipe::Model, Option<category::Model>)>,
) -> Result<Vec<RecipeResponse>, AppError> {
    let media_ids: Vec<String> = rows.iter().filter_map(|(r, _)| r.media_id.clone()).collect();
    let media: HashMap<String, media::Model> = if media_ids.is_empty() {
        HashMap::new()
    } else {
        media::Entity::find()
            .filter(media::Column::Id.is_in(media_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|m| (m.id.clone(), m))
            .collect()
    };

    rows.into_iter()
        .map(|(r, cat)| {
            let cat = cat.ok_or_else(|| {
                AppError::Internal(format!("recipe {} has no category row", r.id))
            })?;
            let image = r.media_id.as_ref().and_then(|id| media.get(id));
            Ok(RecipeResponse::new(r, &cat, image))
        })
        .collect()
}

impl From<SavedRecipe> for RecipeResponse {
    fn from(saved: SavedRecipe) -> Self {
        RecipeResponse::new(saved.recipe, &saved.category, saved.media.as_ref())
    }
}

#[utoipa::path(
    post,
    path = "/recipes",
    tag = "Recipes",
    operation_id = "createRecipe",
    summary = "Create a recipe",
    description = "Creates a recipe owned by the caller. `media_id` must name a media row the caller registered. The recipe ID defaults to `media_id`, so a recipe and its first image share a key.",
    request_body = CreateRecipeRequest,
    responses(
        (status = 201, description = "Recipe created", body = RecipeResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Media belongs to another user (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Recipe ID already taken, or another user's media key (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = %auth_user.user_id, title = %payload.title))]
pub async fn create_recipe(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateRecipeRequest>,
) -> Result<impl IntoResponse, AppError> {
    let fields = validate_create_recipe(&payload)?;

    let media_id = match payload.media_id.as_deref().map(str::trim) {
        Some(id) => Some(validate_object_key(id)?.to_string()),
        None => None,
    };
    let id = match payload.id.as_deref().map(str::trim) {
        Some(id) => validate_object_key(id)?.to_string(),
        None => media_id.clone().unwrap_or_else(generate_object_key),
    };

    let txn = state.db.begin().await?;

    if recipe::Entity::find_by_id(id.as_str()).one(&txn).await?.is_some() {
        return Err(AppError::Conflict("A recipe with this ID already exists".into()));
    }
    if payload.id.is_some()
        && let Some(row) = media::Entity::find_by_id(id.as_str()).one(&txn).await?
        && row.user_id != auth_user.user_id
    {
        return Err(AppError::Conflict("This ID is already in use".into()));
    }
    let category = require_category(&txn, &fields.category_id).await?;
    let image = match &media_id {
        Some(media_id) => {
            let row = media::Entity::find_by_id(media_id.as_str())
                .one(&txn)
                .await?
                .ok_or_else(|| {
                    AppError::Validation(format!("Media {media_id} is not registered"))
                })?;
            auth_user.require_owner(&row.user_id)?;
            Some(row)
        }
        None => None,
    };

    let now = Utc::now();
    let new_recipe = recipe::ActiveModel {
        id: Set(id),
        title: Set(fields.title),
        ingredients: Set(fields.ingredients),
        steps: Set(fields.steps),
        category_id: Set(fields.category_id),
        media_id: Set(media_id),
        user_id: Set(auth_user.user_id.clone()),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let model = match new_recipe.insert(&txn).await {
        Ok(model) => model,
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            return Err(AppError::Conflict("A recipe with this ID already exists".into()));
        }
        Err(e) => return Err(e.into()),
    };
    txn.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(RecipeResponse::new(model, &category, image.as_ref())),
    ))
}

#[utoipa::path(
    get,
    path = "/recipes",
    tag = "Recipes",
    operation_id = "listRecipes",
    summary = "List recipes",
    description = "Returns all recipes, newest first, with category name and image URL. `search` matches case-insensitively against the category name or the ingredients.",
    params(RecipeListQuery),
    responses(
        (status = 200, description = "Recipes", body = RecipeListResponse),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_recipes(
    State(state): State<AppState>,
    Query(query): Query<RecipeListQuery>,
) -> Result<Json<RecipeListResponse>, AppError> {
    let mut select = recipe::Entity::find().find_also_related(category::Entity);

    if let Some(ref search) = query.search {
        let term = escape_like(search.trim());
        if !term.is_empty() {
            let pattern = format!("%{}%", term.to_lowercase());
            select = select.filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col((
                            category::Entity,
                            category::Column::Name,
                        ))))
                        .like(LikeExpr::new(pattern.clone()).escape('\\')),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col((
                            recipe::Entity,
                            recipe::Column::Ingredients,
                        ))))
                        .like(LikeExpr::new(pattern).escape('\\')),
                    ),
            );
        }
    }

    let rows = select
        .order_by_desc(recipe::Column::CreatedAt)
        .all(&state.db)
        .await?;
    let data = recipe_responses(&state.db, rows).await?;

    Ok(Json(RecipeListResponse {
        total: data.len() as u64,
        data,
    }))
}

#[utoipa::path(
    get,
    path = "/recipes/{id}",
    tag = "Recipes",
    operation_id = "getRecipe",
    summary = "Get a recipe by ID",
    params(("id" = String, Path, description = "Recipe ID")),
    responses(
        (status = 200, description = "Recipe details", body = RecipeResponse),
        (status = 404, description = "Recipe not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id = %id))]
pub async fn get_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RecipeResponse>, AppError> {
    let row = recipe::Entity::find_by_id(id.as_str())
        .find_also_related(category::Entity)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Recipe not found".into()))?;

    let mut data = recipe_responses(&state.db, vec![row]).await?;
    data.pop()
        .map(Json)
        .ok_or_else(|| AppError::Internal(format!("recipe {id} vanished while loading")))
}

#[utoipa::path(
    put,
    path = "/recipes/{id}",
    tag = "Recipes",
    operation_id = "updateRecipe",
    summary = "Update a recipe and reconcile its image",
    description = "Owner only; ownership is checked before anything is written. Replaces title, ingredients, steps and category. `media` is omitted to keep the image, `{\"action\":\"replace\",...}` after uploading a new one, or `{\"action\":\"remove\"}`. A superseded image row is deleted in the same transaction and its object is removed afterwards.",
    params(("id" = String, Path, description = "Recipe ID")),
    request_body = UpdateRecipeRequest,
    responses(
        (status = 200, description = "Recipe updated", body = RecipeResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the owner (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Recipe not found (NOT_FOUND)", body = ErrorBody),
        (status = 415, description = "Not an accepted image type (UNSUPPORTED_MEDIA_TYPE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = %auth_user.user_id, id = %id))]
pub async fn update_recipe(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateRecipeRequest>,
) -> Result<Json<RecipeResponse>, AppError> {
    let saved = reconcile::update_recipe(&state, &auth_user, &id, payload).await?;
    Ok(Json(saved.into()))
}

#[utoipa::path(
    delete,
    path = "/recipes/{id}",
    tag = "Recipes",
    operation_id = "deleteRecipe",
    summary = "Delete a recipe",
    description = "Owner only. Deletes the recipe and, unless another recipe still uses it, its media row. The stored object is removed after commit on a best-effort basis.",
    params(("id" = String, Path, description = "Recipe ID")),
    responses(
        (status = 204, description = "Recipe deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the owner (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Recipe not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id, id = %id))]
pub async fn delete_recipe(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let txn = state.db.begin().await?;

    let existing = find_recipe(&txn, &id).await?;
    auth_user.require_owner(&existing.user_id)?;

    recipe::Entity::delete_by_id(existing.id.as_str())
        .exec(&txn)
        .await?;

    let mut orphaned = None;
    if let Some(media_id) = &existing.media_id
        && count_other_links(&txn, media_id, &existing.id).await? == 0
        && let Some(row) = media::Entity::find_by_id(media_id.as_str()).one(&txn).await?
    {
        media::Entity::delete_by_id(media_id.as_str())
            .exec(&txn)
            .await?;
        orphaned = Some(row);
    }

    txn.commit().await?;
    info!("Deleted recipe");

    if let Some(row) = orphaned {
        remove_object_best_effort(state.store.as_ref(), &row).await;
    }

    Ok(StatusCode::NO_CONTENT)
}
