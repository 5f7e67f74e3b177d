use axum::Json;
use axum::extract::State;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{category, recipe, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::handlers::recipe::recipe_responses;
use crate::models::recipe::RecipeListResponse;
use crate::models::user::UserResponse;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/users/me",
    tag = "Users",
    operation_id = "getCurrentUser",
    summary = "Get the caller's profile",
    responses(
        (status = 200, description = "Profile", body = UserResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "User no longer exists (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn me(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, AppError> {
    let model = user::Entity::find_by_id(auth_user.user_id.as_str())
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    get,
    path = "/users/me/recipes",
    tag = "Users",
    operation_id = "listMyRecipes",
    summary = "List the caller's recipes",
    responses(
        (status = 200, description = "Recipes owned by the caller, newest first", body = RecipeListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn my_recipes(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<RecipeListResponse>, AppError> {
    let rows = recipe::Entity::find()
        .filter(recipe::Column::UserId.eq(auth_user.user_id.as_str()))
        .find_also_related(category::Entity)
        .order_by_desc(recipe::Column::CreatedAt)
        .all(&state.db)
        .await?;
    let data = recipe_responses(&state.db, rows).await?;

    Ok(Json(RecipeListResponse {
        total: data.len() as u64,
        data,
    }))
}
