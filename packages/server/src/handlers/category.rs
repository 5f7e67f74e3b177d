use axum::Json;
use axum::extract::State;
use sea_orm::*;
use tracing::instrument;

use crate::entity::category;
use crate::error::AppError;
use crate::models::category::CategoryResponse;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/categories",
    tag = "Categories",
    operation_id = "listCategories",
    summary = "List recipe categories",
    responses(
        (status = 200, description = "All categories by name", body = Vec<CategoryResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryResponse>>, AppError> {
    let rows = category::Entity::find()
        .order_by_asc(category::Column::Name)
        .all(&state.db)
        .await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}
