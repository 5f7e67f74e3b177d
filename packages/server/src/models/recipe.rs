use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

use crate::entity::{category, media, recipe};
use crate::error::AppError;
use crate::utils::list::{self, ListError};

use super::shared::validate_title;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateRecipeRequest {
    /// Defaults to `media_id` when present, otherwise a fresh random key.
    pub id: Option<String>,
    #[schema(example = "Buttermilk pancakes")]
    pub title: String,
    #[schema(example = json!(["flour", "buttermilk", "eggs"]))]
    pub ingredients: Vec<String>,
    #[schema(example = json!(["Whisk", "Rest 10 minutes", "Fry"]))]
    pub steps: Vec<String>,
    pub category_id: String,
    /// A media row previously registered by the caller.
    pub media_id: Option<String>,
}

/// Full replacement of a recipe's editable fields.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateRecipeRequest {
    pub title: String,
    pub ingredients: Vec<String>,
    /// Omitted or empty clears the steps.
    #[serde(default)]
    pub steps: Vec<String>,
    pub category_id: String,
    /// Omitted keeps the current image.
    pub media: Option<MediaChange>,
}

/// What to do with a recipe's image slot on save.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, utoipa::ToSchema)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum MediaChange {
    /// A new object was uploaded under `file_name`.
    Replace { file_name: String, mime_type: String },
    /// The user removed the image.
    Remove,
}

/// Field values validated and encoded for storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeFields {
    pub title: String,
    pub ingredients: String,
    pub steps: Option<String>,
    pub category_id: String,
}

fn list_error(field: &str, err: ListError) -> AppError {
    let message = match err {
        ListError::Empty => format!("{field} are required"),
        ListError::BlankItem => format!("{field} must not contain blank items"),
        ListError::ContainsComma => format!("{field} must not contain commas"),
    };
    AppError::Validation(message)
}

fn required_id(value: &str, field: &str) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}

pub fn validate_create_recipe(payload: &CreateRecipeRequest) -> Result<RecipeFields, AppError> {
    validate_title(&payload.title)?;
    Ok(RecipeFields {
        title: payload.title.trim().to_string(),
        ingredients: list::join(&payload.ingredients).map_err(|e| list_error("Ingredients", e))?,
        steps: Some(list::join(&payload.steps).map_err(|e| list_error("Steps", e))?),
        category_id: required_id(&payload.category_id, "category_id")?,
    })
}

pub fn validate_update_recipe(payload: &UpdateRecipeRequest) -> Result<RecipeFields, AppError> {
    validate_title(&payload.title)?;
    let steps = if payload.steps.is_empty() {
        None
    } else {
        Some(list::join(&payload.steps).map_err(|e| list_error("Steps", e))?)
    };
    if let Some(MediaChange::Replace { file_name, .. }) = &payload.media
        && file_name.trim().is_empty()
    {
        return Err(AppError::Validation(
            "file_name cannot be empty when replacing the image".into(),
        ));
    }
    Ok(RecipeFields {
        title: payload.title.trim().to_string(),
        ingredients: list::join(&payload.ingredients).map_err(|e| list_error("Ingredients", e))?,
        steps,
        category_id: required_id(&payload.category_id, "category_id")?,
    })
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct RecipeResponse {
    pub id: String,
    pub title: String,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
    pub category_id: String,
    /// Category name.
    #[schema(example = "Breakfast")]
    pub category: String,
    pub media_id: Option<String>,
    pub image_url: Option<String>,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RecipeResponse {
    pub fn new(
        model: recipe::Model,
        category: &category::Model,
        media: Option<&media::Model>,
    ) -> Self {
        Self {
            ingredients: list::split(&model.ingredients),
            steps: model.steps.as_deref().map(list::split).unwrap_or_default(),
            id: model.id,
            title: model.title,
            category_id: model.category_id,
            category: category.name.clone(),
            media_id: model.media_id,
            image_url: media.map(|m| m.url.clone()),
            user_id: model.user_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecipeListQuery {
    /// Case-insensitive match against category name or ingredients.
    pub search: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct RecipeListResponse {
    pub data: Vec<RecipeResponse>,
    pub total: u64,
}
