use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "recipe")]
pub struct Model {
    /// Initially the object key generated for the recipe's first image.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub title: String,
    /// Comma-joined list.
    pub ingredients: String,
    /// Comma-joined list.
    pub steps: Option<String>,

    pub category_id: String,
    #[sea_orm(belongs_to, from = "category_id", to = "id")]
    pub category: HasOne<super::category::Entity>,

    /// NULL when the recipe has no image.
    pub media_id: Option<String>,
    #[sea_orm(belongs_to, from = "media_id", to = "id")]
    pub media: HasOne<super::media::Entity>,

    /// Deleting the owner deletes their recipes.
    pub user_id: String,
    #[sea_orm(belongs_to, from = "user_id", to = "id", on_delete = "Cascade")]
    pub user: HasOne<super::user::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
