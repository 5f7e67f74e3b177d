use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    /// UUIDv4 in canonical string form.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub name: Option<String>,
    #[sea_orm(unique)]
    pub email: String,
    /// Avatar URL.
    pub image: Option<String>,
    /// Argon2 PHC string.
    pub password: String,

    #[sea_orm(has_many)]
    pub recipes: HasMany<super::recipe::Entity>,

    #[sea_orm(has_many)]
    pub media: HasMany<super::media::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
