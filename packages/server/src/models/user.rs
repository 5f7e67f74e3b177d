use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entity::user;

/// Public profile of a user.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UserResponse {
    #[schema(example = "2f1c0f5e-8a7b-4d0e-9b59-1f1f4a0c2d11")]
    pub id: String,
    #[schema(example = "Ada")]
    pub name: Option<String>,
    #[schema(example = "ada@example.com")]
    pub email: String,
    /// Avatar URL.
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            image: model.image,
            created_at: model.created_at,
        }
    }
}
