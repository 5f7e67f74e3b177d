use serde::Serialize;

use crate::entity::category;

#[derive(Serialize, utoipa::ToSchema)]
pub struct CategoryResponse {
    pub id: String,
    #[schema(example = "Breakfast")]
    pub name: String,
}

impl From<category::Model> for CategoryResponse {
    fn from(model: category::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}
