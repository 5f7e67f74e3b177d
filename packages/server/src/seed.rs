use sea_orm::*;
use tracing::info;

use crate::entity::category;

/// Categories created on first start.
pub const DEFAULT_CATEGORIES: &[&str] = &["Breakfast", "Italian", "Fast Food", "Chinese", "Health"];

/// Seed the `category` table when it is empty.
pub async fn seed_categories(db: &DatabaseConnection) -> Result<(), DbErr> {
    if category::Entity::find().count(db).await? > 0 {
        return Ok(());
    }

    for &name in DEFAULT_CATEGORIES {
        let model = category::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            name: Set(name.to_string()),
        };
        category::Entity::insert(model)
            .exec_without_returning(db)
            .await?;
    }

    info!("Seeded {} categories", DEFAULT_CATEGORIES.len());
    Ok(())
}
