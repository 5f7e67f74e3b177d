use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers::{auth, category, media, recipe, user};
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .merge(auth_routes())
        .merge(media_routes())
        .merge(recipe_routes())
        .merge(user_routes())
        .routes(routes!(category::list_categories))
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(auth::register))
        .routes(routes!(auth::login))
        .routes(routes!(auth::session))
}

fn media_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(media::create_upload_url))
        .routes(routes!(media::register_media))
        .routes(routes!(media::delete_media))
        .routes(routes!(media::replace_upload_url))
}

fn recipe_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(recipe::create_recipe, recipe::list_recipes))
        .routes(routes!(
            recipe::get_recipe,
            recipe::update_recipe,
            recipe::delete_recipe
        ))
}

fn user_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(user::me))
        .routes(routes!(user::my_recipes))
}
