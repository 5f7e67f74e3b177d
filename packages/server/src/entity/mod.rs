pub mod category;
pub mod media;
pub mod recipe;
pub mod user;
