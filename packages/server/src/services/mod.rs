pub mod media;
pub mod reconcile;
pub mod upload;
