pub mod storage;
pub mod upload;

pub use upload::{PolicyViolation, UploadPolicy};
