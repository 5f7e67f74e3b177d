mod error;
mod key;
mod traits;

pub mod memory;
#[cfg(feature = "object-storage")]
pub mod s3;

pub use error::StorageError;
pub use key::{KeyError, generate_object_key, object_key_from_url, object_url, validate_object_key};
pub use traits::{ObjectStore, PutTarget};
