use std::time::Duration;

use common::UploadPolicy;
use common::storage::{ObjectStore, PutTarget, generate_object_key, validate_object_key};
use tracing::debug;

use crate::error::AppError;

/// A pre-signed PUT and the key it writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCredential {
    pub url: String,
    /// Object key, later used as the media (and possibly recipe) ID.
    pub file_name: String,
    pub expires_in: Duration,
}

/// Parameters of one credential request.
#[derive(Debug, Clone, Copy)]
pub struct UploadRequest<'a> {
    pub owner_id: &'a str,
    pub mime_type: &'a str,
    pub size: u64,
    /// Reuse this key so the upload overwrites the object already stored there.
    pub existing_key: Option<&'a str>,
}

/// Check `request` against `policy` and sign a PUT scoped to one key,
/// content type and content length.
///
/// Nothing is written: the client uploads to the returned URL itself, and the
/// server learns of the object only when the client registers it.
pub async fn issue_upload_credential(
    store: &dyn ObjectStore,
    policy: &UploadPolicy,
    expires_in: Duration,
    request: UploadRequest<'_>,
) -> Result<UploadCredential, AppError> {
    policy.check(request.mime_type, request.size)?;

    let key = match request.existing_key {
        Some(key) => validate_object_key(key)?.to_string(),
        None => generate_object_key(),
    };

    let url = store
        .presign_put(PutTarget {
            key: &key,
            content_type: request.mime_type,
            content_length: request.size,
            owner_id: request.owner_id,
            expires_in,
        })
        .await?;

    debug!(key = %key, size = request.size, "Issued upload credential");

    Ok(UploadCredential {
        url,
        file_name: key,
        expires_in,
    })
}
