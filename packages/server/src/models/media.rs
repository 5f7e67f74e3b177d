use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::media;

/// Request for a pre-signed upload URL.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct UploadUrlRequest {
    /// MIME type the client will upload with.
    #[schema(example = "image/png")]
    pub mime_type: String,
    /// Exact byte length of the file.
    #[schema(example = 482133)]
    pub size: u64,
}

/// A single-use write credential.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UploadUrlResponse {
    /// `PUT` the file here with the same `Content-Type` and `Content-Length`.
    pub url: String,
    /// Object key to reference in subsequent calls.
    #[schema(example = "9f2c4e0b7a1d...")]
    pub file_name: String,
    /// Seconds until `url` stops working.
    #[schema(example = 60)]
    pub expires_in: u64,
}

/// Register an object the client uploaded as a media row.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct RegisterMediaRequest {
    /// Object key returned by the upload-url endpoint.
    pub file_name: String,
    #[schema(example = "image/png")]
    pub mime_type: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct MediaResponse {
    /// Object-storage key.
    pub id: String,
    pub url: String,
    #[schema(example = "image/png")]
    pub mime_type: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

impl From<media::Model> for MediaResponse {
    fn from(model: media::Model) -> Self {
        Self {
            id: model.id,
            url: model.url,
            mime_type: model.mime_type,
            user_id: model.user_id,
            created_at: model.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct DeleteMediaResponse {
    #[schema(example = "Your image has successfully been deleted")]
    pub message: String,
}
