use async_trait::async_trait;
use http::{HeaderMap, HeaderName, HeaderValue, header};
use s3::creds::Credentials;
use s3::{Bucket, Region};
use tracing::debug;

use super::error::StorageError;
use super::traits::{ObjectStore, PutTarget};

/// Connection settings for an S3-compatible bucket.
#[derive(Debug, Clone)]
pub struct S3Settings {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint (MinIO, R2, ...). Enables path-style addressing.
    pub endpoint: Option<String>,
    pub access_key: String,
    pub secret_key: String,
}

/// [`ObjectStore`] backed by an S3-compatible bucket.
///
/// Built once at startup and shared through the application state.
pub struct S3ObjectStore {
    bucket: Box<Bucket>,
}

impl S3ObjectStore {
    pub fn new(settings: &S3Settings) -> Result<Self, StorageError> {
        if settings.bucket.trim().is_empty() {
            return Err(StorageError::Config("bucket name is empty".into()));
        }

        let region = match &settings.endpoint {
            Some(endpoint) => Region::Custom {
                region: settings.region.clone(),
                endpoint: endpoint.clone(),
            },
            None => settings
                .region
                .parse::<Region>()
                .map_err(|e| StorageError::Config(format!("invalid region: {e}")))?,
        };

        let credentials = Credentials::new(
            Some(&settings.access_key),
            Some(&settings.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| StorageError::Config(format!("invalid credentials: {e}")))?;

        let mut bucket = Bucket::new(&settings.bucket, region, credentials)
            .map_err(|e| StorageError::Config(e.to_string()))?;
        if settings.endpoint.is_some() {
            bucket = bucket.with_path_style();
        }

        Ok(Self { bucket })
    }
}

fn signed_headers(target: &PutTarget<'_>) -> Result<HeaderMap, StorageError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(target.content_type)
            .map_err(|e| StorageError::Backend(format!("invalid content type: {e}")))?,
    );
    headers.insert(
        header::CONTENT_LENGTH,
        HeaderValue::from(target.content_length),
    );
    headers.insert(
        HeaderName::from_static("x-amz-meta-user-id"),
        HeaderValue::from_str(target.owner_id)
            .map_err(|e| StorageError::Backend(format!("invalid owner id: {e}")))?,
    );
    Ok(headers)
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn presign_put(&self, target: PutTarget<'_>) -> Result<String, StorageError> {
        let expiry = u32::try_from(target.expires_in.as_secs())
            .map_err(|_| StorageError::Backend("presign expiry out of range".into()))?;
        let headers = signed_headers(&target)?;

        let url = self
            .bucket
            .presign_put(target.key, expiry, Some(headers), None)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        debug!(key = target.key, expiry, "Issued pre-signed PUT");
        Ok(url)
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let response = self
            .bucket
            .delete_object(key)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        match response.status_code() {
            200..=299 | 404 => Ok(()),
            code => Err(StorageError::Backend(format!(
                "delete of {key} returned HTTP {code}"
            ))),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        let (_, code) = self
            .bucket
            .head_object(key)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        match code {
            200..=299 => Ok(true),
            404 => Ok(false),
            code => Err(StorageError::Backend(format!(
                "head of {key} returned HTTP {code}"
            ))),
        }
    }
}
