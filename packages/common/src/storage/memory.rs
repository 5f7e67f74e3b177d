use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::error::StorageError;
use super::key::object_url;
use super::traits::{ObjectStore, PutTarget};

/// A pre-signed PUT handed out by [`MemoryObjectStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedPut {
    pub key: String,
    pub content_type: String,
    pub content_length: u64,
    pub owner_id: String,
    pub expires_in_secs: u64,
}

#[derive(Default)]
struct Inner {
    objects: HashMap<String, Vec<u8>>,
    issued: Vec<IssuedPut>,
    deleted: Vec<String>,
    fail_deletes: bool,
}

/// Process-local object store.
///
/// Used for local development without a bucket and as the injected store in
/// tests. Uploads that would go to the pre-signed URL are simulated with
/// [`MemoryObjectStore::put_object`].
pub struct MemoryObjectStore {
    base_url: String,
    inner: Mutex<Inner>,
}

impl MemoryObjectStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            inner: Mutex::new(Inner::default()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned lock only means a test panicked mid-update; the map is still usable.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Store bytes under `key`, as a client PUT to the signed URL would.
    pub fn put_object(&self, key: &str, data: impl Into<Vec<u8>>) {
        self.lock().objects.insert(key.to_string(), data.into());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().objects.contains_key(key)
    }

    /// Every pre-signed PUT issued so far, oldest first.
    pub fn issued(&self) -> Vec<IssuedPut> {
        self.lock().issued.clone()
    }

    /// Every key a delete was attempted for, including failed attempts.
    pub fn delete_attempts(&self) -> Vec<String> {
        self.lock().deleted.clone()
    }

    /// Make subsequent deletes fail with a backend error.
    pub fn set_fail_deletes(&self, fail: bool) {
        self.lock().fail_deletes = fail;
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn presign_put(&self, target: PutTarget<'_>) -> Result<String, StorageError> {
        let expires_in_secs = target.expires_in.as_secs();
        self.lock().issued.push(IssuedPut {
            key: target.key.to_string(),
            content_type: target.content_type.to_string(),
            content_length: target.content_length,
            owner_id: target.owner_id.to_string(),
            expires_in_secs,
        });
        Ok(format!(
            "{}?X-Amz-Expires={expires_in_secs}&X-Amz-Signature=memory",
            object_url(&self.base_url, target.key)
        ))
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let mut inner = self.lock();
        inner.deleted.push(key.to_string());
        if inner.fail_deletes {
            return Err(StorageError::Backend(format!("delete of {key} refused")));
        }
        inner.objects.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.contains(key))
    }
}
