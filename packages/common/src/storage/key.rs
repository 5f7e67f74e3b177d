use rand::RngCore;

/// Number of random bytes behind a generated object key.
pub const KEY_BYTES: usize = 32;

/// Longest key accepted from clients.
pub const MAX_KEY_LEN: usize = 256;

/// Result of validating a flat object key.
#[derive(Debug, PartialEq, Eq)]
pub enum KeyError {
    /// Key is empty or whitespace-only.
    Empty,
    /// Key exceeds [`MAX_KEY_LEN`] bytes.
    TooLong,
    /// Key contains `/` or `\`.
    ContainsPathSeparator,
    /// Key is `.` or `..`.
    PathTraversal,
    /// Key contains whitespace or control characters.
    InvalidCharacter,
}

impl KeyError {
    /// Returns a human-readable error message.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "File name cannot be empty",
            Self::TooLong => "File name is too long",
            Self::ContainsPathSeparator => "Invalid file name: path separators are not allowed",
            Self::PathTraversal => "Invalid file name: '.' and '..' are not allowed",
            Self::InvalidCharacter => {
                "Invalid file name: whitespace and control characters are not allowed"
            }
        }
    }
}

/// Generate a fresh object key: [`KEY_BYTES`] random bytes, hex-encoded.
///
/// The key doubles as the media id and, on creation, the recipe id.
pub fn generate_object_key() -> String {
    let mut bytes = [0u8; KEY_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Validates a client-supplied object key. Keys live at the bucket root.
pub fn validate_object_key(key: &str) -> Result<&str, KeyError> {
    if key.trim().is_empty() {
        return Err(KeyError::Empty);
    }
    if key.len() > MAX_KEY_LEN {
        return Err(KeyError::TooLong);
    }
    if key.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(KeyError::InvalidCharacter);
    }
    if key.contains('/') || key.contains('\\') {
        return Err(KeyError::ContainsPathSeparator);
    }
    if key == "." || key == ".." {
        return Err(KeyError::PathTraversal);
    }
    Ok(key)
}

/// Public URL of the object stored under `key`.
pub fn object_url(base_url: &str, key: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), key)
}

/// Recover the object key from a stored public URL (its last path segment).
pub fn object_key_from_url(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/').next().filter(|segment| !segment.is_empty())
}
