use thiserror::Error;

/// Image types accepted for recipe media unless configured otherwise.
pub const DEFAULT_ACCEPTED_IMAGE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/svg+xml",
    "image/jpg",
];

/// Why an upload request was refused before any credential was issued.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyViolation {
    #[error("content type {0} is not accepted")]
    UnsupportedType(String),
    #[error("file of {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: u64, limit: u64 },
    #[error("file is empty")]
    Empty,
}

/// Content-type allow-list and size ceiling for one upload call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    accepted_types: Vec<String>,
    max_bytes: u64,
}

impl UploadPolicy {
    pub fn new<I, S>(accepted_types: I, max_bytes: u64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            accepted_types: accepted_types.into_iter().map(Into::into).collect(),
            max_bytes,
        }
    }

    /// Policy with [`DEFAULT_ACCEPTED_IMAGE_TYPES`] and the given ceiling.
    pub fn images(max_bytes: u64) -> Self {
        Self::new(DEFAULT_ACCEPTED_IMAGE_TYPES.iter().copied(), max_bytes)
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    pub fn accepts(&self, mime_type: &str) -> bool {
        self.accepted_types.iter().any(|t| t == mime_type)
    }

    /// Type is checked before size so an oversized non-image reports the type.
    pub fn check(&self, mime_type: &str, size: u64) -> Result<(), PolicyViolation> {
        if !self.accepts(mime_type) {
            return Err(PolicyViolation::UnsupportedType(mime_type.to_string()));
        }
        if size == 0 {
            return Err(PolicyViolation::Empty);
        }
        if size > self.max_bytes {
            return Err(PolicyViolation::TooLarge {
                size,
                limit: self.max_bytes,
            });
        }
        Ok(())
    }
}
