//! Banner image uploads and stored image names.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Extensions accepted for banner images (compared case-insensitively).
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];
/// Default upload limit: 2 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 2 * 1024 * 1024;

/// Validation errors for uploads and stored names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageValidationError {
    /// The filename has no usable characters once sanitised.
    #[error("image filename is empty")]
    EmptyFilename,
    /// The extension is not an accepted image type.
    #[error("image must be one of: png, jpg, jpeg, gif")]
    UnsupportedExtension,
    /// The upload had no content.
    #[error("image file is empty")]
    EmptyFile,
    /// The upload exceeded the configured limit.
    #[error("image exceeds the {limit} byte upload limit")]
    TooLarge {
        /// Configured limit in bytes.
        limit: usize,
    },
    /// A stored name did not match the generated-name shape.
    #[error("invalid image name")]
    InvalidName,
}

/// Reduce an uploaded filename to a safe form.
///
/// Directory components are dropped, whitespace becomes `_`, anything other
/// than ASCII alphanumerics, `.`, `-` and `_` is removed, and leading dots and
/// underscores are stripped.
///
/// # Examples
/// ```
/// use newsroom::domain::secure_filename;
///
/// assert_eq!(secure_filename("../../etc/My Photo.PNG"), "My_Photo.PNG");
/// assert_eq!(secure_filename("..."), "");
/// ```
pub fn secure_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let joined = base.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-' | '_'))
        .collect();
    kept.trim_start_matches(['.', '_'])
        .trim_end_matches(['.', '_'])
        .to_owned()
}

fn extension_of(name: &str) -> Option<String> {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

/// An accepted banner image upload.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    file_name: String,
    bytes: Vec<u8>,
}

impl ImageUpload {
    /// Validate an uploaded file against the extension allow-list and size limit.
    pub fn new(
        original_name: &str,
        bytes: Vec<u8>,
        max_bytes: usize,
    ) -> Result<Self, ImageValidationError> {
        let file_name = secure_filename(original_name);
        if file_name.is_empty() {
            return Err(ImageValidationError::EmptyFilename);
        }
        if extension_of(&file_name).is_none() {
            return Err(ImageValidationError::UnsupportedExtension);
        }
        if bytes.is_empty() {
            return Err(ImageValidationError::EmptyFile);
        }
        if bytes.len() > max_bytes {
            return Err(ImageValidationError::TooLarge { limit: max_bytes });
        }
        Ok(Self { file_name, bytes })
    }

    /// Sanitised original filename.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// File content.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Name of a stored banner image: `<uuid-v4>_<secure filename>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImageName(String);

impl ImageName {
    /// Generate a fresh, collision-free name for an upload.
    pub fn for_upload(upload: &ImageUpload) -> Self {
        Self(format!("{}_{}", Uuid::new_v4(), upload.file_name()))
    }

    /// Validate a stored name, for example one taken from a request path.
    ///
    /// Only names that survive [`secure_filename`] unchanged and carry an
    /// accepted extension are valid, which rules out path traversal.
    pub fn new(raw: impl Into<String>) -> Result<Self, ImageValidationError> {
        let raw = raw.into();
        if raw.is_empty() || secure_filename(&raw) != raw {
            return Err(ImageValidationError::InvalidName);
        }
        if extension_of(&raw).is_none() {
            return Err(ImageValidationError::UnsupportedExtension);
        }
        Ok(Self(raw))
    }

    /// MIME type derived from the extension.
    pub fn content_type(&self) -> &'static str {
        match extension_of(&self.0).as_deref() {
            Some("png") => "image/png",
            Some("gif") => "image/gif",
            Some("jpg" | "jpeg") => "image/jpeg",
            _ => "application/octet-stream",
        }
    }
}

impl AsRef<str> for ImageName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ImageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ImageName> for String {
    fn from(value: ImageName) -> Self {
        value.0
    }
}

impl TryFrom<String> for ImageName {
    type Error = ImageValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
