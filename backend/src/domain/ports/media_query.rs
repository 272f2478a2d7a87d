//! Driving port for serving stored banner images.

use async_trait::async_trait;

use crate::domain::{Error, ImageName};

/// Image bytes with the content type derived from the file extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    /// File content.
    pub bytes: Vec<u8>,
    /// MIME type sent with the bytes.
    pub content_type: &'static str,
}

/// Domain use-case port for reading banner images.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaQuery: Send + Sync {
    /// Load an image; missing files fail with
    /// [`crate::domain::ErrorCode::NotFound`].
    async fn load_image(&self, name: &ImageName) -> Result<StoredImage, Error>;
}
