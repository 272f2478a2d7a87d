//! Port for banner image storage.

use async_trait::async_trait;

use crate::domain::ImageName;

use super::define_port_error;

define_port_error! {
    /// Errors raised by image store adapters.
    pub enum ImageStoreError {
        /// Reading or writing the backing store failed.
        Io { message: String } => "image store failed: {message}",
    }
}

/// Byte storage keyed by [`ImageName`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist `bytes` under `name`, replacing any existing file.
    async fn save(&self, name: &ImageName, bytes: &[u8]) -> Result<(), ImageStoreError>;

    /// Read a stored image; `None` when it does not exist.
    async fn load(&self, name: &ImageName) -> Result<Option<Vec<u8>>, ImageStoreError>;

    /// Remove a stored image. Missing files are not an error.
    async fn remove(&self, name: &ImageName) -> Result<(), ImageStoreError>;
}
