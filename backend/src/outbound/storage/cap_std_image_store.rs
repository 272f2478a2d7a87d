//! Banner image store rooted in a capability-scoped directory.
//!
//! All paths resolve relative to the upload directory handle, so a stored
//! name can never address a file outside it. Writes go to a staging file and
//! are renamed into place.

use std::io;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use uuid::Uuid;

use crate::domain::ImageName;
use crate::domain::ports::{ImageStore, ImageStoreError};

/// [`ImageStore`] backed by a directory on the local filesystem.
#[derive(Clone)]
pub struct CapStdImageStore {
    dir: Arc<Dir>,
}

impl CapStdImageStore {
    /// Open `path`, creating it when missing.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        Dir::create_ambient_dir_all(path, ambient_authority())?;
        let dir = Dir::open_ambient_dir(path, ambient_authority())?;
        Ok(Self { dir: Arc::new(dir) })
    }

    async fn blocking<T, F>(
        &self,
        op: &'static str,
        name: &ImageName,
        work: F,
    ) -> Result<T, ImageStoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Dir, &str) -> io::Result<T> + Send + 'static,
    {
        let dir = Arc::clone(&self.dir);
        let file = name.to_string();
        let label = file.clone();
        tokio::task::spawn_blocking(move || work(&dir, &file))
            .await
            .map_err(|err| ImageStoreError::io(format!("{op} {label}: {err}")))?
            .map_err(|err| ImageStoreError::io(format!("{op} {label}: {err}")))
    }
}

fn write_replacing(dir: &Dir, file: &str, bytes: &[u8]) -> io::Result<()> {
    let staging = format!(".upload-{}", Uuid::new_v4().simple());
    if let Err(err) = dir.write(&staging, bytes) {
        let _cleanup = dir.remove_file(&staging);
        return Err(err);
    }
    dir.rename(&staging, dir, file).inspect_err(|_| {
        let _cleanup = dir.remove_file(&staging);
    })
}

fn read_if_present(dir: &Dir, file: &str) -> io::Result<Option<Vec<u8>>> {
    match dir.read(file) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

fn remove_if_present(dir: &Dir, file: &str) -> io::Result<()> {
    match dir.remove_file(file) {
        Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
        _ => Ok(()),
    }
}

#[async_trait]
impl ImageStore for CapStdImageStore {
    async fn save(&self, name: &ImageName, bytes: &[u8]) -> Result<(), ImageStoreError> {
        let bytes = bytes.to_vec();
        self.blocking("write", name, move |dir, file| write_replacing(dir, file, &bytes))
            .await
    }

    async fn load(&self, name: &ImageName) -> Result<Option<Vec<u8>>, ImageStoreError> {
        self.blocking("read", name, read_if_present).await
    }

    async fn remove(&self, name: &ImageName) -> Result<(), ImageStoreError> {
        self.blocking("remove", name, remove_if_present).await
    }
}
