use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

use sha2::{Digest, Sha256};

use crate::{Result, constants::CACHE_DIR_CHARS};

/// Text blobs on disk, one file per key, addressed by the SHA-256 of the key
/// and fanned out over a two-level directory tree.
#[derive(Clone, Debug)]
pub struct FileCache {
    root: PathBuf,
}

impl FileCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// A cache rooted in a sub-directory of this one.
    pub fn namespace(&self, name: &str) -> Self {
        Self::new(self.root.join(name))
    }

    pub fn key_hash(key: &str) -> String {
        format!("{:x}", Sha256::digest(key.as_bytes()))
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        let hash = Self::key_hash(key);
        let (dir, file) = hash.split_at(CACHE_DIR_CHARS);
        self.root.join(dir).join(file)
    }

    pub fn read(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    pub fn write(&self, key: &str, data: &str) -> Result<()> {
        let path = self.path_for(key);
        ensure_parent(&path)?;
        fs::write(&path, data)?;
        log::trace!("cache: write path={}", path.display());
        Ok(())
    }

    /// Writes only when no file exists yet. Returns `false` if one did.
    pub fn write_new(&self, key: &str, data: &str) -> Result<bool> {
        let path = self.path_for(key);
        ensure_parent(&path)?;
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
            Err(err) => return Err(err.into()),
        };
        file.write_all(data.as_bytes())?;
        log::trace!("cache: write_new path={}", path.display());
        Ok(true)
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => {
                log::debug!("cache: removed path={}", path.display());
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}
