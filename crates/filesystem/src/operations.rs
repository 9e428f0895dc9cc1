use super::errors::FileSystemError;
use super::models::LocalStore;
use bytes::Bytes;
use snapvault_utils::validate_file_name;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use walkdir::WalkDir;

type Result<T> = std::result::Result<T, FileSystemError>;

impl LocalStore {
    /// Opens the store rooted at `root`, creating the directory if needed
    pub async fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = Self::get_absolute_path(root.as_ref())?;
        if !root.exists() {
            fs::create_dir_all(&root).await?;
            tracing::debug!("    Created: {} (local store)", root.display());
        } else {
            tracing::debug!("    Exists:  {} (local store)", root.display());
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, name: &str) -> Result<PathBuf> {
        Ok(self.root.join(validate_file_name(name)?))
    }

    pub async fn write(&self, name: &str, data: &[u8]) -> Result<()> {
        let path = self.path_for(name)?;
        fs::write(&path, data).await?;
        tracing::debug!("Wrote {} bytes to {}", data.len(), path.display());
        Ok(())
    }

    pub async fn read(&self, name: &str) -> Result<Bytes> {
        let path = self.path_for(name)?;
        let data = fs::read(&path).await?;
        Ok(Bytes::from(data))
    }

    /// Removes `name`; returns false when there was nothing to remove
    pub async fn delete(&self, name: &str) -> Result<bool> {
        let path = self.path_for(name)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!("Removed local file {}", path.display());
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn exists(&self, name: &str) -> Result<bool> {
        let path = self.path_for(name)?;
        Ok(fs::try_exists(&path).await?)
    }

    /// Names of every regular file directly inside the store, sorted
    pub async fn list(&self) -> Result<Vec<String>> {
        let root = self.root.clone();

        let names = tokio::task::spawn_blocking(move || -> Result<Vec<String>> {
            let mut names = Vec::new();
            for entry in WalkDir::new(&root).min_depth(1).max_depth(1) {
                let entry = entry?;
                if entry.file_type().is_file() {
                    if let Some(name) = entry.file_name().to_str() {
                        names.push(name.to_string());
                    }
                }
            }
            names.sort();
            Ok(names)
        })
        .await??;

        Ok(names)
    }

    fn get_absolute_path(path: &Path) -> Result<PathBuf> {
        let abs_path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()?.join(path)
        };
        Ok(abs_path)
    }
}
