use crate::backend::{private_namespace, StorageBackend};
use crate::StorageError;
use bytes::Bytes;
use snapvault_config::StorageSettings;
use snapvault_utils::validate_file_name;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Object store emulated on a local directory: `{root}/private/{identity}/{name}`.
///
/// Stands in for the cloud bucket when no S3 endpoint is configured.
pub struct DirectoryBackend {
    namespace: String,
    dir: PathBuf,
}

impl DirectoryBackend {
    pub async fn new(root: PathBuf, identity_id: &str) -> Result<Self, StorageError> {
        let namespace = private_namespace(identity_id);
        // ':' is not portable in directory names
        let dir = root.join("private").join(identity_id.replace(':', "_"));
        tokio::fs::create_dir_all(&dir).await?;

        tracing::debug!("Directory backend ready at {}", dir.display());

        Ok(Self { namespace, dir })
    }

    pub async fn from_settings(
        settings: &StorageSettings,
        identity_id: &str,
    ) -> Result<Self, StorageError> {
        Self::new(PathBuf::from(&settings.remote_dir), identity_id).await
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn object_path(&self, name: &str) -> Result<PathBuf, StorageError> {
        Ok(self.dir.join(validate_file_name(name)?))
    }
}

#[async_trait::async_trait]
impl StorageBackend for DirectoryBackend {
    async fn upload(&self, name: &str, data: Bytes) -> Result<(), StorageError> {
        let path = self.object_path(name)?;
        tracing::info!("Uploading {} to {}", name, self.namespace);

        tokio::fs::write(&path, &data)
            .await
            .map_err(|e| StorageError::UploadError(name.to_string(), e.to_string()))?;

        tracing::info!("Upload complete: {}/{}", self.namespace, name);
        Ok(())
    }

    async fn download(&self, name: &str) -> Result<Bytes, StorageError> {
        let path = self.object_path(name)?;

        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::FileNotFound(name.to_string()))
            }
            Err(e) => Err(StorageError::DownloadError(name.to_string(), e.to_string())),
        }
    }

    async fn delete(&self, name: &str) -> Result<(), StorageError> {
        let path = self.object_path(name)?;
        tracing::info!("Deleting {} from {}", name, self.namespace);

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::DeleteError(name.to_string(), e.to_string())),
        }
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let dir = self.dir.clone();
        let prefix = prefix.to_string();

        tokio::task::spawn_blocking(move || {
            let mut names = Vec::new();
            for entry in WalkDir::new(&dir).min_depth(1).max_depth(1) {
                let entry = entry.map_err(|e| StorageError::ListError(prefix.clone(), e.to_string()))?;
                if !entry.file_type().is_file() {
                    continue;
                }
                if let Some(name) = entry.file_name().to_str() {
                    if name.starts_with(&prefix) {
                        names.push(name.to_string());
                    }
                }
            }
            names.sort();
            Ok::<_, StorageError>(names)
        })
        .await
        .map_err(|e| StorageError::ListError(String::new(), e.to_string()))?
    }

    fn namespace(&self) -> &str {
        &self.namespace
    }
}
