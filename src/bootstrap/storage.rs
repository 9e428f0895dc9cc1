use snapvault_config::{BackendKind, Config};
use snapvault_storage::{DirectoryBackend, StorageBackend};
#[cfg(feature = "s3")]
use snapvault_storage::S3Backend;
use anyhow::Result;
use std::sync::Arc;

/// Connects the remote store for one signed-in identity
pub async fn connect(config: &Config, identity_id: &str) -> Result<Arc<dyn StorageBackend>> {
    match config.storage.backend {
        BackendKind::Directory => {
            let backend = DirectoryBackend::from_settings(&config.storage, identity_id).await?;
            tracing::info!("Directory storage backend at {}", backend.dir().display());
            Ok(Arc::new(backend) as Arc<dyn StorageBackend>)
        }
        #[cfg(feature = "s3")]
        BackendKind::S3 => {
            let backend = S3Backend::from_settings(&config.storage.s3, identity_id).await?;

            tracing::info!(
                "Initialized S3 storage backend: bucket={}, endpoint={}",
                config.storage.s3.bucket_name,
                config.storage.s3.endpoint_url
            );

            Ok(Arc::new(backend) as Arc<dyn StorageBackend>)
        }
        #[cfg(not(feature = "s3"))]
        BackendKind::S3 => {
            anyhow::bail!(
                "S3 backend selected but not compiled. Rebuild with --features s3 to enable S3 support."
            )
        }
    }
}
