use crate::backend::{private_namespace, StorageBackend};
use crate::StorageError;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::{primitives::ByteStream, Client};
use bytes::Bytes;
use snapvault_config::S3Settings;
use snapvault_utils::{join_key, validate_file_name};

/// S3-compatible storage backend
/// Compatible with: AWS S3, Cloudflare R2, MinIO, DigitalOcean Spaces, etc.
pub struct S3Backend {
    client: Client,
    bucket_name: String,
    /// "{bucket_prefix}/private/{identity_id}"
    namespace: String,
}

impl S3Backend {
    pub async fn new(
        endpoint_url: String,
        region: String,
        access_key_id: String,
        secret_access_key: String,
        bucket_name: String,
        bucket_prefix: String,
        identity_id: &str,
    ) -> Result<Self, StorageError> {
        let credentials = Credentials::new(
            access_key_id,
            secret_access_key,
            None,
            None,
            "snapvault-s3",
        );

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(Region::new(region));
        if !endpoint_url.is_empty() {
            loader = loader.endpoint_url(endpoint_url);
        }
        let config = loader.load().await;

        let client = Client::new(&config);
        let namespace = join_key(&[bucket_prefix.as_str(), private_namespace(identity_id).as_str()]);

        Ok(Self {
            client,
            bucket_name,
            namespace,
        })
    }

    pub async fn from_settings(settings: &S3Settings, identity_id: &str) -> Result<Self, StorageError> {
        if !settings.enabled {
            return Err(StorageError::ConfigError(
                "S3 backend selected but not enabled in configuration".to_string(),
            ));
        }

        Self::new(
            settings.endpoint_url.clone(),
            settings.region.clone(),
            settings.access_key_id.clone(),
            settings.secret_access_key.clone(),
            settings.bucket_name.clone(),
            settings.bucket_prefix.clone(),
            identity_id,
        )
        .await
    }

    fn build_key(&self, name: &str) -> Result<String, StorageError> {
        Ok(join_key(&[self.namespace.as_str(), validate_file_name(name)?]))
    }
}

#[async_trait::async_trait]
impl StorageBackend for S3Backend {
    async fn upload(&self, name: &str, data: Bytes) -> Result<(), StorageError> {
        let key = self.build_key(name)?;

        tracing::info!("Uploading {} to S3 bucket {}", key, self.bucket_name);

        self.client
            .put_object()
            .bucket(&self.bucket_name)
            .key(&key)
            .content_type("image/png")
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| StorageError::UploadError(key.clone(), e.to_string()))?;

        tracing::info!("Upload complete: {}", key);
        Ok(())
    }

    async fn download(&self, name: &str) -> Result<Bytes, StorageError> {
        let key = self.build_key(name)?;

        tracing::info!("Downloading {} from S3 bucket {}", key, self.bucket_name);

        let output = self
            .client
            .get_object()
            .bucket(&self.bucket_name)
            .key(&key)
            .send()
            .await
            .map_err(|e| StorageError::DownloadError(key.clone(), e.to_string()))?;

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| StorageError::S3SdkError(e.to_string()))?;

        Ok(data.into_bytes())
    }

    async fn delete(&self, name: &str) -> Result<(), StorageError> {
        let key = self.build_key(name)?;

        tracing::info!("Deleting {} from S3 bucket {}", key, self.bucket_name);

        self.client
            .delete_object()
            .bucket(&self.bucket_name)
            .key(&key)
            .send()
            .await
            .map_err(|e| StorageError::DeleteError(key.clone(), e.to_string()))?;

        tracing::info!("Delete complete: {}", key);
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let namespace_prefix = format!("{}/", self.namespace);
        let full_prefix = format!("{}{}", namespace_prefix, prefix);
        let mut names = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let output = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket_name)
                .prefix(&full_prefix)
                .set_continuation_token(continuation.take())
                .send()
                .await
                .map_err(|e| StorageError::ListError(full_prefix.clone(), e.to_string()))?;

            for object in output.contents() {
                if let Some(name) = object
                    .key()
                    .and_then(|key| key.strip_prefix(&namespace_prefix))
                {
                    // Only direct children belong to the flat namespace
                    if !name.is_empty() && !name.contains('/') {
                        names.push(name.to_string());
                    }
                }
            }

            match output.next_continuation_token() {
                Some(token) if output.is_truncated().unwrap_or(false) => {
                    continuation = Some(token.to_string());
                }
                _ => break,
            }
        }

        names.sort();
        Ok(names)
    }

    fn namespace(&self) -> &str {
        &self.namespace
    }
}
