use super::defaults::DEFAULT_CONFIG_TEMPLATE;
use super::errors::ConfigError;
use super::migration::migrate_config_if_needed;
use super::models::{BackendKind, Config};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

impl Config {
    /// Loads configuration from a file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Self::from_file_with_events(path, None).await
    }

    /// Loads configuration from a file with optional event bus for notifications
    pub async fn from_file_with_events<P: AsRef<Path>>(
        path: P,
        events: Option<&Arc<snapvault_events::EventBus>>,
    ) -> anyhow::Result<Self> {
        let path = path.as_ref();

        // Create default config if it doesn't exist
        if !path.exists() {
            create_default_config(path).await?;
        }

        // Migrate config if needed
        migrate_config_if_needed(path, events).await?;

        // Read and parse config
        let content = tokio::fs::read_to_string(path).await?;
        let config = Self::parse(&content)?;

        Ok(config)
    }

    /// Parses and validates configuration text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.local_dir.trim().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "storage.local_dir must not be empty".to_string(),
            ));
        }

        match self.storage.backend {
            BackendKind::Directory => {
                if self.storage.remote_dir.trim().is_empty() {
                    return Err(ConfigError::InvalidConfig(
                        "storage.remote_dir must not be empty".to_string(),
                    ));
                }
                if Path::new(&self.storage.remote_dir) == Path::new(&self.storage.local_dir) {
                    return Err(ConfigError::InvalidConfig(
                        "storage.remote_dir must differ from storage.local_dir".to_string(),
                    ));
                }
            }
            BackendKind::S3 => {
                if !self.storage.s3.enabled {
                    return Err(ConfigError::InvalidConfig(
                        "S3 backend selected but storage.s3.enabled is false".to_string(),
                    ));
                }
                if self.storage.s3.bucket_name.trim().is_empty() {
                    return Err(ConfigError::InvalidConfig(
                        "storage.s3.bucket_name must not be empty".to_string(),
                    ));
                }
            }
        }

        let mut seen = HashSet::new();
        for user in &self.users {
            if !seen.insert(user.username.as_str()) {
                return Err(ConfigError::DuplicateUser(user.username.clone()));
            }
        }

        Ok(())
    }
}

/// Creates a default configuration file
async fn create_default_config<P: AsRef<Path>>(path: P) -> anyhow::Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::write(path, DEFAULT_CONFIG_TEMPLATE).await?;
    Ok(())
}
