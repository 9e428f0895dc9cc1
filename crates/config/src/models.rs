use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub storage: StorageSettings,
    #[serde(default = "super::defaults::tracker_settings")]
    pub tracker: TrackerSettings,
    #[serde(default = "super::defaults::auth_settings")]
    pub auth: AuthSettings,
    #[serde(default)]
    pub users: Vec<UserConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    /// App-scoped flat directory holding locally saved images
    pub local_dir: String,
    #[serde(default = "super::defaults::backend_kind")]
    pub backend: BackendKind,
    /// Root of the directory-backed object store
    #[serde(default = "super::defaults::remote_dir")]
    pub remote_dir: String,
    #[serde(default = "super::defaults::s3_settings")]
    pub s3: S3Settings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Directory,
    S3,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct S3Settings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub endpoint_url: String,
    #[serde(default = "super::defaults::s3_region")]
    pub region: String,
    #[serde(default)]
    pub access_key_id: String,
    #[serde(default)]
    pub secret_access_key: String,
    #[serde(default = "super::defaults::s3_bucket_name")]
    pub bucket_name: String,
    #[serde(default)]
    pub bucket_prefix: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackerSettings {
    /// Issue a remote delete for every locally tracked file during reconcile
    #[serde(default = "super::defaults::purge_remote_duplicates")]
    pub purge_remote_duplicates: bool,
    /// Delete local files the registry does not know about during reconcile
    #[serde(default = "super::defaults::purge_untracked_local")]
    pub purge_untracked_local: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthSettings {
    /// Prefix of every identity id, mirrors the identity pool region
    #[serde(default = "super::defaults::auth_region")]
    pub region: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserConfig {
    pub username: String,
    pub password_sha1: String,
    /// First-time users must confirm their sign-in with an email
    #[serde(default)]
    pub confirmed: bool,
}
