/// Default values for configuration fields

pub fn local_dir() -> String {
    "snapvault/files".to_string()
}

pub fn backend_kind() -> super::models::BackendKind {
    super::models::BackendKind::Directory
}

pub fn remote_dir() -> String {
    "snapvault/cloud".to_string()
}

pub fn s3_region() -> String {
    "auto".to_string()
}

pub fn s3_bucket_name() -> String {
    "snapvault-media".to_string()
}

pub fn s3_settings() -> super::models::S3Settings {
    super::models::S3Settings {
        enabled: false,
        endpoint_url: String::new(),
        region: s3_region(),
        access_key_id: String::new(),
        secret_access_key: String::new(),
        bucket_name: s3_bucket_name(),
        bucket_prefix: String::new(),
    }
}

pub fn purge_remote_duplicates() -> bool {
    true
}

pub fn purge_untracked_local() -> bool {
    true
}

pub fn tracker_settings() -> super::models::TrackerSettings {
    super::models::TrackerSettings {
        purge_remote_duplicates: purge_remote_duplicates(),
        purge_untracked_local: purge_untracked_local(),
    }
}

pub fn auth_region() -> String {
    "us-east-1".to_string()
}

pub fn auth_settings() -> super::models::AuthSettings {
    super::models::AuthSettings {
        region: auth_region(),
    }
}

pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# ===============================================================================
# SnapVault Configuration
# ===============================================================================

[storage]
local_dir = "snapvault/files"        # App-private directory for locally saved images
backend = "directory"                # Cloud backend: "directory" or "s3"
remote_dir = "snapvault/cloud"       # Bucket emulation root (only used if backend = "directory")

# S3 Configuration (only used if backend = "s3")
[storage.s3]
enabled = false                      # Enable S3 storage backend
endpoint_url = ""                    # S3 endpoint (e.g., https://s3.amazonaws.com)
region = "auto"                      # S3 region (e.g., us-east-1 or "auto")
access_key_id = ""                   # AWS Access Key ID
secret_access_key = ""               # AWS Secret Access Key
bucket_name = "snapvault-media"      # S3 bucket name
bucket_prefix = ""                   # Prefix for all S3 keys (optional)

# ===============================================================================
# LOCATION TRACKING
# ===============================================================================
[tracker]
purge_remote_duplicates = true       # Remove cloud copies of files that live locally
purge_untracked_local = true         # Remove local files no entry refers to

# ===============================================================================
# AUTHENTICATION
# ===============================================================================
[auth]
region = "us-east-1"                 # Identity ids are "<region>:<sha1(username)>"

# Expected password format: lowercase hex SHA-1 of the password

#[[users]]
#username = "demo"
#password_sha1 = "5baa61e4c9b93f3f0682250b6cf8331b7ee68fd8"   # "password"
#confirmed = false                   # First login asks for an email
"#;
