use crate::StorageError;
use bytes::Bytes;

/// Remote object store scoped to one user's private namespace.
///
/// Keys are flat file names; the backend maps them under its namespace.
/// No retries or timeouts are layered on top of the underlying client.
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    /// Stores `data` under `name`, replacing any existing object
    async fn upload(&self, name: &str, data: Bytes) -> Result<(), StorageError>;

    /// Fetches the object stored under `name`
    async fn download(&self, name: &str) -> Result<Bytes, StorageError>;

    /// Deletes `name`; deleting a missing object succeeds
    async fn delete(&self, name: &str) -> Result<(), StorageError>;

    /// Names in the namespace starting with `prefix` ("" lists everything)
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError>;

    /// Namespace every key lives under
    fn namespace(&self) -> &str;
}

/// Per-user namespace, "private/{identity_id}"
pub fn private_namespace(identity_id: &str) -> String {
    snapvault_utils::join_key(&["private", identity_id])
}
