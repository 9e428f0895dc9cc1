use sha1::{Digest, Sha1};

/// Lowercase hex SHA-1 of an in-memory buffer
pub fn sha1_hex<B: AsRef<[u8]>>(data: B) -> String {
    let mut hasher = Sha1::new();
    hasher.update(data.as_ref());
    hex::encode(hasher.finalize())
}
