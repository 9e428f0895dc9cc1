use crate::UtilsError;

/// Checks that `name` is a single flat file name usable in both the local
/// app directory and the remote per-user namespace.
pub fn validate_file_name(name: &str) -> Result<&str, UtilsError> {
    if name.is_empty() {
        return Err(UtilsError::EmptyName);
    }
    if name.contains('/') || name.contains('\\') {
        return Err(UtilsError::PathSeparator(name.to_string()));
    }
    if name == "." || name == ".." || name.contains('\0') {
        return Err(UtilsError::ReservedName(name.to_string()));
    }
    Ok(name)
}

/// Last component of a slash or backslash separated path
pub fn base_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Joins object-key segments with '/', skipping empty ones
pub fn join_key(segments: &[&str]) -> String {
    segments
        .iter()
        .map(|s| s.trim_matches('/'))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_file_name() {
        assert_eq!(validate_file_name("cat.png"), Ok("cat.png"));
        assert_eq!(validate_file_name(""), Err(UtilsError::EmptyName));
        assert!(matches!(validate_file_name("a/b.png"), Err(UtilsError::PathSeparator(_))));
        assert!(matches!(validate_file_name("a\\b.png"), Err(UtilsError::PathSeparator(_))));
        assert!(matches!(validate_file_name(".."), Err(UtilsError::ReservedName(_))));
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("/sdcard/DCIM/cat.png"), "cat.png");
        assert_eq!(base_name("C:\\photos\\dog.jpg"), "dog.jpg");
        assert_eq!(base_name("plain.png"), "plain.png");
    }

    #[test]
    fn test_join_key() {
        assert_eq!(join_key(&["", "private", "us-east-1:abc", "cat.png"]), "private/us-east-1:abc/cat.png");
        assert_eq!(join_key(&["media/", "/private"]), "media/private");
    }
}
