use base64::{engine::general_purpose, Engine as _};
use sha2::{Digest, Sha256};

/// Base64-encoded SHA-256 of a file's current contents. Returns `None` when the path
/// doesn't exist (a file about to be created has no pre-hash).
pub fn hash_file(path: &std::path::Path) -> std::io::Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    let bytes = std::fs::read(path)?;
    Ok(Some(hash_bytes(&bytes)))
}

pub fn hash_bytes(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    general_purpose::STANDARD.encode(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vector_matches() {
        // sha256("") base64-encoded.
        assert_eq!(hash_bytes(b""), "47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU=");
    }

    #[test]
    fn missing_path_has_no_hash() {
        let result = hash_file(std::path::Path::new("/nonexistent/path/for/tests")).unwrap();
        assert!(result.is_none());
    }
}
