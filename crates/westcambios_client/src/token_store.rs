use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use westcambios_error::error::ApiError;

/// File-backed session token. One JSON document with a single
/// `access_token` key, written on login and removed on logout.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: &Path) -> Self {
        TokenStore {
            path: path.to_path_buf(),
        }
    }

    /// Read the stored token. Missing or unreadable files count as
    /// not logged in.
    pub fn load(&self) -> Option<String> {
        let contents = fs::read_to_string(&self.path).ok()?;
        let value = serde_json::from_str::<serde_json::Value>(&contents).ok()?;

        value["access_token"].as_str().map(|token| token.to_string())
    }

    pub fn save(&self, token: &str) -> Result<(), ApiError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ApiError::Error(format!("Failed to create token directory with error: {}", e))
            })?;
        }

        let contents = json!({ "access_token": token }).to_string();

        fs::write(&self.path, contents)
            .map_err(|e| ApiError::Error(format!("Failed to write token with error: {}", e)))
    }

    pub fn clear(&self) -> Result<(), ApiError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ApiError::Error(format!(
                "Failed to remove token with error: {}",
                e
            ))),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(&dir.path().join("nested").join("credentials.json"));

        assert!(store.load().is_none());

        store.save("abc123").unwrap();
        assert_eq!(store.load(), Some("abc123".to_string()));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(&dir.path().join("credentials.json"));

        store.save("abc123").unwrap();
        store.clear().unwrap();
        assert!(store.load().is_none());

        // second clear finds nothing to remove
        store.clear().unwrap();
    }

    #[test]
    fn test_load_ignores_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, "not json").unwrap();

        let store = TokenStore::new(&path);
        assert!(store.load().is_none());
    }
}
