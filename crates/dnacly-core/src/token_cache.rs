// Plain-text token cache
//
// The cache file holds the bare token and nothing else, so a token
// obtained by one invocation can be reused by the next.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::error::CoreError;

#[derive(Debug, Clone)]
pub struct TokenCache {
    path: PathBuf,
}

impl TokenCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The cached token, or `None` when the file is absent or blank.
    pub fn load(&self) -> Result<Option<SecretString>, CoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => {
                let token = raw.trim();
                if token.is_empty() {
                    Ok(None)
                } else {
                    debug!(path = %self.path.display(), "loaded cached token");
                    Ok(Some(SecretString::from(token.to_owned())))
                }
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CoreError::io(&self.path, e)),
        }
    }

    /// Overwrite the cache with `token`.
    pub fn store(&self, token: &SecretString) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| CoreError::io(parent, e))?;
        }
        std::fs::write(&self.path, token.expose_secret())
            .map_err(|e| CoreError::io(&self.path, e))?;
        debug!(path = %self.path.display(), "token cached");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_empty_cache() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = TokenCache::new(dir.path().join("token.tk"));
        assert!(cache.load().expect("load").is_none());
    }

    #[test]
    fn store_then_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = TokenCache::new(dir.path().join("nested").join("token.tk"));

        cache
            .store(&SecretString::from("eyJhbGciOi".to_owned()))
            .expect("store");

        let loaded = cache.load().expect("load").expect("token present");
        assert_eq!(loaded.expose_secret(), "eyJhbGciOi");
    }

    #[test]
    fn trailing_newline_is_ignored() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("token.tk");
        std::fs::write(&path, "abc\n").expect("write");

        let loaded = TokenCache::new(&path).load().expect("load");
        assert_eq!(loaded.map(|t| t.expose_secret().to_owned()).as_deref(), Some("abc"));
    }
}
