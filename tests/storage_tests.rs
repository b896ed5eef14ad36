use portal_nav::{
    auth::{StaticToken, StoredToken, TokenProvider},
    storage::{FileStore, KeyValueStore, MemoryStore, StorageError},
};
use std::{env, fs, path::PathBuf, sync::Arc};
use uuid::Uuid;

fn temp_session_file() -> PathBuf {
    env::temp_dir().join(format!("portal-nav-session-{}.json", Uuid::new_v4()))
}

#[cfg(test)]
mod memory_tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("jwtToken").unwrap(), None);

        store.set("jwtToken", "abc").unwrap();
        assert_eq!(store.get("jwtToken").unwrap().as_deref(), Some("abc"));

        store.remove("jwtToken").unwrap();
        assert_eq!(store.get("jwtToken").unwrap(), None);
    }

    #[test]
    fn test_memory_store_seeded_entry() {
        let store = MemoryStore::with_entry("jwtToken", "seed");
        assert_eq!(store.get("jwtToken").unwrap().as_deref(), Some("seed"));
        assert_eq!(store.get("other").unwrap(), None);
    }
}

#[cfg(test)]
mod file_tests {
    use super::*;

    #[test]
    fn test_missing_file_reads_as_empty() {
        let store = FileStore::new(temp_session_file());
        assert_eq!(store.get("jwtToken").unwrap(), None);
        // Removing from an empty store does not create the file.
        store.remove("jwtToken").unwrap();
        assert!(!store.path().exists());
    }

    #[test]
    fn test_file_store_persists_between_instances() {
        let path = temp_session_file();
        FileStore::new(&path).set("jwtToken", "persisted").unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get("jwtToken").unwrap().as_deref(), Some("persisted"));

        reopened.remove("jwtToken").unwrap();
        assert_eq!(FileStore::new(&path).get("jwtToken").unwrap(), None);

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let path = temp_session_file();
        fs::write(&path, "not json").unwrap();

        let result = FileStore::new(&path).get("jwtToken");
        assert!(matches!(result, Err(StorageError::Corrupt { .. })));

        fs::remove_file(&path).ok();
    }
}

#[cfg(test)]
mod token_tests {
    use super::*;

    #[test]
    fn test_stored_token_reads_configured_key() {
        let store = Arc::new(MemoryStore::with_entry("jwtToken", "abc"));
        let provider = StoredToken::new(store.clone(), "jwtToken");
        assert_eq!(provider.key(), "jwtToken");
        assert_eq!(provider.current_token().as_deref(), Some("abc"));

        let other_key = StoredToken::new(store, "sessionToken");
        assert_eq!(other_key.current_token(), None);
    }

    #[test]
    fn test_stored_blank_token_is_absent() {
        let store = Arc::new(MemoryStore::with_entry("jwtToken", "  "));
        assert_eq!(StoredToken::new(store, "jwtToken").current_token(), None);
    }

    #[test]
    fn test_unreadable_store_is_absent() {
        let path = temp_session_file();
        fs::write(&path, "[1, 2, 3]").unwrap();

        let provider = StoredToken::new(Arc::new(FileStore::new(&path)), "jwtToken");
        assert_eq!(provider.current_token(), None);

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_static_token() {
        assert_eq!(StaticToken::present(" t ").current_token().as_deref(), Some("t"));
        assert_eq!(StaticToken::absent().current_token(), None);
        assert_eq!(StaticToken::new(Some(String::new())).current_token(), None);
    }
}
