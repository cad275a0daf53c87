/*
 * The host's per-user attribute store. The plugin keeps two kinds of rows in
 * it: the free-text profile template (`up_profile_page_text`) and one
 * visibility switch per statistic (`up_stat_<key>`). `delete_matching`
 * purges rows by key prefix across every user and exists solely for the
 * complete-uninstall path.
 *
 * `FileUserMetaStore` persists a JSON map of user id to attribute map under
 * a caller-supplied data directory, in the same read-modify-write style as
 * `FileOptionStore`.
 */
use serde_json;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};

const USER_META_FILENAME: &str = "user_meta.json";

/// Attribute key for the user's profile template text.
pub const META_TEMPLATE_TEXT: &str = "up_profile_page_text";
/// Attribute key prefix for per-statistic visibility switches.
pub const META_STAT_PREFIX: &str = "up_stat_";

#[derive(Debug)]
pub enum UserMetaError {
    Io(io::Error),
    Serde(serde_json::Error),
}

impl From<io::Error> for UserMetaError {
    fn from(err: io::Error) -> Self {
        UserMetaError::Io(err)
    }
}

impl From<serde_json::Error> for UserMetaError {
    fn from(err: serde_json::Error) -> Self {
        UserMetaError::Serde(err)
    }
}

impl std::fmt::Display for UserMetaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserMetaError::Io(e) => write!(f, "User meta I/O error: {e}"),
            UserMetaError::Serde(e) => write!(f, "User meta serialization error: {e}"),
        }
    }
}

impl std::error::Error for UserMetaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UserMetaError::Io(e) => Some(e),
            UserMetaError::Serde(e) => Some(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, UserMetaError>;

pub trait UserMetaOperations: Send + Sync {
    fn get_meta(&self, user_id: u64, key: &str) -> Result<Option<String>>;
    fn update_meta(&self, user_id: u64, key: &str, value: &str) -> Result<()>;
    fn delete_meta(&self, user_id: u64, key: &str) -> Result<()>;
    /// Removes every attribute whose key starts with `key_prefix`, across
    /// all users. Returns the number of rows removed.
    fn delete_matching(&self, key_prefix: &str) -> Result<usize>;
}

// JSON object keys must be strings, so user ids are stored stringified.
type MetaMap = BTreeMap<String, BTreeMap<String, String>>;

pub struct FileUserMetaStore {
    data_dir: PathBuf,
}

impl FileUserMetaStore {
    pub fn new(data_dir: &Path) -> Self {
        FileUserMetaStore {
            data_dir: data_dir.to_path_buf(),
        }
    }

    fn file_path(&self) -> PathBuf {
        self.data_dir.join(USER_META_FILENAME)
    }

    fn read_map(&self) -> Result<MetaMap> {
        let path = self.file_path();
        if !path.exists() {
            log::trace!("FileUserMetaStore: {path:?} does not exist yet, treating as empty.");
            return Ok(MetaMap::new());
        }
        let file = File::open(&path)?;
        let reader = BufReader::new(file);
        let map = serde_json::from_reader(reader)?;
        Ok(map)
    }

    fn write_map(&self, map: &MetaMap) -> Result<()> {
        fs::create_dir_all(&self.data_dir)?;
        let path = self.file_path();
        let file = File::create(&path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, map)?;
        Ok(())
    }
}

impl UserMetaOperations for FileUserMetaStore {
    fn get_meta(&self, user_id: u64, key: &str) -> Result<Option<String>> {
        let map = self.read_map()?;
        Ok(map
            .get(&user_id.to_string())
            .and_then(|attrs| attrs.get(key))
            .cloned())
    }

    fn update_meta(&self, user_id: u64, key: &str, value: &str) -> Result<()> {
        let mut map = self.read_map()?;
        map.entry(user_id.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
        self.write_map(&map)?;
        log::debug!("FileUserMetaStore: Updated '{key}' for user {user_id}.");
        Ok(())
    }

    fn delete_meta(&self, user_id: u64, key: &str) -> Result<()> {
        let mut map = self.read_map()?;
        let removed = map
            .get_mut(&user_id.to_string())
            .and_then(|attrs| attrs.remove(key))
            .is_some();
        if removed {
            self.write_map(&map)?;
            log::debug!("FileUserMetaStore: Deleted '{key}' for user {user_id}.");
        }
        Ok(())
    }

    fn delete_matching(&self, key_prefix: &str) -> Result<usize> {
        let mut map = self.read_map()?;
        let mut removed = 0;
        for attrs in map.values_mut() {
            let before = attrs.len();
            attrs.retain(|key, _| !key.starts_with(key_prefix));
            removed += before - attrs.len();
        }
        if removed > 0 {
            self.write_map(&map)?;
        }
        log::debug!(
            "FileUserMetaStore: Purged {removed} attributes matching prefix '{key_prefix}'."
        );
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_get_absent_meta_returns_none() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir for test");
        let store = FileUserMetaStore::new(temp_dir.path());

        assert!(store.get_meta(42, META_TEMPLATE_TEXT).unwrap().is_none());
    }

    #[test]
    fn test_update_get_and_delete_meta() -> Result<()> {
        let temp_dir = TempDir::new().expect("Failed to create temp dir for test");
        let store = FileUserMetaStore::new(temp_dir.path());

        store.update_meta(42, META_TEMPLATE_TEXT, "Hi, I'm [display_name].")?;
        store.update_meta(42, "up_stat_age", "on")?;
        store.update_meta(7, "up_stat_age", "off")?;

        assert_eq!(
            store.get_meta(42, META_TEMPLATE_TEXT)?,
            Some("Hi, I'm [display_name].".to_string())
        );
        assert_eq!(store.get_meta(7, "up_stat_age")?, Some("off".to_string()));

        store.delete_meta(42, META_TEMPLATE_TEXT)?;
        assert!(store.get_meta(42, META_TEMPLATE_TEXT)?.is_none());
        // The other user's rows are untouched.
        assert!(store.get_meta(7, "up_stat_age")?.is_some());
        Ok(())
    }

    #[test]
    fn test_delete_matching_purges_across_users() -> Result<()> {
        let temp_dir = TempDir::new().expect("Failed to create temp dir for test");
        let store = FileUserMetaStore::new(temp_dir.path());

        store.update_meta(42, META_TEMPLATE_TEXT, "text")?;
        store.update_meta(42, "up_stat_age", "on")?;
        store.update_meta(7, "up_stat_posts", "on")?;
        store.update_meta(7, "unrelated_key", "kept")?;

        let removed = store.delete_matching(META_STAT_PREFIX)?;

        assert_eq!(removed, 2);
        assert!(store.get_meta(42, "up_stat_age")?.is_none());
        assert!(store.get_meta(7, "up_stat_posts")?.is_none());
        // Non-plugin rows and the template row survive a stat purge.
        assert!(store.get_meta(7, "unrelated_key")?.is_some());
        assert!(store.get_meta(42, META_TEMPLATE_TEXT)?.is_some());
        Ok(())
    }

    #[test]
    fn test_meta_survives_a_new_store_instance() -> Result<()> {
        let temp_dir = TempDir::new().expect("Failed to create temp dir for test");
        {
            let store = FileUserMetaStore::new(temp_dir.path());
            store.update_meta(42, META_TEMPLATE_TEXT, "persisted")?;
        }

        let reopened = FileUserMetaStore::new(temp_dir.path());
        assert_eq!(
            reopened.get_meta(42, META_TEMPLATE_TEXT)?,
            Some("persisted".to_string())
        );
        Ok(())
    }
}
