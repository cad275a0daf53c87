/*
 * The host's persistent key-value configuration storage, abstracted behind
 * `OptionStoreOperations` so the coordinator can be tested against a mock.
 * Reads of absent keys return `Ok(None)`; the callers treat that as the
 * default rather than an error.
 *
 * `FileOptionStore` is the bundled implementation: a single JSON map file
 * (`options.json`) under a caller-supplied data directory. Each operation
 * reads the whole map, applies the change, and writes it back; per-key
 * atomicity is all the callers assume.
 */
use serde_json;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};

const OPTIONS_FILENAME: &str = "options.json";

#[derive(Debug)]
pub enum OptionStoreError {
    Io(io::Error),
    Serde(serde_json::Error),
}

impl From<io::Error> for OptionStoreError {
    fn from(err: io::Error) -> Self {
        OptionStoreError::Io(err)
    }
}

impl From<serde_json::Error> for OptionStoreError {
    fn from(err: serde_json::Error) -> Self {
        OptionStoreError::Serde(err)
    }
}

impl std::fmt::Display for OptionStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptionStoreError::Io(e) => write!(f, "Option store I/O error: {e}"),
            OptionStoreError::Serde(e) => write!(f, "Option store serialization error: {e}"),
        }
    }
}

impl std::error::Error for OptionStoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OptionStoreError::Io(e) => Some(e),
            OptionStoreError::Serde(e) => Some(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, OptionStoreError>;

pub trait OptionStoreOperations: Send + Sync {
    fn get_option(&self, key: &str) -> Result<Option<String>>;
    fn update_option(&self, key: &str, value: &str) -> Result<()>;
    fn delete_option(&self, key: &str) -> Result<()>;
}

pub struct FileOptionStore {
    data_dir: PathBuf,
}

impl FileOptionStore {
    pub fn new(data_dir: &Path) -> Self {
        FileOptionStore {
            data_dir: data_dir.to_path_buf(),
        }
    }

    fn file_path(&self) -> PathBuf {
        self.data_dir.join(OPTIONS_FILENAME)
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>> {
        let path = self.file_path();
        if !path.exists() {
            log::trace!("FileOptionStore: {path:?} does not exist yet, treating as empty.");
            return Ok(BTreeMap::new());
        }
        let file = File::open(&path)?;
        let reader = BufReader::new(file);
        let map = serde_json::from_reader(reader)?;
        Ok(map)
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<()> {
        fs::create_dir_all(&self.data_dir)?;
        let path = self.file_path();
        let file = File::create(&path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, map)?;
        log::trace!("FileOptionStore: Wrote {} options to {path:?}.", map.len());
        Ok(())
    }
}

impl OptionStoreOperations for FileOptionStore {
    fn get_option(&self, key: &str) -> Result<Option<String>> {
        let map = self.read_map()?;
        Ok(map.get(key).cloned())
    }

    fn update_option(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self.read_map()?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)?;
        log::debug!("FileOptionStore: Updated option '{key}'.");
        Ok(())
    }

    fn delete_option(&self, key: &str) -> Result<()> {
        let mut map = self.read_map()?;
        if map.remove(key).is_some() {
            self.write_map(&map)?;
            log::debug!("FileOptionStore: Deleted option '{key}'.");
        } else {
            log::trace!("FileOptionStore: Delete of absent option '{key}' is a no-op.");
        }
        Ok(())
    }
}
