/*
 * The host's content-item repository, reduced to what the plugin needs: the
 * installer creates (or re-publishes) the profile page, the request handler
 * never writes through this store (it overwrites title/body in the response
 * only), and uninstall deletes the created page.
 *
 * `FilePageStore` keeps the pages as a JSON vector (`pages.json`) under a
 * caller-supplied data directory; ids are assigned monotonically from the
 * highest existing id.
 */
use serde::{Deserialize, Serialize};
use serde_json;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};

const PAGES_FILENAME: &str = "pages.json";

#[derive(Debug)]
pub enum PageStoreError {
    Io(io::Error),
    Serde(serde_json::Error),
}

impl From<io::Error> for PageStoreError {
    fn from(err: io::Error) -> Self {
        PageStoreError::Io(err)
    }
}

impl From<serde_json::Error> for PageStoreError {
    fn from(err: serde_json::Error) -> Self {
        PageStoreError::Serde(err)
    }
}

impl std::fmt::Display for PageStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PageStoreError::Io(e) => write!(f, "Page store I/O error: {e}"),
            PageStoreError::Serde(e) => write!(f, "Page store serialization error: {e}"),
        }
    }
}

impl std::error::Error for PageStoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PageStoreError::Io(e) => Some(e),
            PageStoreError::Serde(e) => Some(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, PageStoreError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageStatus {
    Published,
    Draft,
}

// A stored content item. Comments and pings are irrelevant to the profile
// page and are not modeled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentPage {
    pub id: u64,
    pub title: String,
    pub slug: String,
    pub body: String,
    pub status: PageStatus,
}

pub trait PageStoreOperations: Send + Sync {
    /// Inserts a new page and returns its assigned id.
    fn insert_page(&self, title: &str, slug: &str, body: &str, status: PageStatus) -> Result<u64>;
    fn update_page(&self, page: &ContentPage) -> Result<()>;
    /// Returns true when a page was actually removed.
    fn delete_page(&self, id: u64) -> Result<bool>;
    fn find_by_id(&self, id: u64) -> Result<Option<ContentPage>>;
    fn find_by_title(&self, title: &str) -> Result<Option<ContentPage>>;
}

pub struct FilePageStore {
    data_dir: PathBuf,
}

impl FilePageStore {
    pub fn new(data_dir: &Path) -> Self {
        FilePageStore {
            data_dir: data_dir.to_path_buf(),
        }
    }

    fn file_path(&self) -> PathBuf {
        self.data_dir.join(PAGES_FILENAME)
    }

    fn read_pages(&self) -> Result<Vec<ContentPage>> {
        let path = self.file_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let file = File::open(&path)?;
        let reader = BufReader::new(file);
        let pages = serde_json::from_reader(reader)?;
        Ok(pages)
    }

    fn write_pages(&self, pages: &[ContentPage]) -> Result<()> {
        fs::create_dir_all(&self.data_dir)?;
        let file = File::create(self.file_path())?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, pages)?;
        Ok(())
    }
}

impl PageStoreOperations for FilePageStore {
    fn insert_page(&self, title: &str, slug: &str, body: &str, status: PageStatus) -> Result<u64> {
        let mut pages = self.read_pages()?;
        let id = pages.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        pages.push(ContentPage {
            id,
            title: title.to_string(),
            slug: slug.to_string(),
            body: body.to_string(),
            status,
        });
        self.write_pages(&pages)?;
        log::debug!("FilePageStore: Inserted page '{title}' with id {id}.");
        Ok(id)
    }

    fn update_page(&self, page: &ContentPage) -> Result<()> {
        let mut pages = self.read_pages()?;
        match pages.iter_mut().find(|p| p.id == page.id) {
            Some(existing) => {
                *existing = page.clone();
                self.write_pages(&pages)?;
                log::debug!("FilePageStore: Updated page {}.", page.id);
            }
            None => {
                log::warn!(
                    "FilePageStore: Update of unknown page {} is a no-op.",
                    page.id
                );
            }
        }
        Ok(())
    }

    fn delete_page(&self, id: u64) -> Result<bool> {
        let mut pages = self.read_pages()?;
        let before = pages.len();
        pages.retain(|p| p.id != id);
        let removed = pages.len() != before;
        if removed {
            self.write_pages(&pages)?;
            log::debug!("FilePageStore: Deleted page {id}.");
        }
        Ok(removed)
    }

    fn find_by_id(&self, id: u64) -> Result<Option<ContentPage>> {
        Ok(self.read_pages()?.into_iter().find(|p| p.id == id))
    }

    fn find_by_title(&self, title: &str) -> Result<Option<ContentPage>> {
        Ok(self.read_pages()?.into_iter().find(|p| p.title == title))
    }
}
