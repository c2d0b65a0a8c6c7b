//! Source document loading
//!
//! The three catalog sources live as JSON documents in the data folder.
//! Each one is read independently; a missing document simply means that
//! source has not arrived yet.

use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{debug, info};
use vcp_common::{CategoryRecord, ClosureMap, Item};

use crate::catalog::{CatalogSources, SourceUpdate};
use crate::error::{Error, Result};

pub const CATEGORIES_FILE: &str = "categories.json";
pub const ITEMS_FILE: &str = "items.json";
pub const CLOSURE_FILE: &str = "closure.json";

/// Read and parse one source; `Ok(None)` when the file does not exist
pub async fn read_source<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("Source {} not available yet", path.display());
            return Ok(None);
        }
        Err(source) => {
            return Err(Error::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let value = serde_json::from_slice(&bytes).map_err(|source| Error::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Loaded {} ({} bytes)", path.display(), bytes.len());
    Ok(Some(value))
}

/// Read all three sources concurrently
pub async fn load_sources(data_dir: &Path) -> Result<CatalogSources> {
    let categories_path = data_dir.join(CATEGORIES_FILE);
    let items_path = data_dir.join(ITEMS_FILE);
    let closure_path = data_dir.join(CLOSURE_FILE);

    let (categories, items, closure) = tokio::join!(
        read_source::<Vec<CategoryRecord>>(&categories_path),
        read_source::<Vec<Item>>(&items_path),
        read_source::<ClosureMap>(&closure_path),
    );

    Ok(CatalogSources::new(categories?, items?, closure?))
}

/// Read each source on its own task and deliver updates as they complete
///
/// Updates arrive in completion order, not in any fixed order. Sources that
/// do not exist produce no update. The channel closes once every reader
/// has finished.
pub fn spawn_source_readers(data_dir: &Path) -> mpsc::Receiver<Result<SourceUpdate>> {
    let (tx, rx) = mpsc::channel(3);

    spawn_reader(tx.clone(), data_dir.join(CATEGORIES_FILE), SourceUpdate::Categories);
    spawn_reader(tx.clone(), data_dir.join(ITEMS_FILE), SourceUpdate::Items);
    spawn_reader(tx, data_dir.join(CLOSURE_FILE), SourceUpdate::Closure);

    rx
}

fn spawn_reader<T, F>(tx: mpsc::Sender<Result<SourceUpdate>>, path: PathBuf, wrap: F)
where
    T: DeserializeOwned + Send + 'static,
    F: FnOnce(T) -> SourceUpdate + Send + 'static,
{
    tokio::spawn(async move {
        let update = match read_source::<T>(&path).await {
            Ok(Some(value)) => Ok(wrap(value)),
            Ok(None) => return,
            Err(e) => Err(e),
        };
        // Receiver gone means nobody is waiting for this source any more
        let _ = tx.send(update).await;
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) {
        fs::write(dir.path().join(name), content).unwrap();
    }

    #[tokio::test]
    async fn test_missing_sources_are_not_errors() {
        let dir = TempDir::new().unwrap();
        write(&dir, CATEGORIES_FILE, r#"[{"token": "c1", "name": "One"}]"#);

        let sources = load_sources(dir.path()).await.unwrap();
        assert_eq!(sources.categories.as_ref().map(Vec::len), Some(1));
        assert!(sources.items.is_none());
        assert!(sources.closure.is_none());
    }

    #[tokio::test]
    async fn test_malformed_source_reports_path() {
        let dir = TempDir::new().unwrap();
        write(&dir, ITEMS_FILE, "{not json");

        let err = load_sources(dir.path()).await.unwrap_err();
        match err {
            Error::Parse { path, .. } => assert!(path.ends_with(ITEMS_FILE)),
            other => panic!("Expected parse error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_readers_deliver_each_present_source_once() {
        let dir = TempDir::new().unwrap();
        write(&dir, ITEMS_FILE, r#"[{"token": "i1", "title": "Voice", "languageTag": "en"}]"#);
        write(&dir, CLOSURE_FILE, r#"{"c1": ["i1"]}"#);

        let mut rx = spawn_source_readers(dir.path());
        let mut names = Vec::new();
        while let Some(update) = rx.recv().await {
            names.push(update.unwrap().source_name());
        }
        names.sort();
        assert_eq!(names, vec!["closure", "items"]);
    }
}
