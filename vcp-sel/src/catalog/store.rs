//! Source tracking and snapshot rebuilds
//!
//! Holds the most recent value of each source. Every update replaces that
//! source and rebuilds a complete snapshot; nothing is patched in place.

use std::sync::Arc;
use tracing::info;
use vcp_common::{CategoryRecord, ClosureMap, Item};

use super::{CatalogOptions, CatalogSnapshot, CatalogSources};

/// A fresh value for one of the three sources
#[derive(Debug, Clone)]
pub enum SourceUpdate {
    Categories(Vec<CategoryRecord>),
    Items(Vec<Item>),
    Closure(ClosureMap),
}

impl SourceUpdate {
    pub fn source_name(&self) -> &'static str {
        match self {
            SourceUpdate::Categories(_) => "categories",
            SourceUpdate::Items(_) => "items",
            SourceUpdate::Closure(_) => "closure",
        }
    }
}

/// Current sources plus the snapshot built from them
#[derive(Debug)]
pub struct CatalogStore {
    sources: CatalogSources,
    options: CatalogOptions,
    current: Arc<CatalogSnapshot>,
}

impl CatalogStore {
    /// Store with no source loaded yet
    pub fn new(options: CatalogOptions) -> Self {
        Self {
            sources: CatalogSources::default(),
            options,
            current: Arc::new(CatalogSnapshot::empty()),
        }
    }

    /// Store seeded with whatever sources are already available
    pub fn with_sources(sources: CatalogSources, options: CatalogOptions) -> Self {
        let current = Arc::new(CatalogSnapshot::build(&sources, &options));
        Self {
            sources,
            options,
            current,
        }
    }

    /// Replace one source and rebuild; returns the new snapshot
    pub fn apply(&mut self, update: SourceUpdate) -> Arc<CatalogSnapshot> {
        info!("Source '{}' updated, rebuilding catalog snapshot", update.source_name());
        match update {
            SourceUpdate::Categories(categories) => self.sources.categories = Some(categories),
            SourceUpdate::Items(items) => self.sources.items = Some(items),
            SourceUpdate::Closure(closure) => self.sources.closure = Some(Arc::new(closure)),
        }
        self.current = Arc::new(CatalogSnapshot::build(&self.sources, &self.options));
        self.current.clone()
    }

    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        self.current.clone()
    }

    pub fn options(&self) -> &CatalogOptions {
        &self.options
    }
}
