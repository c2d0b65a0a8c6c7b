//! Catalog snapshot
//!
//! Bundles the token index, the category forest and the closure store built
//! from one generation of source data. A snapshot is immutable: whenever any
//! source changes a new snapshot is built from scratch and swapped in, so a
//! reader never observes a half-built index.
//!
//! The three sources arrive independently. A snapshot built from a subset
//! of them reports what is missing through [`Readiness`] and degrades to
//! empty results rather than failing.

mod closure;
mod forest;
mod node;
mod store;
mod synthetic;
mod token_index;

pub use closure::ClosureStore;
pub use forest::CategoryForest;
pub use node::{CategoryNode, NodeRef, SyntheticCategory, SyntheticKind};
pub use store::{CatalogStore, SourceUpdate};
pub use synthetic::{build_synthetic_categories, merge_roots};
pub use token_index::TokenIndex;

use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info};
use vcp_common::config::{SiblingOrder, TomlConfig};
use vcp_common::{CategoryRecord, CategoryToken, ClosureMap, Item, ItemToken};

use crate::scope::ScopeFilter;

/// Latest value received from each source, `None` until it arrives
#[derive(Debug, Clone, Default)]
pub struct CatalogSources {
    pub categories: Option<Vec<CategoryRecord>>,
    pub items: Option<Vec<Item>>,
    pub closure: Option<Arc<ClosureMap>>,
}

impl CatalogSources {
    pub fn new(
        categories: Option<Vec<CategoryRecord>>,
        items: Option<Vec<Item>>,
        closure: Option<ClosureMap>,
    ) -> Self {
        Self {
            categories,
            items,
            closure: closure.map(Arc::new),
        }
    }

    pub fn readiness(&self) -> Readiness {
        Readiness {
            categories: self.categories.is_some(),
            items: self.items.is_some(),
            closure: self.closure.is_some(),
        }
    }
}

/// Which sources a snapshot was built from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Readiness {
    pub categories: bool,
    pub items: bool,
    pub closure: bool,
}

impl Readiness {
    pub fn is_complete(&self) -> bool {
        self.categories && self.items && self.closure
    }
}

/// Snapshot build options
#[derive(Debug, Clone)]
pub struct CatalogOptions {
    /// Surface unapproved categories (moderator view)
    pub include_unapproved: bool,
    pub enable_synthetic: bool,
    pub synthetic_latest_limit: usize,
    pub synthetic_trending_limit: usize,
    pub sibling_order: SiblingOrder,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self::from(&TomlConfig::default())
    }
}

impl From<&TomlConfig> for CatalogOptions {
    fn from(config: &TomlConfig) -> Self {
        Self {
            include_unapproved: config.catalog.include_unapproved,
            enable_synthetic: config.catalog.enable_synthetic,
            synthetic_latest_limit: config.catalog.synthetic_latest_limit,
            synthetic_trending_limit: config.catalog.synthetic_trending_limit,
            sibling_order: config.selector.sibling_order,
        }
    }
}

/// One immutable generation of catalog indices
#[derive(Debug, Default)]
pub struct CatalogSnapshot {
    index: TokenIndex,
    forest: CategoryForest,
    closure: ClosureStore,
    readiness: Readiness,
}

impl CatalogSnapshot {
    /// Snapshot with nothing loaded
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build every index from scratch
    pub fn build(sources: &CatalogSources, options: &CatalogOptions) -> Self {
        let readiness = sources.readiness();
        let records = sources.categories.as_deref().unwrap_or(&[]);
        let items = sources.items.clone().unwrap_or_default();

        let mut hidden = 0usize;
        let mut nodes: Vec<NodeRef> = Vec::with_capacity(records.len() + 2);

        let synthetic = if options.enable_synthetic {
            build_synthetic_categories(
                &items,
                options.synthetic_latest_limit,
                options.synthetic_trending_limit,
            )
        } else {
            Vec::new()
        };
        nodes.extend(synthetic.iter().cloned().map(|c| Arc::new(CategoryNode::from(c))));

        for record in records {
            if record.is_deleted() || (record.is_unapproved() && !options.include_unapproved) {
                hidden += 1;
                continue;
            }
            nodes.push(Arc::new(CategoryNode::from(record.clone())));
        }
        if hidden > 0 {
            debug!("{} deleted or unapproved categories hidden", hidden);
        }

        // The forest is built over the deduplicated list so both agree on
        // which occurrence of a repeated token is kept
        let index = TokenIndex::build(nodes, items);
        let forest = CategoryForest::build(index.categories(), options.sibling_order);
        let closure = ClosureStore::new(sources.closure.clone()).with_synthetic(&synthetic);

        info!(
            "Catalog snapshot built: {} categories, {} voice models, {} closure entries (complete: {})",
            index.category_count(),
            index.item_count(),
            closure.len(),
            readiness.is_complete()
        );

        Self {
            index,
            forest,
            closure,
            readiness,
        }
    }

    pub fn index(&self) -> &TokenIndex {
        &self.index
    }

    pub fn forest(&self) -> &CategoryForest {
        &self.forest
    }

    pub fn closure(&self) -> &ClosureStore {
        &self.closure
    }

    pub fn readiness(&self) -> Readiness {
        self.readiness
    }

    pub fn category(&self, token: &CategoryToken) -> Option<&NodeRef> {
        self.index.category(token)
    }

    pub fn members_of(&self, token: &CategoryToken) -> &BTreeSet<ItemToken> {
        self.closure.members_of(token)
    }

    /// Closure members of a category that pass the scope filter
    pub fn scoped_members(&self, token: &CategoryToken, scope: &ScopeFilter) -> Vec<ItemToken> {
        scope.apply(self.members_of(token), &self.index)
    }

    /// Every voice model passing the scope filter, in received order
    pub fn scoped_catalog(&self, scope: &ScopeFilter) -> Vec<ItemToken> {
        self.index
            .items()
            .iter()
            .filter(|item| scope.matches(item))
            .map(|item| item.token.clone())
            .collect()
    }

    /// Whether a category still leads to at least one voice model
    ///
    /// Without a closure nothing can be judged dead, so everything is viable.
    pub fn is_viable(&self, token: &CategoryToken, scope: &ScopeFilter) -> bool {
        if !self.closure.is_loaded() {
            return true;
        }
        scope.first_admitted(self.members_of(token), &self.index).is_some()
    }

    /// Children of `parent` (roots for `None`) that are still viable
    pub fn viable_children(&self, parent: Option<&CategoryToken>, scope: &ScopeFilter) -> Vec<NodeRef> {
        self.forest
            .children_of(parent)
            .iter()
            .filter(|node| self.is_viable(node.token(), scope))
            .cloned()
            .collect()
    }

    /// Categories a voice model may be assigned to directly
    ///
    /// Restricted categories are only offered to moderators.
    pub fn assignable_categories(&self, moderator: bool) -> Vec<NodeRef> {
        self.index
            .categories()
            .iter()
            .filter(|node| {
                node.as_record().is_some_and(|record| {
                    record.can_hold_items_directly && (moderator || !record.restricted_assignment)
                })
            })
            .cloned()
            .collect()
    }
}
