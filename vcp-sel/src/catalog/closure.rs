//! Category → voice model closure lookups
//!
//! The closure (every voice model assigned to a category or any of its
//! descendants) is computed server-side and consumed here as-is. Walking
//! each model's ancestor chain per category on the client costs
//! O(items × categories) per rebuild; consuming the precomputed map keeps
//! each selector interaction proportional to the selection depth.
//!
//! Synthetic categories register their ephemeral member sets alongside the
//! real closure so that callers look both up the same way.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use vcp_common::{CategoryToken, ClosureMap, ItemToken};

use super::node::SyntheticCategory;

static EMPTY: BTreeSet<ItemToken> = BTreeSet::new();

/// Read-only view over the precomputed closure
#[derive(Debug, Default, Clone)]
pub struct ClosureStore {
    closure: Option<Arc<ClosureMap>>,
    synthetic: HashMap<CategoryToken, BTreeSet<ItemToken>>,
}

impl ClosureStore {
    /// Wrap a closure map; `None` while the source has not arrived
    pub fn new(closure: Option<Arc<ClosureMap>>) -> Self {
        Self {
            closure,
            synthetic: HashMap::new(),
        }
    }

    /// Register the member sets of synthetic categories
    pub fn with_synthetic(mut self, synthetic: &[SyntheticCategory]) -> Self {
        self.synthetic = synthetic
            .iter()
            .map(|c| (c.token.clone(), c.members.clone()))
            .collect();
        self
    }

    /// Members of a category, empty if the category has no entry
    pub fn members_of(&self, token: &CategoryToken) -> &BTreeSet<ItemToken> {
        if let Some(members) = self.synthetic.get(token) {
            return members;
        }
        self.closure
            .as_ref()
            .and_then(|closure| closure.get(token))
            .unwrap_or(&EMPTY)
    }

    /// Whether the closure source has arrived
    pub fn is_loaded(&self) -> bool {
        self.closure.is_some()
    }

    pub fn len(&self) -> usize {
        self.closure.as_ref().map_or(0, |c| c.len()) + self.synthetic.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
