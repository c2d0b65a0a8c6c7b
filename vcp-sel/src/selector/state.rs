//! Selection state and transitions
//!
//! Every transition is a pure function from the current state and a catalog
//! snapshot to a complete new state. Path, candidate levels, selected voice
//! model and scope are always replaced together, so no reader can see a
//! path and a level list of mismatched length.
//!
//! Invariants of every state produced here:
//! - `levels.len() == path.len() + 1`
//! - `path[i]`'s parent is `path[i - 1]`, and `path[0]` is a root
//! - `levels[i]` holds the viable children of `path[i - 1]` (roots for 0)
//! - with a non-empty path and a loaded closure, the selected voice model
//!   is a scoped member of the deepest category's closure

use tracing::debug;
use vcp_common::{CategoryToken, ItemToken};

use crate::catalog::{CatalogSnapshot, NodeRef};
use crate::scope::ScopeFilter;

/// Choice made at one dropdown level
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelChoice {
    Category(CategoryToken),
    /// Clear this level and everything below it
    Clear,
}

/// User-driven transitions
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Select { level: usize, choice: LevelChoice },
    SetScope(ScopeFilter),
    SelectItem(ItemToken),
    /// Select every level down to a (deep-linked) category
    SelectPathTo(CategoryToken),
}

/// Published state of the cascading selector
#[derive(Debug, Clone)]
pub struct SelectionState {
    path: Vec<NodeRef>,
    levels: Vec<Vec<NodeRef>>,
    selected_item: Option<ItemToken>,
    scope: ScopeFilter,
}

impl SelectionState {
    /// Nothing selected; one level holding the viable roots
    pub fn initial(
        catalog: &CatalogSnapshot,
        scope: ScopeFilter,
        selected_item: Option<ItemToken>,
    ) -> Self {
        Self {
            path: Vec::new(),
            levels: vec![catalog.viable_children(None, &scope)],
            selected_item,
            scope,
        }
    }

    /// Chosen categories, root first
    pub fn path(&self) -> &[NodeRef] {
        &self.path
    }

    /// Candidate lists, one per level; the last one may be empty
    pub fn levels(&self) -> &[Vec<NodeRef>] {
        &self.levels
    }

    /// Levels to present
    ///
    /// A selection without viable children ends the cascade: its empty
    /// trailing level is not shown.
    pub fn visible_levels(&self) -> &[Vec<NodeRef>] {
        match self.levels.last() {
            Some(last) if last.is_empty() && !self.path.is_empty() => {
                &self.levels[..self.levels.len() - 1]
            }
            _ => &self.levels,
        }
    }

    pub fn selected_item(&self) -> Option<&ItemToken> {
        self.selected_item.as_ref()
    }

    pub fn scope(&self) -> &ScopeFilter {
        &self.scope
    }

    pub fn deepest(&self) -> Option<&NodeRef> {
        self.path.last()
    }

    pub fn path_tokens(&self) -> Vec<CategoryToken> {
        self.path.iter().map(|n| n.token().clone()).collect()
    }

    /// Voice models the item picker may offer, in deterministic order
    pub fn addressable_items(&self, catalog: &CatalogSnapshot) -> Vec<ItemToken> {
        match self.deepest() {
            Some(node) => catalog.scoped_members(node.token(), &self.scope),
            None => catalog.scoped_catalog(&self.scope),
        }
    }

    pub fn is_addressable(&self, token: &ItemToken, catalog: &CatalogSnapshot) -> bool {
        if !self.scope.admits(token, catalog.index()) {
            return false;
        }
        match self.deepest() {
            Some(node) => catalog.members_of(node.token()).contains(token),
            None => true,
        }
    }
}

/// Apply one action
pub fn reduce(state: &SelectionState, catalog: &CatalogSnapshot, action: Action) -> SelectionState {
    match action {
        Action::Select { level, choice } => select(state, catalog, level, choice),
        Action::SetScope(scope) => set_scope(state, catalog, scope),
        Action::SelectItem(token) => select_item(state, catalog, token),
        Action::SelectPathTo(token) => select_path_to(state, catalog, token),
    }
}

/// Re-apply the current selection to a newly built snapshot
///
/// The path is replayed level by level and cut at the first category that
/// no longer resolves or has moved under another parent.
pub fn rebase(state: &SelectionState, catalog: &CatalogSnapshot) -> SelectionState {
    let mut next = SelectionState::initial(catalog, state.scope.clone(), state.selected_item.clone());

    for (level, node) in state.path.iter().enumerate() {
        let candidate = select(&next, catalog, level, LevelChoice::Category(node.token().clone()));
        if candidate.path.len() != level + 1 {
            debug!("Selection cut at level {} ({}) after catalog update", level, node.token());
            break;
        }
        next = candidate;
    }

    let repaired = repair(
        next.selected_item.as_ref(),
        next.deepest().map(|n| n.token()),
        catalog,
        &next.scope,
    );
    next.selected_item = repaired;
    next
}

fn select(
    state: &SelectionState,
    catalog: &CatalogSnapshot,
    level: usize,
    choice: LevelChoice,
) -> SelectionState {
    if level > state.path.len() {
        debug!("Level {} is beyond the current selection depth, ignoring", level);
        return state.clone();
    }

    let token = match choice {
        LevelChoice::Clear => {
            let mut next = state.clone();
            next.path.truncate(level);
            next.levels.truncate(level + 1);
            return next;
        }
        LevelChoice::Category(token) => token,
    };

    let Some(node) = catalog.category(&token) else {
        debug!("Unknown category {}, ignoring selection", token);
        return state.clone();
    };

    let attached = match level.checked_sub(1).map(|i| state.path[i].token()) {
        None => catalog.forest().is_root(&token),
        Some(parent) => catalog.forest().parent_of(&token) == Some(parent),
    };
    if !attached {
        debug!("Category {} is not offered at level {}, ignoring selection", token, level);
        return state.clone();
    }

    let mut path = state.path[..level].to_vec();
    path.push(node.clone());

    let mut levels = state.levels[..=level].to_vec();
    levels.push(catalog.viable_children(Some(&token), &state.scope));

    let selected_item = repair(state.selected_item.as_ref(), Some(&token), catalog, &state.scope);

    SelectionState {
        path,
        levels,
        selected_item,
        scope: state.scope.clone(),
    }
}

fn set_scope(state: &SelectionState, catalog: &CatalogSnapshot, scope: ScopeFilter) -> SelectionState {
    let mut levels = Vec::with_capacity(state.path.len() + 1);
    levels.push(catalog.viable_children(None, &scope));
    for node in &state.path {
        levels.push(catalog.viable_children(Some(node.token()), &scope));
    }

    let selected_item = repair(
        state.selected_item.as_ref(),
        state.deepest().map(|n| n.token()),
        catalog,
        &scope,
    );

    SelectionState {
        path: state.path.clone(),
        levels,
        selected_item,
        scope,
    }
}

fn select_item(state: &SelectionState, catalog: &CatalogSnapshot, token: ItemToken) -> SelectionState {
    if !state.is_addressable(&token, catalog) {
        debug!("Voice model {} is not addressable from the current selection", token);
        return state.clone();
    }
    SelectionState {
        selected_item: Some(token),
        ..state.clone()
    }
}

fn select_path_to(
    state: &SelectionState,
    catalog: &CatalogSnapshot,
    token: CategoryToken,
) -> SelectionState {
    let Some(chain) = catalog.forest().ancestors(&token) else {
        debug!("No root path to category {}, ignoring", token);
        return state.clone();
    };

    let mut next = select(state, catalog, 0, LevelChoice::Clear);
    for (level, step) in chain.into_iter().enumerate() {
        next = select(&next, catalog, level, LevelChoice::Category(step));
        if next.path.len() != level + 1 {
            return state.clone();
        }
    }
    next
}

/// Keep the selected voice model if it is still addressable, otherwise
/// fall back to the first addressable one
///
/// An unset selection stays unset. While the relevant source has not
/// arrived membership cannot be judged and the selection is kept.
fn repair(
    selected: Option<&ItemToken>,
    deepest: Option<&CategoryToken>,
    catalog: &CatalogSnapshot,
    scope: &ScopeFilter,
) -> Option<ItemToken> {
    let selected = selected?;
    let index = catalog.index();

    match deepest {
        Some(token) => {
            if !catalog.closure().is_loaded() {
                return Some(selected.clone());
            }
            let members = catalog.members_of(token);
            if members.contains(selected) && scope.admits(selected, index) {
                Some(selected.clone())
            } else {
                scope.first_admitted(members, index).cloned()
            }
        }
        None => {
            if !catalog.readiness().items || scope.admits(selected, index) {
                Some(selected.clone())
            } else {
                index
                    .items()
                    .iter()
                    .find(|item| scope.matches(item))
                    .map(|item| item.token.clone())
            }
        }
    }
}
