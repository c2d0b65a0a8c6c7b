//! Serializable view for the rendering layer

use serde::Serialize;
use vcp_common::{CategoryToken, ItemToken};

use super::state::SelectionState;
use crate::catalog::{CatalogSnapshot, NodeRef, Readiness};
use crate::scope::ScopeFilter;

/// One option in a dropdown or one breadcrumb segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateView {
    pub token: CategoryToken,
    pub label: String,
    pub synthetic: bool,
}

impl From<&NodeRef> for CandidateView {
    fn from(node: &NodeRef) -> Self {
        Self {
            token: node.token().clone(),
            label: node.label().to_string(),
            synthetic: node.is_synthetic(),
        }
    }
}

/// One cascading dropdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum LevelView {
    /// Placeholder shown while no root category is available and a source
    /// has yet to arrive
    Loading,
    #[serde(rename_all = "camelCase")]
    Ready {
        selected: Option<CategoryToken>,
        candidates: Vec<CandidateView>,
    },
}

/// Entry in the voice model picker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    pub token: ItemToken,
    pub title: String,
    pub language_tag: String,
}

/// Everything the rendering layer needs from one state
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionView {
    pub levels: Vec<LevelView>,
    pub breadcrumb: Vec<CandidateView>,
    pub items: Vec<ItemView>,
    pub selected_item: Option<ItemToken>,
    /// Sources are loaded but the current selection holds no voice model
    pub no_items_available: bool,
    pub scope: ScopeFilter,
    pub readiness: Readiness,
}

impl SelectionView {
    pub fn new(state: &SelectionState, catalog: &CatalogSnapshot) -> Self {
        let path = state.path();
        let visible = state.visible_levels();

        let readiness = catalog.readiness();

        // An empty root level only means "loading" while a source is still
        // missing; with everything loaded it is a real, empty result
        let no_roots = visible.first().map_or(true, |roots| roots.is_empty());
        let levels = if path.is_empty() && no_roots && !readiness.is_complete() {
            vec![LevelView::Loading]
        } else {
            visible
                .iter()
                .enumerate()
                .map(|(i, candidates)| LevelView::Ready {
                    selected: path.get(i).map(|n| n.token().clone()),
                    candidates: candidates.iter().map(CandidateView::from).collect(),
                })
                .collect()
        };

        let index = catalog.index();
        let items: Vec<ItemView> = state
            .addressable_items(catalog)
            .iter()
            .filter_map(|token| index.item(token))
            .map(|item| ItemView {
                token: item.token.clone(),
                title: item.title.clone(),
                language_tag: item.language_tag.clone(),
            })
            .collect();

        let no_items_available = items.is_empty() && readiness.is_complete();

        Self {
            levels,
            breadcrumb: path.iter().map(CandidateView::from).collect(),
            items,
            selected_item: state.selected_item().cloned(),
            no_items_available,
            scope: state.scope().clone(),
            readiness,
        }
    }
}
