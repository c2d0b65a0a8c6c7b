//! Cascading category selector
//!
//! Drives N dependent dropdowns: a choice at level L determines the
//! candidates at level L+1, and the selected voice model is repaired
//! whenever the selection moves somewhere it is no longer reachable.
//!
//! The selector owns an `Arc` of the current catalog snapshot and an `Arc`
//! of the current state; every transition swaps in a whole new state.

mod state;
mod view;

pub use state::{rebase, reduce, Action, LevelChoice, SelectionState};
pub use view::{CandidateView, ItemView, LevelView, SelectionView};

use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;
use vcp_common::{CategoryToken, ItemToken};

use crate::catalog::CatalogSnapshot;
use crate::error::Error;
use crate::scope::ScopeFilter;

/// Cascading selector bound to one catalog snapshot at a time
#[derive(Debug, Clone)]
pub struct CascadingSelector {
    catalog: Arc<CatalogSnapshot>,
    state: Arc<SelectionState>,
}

impl CascadingSelector {
    pub fn new(catalog: Arc<CatalogSnapshot>, scope: ScopeFilter) -> Self {
        Self::with_selected_item(catalog, scope, None)
    }

    /// Start with an externally provided voice model selection
    pub fn with_selected_item(
        catalog: Arc<CatalogSnapshot>,
        scope: ScopeFilter,
        selected_item: Option<ItemToken>,
    ) -> Self {
        let state = Arc::new(SelectionState::initial(&catalog, scope, selected_item));
        Self { catalog, state }
    }

    /// Apply an action and publish the resulting state
    pub fn dispatch(&mut self, action: Action) -> Arc<SelectionState> {
        debug!("Selector action: {:?}", action);
        self.state = Arc::new(reduce(&self.state, &self.catalog, action));
        self.state.clone()
    }

    pub fn select(&mut self, level: usize, token: impl Into<CategoryToken>) -> Arc<SelectionState> {
        self.dispatch(Action::Select {
            level,
            choice: LevelChoice::Category(token.into()),
        })
    }

    pub fn clear(&mut self, level: usize) -> Arc<SelectionState> {
        self.dispatch(Action::Select {
            level,
            choice: LevelChoice::Clear,
        })
    }

    pub fn set_scope(&mut self, scope: ScopeFilter) -> Arc<SelectionState> {
        self.dispatch(Action::SetScope(scope))
    }

    pub fn select_item(&mut self, token: impl Into<ItemToken>) -> Arc<SelectionState> {
        self.dispatch(Action::SelectItem(token.into()))
    }

    pub fn select_path_to(&mut self, token: impl Into<CategoryToken>) -> Arc<SelectionState> {
        self.dispatch(Action::SelectPathTo(token.into()))
    }

    /// Swap in a rebuilt snapshot and carry the selection over
    pub fn replace_catalog(&mut self, catalog: Arc<CatalogSnapshot>) -> Arc<SelectionState> {
        self.state = Arc::new(rebase(&self.state, &catalog));
        self.catalog = catalog;
        self.state.clone()
    }

    pub fn state(&self) -> Arc<SelectionState> {
        self.state.clone()
    }

    pub fn catalog(&self) -> &Arc<CatalogSnapshot> {
        &self.catalog
    }

    pub fn addressable_items(&self) -> Vec<ItemToken> {
        self.state.addressable_items(&self.catalog)
    }

    pub fn view(&self) -> SelectionView {
        SelectionView::new(&self.state, &self.catalog)
    }
}

/// Scripted action syntax
///
/// - `select:<level>:<category token>`
/// - `clear:<level>`
/// - `scope:<all | language tag>`
/// - `item:<voice model token>`
/// - `goto:<category token>`
///
/// Tokens may themselves contain `:`.
impl FromStr for Action {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidAction(s.to_string());
        let (verb, rest) = s.split_once(':').ok_or_else(invalid)?;

        let parse_level = |level: &str| level.parse::<usize>().map_err(|_| invalid());
        let non_empty = |value: &str| {
            if value.is_empty() {
                Err(invalid())
            } else {
                Ok(value.to_string())
            }
        };

        match verb {
            "select" => {
                let (level, token) = rest.split_once(':').ok_or_else(invalid)?;
                Ok(Action::Select {
                    level: parse_level(level)?,
                    choice: LevelChoice::Category(CategoryToken::new(non_empty(token)?)),
                })
            }
            "clear" => Ok(Action::Select {
                level: parse_level(rest)?,
                choice: LevelChoice::Clear,
            }),
            "scope" => Ok(Action::SetScope(ScopeFilter::parse(rest))),
            "item" => Ok(Action::SelectItem(ItemToken::new(non_empty(rest)?))),
            "goto" => Ok(Action::SelectPathTo(CategoryToken::new(non_empty(rest)?))),
            _ => Err(invalid()),
        }
    }
}
