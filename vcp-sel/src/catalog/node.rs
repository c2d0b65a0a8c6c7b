//! Category node variants
//!
//! Taxonomy-backed categories and client-only synthetic categories share
//! one interface (`token`, `label`, `parent_token`) so that the forest and
//! the selector never need to tell them apart.

use std::collections::BTreeSet;
use std::sync::Arc;
use vcp_common::{CategoryRecord, CategoryToken, ItemToken};

/// Shared handle to a category; levels and paths hold clones of these
pub type NodeRef = Arc<CategoryNode>;

/// Well-known virtual root categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SyntheticKind {
    /// Most recently uploaded voice models
    Latest,
    /// Most used voice models
    Trending,
}

impl SyntheticKind {
    /// Presentation order at the root level
    pub const ALL: [SyntheticKind; 2] = [SyntheticKind::Latest, SyntheticKind::Trending];

    pub fn token(self) -> CategoryToken {
        match self {
            SyntheticKind::Latest => CategoryToken::new("SYNTHETIC:latest"),
            SyntheticKind::Trending => CategoryToken::new("SYNTHETIC:trending"),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SyntheticKind::Latest => "Latest",
            SyntheticKind::Trending => "Trending",
        }
    }

    /// Lower sorts first
    pub fn priority(self) -> u8 {
        match self {
            SyntheticKind::Latest => 0,
            SyntheticKind::Trending => 1,
        }
    }
}

/// Client-only root category with an ephemeral member set
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticCategory {
    pub kind: SyntheticKind,
    pub token: CategoryToken,
    pub members: BTreeSet<ItemToken>,
}

impl SyntheticCategory {
    pub fn new(kind: SyntheticKind, members: BTreeSet<ItemToken>) -> Self {
        Self {
            kind,
            token: kind.token(),
            members,
        }
    }
}

/// A node in the category forest
#[derive(Debug, Clone, PartialEq)]
pub enum CategoryNode {
    Real(CategoryRecord),
    Synthetic(SyntheticCategory),
}

impl CategoryNode {
    pub fn token(&self) -> &CategoryToken {
        match self {
            CategoryNode::Real(record) => &record.token,
            CategoryNode::Synthetic(synthetic) => &synthetic.token,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            CategoryNode::Real(record) => &record.name,
            CategoryNode::Synthetic(synthetic) => synthetic.kind.label(),
        }
    }

    /// Dropdown label
    pub fn label(&self) -> &str {
        match self {
            CategoryNode::Real(record) => record.label(),
            CategoryNode::Synthetic(synthetic) => synthetic.kind.label(),
        }
    }

    /// Declared parent; synthetic categories are always roots
    pub fn parent_token(&self) -> Option<&CategoryToken> {
        match self {
            CategoryNode::Real(record) => record.parent_token.as_ref(),
            CategoryNode::Synthetic(_) => None,
        }
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(self, CategoryNode::Synthetic(_))
    }

    pub fn synthetic_kind(&self) -> Option<SyntheticKind> {
        match self {
            CategoryNode::Real(_) => None,
            CategoryNode::Synthetic(synthetic) => Some(synthetic.kind),
        }
    }

    pub fn as_record(&self) -> Option<&CategoryRecord> {
        match self {
            CategoryNode::Real(record) => Some(record),
            CategoryNode::Synthetic(_) => None,
        }
    }
}

impl From<CategoryRecord> for CategoryNode {
    fn from(record: CategoryRecord) -> Self {
        CategoryNode::Real(record)
    }
}

impl From<SyntheticCategory> for CategoryNode {
    fn from(synthetic: SyntheticCategory) -> Self {
        CategoryNode::Synthetic(synthetic)
    }
}
