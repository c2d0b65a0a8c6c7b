//! Catalog wire models
//!
//! Shapes of the three catalog sources as delivered by the front end's
//! data-fetching layer. Field names are camelCase on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Unique, stable identifier of a category
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryToken(String);

impl CategoryToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CategoryToken {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Unique, stable identifier of a voice model
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemToken(String);

impl ItemToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemToken {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Category as stored in the taxonomy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRecord {
    pub token: CategoryToken,
    pub name: String,
    /// Dropdown label; falls back to `name` when absent
    #[serde(default)]
    pub display_name: Option<String>,
    /// Absent for root categories
    #[serde(default)]
    pub parent_token: Option<CategoryToken>,
    #[serde(default)]
    pub can_hold_items_directly: bool,
    #[serde(default)]
    pub can_have_children: bool,
    /// Only moderators may assign voice models here
    #[serde(default)]
    pub restricted_assignment: bool,
    /// `None` while awaiting moderation on older records
    #[serde(default)]
    pub approved: Option<bool>,
    /// Soft-delete marker
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl CategoryRecord {
    /// Minimal root-or-child record, mostly useful for tests and fixtures
    pub fn new(token: &str, name: &str, parent_token: Option<&str>) -> Self {
        Self {
            token: CategoryToken::new(token),
            name: name.to_string(),
            display_name: None,
            parent_token: parent_token.map(CategoryToken::new),
            can_hold_items_directly: true,
            can_have_children: true,
            restricted_assignment: false,
            approved: Some(true),
            deleted_at: None,
        }
    }

    /// Label shown in a dropdown
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Explicitly rejected or still pending (`approved == Some(false)`)
    pub fn is_unapproved(&self) -> bool {
        self.approved == Some(false)
    }
}

/// Voice model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub token: ItemToken,
    pub title: String,
    pub language_tag: String,
    /// Categories the model is directly assigned to (closure extends upward)
    #[serde(default)]
    pub direct_category_tokens: BTreeSet<CategoryToken>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub usage_count: Option<u64>,
}

impl Item {
    pub fn new(token: &str, title: &str, language_tag: &str) -> Self {
        Self {
            token: ItemToken::new(token),
            title: title.to_string(),
            language_tag: language_tag.to_string(),
            direct_category_tokens: BTreeSet::new(),
            created_at: None,
            usage_count: None,
        }
    }

    /// Builder-style direct category assignment
    pub fn in_categories(mut self, tokens: &[&str]) -> Self {
        self.direct_category_tokens = tokens.iter().map(|t| CategoryToken::new(*t)).collect();
        self
    }
}

/// Precomputed category → transitively assigned voice models
pub type ClosureMap = HashMap<CategoryToken, BTreeSet<ItemToken>>;
