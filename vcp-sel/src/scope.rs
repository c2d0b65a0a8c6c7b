//! Scope filter
//!
//! A single equality filter (language) composed with closure membership.
//! It is only ever applied to a closure member set, never to the whole
//! catalog, so its cost is bounded by the size of that set.

use serde::{Deserialize, Serialize};
use std::fmt;
use vcp_common::{Item, ItemToken};

use crate::catalog::TokenIndex;

/// Sentinel accepted for "no filtering"
pub const ALL_SENTINEL: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ScopeFilter {
    #[default]
    All,
    /// Language tag; a bare primary tag ("en") also matches regional
    /// variants ("en-US")
    Language(String),
}

impl ScopeFilter {
    /// Parse a control value; empty or "all" means no filtering
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case(ALL_SENTINEL) {
            ScopeFilter::All
        } else {
            ScopeFilter::Language(value.to_string())
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, ScopeFilter::All)
    }

    pub fn matches(&self, item: &Item) -> bool {
        match self {
            ScopeFilter::All => true,
            ScopeFilter::Language(tag) => language_matches(tag, &item.language_tag),
        }
    }

    /// Filter a member set, keeping its iteration order
    ///
    /// Tokens unknown to the index are dropped.
    pub fn apply<'a, I>(&self, members: I, index: &TokenIndex) -> Vec<ItemToken>
    where
        I: IntoIterator<Item = &'a ItemToken>,
    {
        members
            .into_iter()
            .filter(|token| self.admits(token, index))
            .cloned()
            .collect()
    }

    /// First admitted member in iteration order
    pub fn first_admitted<'a, I>(&self, members: I, index: &TokenIndex) -> Option<&'a ItemToken>
    where
        I: IntoIterator<Item = &'a ItemToken>,
    {
        members.into_iter().find(|token| self.admits(token, index))
    }

    /// Whether a single token resolves and passes the filter
    pub fn admits(&self, token: &ItemToken, index: &TokenIndex) -> bool {
        index.item(token).is_some_and(|item| self.matches(item))
    }
}

fn language_matches(scope: &str, tag: &str) -> bool {
    if scope.contains('-') {
        return scope.eq_ignore_ascii_case(tag);
    }
    let primary = tag.split('-').next().unwrap_or(tag);
    scope.eq_ignore_ascii_case(primary)
}

impl fmt::Display for ScopeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeFilter::All => f.write_str(ALL_SENTINEL),
            ScopeFilter::Language(tag) => f.write_str(tag),
        }
    }
}

impl From<String> for ScopeFilter {
    fn from(value: String) -> Self {
        ScopeFilter::parse(&value)
    }
}

impl From<ScopeFilter> for String {
    fn from(scope: ScopeFilter) -> Self {
        scope.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn index() -> TokenIndex {
        TokenIndex::build(
            Vec::new(),
            vec![
                Item::new("m1", "One", "en"),
                Item::new("m2", "Two", "fr"),
                Item::new("m3", "Three", "en-GB"),
                Item::new("m4", "Four", "EN-us"),
            ],
        )
    }

    fn set(tokens: &[&str]) -> BTreeSet<ItemToken> {
        tokens.iter().map(|t| ItemToken::new(*t)).collect()
    }

    fn strs(tokens: &[ItemToken]) -> Vec<&str> {
        tokens.iter().map(|t| t.as_str()).collect()
    }

    #[test]
    fn test_parse() {
        assert_eq!(ScopeFilter::parse("all"), ScopeFilter::All);
        assert_eq!(ScopeFilter::parse("ALL"), ScopeFilter::All);
        assert_eq!(ScopeFilter::parse("  "), ScopeFilter::All);
        assert_eq!(ScopeFilter::parse("en"), ScopeFilter::Language("en".to_string()));
    }

    #[test]
    fn test_all_keeps_known_members() {
        let members = set(&["m1", "m2", "ghost"]);
        let kept = ScopeFilter::All.apply(&members, &index());
        assert_eq!(strs(&kept), vec!["m1", "m2"]);
    }

    #[test]
    fn test_primary_tag_matches_regional_variants() {
        let members = set(&["m1", "m2", "m3", "m4"]);
        let kept = ScopeFilter::parse("en").apply(&members, &index());
        assert_eq!(strs(&kept), vec!["m1", "m3", "m4"]);
    }

    #[test]
    fn test_full_tag_matches_exactly() {
        let members = set(&["m1", "m3", "m4"]);
        let kept = ScopeFilter::parse("en-us").apply(&members, &index());
        assert_eq!(strs(&kept), vec!["m4"]);
    }

    #[test]
    fn test_first_admitted() {
        let members = set(&["m1", "m2"]);
        let idx = index();
        assert_eq!(
            ScopeFilter::parse("fr").first_admitted(&members, &idx).map(|t| t.as_str()),
            Some("m2")
        );
        assert!(ScopeFilter::parse("de").first_admitted(&members, &idx).is_none());
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&ScopeFilter::parse("fr")).unwrap();
        assert_eq!(json, "\"fr\"");
        let scope: ScopeFilter = serde_json::from_str("\"all\"").unwrap();
        assert!(scope.is_all());
    }
}
