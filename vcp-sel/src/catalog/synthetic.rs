//! Synthetic root categories
//!
//! "Latest" and "Trending" have no taxonomy record. Their member sets are
//! derived from the voice model list each time a snapshot is built, and they
//! are always presented ahead of the real root categories.

use std::cmp::Reverse;
use std::collections::BTreeSet;

use vcp_common::{Item, ItemToken};

use super::node::{NodeRef, SyntheticCategory, SyntheticKind};

/// Build the synthetic categories that currently have members
///
/// - Latest: voice models with a creation timestamp, newest first
/// - Trending: voice models with non-zero usage, most used first
///
/// Ties are broken by token so the selection is deterministic.
pub fn build_synthetic_categories(
    items: &[Item],
    latest_limit: usize,
    trending_limit: usize,
) -> Vec<SyntheticCategory> {
    let mut latest: Vec<&Item> = items.iter().filter(|i| i.created_at.is_some()).collect();
    latest.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.token.cmp(&b.token)));

    let mut trending: Vec<&Item> = items
        .iter()
        .filter(|i| i.usage_count.unwrap_or(0) > 0)
        .collect();
    trending.sort_by_key(|i| (Reverse(i.usage_count.unwrap_or(0)), i.token.clone()));

    let take = |list: Vec<&Item>, limit: usize| -> BTreeSet<ItemToken> {
        list.into_iter().take(limit).map(|i| i.token.clone()).collect()
    };

    [
        SyntheticCategory::new(SyntheticKind::Latest, take(latest, latest_limit)),
        SyntheticCategory::new(SyntheticKind::Trending, take(trending, trending_limit)),
    ]
    .into_iter()
    .filter(|c| !c.members.is_empty())
    .collect()
}

/// Order the root level: synthetic categories first in fixed priority,
/// then real roots in the order given
pub fn merge_roots(roots: Vec<NodeRef>) -> Vec<NodeRef> {
    let (mut synthetic, real): (Vec<NodeRef>, Vec<NodeRef>) =
        roots.into_iter().partition(|n| n.is_synthetic());
    synthetic.sort_by_key(|n| n.synthetic_kind().map(|k| k.priority()));
    synthetic.extend(real);
    synthetic
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::node::CategoryNode;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;
    use vcp_common::CategoryRecord;

    fn item(token: &str, day: Option<u32>, usage: Option<u64>) -> Item {
        let mut item = Item::new(token, token, "en");
        item.created_at = day.map(|d| Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap());
        item.usage_count = usage;
        item
    }

    fn tokens(set: &BTreeSet<ItemToken>) -> Vec<&str> {
        set.iter().map(|t| t.as_str()).collect()
    }

    #[test]
    fn test_latest_takes_newest() {
        let items = vec![
            item("m1", Some(1), None),
            item("m2", Some(3), None),
            item("m3", Some(2), None),
            item("m4", None, None),
        ];

        let synthetic = build_synthetic_categories(&items, 2, 2);
        assert_eq!(synthetic.len(), 1);
        assert_eq!(synthetic[0].kind, SyntheticKind::Latest);
        assert_eq!(tokens(&synthetic[0].members), vec!["m2", "m3"]);
    }

    #[test]
    fn test_trending_skips_unused() {
        let items = vec![
            item("m1", None, Some(5)),
            item("m2", None, Some(0)),
            item("m3", None, Some(9)),
            item("m4", None, Some(1)),
        ];

        let synthetic = build_synthetic_categories(&items, 10, 2);
        assert_eq!(synthetic.len(), 1);
        assert_eq!(synthetic[0].kind, SyntheticKind::Trending);
        assert_eq!(tokens(&synthetic[0].members), vec!["m1", "m3"]);
    }

    #[test]
    fn test_no_items_no_synthetic() {
        assert!(build_synthetic_categories(&[], 25, 25).is_empty());
    }

    #[test]
    fn test_merge_roots_puts_synthetic_first() {
        let a: NodeRef = Arc::new(CategoryRecord::new("A", "A", None).into());
        let b: NodeRef = Arc::new(CategoryRecord::new("B", "B", None).into());
        let latest: NodeRef = Arc::new(CategoryNode::from(SyntheticCategory::new(
            SyntheticKind::Latest,
            BTreeSet::new(),
        )));
        let trending: NodeRef = Arc::new(CategoryNode::from(SyntheticCategory::new(
            SyntheticKind::Trending,
            BTreeSet::new(),
        )));

        let merged = merge_roots(vec![a, trending, b, latest]);
        let labels: Vec<&str> = merged.iter().map(|n| n.label()).collect();
        assert_eq!(labels, vec!["Latest", "Trending", "A", "B"]);
    }
}
