//! Token-keyed lookup maps
//!
//! Built in O(n) from the category and voice model lists. Lookups of unknown
//! tokens return `None`; callers treat that as a no-op because client and
//! server data can be transiently out of step.

use std::collections::HashMap;
use tracing::warn;
use vcp_common::{CategoryToken, Item, ItemToken};

use super::node::NodeRef;

/// Category-by-token and item-by-token maps, keys unique
#[derive(Debug, Default)]
pub struct TokenIndex {
    categories: HashMap<CategoryToken, NodeRef>,
    /// Categories in received order (duplicates dropped)
    category_order: Vec<NodeRef>,
    items: Vec<Item>,
    item_positions: HashMap<ItemToken, usize>,
}

impl TokenIndex {
    /// Build both maps; on duplicate tokens the first occurrence wins
    pub fn build(categories: Vec<NodeRef>, items: Vec<Item>) -> Self {
        let mut index = Self {
            categories: HashMap::with_capacity(categories.len()),
            category_order: Vec::with_capacity(categories.len()),
            items: Vec::with_capacity(items.len()),
            item_positions: HashMap::with_capacity(items.len()),
        };

        for node in categories {
            if index.categories.contains_key(node.token()) {
                warn!("Duplicate category token {}, keeping first occurrence", node.token());
                continue;
            }
            index.categories.insert(node.token().clone(), node.clone());
            index.category_order.push(node);
        }

        for item in items {
            if index.item_positions.contains_key(&item.token) {
                warn!("Duplicate voice model token {}, keeping first occurrence", item.token);
                continue;
            }
            index.item_positions.insert(item.token.clone(), index.items.len());
            index.items.push(item);
        }

        index
    }

    pub fn category(&self, token: &CategoryToken) -> Option<&NodeRef> {
        self.categories.get(token)
    }

    pub fn item(&self, token: &ItemToken) -> Option<&Item> {
        self.item_positions.get(token).map(|&pos| &self.items[pos])
    }

    pub fn contains_category(&self, token: &CategoryToken) -> bool {
        self.categories.contains_key(token)
    }

    /// Categories in received order
    pub fn categories(&self) -> &[NodeRef] {
        &self.category_order
    }

    /// Voice models in received order
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn category_count(&self) -> usize {
        self.category_order.len()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use vcp_common::CategoryRecord;

    fn node(token: &str, name: &str) -> NodeRef {
        Arc::new(CategoryRecord::new(token, name, None).into())
    }

    #[test]
    fn test_lookup_known_and_unknown() {
        let index = TokenIndex::build(
            vec![node("c1", "one")],
            vec![Item::new("i1", "Voice", "en")],
        );

        assert_eq!(index.category(&CategoryToken::new("c1")).map(|n| n.name()), Some("one"));
        assert_eq!(index.item(&ItemToken::new("i1")).map(|i| i.title.as_str()), Some("Voice"));
        assert!(index.category(&CategoryToken::new("missing")).is_none());
        assert!(index.item(&ItemToken::new("missing")).is_none());
    }

    #[test]
    fn test_duplicates_keep_first() {
        let index = TokenIndex::build(
            vec![node("c1", "first"), node("c1", "second")],
            vec![Item::new("i1", "first", "en"), Item::new("i1", "second", "fr")],
        );

        assert_eq!(index.category_count(), 1);
        assert_eq!(index.item_count(), 1);
        assert_eq!(index.category(&CategoryToken::new("c1")).map(|n| n.name()), Some("first"));
        assert_eq!(index.item(&ItemToken::new("i1")).map(|i| i.language_tag.as_str()), Some("en"));
    }

    #[test]
    fn test_order_preserved() {
        let index = TokenIndex::build(vec![node("b", "b"), node("a", "a")], Vec::new());
        let order: Vec<&str> = index.categories().iter().map(|n| n.token().as_str()).collect();
        assert_eq!(order, vec!["b", "a"]);
    }
}
