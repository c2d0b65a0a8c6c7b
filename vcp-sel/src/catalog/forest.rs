//! Category forest
//!
//! Validates that categories form a forest and answers child lookups.
//!
//! Malformed input never fails the build:
//! - A node that transitively names itself as an ancestor is orphaned
//!   (treated as a root) so the rest of the tree stays usable.
//! - A node whose parent is unknown (deleted, unapproved, not yet fetched)
//!   is detached: it stays addressable by token but no level offers it.

use std::collections::HashMap;
use tracing::{debug, warn};
use vcp_common::config::SiblingOrder;
use vcp_common::CategoryToken;

use super::node::NodeRef;
use super::synthetic::merge_roots;

/// Effective parent link after validation
#[derive(Debug, Clone, PartialEq, Eq)]
enum ParentLink {
    Root,
    Parent(CategoryToken),
    Dangling(CategoryToken),
}

/// Validated parent/child structure over the visible categories
#[derive(Debug, Default)]
pub struct CategoryForest {
    links: HashMap<CategoryToken, ParentLink>,
    roots: Vec<NodeRef>,
    children: HashMap<CategoryToken, Vec<NodeRef>>,
    orphaned: Vec<CategoryToken>,
    detached: Vec<CategoryToken>,
}

impl CategoryForest {
    /// Build from categories in received order
    ///
    /// A repeated token keeps its first occurrence, matching [`TokenIndex`].
    /// Nodes are checked in input order, so the first member of each cycle
    /// to be checked is the one orphaned and the remaining members hang
    /// below it.
    ///
    /// [`TokenIndex`]: super::TokenIndex
    pub fn build(nodes: &[NodeRef], order: SiblingOrder) -> Self {
        let mut position: HashMap<&CategoryToken, usize> = HashMap::with_capacity(nodes.len());
        let mut unique: Vec<&NodeRef> = Vec::with_capacity(nodes.len());
        for node in nodes {
            if position.contains_key(node.token()) {
                debug!("Duplicate category token {}, keeping first occurrence", node.token());
                continue;
            }
            position.insert(node.token(), unique.len());
            unique.push(node);
        }

        let mut links: Vec<ParentLink> = unique
            .iter()
            .map(|node| match node.parent_token() {
                None => ParentLink::Root,
                Some(parent) if position.contains_key(parent) => ParentLink::Parent(parent.clone()),
                Some(parent) => ParentLink::Dangling(parent.clone()),
            })
            .collect();
        let parents: Vec<Option<usize>> = unique
            .iter()
            .map(|node| node.parent_token().and_then(|p| position.get(p).copied()))
            .collect();

        let mut orphaned = Vec::new();
        for i in cycle_breakers(&parents) {
            let token = unique[i].token();
            warn!("Category {} is its own ancestor, treating it as a root", token);
            links[i] = ParentLink::Root;
            orphaned.push(token.clone());
        }

        let mut roots = Vec::new();
        let mut children: HashMap<CategoryToken, Vec<NodeRef>> = HashMap::new();
        let mut detached = Vec::new();
        for (node, link) in unique.iter().zip(&links) {
            match link {
                ParentLink::Root => roots.push((*node).clone()),
                ParentLink::Parent(parent) => {
                    children.entry(parent.clone()).or_default().push((*node).clone())
                }
                ParentLink::Dangling(parent) => {
                    debug!("Category {} references unknown parent {}", node.token(), parent);
                    detached.push(node.token().clone());
                }
            }
        }

        if order == SiblingOrder::NameAscending {
            sort_by_label(&mut roots);
            for siblings in children.values_mut() {
                sort_by_label(siblings);
            }
        }

        let links = unique
            .iter()
            .map(|node| node.token().clone())
            .zip(links)
            .collect();

        Self {
            links,
            roots: merge_roots(roots),
            children,
            orphaned,
            detached,
        }
    }

    /// Children of a category, or the root level for `None`
    pub fn children_of(&self, parent: Option<&CategoryToken>) -> &[NodeRef] {
        match parent {
            None => &self.roots,
            Some(token) => self.children.get(token).map(Vec::as_slice).unwrap_or(&[]),
        }
    }

    /// Effective parent after cycle repair
    pub fn parent_of(&self, token: &CategoryToken) -> Option<&CategoryToken> {
        match self.links.get(token) {
            Some(ParentLink::Parent(parent)) => Some(parent),
            _ => None,
        }
    }

    /// Whether the category sits at the root level
    pub fn is_root(&self, token: &CategoryToken) -> bool {
        matches!(self.links.get(token), Some(ParentLink::Root))
    }

    /// Root-first chain ending at `token`
    ///
    /// `None` if the token is unknown or the chain does not reach a root.
    pub fn ancestors(&self, token: &CategoryToken) -> Option<Vec<CategoryToken>> {
        let mut chain = vec![token.clone()];
        let mut current = token;

        // Cycles are repaired at build, the bound only guards against bugs
        for _ in 0..=self.links.len() {
            match self.links.get(current)? {
                ParentLink::Root => {
                    chain.reverse();
                    return Some(chain);
                }
                ParentLink::Parent(parent) => {
                    chain.push(parent.clone());
                    current = parent;
                }
                ParentLink::Dangling(_) => return None,
            }
        }

        None
    }

    /// Categories cut loose from a cycle
    pub fn orphaned(&self) -> &[CategoryToken] {
        &self.orphaned
    }

    /// Categories whose parent is unknown
    pub fn detached(&self) -> &[CategoryToken] {
        &self.detached
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Unseen,
    OnWalk,
    Done,
}

/// Positions of the nodes whose parent link must be cut to break every cycle
///
/// `parents[i]` is the position of node i's parent. Each node is walked at
/// most once: a walk stops at the first node already settled by an earlier
/// walk. Meeting a node of the current walk closes a cycle, and its member
/// earliest in input order is the breaker. Returned in input order.
fn cycle_breakers(parents: &[Option<usize>]) -> Vec<usize> {
    let mut visit = vec![Visit::Unseen; parents.len()];
    let mut walk: Vec<usize> = Vec::new();
    let mut breakers = Vec::new();

    for start in 0..parents.len() {
        let mut current = Some(start);
        while let Some(i) = current {
            match visit[i] {
                Visit::Done => break,
                Visit::OnWalk => {
                    if let Some(from) = walk.iter().position(|&n| n == i) {
                        if let Some(&first) = walk[from..].iter().min() {
                            breakers.push(first);
                        }
                    }
                    break;
                }
                Visit::Unseen => {
                    visit[i] = Visit::OnWalk;
                    walk.push(i);
                    current = parents[i];
                }
            }
        }
        for i in walk.drain(..) {
            visit[i] = Visit::Done;
        }
    }

    breakers.sort_unstable();
    breakers
}

fn sort_by_label(nodes: &mut [NodeRef]) {
    nodes.sort_by_cached_key(|n| n.label().to_lowercase());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::node::{CategoryNode, SyntheticCategory, SyntheticKind};
    use std::collections::BTreeSet;
    use std::sync::Arc;
    use vcp_common::CategoryRecord;

    fn node(token: &str, parent: Option<&str>) -> NodeRef {
        Arc::new(CategoryRecord::new(token, token, parent).into())
    }

    fn tokens(nodes: &[NodeRef]) -> Vec<&str> {
        nodes.iter().map(|n| n.token().as_str()).collect()
    }

    fn t(token: &str) -> CategoryToken {
        CategoryToken::new(token)
    }

    #[test]
    fn test_children_in_input_order() {
        let nodes = vec![
            node("root", None),
            node("z", Some("root")),
            node("a", Some("root")),
            node("m", Some("root")),
        ];
        let forest = CategoryForest::build(&nodes, SiblingOrder::ServerOrder);

        assert_eq!(tokens(forest.children_of(None)), vec!["root"]);
        assert_eq!(tokens(forest.children_of(Some(&t("root")))), vec!["z", "a", "m"]);
        assert!(forest.children_of(Some(&t("z"))).is_empty());
        assert!(forest.children_of(Some(&t("unknown"))).is_empty());
    }

    #[test]
    fn test_name_ascending_order() {
        let nodes = vec![
            node("root", None),
            node("beta", Some("root")),
            node("Alpha", Some("root")),
            node("gamma", Some("root")),
        ];
        let forest = CategoryForest::build(&nodes, SiblingOrder::NameAscending);
        assert_eq!(
            tokens(forest.children_of(Some(&t("root")))),
            vec!["Alpha", "beta", "gamma"]
        );
    }

    #[test]
    fn test_self_parent_is_orphaned() {
        let nodes = vec![node("a", Some("a"))];
        let forest = CategoryForest::build(&nodes, SiblingOrder::ServerOrder);

        assert_eq!(tokens(forest.children_of(None)), vec!["a"]);
        assert_eq!(forest.orphaned(), &[t("a")]);
    }

    #[test]
    fn test_two_cycle_orphans_first_member_only() {
        let nodes = vec![node("a", Some("b")), node("b", Some("a")), node("c", Some("b"))];
        let forest = CategoryForest::build(&nodes, SiblingOrder::ServerOrder);

        assert_eq!(forest.orphaned(), &[t("a")]);
        assert_eq!(tokens(forest.children_of(None)), vec!["a"]);
        assert_eq!(tokens(forest.children_of(Some(&t("a")))), vec!["b"]);
        assert_eq!(tokens(forest.children_of(Some(&t("b")))), vec!["c"]);
        assert_eq!(forest.ancestors(&t("c")), Some(vec![t("a"), t("b"), t("c")]));
    }

    #[test]
    fn test_cycle_reached_from_outside_is_repaired_by_its_own_member() {
        // x walks into the a<->b cycle before a is checked
        let nodes = vec![node("x", Some("a")), node("a", Some("b")), node("b", Some("a"))];
        let forest = CategoryForest::build(&nodes, SiblingOrder::ServerOrder);

        assert_eq!(forest.orphaned(), &[t("a")]);
        assert_eq!(forest.ancestors(&t("x")), Some(vec![t("a"), t("x")]));
    }

    #[test]
    fn test_dangling_parent_is_detached() {
        let nodes = vec![node("root", None), node("lost", Some("deleted"))];
        let forest = CategoryForest::build(&nodes, SiblingOrder::ServerOrder);

        assert_eq!(tokens(forest.children_of(None)), vec!["root"]);
        assert_eq!(forest.detached(), &[t("lost")]);
        assert!(forest.ancestors(&t("lost")).is_none());
    }

    #[test]
    fn test_ancestors_root_first() {
        let nodes = vec![
            node("c3", Some("c2")),
            node("c1", None),
            node("c2", Some("c1")),
        ];
        let forest = CategoryForest::build(&nodes, SiblingOrder::ServerOrder);

        assert_eq!(forest.ancestors(&t("c3")), Some(vec![t("c1"), t("c2"), t("c3")]));
        assert_eq!(forest.ancestors(&t("c1")), Some(vec![t("c1")]));
        assert!(forest.ancestors(&t("nope")).is_none());
        assert_eq!(forest.parent_of(&t("c3")), Some(&t("c2")));
        assert!(forest.is_root(&t("c1")));
        assert!(!forest.is_root(&t("c2")));
    }

    #[test]
    fn test_every_chain_terminates_within_node_count() {
        // Tangle of cycles, self-references and valid chains
        let nodes = vec![
            node("a", Some("b")),
            node("b", Some("c")),
            node("c", Some("a")),
            node("d", Some("d")),
            node("e", Some("c")),
            node("f", None),
            node("g", Some("f")),
            node("h", Some("e")),
        ];
        let forest = CategoryForest::build(&nodes, SiblingOrder::ServerOrder);

        for n in &nodes {
            let chain = forest.ancestors(n.token()).expect("chain should reach a root");
            assert!(chain.len() <= nodes.len());
            assert!(forest.is_root(&chain[0]));
        }
    }

    #[test]
    fn test_synthetic_roots_lead_in_any_input_order() {
        let latest: NodeRef = Arc::new(CategoryNode::from(SyntheticCategory::new(
            SyntheticKind::Latest,
            BTreeSet::new(),
        )));
        let trending: NodeRef = Arc::new(CategoryNode::from(SyntheticCategory::new(
            SyntheticKind::Trending,
            BTreeSet::new(),
        )));
        let nodes = vec![node("A", None), trending, node("B", None), latest];

        for order in [SiblingOrder::ServerOrder, SiblingOrder::NameAscending] {
            let forest = CategoryForest::build(&nodes, order);
            let labels: Vec<&str> = forest.children_of(None).iter().map(|n| n.label()).collect();
            assert_eq!(labels, vec!["Latest", "Trending", "A", "B"]);
        }
    }

    #[test]
    fn test_duplicate_token_keeps_first_occurrence() {
        let first: NodeRef = Arc::new(CategoryRecord::new("d", "D-first-root", None).into());
        let second: NodeRef = Arc::new(CategoryRecord::new("d", "D-second-child", Some("p")).into());
        let nodes = vec![node("p", None), first, second];
        let forest = CategoryForest::build(&nodes, SiblingOrder::ServerOrder);

        let roots: Vec<&str> = forest.children_of(None).iter().map(|n| n.label()).collect();
        assert_eq!(roots, vec!["p", "D-first-root"]);
        assert!(forest.children_of(Some(&t("p"))).is_empty());
        assert!(forest.is_root(&t("d")));
        assert!(forest.parent_of(&t("d")).is_none());
    }

    #[test]
    fn test_long_chain_in_reverse_order() {
        // Deepest node first: every walk from the front would cover the whole chain
        let depth = 20_000;
        let mut nodes: Vec<NodeRef> = (1..depth)
            .rev()
            .map(|i| {
                let parent = format!("c{}", i - 1);
                node(&format!("c{}", i), Some(parent.as_str()))
            })
            .collect();
        nodes.push(node("c0", None));
        let forest = CategoryForest::build(&nodes, SiblingOrder::ServerOrder);

        assert!(forest.orphaned().is_empty());
        assert_eq!(tokens(forest.children_of(None)), vec!["c0"]);
        let deepest = t(&format!("c{}", depth - 1));
        assert_eq!(forest.ancestors(&deepest).map(|chain| chain.len()), Some(depth));
    }

    #[test]
    fn test_cycle_at_end_of_long_chain() {
        let nodes = vec![
            node("tail", Some("mid")),
            node("mid", Some("loop-b")),
            node("loop-a", Some("loop-b")),
            node("loop-b", Some("loop-a")),
        ];
        let forest = CategoryForest::build(&nodes, SiblingOrder::ServerOrder);

        assert_eq!(forest.orphaned(), &[t("loop-a")]);
        assert_eq!(
            forest.ancestors(&t("tail")),
            Some(vec![t("loop-a"), t("loop-b"), t("mid"), t("tail")])
        );
    }
}
