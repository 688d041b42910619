//! Subtree reduction.  A subtree that both trees share, up to chains and dead branches, needs no
//! reticulation inside it, so it is cut out of both trees and replaced by a single placeholder
//! leaf.  Children of one multifurcation that match children of the same multifurcation in the
//! other tree are cut out together.

use crate::error::Result;
use crate::network::{Network, NodeId};
use crate::reduction::{branching, check_taxa, detach, is_isomorphic, Detached};
use crate::taxa::{Placeholders, TaxonSet};
use std::collections::HashMap;
use tracing::debug;

/// The outcome of a subtree reduction
#[derive(Debug)]
pub enum SubtreeReduction {
    /// The two trees are isomorphic and can be merged without reticulations
    Isomorphic,

    /// A common subtree was replaced by a placeholder in both trees
    Reduced(Detached),

    /// The trees share no subtree with more than one taxon
    Irreducible,
}

/// A group of alive children of one branching node in each tree that pair up isomorphically
struct Match {
    parent2: NodeId,
    nodes1: Vec<NodeId>,
    nodes2: Vec<NodeId>,
    taxa: TaxonSet,
}

/// Look for the topmost common subtree of the two trees and replace it by a placeholder leaf
pub fn reduce(
    tree1: &mut Network,
    tree2: &mut Network,
    placeholders: &mut Placeholders,
) -> Result<SubtreeReduction> {
    check_taxa(tree1, tree2)?;
    if is_isomorphic(tree1, tree1.root(), tree2, tree2.root()) {
        return Ok(SubtreeReduction::Isomorphic);
    }

    // Where each cluster hangs off a branching node of the second tree
    let mut index: HashMap<TaxonSet, (NodeId, NodeId)> = HashMap::new();
    for parent in tree2.postorder() {
        let alive = tree2.alive_children(parent);
        if alive.len() < 2 {
            continue;
        }
        for child in alive {
            index.insert(tree2[child].taxa().clone(), (parent, child));
        }
    }

    let mut order = tree1.postorder();
    order.reverse();
    for parent1 in order {
        let alive = tree1.alive_children(parent1);
        if alive.len() < 2 {
            continue;
        }

        let mut matches: Vec<Match> = vec![];
        for child1 in alive {
            let taxa = tree1[child1].taxa();
            let (parent2, child2) = match index.get(taxa) {
                Some(&entry) => entry,
                None => continue,
            };
            if !is_isomorphic(tree1, child1, tree2, child2) {
                continue;
            }
            match matches.iter_mut().find(|m| m.parent2 == parent2) {
                Some(m) => {
                    m.nodes1.push(child1);
                    m.nodes2.push(child2);
                    m.taxa.union_with(taxa);
                }
                None => matches.push(Match {
                    parent2,
                    nodes1: vec![child1],
                    nodes2: vec![child2],
                    taxa: taxa.clone(),
                }),
            }
        }

        if let Some(mut m) = matches.into_iter().find(|m| m.taxa.len() > 1) {
            if m.nodes1.len() == 1 {
                m.nodes1[0] = branching(tree1, m.nodes1[0]);
                m.nodes2[0] = branching(tree2, m.nodes2[0]);
            }
            let placeholder = placeholders.fresh();
            debug!(
                "subtree reduction: {:?} becomes placeholder {}",
                m.taxa, placeholder
            );
            let first = detach(tree1, parent1, &m.nodes1, placeholder);
            let second = detach(tree2, m.parent2, &m.nodes2, placeholder);
            check_taxa(tree1, tree2)?;
            return Ok(SubtreeReduction::Reduced(Detached {
                first,
                second,
                placeholder,
            }));
        }
    }
    Ok(SubtreeReduction::Irreducible)
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::error::Error;
    use crate::network::tests::{build, l, n};

    /// Identical trees are isomorphic
    #[test]
    fn identical_trees() {
        let mut tree1 = build(&n(vec![n(vec![l(0), l(1)]), l(2)]));
        let mut tree2 = tree1.clone();
        let mut placeholders = Placeholders::new(3);
        assert!(matches!(
            reduce(&mut tree1, &mut tree2, &mut placeholders),
            Ok(SubtreeReduction::Isomorphic)
        ));
    }

    /// A common cherry is replaced by a placeholder in both trees
    #[test]
    fn common_cherry() {
        let mut tree1 = build(&n(vec![n(vec![n(vec![l(0), l(1)]), l(2)]), l(3)]));
        let mut tree2 = build(&n(vec![n(vec![n(vec![l(0), l(1)]), l(3)]), l(2)]));
        let mut placeholders = Placeholders::new(5);
        match reduce(&mut tree1, &mut tree2, &mut placeholders) {
            Ok(SubtreeReduction::Reduced(detached)) => {
                assert_eq!(detached.placeholder, 5);
                assert_eq!(detached.first.to_string(), "(0,1);");
                assert_eq!(detached.second.to_string(), "(0,1);");
            }
            other => panic!("expected a reduction, got {:?}", other),
        }
        assert_eq!(tree1.to_string(), "((2,5),3);");
        assert_eq!(tree2.to_string(), "(2,(3,5));");
    }

    /// Matching children of a multifurcation are cut out together
    #[test]
    fn common_group() {
        let mut tree1 = build(&n(vec![l(0), l(1), n(vec![l(2), l(3)])]));
        let mut tree2 = build(&n(vec![l(0), l(1), l(2), l(3)]));
        let mut placeholders = Placeholders::new(5);
        match reduce(&mut tree1, &mut tree2, &mut placeholders) {
            Ok(SubtreeReduction::Reduced(detached)) => {
                assert_eq!(detached.first.to_string(), "(0,1);");
                assert_eq!(detached.second.to_string(), "(0,1);");
            }
            other => panic!("expected a reduction, got {:?}", other),
        }
        assert_eq!(tree1.to_string(), "((2,3),5);");
        assert_eq!(tree2.to_string(), "(2,3,5);");
    }

    /// Trees that agree only on single leaves are irreducible
    #[test]
    fn irreducible() {
        let mut tree1 = build(&n(vec![n(vec![l(0), l(1)]), l(2)]));
        let mut tree2 = build(&n(vec![n(vec![l(0), l(2)]), l(1)]));
        let mut placeholders = Placeholders::new(3);
        assert!(matches!(
            reduce(&mut tree1, &mut tree2, &mut placeholders),
            Ok(SubtreeReduction::Irreducible)
        ));
    }

    /// Trees on different taxa are rejected
    #[test]
    fn taxon_mismatch() {
        let mut tree1 = build(&n(vec![l(0), l(1)]));
        let mut tree2 = build(&n(vec![l(0), l(2)]));
        let mut placeholders = Placeholders::new(3);
        assert!(matches!(
            reduce(&mut tree1, &mut tree2, &mut placeholders),
            Err(Error::TaxonMismatch { .. })
        ));
    }
}
