use autumn::maaf::{compute_maaf, remove_duplicates, Maaf};
use autumn::network::{Network, NodeId, Origin};
use autumn::newick;
use autumn::removal::{reinsert, remove};
use autumn::taxa::TaxonSet;
use autumn::tree::TreeBuilder;
use autumn::{hybridization_networks, Options, Progress};
use proptest::prelude::*;
use proptest::sample::Index;

/// The shape of a random tree.  Leaves are numbered when the tree is built.
#[derive(Clone, Debug)]
enum Shape {
    Leaf,
    Node(Vec<Shape>),
}

fn subtree() -> impl Strategy<Value = Shape> {
    Just(Shape::Leaf).prop_recursive(4, 24, 4, |inner| {
        prop::collection::vec(inner, 2..4).prop_map(Shape::Node)
    })
}

fn tree() -> impl Strategy<Value = Vec<Shape>> {
    prop::collection::vec(subtree(), 2..4)
}

/// Build a network from the shapes of the root's children.  Returns the network and its number of
/// taxa.
fn build(children: &[Shape]) -> (Network, usize) {
    let mut network = Network::new(TaxonSet::new());
    let root = network.root();
    let mut next = 0;
    for child in children {
        add(&mut network, root, child, &mut next);
    }
    network.recompute_taxa();
    (network, next)
}

fn add(network: &mut Network, parent: NodeId, shape: &Shape, next: &mut usize) {
    match shape {
        Shape::Leaf => {
            let leaf = network.new_leaf(*next);
            *next += 1;
            network.link(parent, leaf, None);
        }
        Shape::Node(children) => {
            let node = network.new_node(TaxonSet::new(), TaxonSet::new());
            network.link(parent, node, None);
            for child in children {
                add(network, node, child, next);
            }
        }
    }
}

/// The minimal networks of two trees that conflict in several ways, with every network repeated
fn networks_with_duplicates() -> Vec<Network> {
    let mut builder = TreeBuilder::new();
    newick::parse_forest(&mut builder, "((((a,b),c),d),e);\n((((a,c),b),e),d);\n").unwrap();
    let trees = builder.trees();
    let outcome =
        hybridization_networks(&trees[0], &trees[1], &Options::default(), &Progress::new())
            .unwrap();
    let networks = outcome
        .networks
        .iter()
        .map(|network| network.network().clone())
        .collect::<Vec<_>>();
    networks.iter().chain(networks.iter()).cloned().collect()
}

fn sorted_forests(networks: &[Network]) -> Vec<Maaf> {
    let mut forests = networks.iter().map(compute_maaf).collect::<Vec<_>>();
    forests.sort();
    forests
}

proptest! {

    /// Removing a taxon and putting it back restores the tree
    #[test]
    fn remove_then_reinsert(children in tree(), index in any::<Index>()) {
        let (original, count) = build(&children);
        let taxon = index.index(count);
        let mut tree = original.clone();
        let root = tree.root();
        prop_assert!(remove(&mut tree, root, Origin::First, taxon));
        prop_assert!(!tree[root].taxa().contains(taxon));
        reinsert(&mut tree, root, taxon);
        prop_assert_eq!(tree.structural_hash(), original.structural_hash());
        prop_assert_eq!(tree.to_string(), original.to_string());
    }

    /// The forest of a forest is the forest itself
    #[test]
    fn maaf_is_idempotent(children in tree()) {
        let (network, _) = build(&children);
        let maaf = compute_maaf(&network);
        prop_assert_eq!(compute_maaf(&maaf.to_network()), maaf);
    }

    /// The order of the networks does not change which forests survive deduplication
    #[test]
    fn deduplication_ignores_order(
        networks in Just(networks_with_duplicates()).prop_shuffle()
    ) {
        let expected = remove_duplicates(networks_with_duplicates());
        let unique = remove_duplicates(networks);
        prop_assert_eq!(unique.len(), expected.len());
        prop_assert_eq!(sorted_forests(&unique), sorted_forests(&expected));
    }
}
