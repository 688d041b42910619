//! Taxon identifiers and the bit sets used to track which taxa live below a node.
//!
//! Taxa are dense integers shared by both input trees.  Leaf labels are mapped to these integers
//! by a `TaxonTable` when the input is prepared.  Ids beyond the end of the table are placeholders
//! handed out during the search, each standing in for a collapsed group of taxa.

use fixedbitset::FixedBitSet;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FromIterator;

/// The type used to identify taxa
pub type Taxon = usize;

/// A set of taxa.  Equality, ordering and hashing depend only on the members of the set, not on
/// the capacity of the underlying bit set, so two sets built along different paths compare equal
/// whenever they hold the same taxa.
#[derive(Clone, Default)]
pub struct TaxonSet(FixedBitSet);

impl TaxonSet {
    /// Create an empty set
    pub fn new() -> Self {
        TaxonSet(FixedBitSet::with_capacity(0))
    }

    /// Create a set holding exactly one taxon
    pub fn singleton(taxon: Taxon) -> Self {
        let mut set = Self::new();
        set.insert(taxon);
        set
    }

    /// Add a taxon to the set, growing the set if necessary
    pub fn insert(&mut self, taxon: Taxon) {
        if taxon >= self.0.len() {
            self.0.grow(taxon + 1);
        }
        self.0.insert(taxon);
    }

    /// Remove a taxon from the set.  Returns whether the taxon was present.
    pub fn remove(&mut self, taxon: Taxon) -> bool {
        if self.contains(taxon) {
            self.0.set(taxon, false);
            true
        } else {
            false
        }
    }

    /// Is the given taxon a member of this set?
    pub fn contains(&self, taxon: Taxon) -> bool {
        self.0.contains(taxon)
    }

    /// The number of taxa in the set
    pub fn len(&self) -> usize {
        self.0.count_ones(..)
    }

    /// Is the set empty?
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Iterate over the members in increasing order
    pub fn iter(&self) -> impl Iterator<Item = Taxon> + '_ {
        self.0.ones()
    }

    /// The smallest member of the set
    pub fn first(&self) -> Option<Taxon> {
        self.iter().next()
    }

    /// Add all members of `other` to this set
    pub fn union_with(&mut self, other: &TaxonSet) {
        self.0.union_with(&other.0);
    }

    /// Remove all members of `other` from this set
    pub fn difference_with(&mut self, other: &TaxonSet) {
        for taxon in other.iter() {
            self.remove(taxon);
        }
    }

    /// The union of two sets
    pub fn union(&self, other: &TaxonSet) -> TaxonSet {
        let mut set = self.clone();
        set.union_with(other);
        set
    }

    /// The set of members of this set that are not in `other`
    pub fn difference(&self, other: &TaxonSet) -> TaxonSet {
        self.iter().filter(|&taxon| !other.contains(taxon)).collect()
    }

    /// The set of taxa in both sets
    pub fn intersection(&self, other: &TaxonSet) -> TaxonSet {
        self.iter().filter(|&taxon| other.contains(taxon)).collect()
    }

    /// Do the two sets share a taxon?
    pub fn intersects(&self, other: &TaxonSet) -> bool {
        self.iter().any(|taxon| other.contains(taxon))
    }

    /// Is every member of this set also a member of `other`?
    pub fn is_subset(&self, other: &TaxonSet) -> bool {
        self.iter().all(|taxon| other.contains(taxon))
    }
}

impl FromIterator<Taxon> for TaxonSet {
    fn from_iter<I: IntoIterator<Item = Taxon>>(iter: I) -> Self {
        let mut set = TaxonSet::new();
        for taxon in iter {
            set.insert(taxon);
        }
        set
    }
}

impl PartialEq for TaxonSet {
    fn eq(&self, other: &TaxonSet) -> bool {
        self.iter().eq(other.iter())
    }
}

impl Eq for TaxonSet {}

/// Sets are ordered lexicographically by their sorted members
impl Ord for TaxonSet {
    fn cmp(&self, other: &TaxonSet) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl PartialOrd for TaxonSet {
    fn partial_cmp(&self, other: &TaxonSet) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for TaxonSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        for taxon in self.iter() {
            state.write_usize(taxon);
        }
    }
}

impl fmt::Debug for TaxonSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// The table mapping leaf labels to taxa and back
#[derive(Clone, Debug, Default)]
pub struct TaxonTable {
    /// Label of each taxon, indexed by taxon
    labels: Vec<String>,

    /// Map from label back to its taxon
    ids: HashMap<String, Taxon>,
}

impl TaxonTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// The taxon of the given label, allocating the next free id if the label is new
    pub fn id_or_insert(&mut self, label: &str) -> Taxon {
        if let Some(&taxon) = self.ids.get(label) {
            return taxon;
        }
        let taxon = self.labels.len();
        self.labels.push(label.to_string());
        self.ids.insert(label.to_string(), taxon);
        taxon
    }

    /// The taxon of the given label, if the label is known
    pub fn id(&self, label: &str) -> Option<Taxon> {
        self.ids.get(label).copied()
    }

    /// The label of the given taxon
    pub fn label(&self, taxon: Taxon) -> Option<&str> {
        self.labels.get(taxon).map(|label| label.as_str())
    }

    /// The number of taxa in the table
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Is the table empty?
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Hands out fresh taxa for the placeholder leaves created by reductions
#[derive(Clone, Debug)]
pub struct Placeholders {
    next: Taxon,
}

impl Placeholders {
    /// Start handing out taxa at `first`, which must lie beyond every real taxon
    pub fn new(first: Taxon) -> Self {
        Placeholders { next: first }
    }

    /// A taxon that has not been handed out before
    pub fn fresh(&mut self) -> Taxon {
        let taxon = self.next;
        self.next += 1;
        taxon
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    /// Sets compare by their members, independent of how far they have grown
    #[test]
    fn equality_ignores_capacity() {
        let mut a = TaxonSet::singleton(3);
        a.insert(40);
        a.remove(40);
        let b = TaxonSet::singleton(3);
        assert_eq!(a, b);
        assert_eq!(a.cmp(&b), Ordering::Equal);
    }

    /// Sets are ordered lexicographically by their members
    #[test]
    fn lexicographic_order() {
        let a: TaxonSet = vec![0, 5].into_iter().collect();
        let b: TaxonSet = vec![1].into_iter().collect();
        let c: TaxonSet = vec![0, 5, 6].into_iter().collect();
        assert!(a < b);
        assert!(a < c);
        assert!(c < b);
    }

    /// Set algebra
    #[test]
    fn set_operations() {
        let a: TaxonSet = vec![1, 2, 3].into_iter().collect();
        let b: TaxonSet = vec![3, 4].into_iter().collect();
        assert_eq!(a.union(&b).iter().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
        assert_eq!(a.difference(&b).iter().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(a.intersection(&b).iter().collect::<Vec<_>>(), vec![3]);
        assert!(a.intersects(&b));
        assert!(!a.is_subset(&b));
        assert!(TaxonSet::singleton(2).is_subset(&a));
        assert_eq!(a.first(), Some(1));
        assert!(TaxonSet::new().is_empty());
    }

    /// Labels get dense ids in order of first appearance
    #[test]
    fn taxon_table() {
        let mut table = TaxonTable::new();
        assert_eq!(table.id_or_insert("a"), 0);
        assert_eq!(table.id_or_insert("b"), 1);
        assert_eq!(table.id_or_insert("a"), 0);
        assert_eq!(table.len(), 2);
        assert_eq!(table.label(1), Some("b"));
        assert_eq!(table.id("c"), None);

        let mut placeholders = Placeholders::new(table.len());
        assert_eq!(placeholders.fresh(), 2);
        assert_eq!(placeholders.fresh(), 3);
    }
}
