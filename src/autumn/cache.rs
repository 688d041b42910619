//! The memo table of the search.  States are keyed by the structural hashes of the two trees and
//! the candidate set.  An entry records either the exact minimum of the state together with all
//! its minimal networks, or a lower bound proven by a search that failed under a smaller bound.
//! Once the table is full, the least recently used quarter of its entries is evicted in one go.
//! Lookups only stamp the entry with the time of use, so a hit takes constant time and the cost of
//! sorting by use is shared by all the stores a batch eviction makes room for.

use crate::network::Network;
use crate::taxa::TaxonSet;
use indexmap::IndexMap;
use tracing::trace;

/// The fraction of the entries evicted when the table is full
const EVICTION_DIVISOR: usize = 4;

/// The key of a search state
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Key {
    tree1: u64,
    tree2: u64,
    candidates: TaxonSet,
}

impl Key {
    /// The key of the state made up of the given trees and candidates
    pub fn new(tree1: &Network, tree2: &Network, candidates: &TaxonSet) -> Self {
        Key {
            tree1: tree1.structural_hash(),
            tree2: tree2.structural_hash(),
            candidates: candidates.clone(),
        }
    }
}

/// What is known about a search state
#[derive(Clone, Debug)]
pub enum Entry {
    /// The minimum cost of the state and all networks achieving it
    Exact { cost: usize, networks: Vec<Network> },

    /// The minimum cost of the state is at least this
    LowerBound(usize),
}

/// An entry together with the time of its last use
#[derive(Debug)]
struct Slot {
    used: u64,
    entry: Entry,
}

/// A bounded LRU table of search states
#[derive(Debug)]
pub struct Cache {
    entries: IndexMap<Key, Slot>,

    /// The maximum number of entries
    capacity: usize,

    /// Is the cache used at all?
    enabled: bool,

    /// Advanced by every lookup and store
    clock: u64,

    hits: usize,
    misses: usize,
    evictions: usize,
}

impl Cache {
    /// Create an empty cache.  A disabled cache never stores anything.
    pub fn new(capacity: usize, enabled: bool) -> Self {
        Cache {
            entries: IndexMap::new(),
            capacity,
            enabled: enabled && capacity > 0,
            clock: 0,
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    /// Look up a state, marking it as most recently used
    pub fn get(&mut self, key: &Key) -> Option<&Entry> {
        if !self.enabled {
            return None;
        }
        self.clock += 1;
        match self.entries.get_mut(key) {
            Some(slot) => {
                self.hits += 1;
                slot.used = self.clock;
                Some(&slot.entry)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Record what is known about a state.  An exact entry is never replaced by a lower bound.
    pub fn store(&mut self, key: Key, entry: Entry) {
        if !self.enabled {
            return;
        }
        let present = match (self.entries.get(&key), &entry) {
            (Some(Slot { entry: Entry::Exact { .. }, .. }), Entry::LowerBound(_)) => return,
            (slot, _) => slot.is_some(),
        };
        if !present && self.entries.len() >= self.capacity {
            self.evict();
        }
        self.clock += 1;
        let used = self.clock;
        self.entries.insert(key, Slot { used, entry });
    }

    /// Drop the least recently used entries, a quarter of the capacity but at least one
    fn evict(&mut self) {
        let count = (self.capacity / EVICTION_DIVISOR)
            .max(1)
            .min(self.entries.len());
        self.entries
            .sort_unstable_by(|_, slot1, _, slot2| slot1.used.cmp(&slot2.used));
        self.entries.drain(..count);
        self.evictions += count;
    }

    /// The number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Is the cache empty?
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all entries
    pub fn clear(&mut self) {
        trace!(
            "clearing cache with {} entries after {} hits, {} misses and {} evictions",
            self.entries.len(),
            self.hits,
            self.misses,
            self.evictions
        );
        self.entries.clear();
        self.clock = 0;
        self.hits = 0;
        self.misses = 0;
        self.evictions = 0;
    }
}
