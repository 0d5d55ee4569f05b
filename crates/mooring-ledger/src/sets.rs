// crates/mooring-ledger/src/sets.rs
//
// Dynamic membership set: arena plus index with O(1) insert and
// swap-with-last removal. Enumeration order is not stable across mutations
// and must not be relied upon for correctness.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use mooring_core::Address;

/// An unordered set of addresses with O(1) add/remove and cheap iteration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddressSet {
    items: Vec<Address>,
    index: HashMap<Address, usize>,
}

impl AddressSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `addr`. Returns false if it was already present.
    pub fn insert(&mut self, addr: Address) -> bool {
        if self.index.contains_key(&addr) {
            return false;
        }
        self.index.insert(addr, self.items.len());
        self.items.push(addr);
        true
    }

    /// Remove `addr` by swapping the last element into its slot.
    /// Returns false if it was not present.
    pub fn remove(&mut self, addr: &Address) -> bool {
        let Some(pos) = self.index.remove(addr) else {
            return false;
        };
        let last = self.items.len() - 1;
        self.items.swap_remove(pos);
        if pos != last {
            self.index.insert(self.items[pos], pos);
        }
        true
    }

    pub fn contains(&self, addr: &Address) -> bool {
        self.index.contains_key(addr)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Address> {
        self.items.iter()
    }

    /// Snapshot of the current members, for iteration while mutating.
    pub fn to_vec(&self) -> Vec<Address> {
        self.items.clone()
    }
}

impl PartialEq for AddressSet {
    fn eq(&self, other: &Self) -> bool {
        // Order-insensitive comparison; the arena layout is incidental.
        self.items.len() == other.items.len()
            && self.items.iter().all(|a| other.contains(a))
    }
}

impl Eq for AddressSet {}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(b: u8) -> Address {
        Address::from_bytes([b; 20])
    }

    #[test]
    fn test_insert_and_contains() {
        let mut set = AddressSet::new();
        assert!(set.insert(addr(1)));
        assert!(!set.insert(addr(1)));
        assert!(set.contains(&addr(1)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_remove_swaps_last() {
        let mut set = AddressSet::new();
        set.insert(addr(1));
        set.insert(addr(2));
        set.insert(addr(3));
        assert!(set.remove(&addr(1)));
        assert!(!set.contains(&addr(1)));
        assert!(set.contains(&addr(2)));
        assert!(set.contains(&addr(3)));
        assert_eq!(set.len(), 2);
        // Remaining members still removable after the swap
        assert!(set.remove(&addr(3)));
        assert!(set.remove(&addr(2)));
        assert!(set.is_empty());
    }

    #[test]
    fn test_remove_absent() {
        let mut set = AddressSet::new();
        set.insert(addr(1));
        assert!(!set.remove(&addr(9)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_remove_last_element() {
        let mut set = AddressSet::new();
        set.insert(addr(1));
        assert!(set.remove(&addr(1)));
        assert!(set.is_empty());
    }
}
