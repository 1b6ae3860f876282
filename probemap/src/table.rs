use std::fmt;
use std::ops::Index;

use log::{debug, trace};

use crate::config::{DEFAULT_LOAD_CEILING, TableConfig};
use crate::error::{Result, TableError};
use crate::iter::Iter;
use crate::primes::prime_at_least;
use crate::probe::{Linear, ProbeStrategy, Strategy};
use crate::slot::Slot;

/// Outcome of walking the probe sequence of a key
enum Lookup {
    /// The key lives in this slot
    Found(usize),
    /// The key is absent, this is where it should go
    Vacant(usize),
    /// The key is absent and no slot in its sequence is free
    Full,
}

/// This is an open address table with non-negative integer keys.
/// All entries live in a single slot array; collisions are resolved by
/// walking the sequence produced by the injected `ProbeStrategy`.
/// The table never grows on its own, see [`ResizableTable`](crate::ResizableTable).
pub struct OpenTable<V, P = Linear> {
    slots: Vec<Slot<V>>,
    len: usize,
    tombstones: usize,
    strategy: P,
    load_ceiling: f64,
}

impl<V> OpenTable<V, Linear> {
    /// Creates a linear probing table with `capacity` slots
    pub fn new(capacity: usize) -> Result<Self> {
        Self::with_strategy(capacity, Linear)
    }
}

impl<V> OpenTable<V, Strategy> {
    /// Creates a table using the capacity, strategy and load ceiling of `config`
    pub fn from_config(config: &TableConfig) -> Result<Self> {
        config.validate()?;
        Self::build(config.initial_capacity, config.strategy, config.load_ceiling)
    }
}

impl<V, P: ProbeStrategy> OpenTable<V, P> {
    /// Creates a table probing with `strategy`.
    /// Strategies that need a prime capacity get the smallest prime `>= capacity`.
    pub fn with_strategy(capacity: usize, strategy: P) -> Result<Self> {
        Self::build(capacity, strategy, DEFAULT_LOAD_CEILING)
    }

    pub(crate) fn build(capacity: usize, strategy: P, load_ceiling: f64) -> Result<Self> {
        if capacity == 0 {
            return Err("capacity must be at least 1".into());
        }
        if !(load_ceiling > 0.0 && load_ceiling <= 1.0) {
            return Err(TableError::InvalidConfig(format!(
                "load ceiling must be in (0, 1], got {load_ceiling}"
            )));
        }

        let capacity = if strategy.requires_prime_capacity() {
            let prime = prime_at_least(capacity as u64) as usize;
            if prime != capacity {
                trace!("rounding capacity {capacity} up to prime {prime}");
            }
            prime
        } else {
            capacity
        };

        Ok(Self {
            slots: std::iter::repeat_with(|| Slot::Empty).take(capacity).collect(),
            len: 0,
            tombstones: 0,
            strategy,
            load_ceiling,
        })
    }

    /// Returns the number of key-value pairs in the table
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the table contains no elements
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of slots
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of tombstones left by deletions
    pub fn tombstones(&self) -> usize {
        self.tombstones
    }

    /// Returns the load factor of the table (len / capacity)
    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.capacity() as f64
    }

    pub fn load_ceiling(&self) -> f64 {
        self.load_ceiling
    }

    pub fn strategy(&self) -> &P {
        &self.strategy
    }

    fn home(&self, key: u64) -> usize {
        (key % self.capacity() as u64) as usize
    }

    /// Walks the probe sequence of `key`, at most `capacity` slots, stopping
    /// early when the strategy comes back to the home slot.
    fn slots_of(&self, key: u64) -> impl Iterator<Item = usize> + '_ {
        let size = self.capacity();
        let home = self.home(key);
        std::iter::once(home).chain(
            (1..size)
                .map(move |attempt| self.strategy.probe(key, home, attempt, size))
                .take_while(move |&idx| idx != home),
        )
    }

    /// Find the slot for a key.
    /// A tombstone is only handed out once the key is known to be absent,
    /// otherwise a later copy of the key would survive further down the chain.
    fn locate(&self, key: u64) -> Lookup {
        let mut first_tombstone = None;

        for idx in self.slots_of(key) {
            match &self.slots[idx] {
                Slot::Empty => return Lookup::Vacant(first_tombstone.unwrap_or(idx)),
                Slot::Deleted => {
                    first_tombstone.get_or_insert(idx);
                }
                Slot::Occupied { key: k, .. } if *k as u64 == key => return Lookup::Found(idx),
                Slot::Occupied { .. } => {}
            }
        }

        match first_tombstone {
            Some(idx) => Lookup::Vacant(idx),
            None => Lookup::Full,
        }
    }

    fn find(&self, key: i64) -> Option<usize> {
        let key = u64::try_from(key).ok()?;
        match self.locate(key) {
            Lookup::Found(idx) => Some(idx),
            Lookup::Vacant(_) | Lookup::Full => None,
        }
    }

    /// Insert a key-value pair, overwriting the value if the key is present.
    ///
    /// Fails with [`TableError::TableFull`] when the probe sequence of the key
    /// holds no free slot, or when the new key would land off its home slot
    /// while the load factor is at or above the load ceiling.
    pub fn put(&mut self, key: i64, value: V) -> Result<()> {
        self.insert(key, value, true)
    }

    /// Insert used by rehashing as well, which skips the load ceiling since
    /// the destination is known to have room for every key.
    pub(crate) fn insert(&mut self, key: i64, value: V, enforce_ceiling: bool) -> Result<()> {
        let hashed = u64::try_from(key).map_err(|_| TableError::InvalidKey(key))?;
        let idx = self.slot_for(key, hashed, enforce_ceiling)?;

        match self.slots[idx] {
            Slot::Occupied { .. } => {}
            Slot::Deleted => {
                self.tombstones -= 1;
                self.len += 1;
            }
            Slot::Empty => self.len += 1,
        }
        self.slots[idx] = Slot::Occupied { key, value };
        Ok(())
    }

    /// Whether a put of `key` would succeed, without writing anything
    pub(crate) fn check_room(&self, key: i64) -> Result<()> {
        let hashed = u64::try_from(key).map_err(|_| TableError::InvalidKey(key))?;
        self.slot_for(key, hashed, true).map(|_| ())
    }

    /// The slot a put of `key` writes to: its current slot if present,
    /// otherwise the free slot found by `locate`.
    fn slot_for(&self, key: i64, hashed: u64, enforce_ceiling: bool) -> Result<usize> {
        match self.locate(hashed) {
            Lookup::Found(idx) => Ok(idx),
            Lookup::Vacant(idx) => {
                if enforce_ceiling
                    && idx != self.home(hashed)
                    && self.load_factor() >= self.load_ceiling
                {
                    debug!(
                        "refusing key {key}: load factor {:.3} reached ceiling {:.3}",
                        self.load_factor(),
                        self.load_ceiling
                    );
                    return Err(TableError::TableFull {
                        capacity: self.capacity(),
                    });
                }
                Ok(idx)
            }
            Lookup::Full => {
                debug!("refusing key {key}: all {} slots taken", self.capacity());
                Err(TableError::TableFull {
                    capacity: self.capacity(),
                })
            }
        }
    }

    /// Get a value by key
    pub fn get(&self, key: i64) -> Option<&V> {
        self.find(key).and_then(|idx| self.slots[idx].value())
    }

    /// Get a mutable reference to the value of a key
    pub fn get_mut(&mut self, key: i64) -> Option<&mut V> {
        let idx = self.find(key)?;
        match &mut self.slots[idx] {
            Slot::Occupied { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn contains(&self, key: i64) -> bool {
        self.get(key).is_some()
    }

    /// Remove a key, leaving a tombstone so longer probe chains stay intact.
    /// Returns whether the key was present.
    pub fn delete(&mut self, key: i64) -> bool {
        self.remove(key).is_some()
    }

    /// Remove a key and return its value
    pub fn remove(&mut self, key: i64) -> Option<V> {
        let idx = self.find(key)?;
        let (_, value) = self.slots[idx].take()?;
        self.len -= 1;
        self.tombstones += 1;
        Some(value)
    }

    /// Drop every entry and tombstone, keeping the capacity
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = Slot::Empty);
        self.len = 0;
        self.tombstones = 0;
    }

    pub fn iter(&self) -> Iter<'_, V> {
        Iter::new(&self.slots, self.len)
    }

    pub fn keys(&self) -> impl Iterator<Item = i64> + '_ {
        self.iter().map(|(key, _)| key)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, value)| value)
    }

    /// Slot indices examined for `key` when none of them resolves it,
    /// i.e. the longest walk a lookup of `key` can take.
    pub fn probe_sequence(&self, key: i64) -> Vec<usize> {
        match u64::try_from(key) {
            Ok(key) => self.slots_of(key).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Consumes the table, yielding its entries in slot order
    pub(crate) fn into_entries(self) -> impl Iterator<Item = (i64, V)> {
        self.slots.into_iter().filter_map(|slot| match slot {
            Slot::Occupied { key, value } => Some((key, value)),
            _ => None,
        })
    }

    #[cfg(test)]
    pub(crate) fn slots(&self) -> &[Slot<V>] {
        &self.slots
    }
}

impl<V, P: ProbeStrategy> Index<i64> for OpenTable<V, P> {
    type Output = V;

    /// Panics if the key is not present, like `std::collections::HashMap`
    fn index(&self, key: i64) -> &V {
        self.get(key).expect("key not found in table")
    }
}

impl<'a, V, P: ProbeStrategy> IntoIterator for &'a OpenTable<V, P> {
    type Item = (i64, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<V: fmt::Debug, P: ProbeStrategy> fmt::Debug for OpenTable<V, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::OpenTable;
    use crate::config::TableConfig;
    use crate::error::{Result, TableError};
    use crate::probe::{DoubleHash, Linear, ProbeStrategy};
    use crate::test_util::initialize_logger;
    use proptest::prelude::*;
    use rustc_hash::FxHashMap;

    // Basic functionality tests
    #[test]
    fn test_put_and_get() {
        let mut table = OpenTable::new(11).unwrap();

        table.put(42, "answer").unwrap();

        assert_eq!(table.get(42), Some(&"answer"));
        assert_eq!(table.get(7), None);
        assert_eq!(table.len(), 1);
        assert!(table.contains(42));
        assert!(!table.contains(7));
    }

    #[test]
    fn test_empty_table() {
        let table: OpenTable<u32> = OpenTable::new(11).unwrap();

        assert_eq!(table.len(), 0);
        assert!(table.is_empty());
        for key in 0..100 {
            assert_eq!(table.get(key), None);
        }
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        let table: Result<OpenTable<u32>> = OpenTable::new(0);
        assert!(matches!(table, Err(TableError::InvalidConfig(_))));
    }

    #[test]
    fn test_overwrite_keeps_len() {
        let mut table = OpenTable::new(11).unwrap();

        table.put(3, "v1").unwrap();
        table.put(3, "v2").unwrap();

        assert_eq!(table.get(3), Some(&"v2"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_negative_keys() {
        let mut table = OpenTable::new(11).unwrap();

        assert_eq!(table.put(-1, "nope"), Err(TableError::InvalidKey(-1)));
        assert!(table.is_empty());
        assert_eq!(table.get(-1), None);
        assert!(!table.delete(-1));
        assert!(table.probe_sequence(-1).is_empty());
    }

    #[test]
    fn test_full_table_detection() {
        initialize_logger();
        let mut table = OpenTable::new(3).unwrap();

        table.put(0, 'a').unwrap();
        table.put(1, 'b').unwrap();
        table.put(2, 'c').unwrap();

        assert_eq!(table.put(3, 'd'), Err(TableError::TableFull { capacity: 3 }));
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(3), None);

        // overwriting is still fine on a full table
        table.put(2, 'z').unwrap();
        assert_eq!(table.get(2), Some(&'z'));
    }

    #[test]
    fn test_full_table_lookup_terminates() {
        let mut table = OpenTable::new(5).unwrap();
        for key in 0..5 {
            table.put(key, key).unwrap();
        }
        assert_eq!(table.get(100), None);
        assert!(!table.delete(100));
    }

    #[test]
    fn test_tombstone_preserves_chain() {
        let mut table = OpenTable::new(11).unwrap();

        // 22 has home slot 0, taken by 0, so it probes to slot 1
        table.put(0, "zero").unwrap();
        table.put(22, "twenty-two").unwrap();
        assert!(table.slots()[1].is_occupied());

        assert!(table.delete(0));
        assert!(table.slots()[0].is_deleted());
        assert_eq!(table.get(22), Some(&"twenty-two"));
        assert_eq!(table.len(), 1);
        assert_eq!(table.tombstones(), 1);
        assert!(!table.delete(0));
    }

    #[test]
    fn test_tombstone_before_key_does_not_duplicate() {
        let mut table = OpenTable::new(11).unwrap();

        table.put(0, 1).unwrap();
        table.put(11, 2).unwrap();
        assert!(table.delete(0));

        // 11 now sits behind a tombstone, overwriting it must not
        // leave a second copy in slot 0
        table.put(11, 3).unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.get(11), Some(&3));
        assert_eq!(table.keys().filter(|k| *k == 11).count(), 1);
        assert!(table.slots()[0].is_deleted());
    }

    #[test]
    fn test_tombstone_reused() {
        let mut table = OpenTable::new(3).unwrap();
        for key in 0..3 {
            table.put(key, key).unwrap();
        }
        assert!(table.delete(1));

        // no empty slot left, the tombstone is the only place to go
        table.put(4, 4).unwrap();
        assert_eq!(table.tombstones(), 0);
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(4), Some(&4));
        assert_eq!(table.put(5, 5), Err(TableError::TableFull { capacity: 3 }));
    }

    #[test]
    fn test_remove_returns_value() {
        let mut table = OpenTable::new(7).unwrap();
        table.put(5, String::from("five")).unwrap();

        assert_eq!(table.remove(5), Some(String::from("five")));
        assert_eq!(table.remove(5), None);
        assert!(table.is_empty());
    }

    #[test]
    fn test_get_mut() {
        let mut table = OpenTable::new(7).unwrap();
        table.put(1, vec![1]).unwrap();

        table.get_mut(1).unwrap().push(2);

        assert_eq!(table[1], vec![1, 2]);
        assert!(table.get_mut(2).is_none());
    }

    #[test]
    #[should_panic(expected = "key not found")]
    fn test_index_missing_key_panics() {
        let table: OpenTable<u8> = OpenTable::new(7).unwrap();
        let _ = table[3];
    }

    #[test]
    fn test_double_hash_same_home_slot() {
        let mut linear = OpenTable::new(11).unwrap();
        linear.put(0, 'a').unwrap();
        linear.put(11, 'b').unwrap();

        let mut double = OpenTable::with_strategy(11, DoubleHash).unwrap();
        double.put(0, 'a').unwrap();
        double.put(11, 'b').unwrap();

        // both land in slot 0 first, then diverge
        assert_eq!(linear.slots[0].key(), Some(0));
        assert_eq!(linear.slots[1].key(), Some(11));
        assert_eq!(double.slots[0].key(), Some(0));
        assert_eq!(double.slots[1].key(), Some(11));

        assert_eq!(linear.get(0), Some(&'a'));
        assert_eq!(linear.get(11), Some(&'b'));
        assert_eq!(double.get(0), Some(&'a'));
        assert_eq!(double.get(11), Some(&'b'));
    }

    #[test]
    fn test_double_hash_spreads_collisions() {
        let mut linear = OpenTable::new(11).unwrap();
        let mut double = OpenTable::with_strategy(11, DoubleHash).unwrap();
        for key in [0, 22, 44] {
            linear.put(key, ()).unwrap();
            double.put(key, ()).unwrap();
        }

        // linear stacks them up, double hashing jumps by h2 = 2
        assert_eq!(linear.keys().collect::<Vec<_>>(), vec![0, 22, 44]);
        assert_eq!(double.slots[2].key(), Some(22));
        assert_eq!(double.slots[4].key(), Some(44));
    }

    #[test]
    fn test_double_hash_rounds_capacity_to_prime() {
        let table: OpenTable<u8, DoubleHash> = OpenTable::with_strategy(12, DoubleHash).unwrap();
        assert_eq!(table.capacity(), 13);

        let table: OpenTable<u8, Linear> = OpenTable::with_strategy(12, Linear).unwrap();
        assert_eq!(table.capacity(), 12);
    }

    #[test]
    fn test_double_hash_fills_every_slot() {
        let mut table = OpenTable::with_strategy(13, DoubleHash).unwrap();
        // every key shares home slot 0
        for i in 0..13 {
            table.put(i * 13, i).unwrap();
        }
        assert_eq!(table.len(), 13);
        assert!(table.slots().iter().all(|s| s.is_occupied()));
        assert_eq!(
            table.put(13 * 13, 13),
            Err(TableError::TableFull { capacity: 13 })
        );
    }

    #[test]
    fn test_load_ceiling_refuses_long_chains() {
        initialize_logger();
        let config = TableConfig::new().with_capacity(10).with_load_ceiling(0.5);
        let mut table = OpenTable::from_config(&config).unwrap();
        for key in 0..5 {
            table.put(key, key).unwrap();
        }
        assert_eq!(table.load_factor(), 0.5);

        // home slot free, no chain to extend
        table.put(7, 7).unwrap();
        // home slot 0 taken, would need probing
        assert_eq!(table.put(10, 10), Err(TableError::TableFull { capacity: 10 }));
        // overwrites are never refused
        table.put(0, 100).unwrap();
        assert_eq!(table.get(0), Some(&100));
    }

    #[test]
    fn test_probe_sequence() {
        let linear: OpenTable<()> = OpenTable::new(5).unwrap();
        assert_eq!(linear.probe_sequence(7), vec![2, 3, 4, 0, 1]);

        let double: OpenTable<(), DoubleHash> = OpenTable::with_strategy(5, DoubleHash).unwrap();
        let mut seq = double.probe_sequence(7);
        assert_eq!(seq[0], 2);
        seq.sort_unstable();
        assert_eq!(seq, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_iter_and_clear() {
        let mut table = OpenTable::new(11).unwrap();
        for key in [3, 14, 5] {
            table.put(key, key * 10).unwrap();
        }
        table.delete(5);

        let mut pairs: Vec<(i64, i64)> = table.iter().map(|(k, v)| (k, *v)).collect();
        pairs.sort_unstable();
        assert_eq!(pairs, vec![(3, 30), (14, 140)]);
        assert_eq!(table.iter().len(), 2);
        assert_eq!((&table).into_iter().count(), 2);
        assert_eq!(table.values().sum::<i64>(), 170);

        table.clear();
        assert!(table.is_empty());
        assert_eq!(table.tombstones(), 0);
        assert_eq!(table.iter().next(), None);
        assert_eq!(table.capacity(), 11);
    }

    #[test]
    fn test_debug_lists_entries() {
        let mut table = OpenTable::new(11).unwrap();
        table.put(1, "one").unwrap();
        assert_eq!(format!("{table:?}"), r#"{1: "one"}"#);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Put(i64, u32),
        Delete(i64),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => (0i64..64, any::<u32>()).prop_map(|(k, v)| Op::Put(k, v)),
            1 => (0i64..64).prop_map(Op::Delete),
        ]
    }

    fn check_against_model<P: ProbeStrategy>(mut table: OpenTable<u32, P>, ops: Vec<Op>) {
        let mut model: FxHashMap<i64, u32> = FxHashMap::default();

        for op in ops {
            match op {
                Op::Put(k, v) => {
                    // capacity exceeds the key range, so puts never fail
                    table.put(k, v).unwrap();
                    model.insert(k, v);
                }
                Op::Delete(k) => {
                    assert_eq!(table.delete(k), model.remove(&k).is_some());
                }
            }
            assert_eq!(table.len(), model.len());
        }

        let occupied = table.slots().iter().filter(|s| s.is_occupied()).count();
        assert_eq!(occupied, table.len());
        let mut keys: Vec<i64> = table.keys().collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), table.len(), "duplicate key in table");

        for (k, v) in model.iter() {
            assert_eq!(table.get(*k), Some(v), "key: {k}");
        }
    }

    proptest! {
        #[test]
        fn linear_behaves_like_a_map(ops in proptest::collection::vec(op_strategy(), 1..300)) {
            check_against_model(OpenTable::new(67).unwrap(), ops);
        }

        #[test]
        fn double_hash_behaves_like_a_map(ops in proptest::collection::vec(op_strategy(), 1..300)) {
            check_against_model(OpenTable::with_strategy(67, DoubleHash).unwrap(), ops);
        }

        #[test]
        fn put_then_get(key in 0i64..i64::MAX, value in any::<u64>()) {
            let mut table = OpenTable::new(11).unwrap();
            table.put(key, value).unwrap();
            prop_assert_eq!(table.get(key), Some(&value));
        }
    }
}
