//! HashTable: separately-chained table from string keys to owned values.
//!
//! Every entry is a node in one table-wide arena. Each slot of the bucket
//! vector holds only the first and last node key of its chain; an entry
//! lives in slot `hash(key) & (capacity - 1)` and nowhere else. Capacity is
//! always a power of two.

use crate::config::{TableConfig, DEFAULT_INITIAL_CAPACITY};
use crate::destructor::{Destructor, DropValue};
use crate::error::TableError;
use crate::iter::{HashIter, Iter, Keys, Values};
use crate::list::{Ends, Nodes};
use crate::lookup3::Lookup3State;
use crate::macros::trace;
use crate::reentrancy::ResizeState;
use core::fmt;
use core::hash::{BuildHasher, Hasher};

#[derive(Debug)]
pub(crate) struct Entry<V> {
    pub(crate) key: Box<str>,
    pub(crate) value: V,
}

pub struct HashTable<V, D = DropValue, S = Lookup3State>
where
    D: Destructor<V>,
{
    nodes: Nodes<Entry<V>>,
    slots: Vec<Ends>,
    // Rounded initial capacity; shrinking stops here.
    floor: usize,
    config: TableConfig,
    destructor: D,
    hasher: S,
    resize_state: ResizeState,
}

/// Slot for `key` in a table of `capacity` slots. The empty key always maps
/// to slot 0.
#[inline]
fn slot_of<S: BuildHasher>(hasher: &S, capacity: usize, key: &str) -> usize {
    if key.is_empty() {
        return 0;
    }
    let mut h = hasher.build_hasher();
    h.write(key.as_bytes());
    (h.finish() as usize) & (capacity - 1)
}

fn empty_slots(capacity: usize) -> Result<Vec<Ends>, TableError> {
    let mut slots = Vec::new();
    slots.try_reserve_exact(capacity)?;
    slots.resize(capacity, Ends::EMPTY);
    Ok(slots)
}

fn copy_key(key: &str) -> Result<Box<str>, TableError> {
    let mut owned = String::new();
    owned.try_reserve_exact(key.len())?;
    owned.push_str(key);
    Ok(owned.into_boxed_str())
}

impl<V> HashTable<V> {
    pub fn new() -> Self {
        Self::with_destructor(DropValue)
    }

    pub fn with_config(config: TableConfig) -> Result<Self, TableError> {
        Self::with_config_and_destructor(config, DropValue)
    }
}

impl<V> Default for HashTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, D> HashTable<V, D>
where
    D: Destructor<V>,
{
    /// Table with the default configuration whose values are handed to
    /// `destructor` on overwrite, `clear` and drop.
    pub fn with_destructor(destructor: D) -> Self {
        Self::with_destructor_and_hasher(destructor, Lookup3State::default())
    }

    pub fn with_config_and_destructor(
        config: TableConfig,
        destructor: D,
    ) -> Result<Self, TableError> {
        Self::with_config_destructor_and_hasher(config, destructor, Lookup3State::default())
    }
}

impl<V, S> HashTable<V, DropValue, S>
where
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_destructor_and_hasher(DropValue, hasher)
    }
}

impl<V, D, S> HashTable<V, D, S>
where
    D: Destructor<V>,
    S: BuildHasher,
{
    pub fn with_destructor_and_hasher(destructor: D, hasher: S) -> Self {
        Self {
            nodes: Nodes::with_key(),
            slots: vec![Ends::EMPTY; DEFAULT_INITIAL_CAPACITY],
            floor: DEFAULT_INITIAL_CAPACITY,
            config: TableConfig::default(),
            destructor,
            hasher,
            resize_state: ResizeState::Idle,
        }
    }

    /// Fallible constructor: rejects an invalid `config` and reports a slot
    /// array that cannot be allocated.
    pub fn with_config_destructor_and_hasher(
        config: TableConfig,
        destructor: D,
        hasher: S,
    ) -> Result<Self, TableError> {
        config.validate()?;
        let capacity = config.slot_count()?;
        let slots = empty_slots(capacity)?;
        Ok(Self {
            nodes: Nodes::with_key(),
            slots,
            floor: capacity,
            config,
            destructor,
            hasher,
            resize_state: ResizeState::Idle,
        })
    }

    fn should_grow(&self) -> bool {
        self.count() as f64 > self.config.get_max_load_factor() * self.capacity() as f64
    }

    fn should_shrink(&self) -> bool {
        self.capacity() > self.floor
            && (self.count() as f64) < self.config.get_min_load_factor() * self.capacity() as f64
    }

    fn find(&self, key: &str) -> Option<&Entry<V>> {
        let slot = slot_of(&self.hasher, self.capacity(), key);
        self.slots[slot]
            .iter(&self.nodes)
            .find(|e| &*e.key == key)
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.find(key).map(|e| &e.value)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let slot = slot_of(&self.hasher, self.capacity(), key);
        let mut cursor = self.slots[slot].cursor_mut(&mut self.nodes);
        loop {
            match cursor.current() {
                None => return None,
                Some(e) if &*e.key == key => break,
                Some(_) => {
                    cursor.advance();
                }
            }
        }
        cursor.into_current_mut().map(|e| &mut e.value)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.find(key).is_some()
    }

    /// Store `value` under a private copy of `key`.
    ///
    /// An existing value for the key is replaced in place and handed to the
    /// destructor. If the table is above its max load factor it grows first;
    /// when that growth, or copying the key, fails the table is left exactly
    /// as it was and the error is returned.
    pub fn put(&mut self, key: &str, value: V) -> Result<(), TableError> {
        if self.should_grow() {
            let target = self
                .capacity()
                .checked_mul(2)
                .ok_or(TableError::AllocationFailure)?;
            self.resize(target)?;
        }

        let slot = slot_of(&self.hasher, self.capacity(), key);
        let mut cursor = self.slots[slot].cursor_mut(&mut self.nodes);
        while let Some(entry) = cursor.current_mut() {
            if &*entry.key == key {
                let old = core::mem::replace(&mut entry.value, value);
                self.destructor.destroy(old);
                return Ok(());
            }
            cursor.advance();
        }

        // Copy before touching the chain so a failure leaves nothing behind.
        let key = copy_key(key)?;
        self.slots[slot].push_back(&mut self.nodes, Entry { key, value });
        Ok(())
    }

    /// Detach the entry for `key` and hand its value back to the caller
    /// without running the destructor.
    ///
    /// May shrink the table afterwards; a failed shrink is ignored.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let slot = slot_of(&self.hasher, self.capacity(), key);
        let mut cursor = self.slots[slot].cursor_mut(&mut self.nodes);
        let mut removed = None;
        while let Some(entry) = cursor.current() {
            if &*entry.key == key {
                removed = cursor.remove();
                break;
            }
            cursor.advance();
        }
        let entry = removed?;

        if self.should_shrink() {
            let target = (self.capacity() / 2).max(self.floor);
            if let Err(_e) = self.resize(target) {
                trace!("shrink to {} slots failed: {}", target, _e);
            }
        }
        Some(entry.value)
    }

    /// Rebuild the bucket vector with `new_capacity` slots (rounded up to a
    /// power of two) and rehash every entry into it.
    ///
    /// The new vector is allocated before the old one is touched, so on
    /// failure the table is unchanged. Entries stay where they are in the
    /// node arena and are only relinked into their new chains, a private
    /// insertion path that never checks load factors or allocates. A resize
    /// requested while one is running is a successful no-op.
    pub fn resize(&mut self, new_capacity: usize) -> Result<(), TableError> {
        if new_capacity == 0 {
            return Err(TableError::InvalidArgument("capacity must be positive"));
        }
        let new_capacity = new_capacity
            .checked_next_power_of_two()
            .ok_or(TableError::AllocationFailure)?;

        let Some(_gate) = self.resize_state.enter() else {
            trace!("resize to {} ignored: already resizing", new_capacity);
            return Ok(());
        };

        let fresh = match empty_slots(new_capacity) {
            Ok(fresh) => fresh,
            Err(e) => {
                trace!(
                    "resize from {} to {} slots failed: {}",
                    self.slots.len(),
                    new_capacity,
                    e
                );
                return Err(e);
            }
        };
        let old = core::mem::replace(&mut self.slots, fresh);
        trace!(
            "resizing from {} to {} slots ({} entries)",
            old.len(),
            new_capacity,
            self.nodes.len()
        );

        for mut chain in old {
            while let Some(k) = chain.unlink_front(&mut self.nodes) {
                let slot = slot_of(&self.hasher, new_capacity, &self.nodes[k].value().key);
                self.slots[slot].link_back(&mut self.nodes, k);
            }
        }
        Ok(())
    }
}

impl<V, D, S> HashTable<V, D, S>
where
    D: Destructor<V>,
{
    /// Number of live entries.
    pub fn count(&self) -> usize {
        self.nodes.len()
    }

    pub fn len(&self) -> usize {
        self.count()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of slots in the bucket vector.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn load_factor(&self) -> f64 {
        self.count() as f64 / self.capacity() as f64
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    /// Drop every entry, handing each value to the destructor. Capacity is
    /// kept.
    pub fn clear(&mut self) {
        let destructor = &mut self.destructor;
        let nodes = &mut self.nodes;
        for chain in self.slots.iter_mut() {
            chain.drain_with(nodes, |e| destructor.destroy(e.value));
        }
        debug_assert!(self.nodes.is_empty());
    }

    /// External cursor over the entries, in slot order and chain order
    /// within a slot.
    pub fn cursor(&self) -> HashIter<'_, V> {
        HashIter::new(self)
    }

    pub fn iter(&self) -> Iter<'_, V> {
        Iter::new(self.cursor(), self.count())
    }

    pub fn keys(&self) -> Keys<'_, V> {
        Keys::new(self.iter())
    }

    pub fn values(&self) -> Values<'_, V> {
        Values::new(self.iter())
    }

    pub(crate) fn slots(&self) -> &[Ends] {
        &self.slots
    }

    pub(crate) fn nodes(&self) -> &Nodes<Entry<V>> {
        &self.nodes
    }

    pub(crate) fn snapshot_count(&self) -> usize {
        self.count()
    }
}

impl<V, D, S> Drop for HashTable<V, D, S>
where
    D: Destructor<V>,
{
    fn drop(&mut self) {
        self.clear();
    }
}

impl<V, D, S> fmt::Debug for HashTable<V, D, S>
where
    V: fmt::Debug,
    D: Destructor<V>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, V, D, S> IntoIterator for &'a HashTable<V, D, S>
where
    D: Destructor<V>,
{
    type Item = (&'a str, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Panics if the table cannot allocate, like the standard collections.
impl<K, V, D, S> Extend<(K, V)> for HashTable<V, D, S>
where
    K: AsRef<str>,
    D: Destructor<V>,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            if let Err(e) = self.put(k.as_ref(), v) {
                panic!("HashTable::extend: {}", e);
            }
        }
    }
}

impl<K, V> FromIterator<(K, V)> for HashTable<V>
where
    K: AsRef<str>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = HashTable::new();
        table.extend(iter);
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::collections::BTreeSet;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct ConstBuildHasher;
    struct ConstHasher;
    impl BuildHasher for ConstBuildHasher {
        type Hasher = ConstHasher;
        fn build_hasher(&self) -> Self::Hasher {
            ConstHasher
        }
    }
    impl Hasher for ConstHasher {
        fn write(&mut self, _bytes: &[u8]) {}
        fn finish(&self) -> u64 {
            0
        } // force all keys into one chain
    }

    fn small(cap: usize) -> HashTable<i32> {
        HashTable::with_config(TableConfig::new().initial_capacity(cap)).unwrap()
    }

    fn counting() -> (Rc<RefCell<Vec<i32>>>, impl FnMut(i32)) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = log.clone();
        (log, move |v| l.borrow_mut().push(v))
    }

    /// Invariant: every entry sits in the slot its key hashes to, and every
    /// node in the arena is reachable from exactly one chain.
    fn assert_structure<V, D: Destructor<V>, S: BuildHasher>(t: &HashTable<V, D, S>) {
        let mut total = 0;
        for (i, chain) in t.slots.iter().enumerate() {
            for e in chain.iter(&t.nodes) {
                assert_eq!(slot_of(&t.hasher, t.capacity(), &e.key), i);
                total += 1;
            }
        }
        assert_eq!(total, t.count());
        assert!(t.capacity().is_power_of_two());
    }

    #[test]
    fn put_get_contains() {
        let mut t = HashTable::new();
        t.put("uno", 1).unwrap();
        t.put("dos", 2).unwrap();
        assert_eq!(t.get("uno"), Some(&1));
        assert_eq!(t.get("dos"), Some(&2));
        assert_eq!(t.get("tres"), None);
        assert!(t.contains("uno"));
        assert!(!t.contains("tres"));
        assert_eq!(t.count(), 2);
        assert_structure(&t);
    }

    /// Invariant: overwriting keeps `count`, replaces in place and hands the
    /// old value to the destructor exactly once.
    #[test]
    fn overwrite_destroys_old_value() {
        let (log, d) = counting();
        let mut t = HashTable::with_destructor(d);
        t.put("k", 1).unwrap();
        t.put("k", 2).unwrap();
        assert_eq!(t.count(), 1);
        assert_eq!(t.get("k"), Some(&2));
        assert_eq!(*log.borrow(), vec![1]);
    }

    /// Invariant: `remove` returns ownership without running the destructor
    /// and leaves no trace of the key.
    #[test]
    fn remove_returns_value_without_destroying() {
        let (log, d) = counting();
        let mut t = HashTable::with_destructor(d);
        t.put("a", 10).unwrap();
        t.put("b", 20).unwrap();
        assert_eq!(t.remove("a"), Some(10));
        assert_eq!(t.remove("a"), None);
        assert!(!t.contains("a"));
        assert_eq!(t.count(), 1);
        assert!(log.borrow().is_empty());
        drop(t);
        assert_eq!(*log.borrow(), vec![20]);
    }

    #[test]
    fn remove_absent_has_no_side_effects() {
        let mut t = small(8);
        t.put("x", 1).unwrap();
        let cap = t.capacity();
        assert_eq!(t.remove("y"), None);
        assert_eq!(t.count(), 1);
        assert_eq!(t.capacity(), cap);
    }

    /// Invariant: a chain emptied by `remove` is released and its slot reset.
    #[test]
    fn empty_chains_are_released() {
        let mut t: HashTable<i32, DropValue, ConstBuildHasher> =
            HashTable::with_hasher(ConstBuildHasher);
        t.put("a", 1).unwrap();
        t.put("b", 2).unwrap();
        assert!(!t.slots[0].is_empty());
        t.remove("a");
        assert!(!t.slots[0].is_empty());
        t.remove("b");
        assert!(t.slots.iter().all(|s| *s == Ends::EMPTY));
        assert!(t.nodes.is_empty());
        assert_structure(&t);
    }

    #[test]
    fn empty_key_is_legal_and_maps_to_slot_zero() {
        let mut t = small(16);
        t.put("", 7).unwrap();
        assert_eq!(t.get(""), Some(&7));
        assert!(!t.slots[0].is_empty());
        assert_eq!(t.remove(""), Some(7));
        assert!(!t.contains(""));
    }

    /// Invariant: collisions are resolved by exact key comparison and the
    /// chain keeps insertion order.
    #[test]
    fn collisions_share_a_chain_in_insertion_order() {
        let mut t: HashTable<i32, DropValue, ConstBuildHasher> =
            HashTable::with_hasher(ConstBuildHasher);
        for (i, k) in ["a", "b", "c", "d"].iter().enumerate() {
            t.put(k, i as i32).unwrap();
        }
        let keys: Vec<&str> = t.keys().collect();
        assert_eq!(keys, vec!["a", "b", "c", "d"]);
        assert_eq!(t.get("c"), Some(&2));
        assert_eq!(t.remove("b"), Some(1));
        let keys: Vec<&str> = t.keys().collect();
        assert_eq!(keys, vec!["a", "c", "d"]);
    }

    /// Invariant: all chains share the table's node arena, a slot is only a
    /// pair of node keys, and rehashing relinks nodes without reallocating
    /// them.
    #[test]
    fn chains_share_one_arena() {
        assert_eq!(
            core::mem::size_of::<Ends>(),
            2 * core::mem::size_of::<slotmap::DefaultKey>()
        );
        let mut t = small(8);
        for i in 0..5 {
            t.put(&format!("k{}", i), i).unwrap();
        }
        let occupied = t.slots.iter().filter(|s| !s.is_empty()).count();
        assert!(occupied > 1, "keys spread over several slots");
        assert_eq!(t.nodes.len(), 5);

        let before: BTreeSet<slotmap::DefaultKey> = t.nodes.keys().collect();
        t.resize(64).unwrap();
        let after: BTreeSet<slotmap::DefaultKey> = t.nodes.keys().collect();
        assert_eq!(before, after);
        assert_eq!(t.capacity(), 64);
        assert_structure(&t);
        for i in 0..5 {
            assert_eq!(t.get(&format!("k{}", i)), Some(&i));
        }
    }

    #[test]
    fn get_mut_updates_value() {
        let mut t = HashTable::new();
        t.put("k", String::from("a")).unwrap();
        t.get_mut("k").unwrap().push('b');
        assert_eq!(t.get("k").map(String::as_str), Some("ab"));
        assert!(t.get_mut("missing").is_none());
    }

    /// Invariant: growth doubles capacity once the load factor passes the
    /// maximum and every key stays reachable.
    #[test]
    fn grows_past_threshold() {
        let mut t = small(8);
        for i in 0..7 {
            t.put(&format!("k{}", i), i).unwrap();
        }
        // 6/8 > 0.7 triggered growth on the seventh put.
        assert_eq!(t.capacity(), 16);
        for i in 0..7 {
            assert_eq!(t.get(&format!("k{}", i)), Some(&i));
        }
        assert_structure(&t);
    }

    /// Invariant: shrinking halves capacity when sparse but never goes below
    /// the initial capacity.
    #[test]
    fn shrinks_back_to_floor() {
        let mut t = small(8);
        for i in 0..100 {
            t.put(&format!("k{}", i), i).unwrap();
        }
        let grown = t.capacity();
        assert!(grown >= 128);
        for i in 0..100 {
            assert_eq!(t.remove(&format!("k{}", i)), Some(i));
            assert_structure(&t);
        }
        assert!(t.capacity() < grown);
        assert_eq!(t.capacity(), 8);
        assert!(t.is_empty());
    }

    #[test]
    fn zero_min_load_factor_never_shrinks() {
        let cfg = TableConfig::new().initial_capacity(8).min_load_factor(0.0);
        let mut t: HashTable<i32> = HashTable::with_config(cfg).unwrap();
        for i in 0..50 {
            t.put(&i.to_string(), i).unwrap();
        }
        let cap = t.capacity();
        for i in 0..50 {
            t.remove(&i.to_string());
        }
        assert_eq!(t.capacity(), cap);
    }

    /// Invariant: a resize that cannot allocate leaves the table untouched.
    #[test]
    fn failed_resize_leaves_table_unchanged() {
        let mut t = small(8);
        t.put("a", 1).unwrap();
        t.put("b", 2).unwrap();
        let before: BTreeSet<(String, i32)> =
            t.iter().map(|(k, v)| (k.to_string(), *v)).collect();

        let huge = (usize::MAX >> 1) + 1;
        assert_eq!(t.resize(huge), Err(TableError::AllocationFailure));
        assert_eq!(t.resize(usize::MAX), Err(TableError::AllocationFailure));

        assert_eq!(t.capacity(), 8);
        assert_eq!(t.count(), 2);
        assert!(!t.resize_state.is_resizing());
        let after: BTreeSet<(String, i32)> =
            t.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        assert_eq!(before, after);
        assert_structure(&t);
    }

    #[test]
    fn resize_rejects_zero_and_rounds_up() {
        let mut t = small(8);
        assert!(matches!(t.resize(0), Err(TableError::InvalidArgument(_))));
        for i in 0..5 {
            t.put(&i.to_string(), i).unwrap();
        }
        t.resize(100).unwrap();
        assert_eq!(t.capacity(), 128);
        t.resize(1).unwrap();
        assert_eq!(t.capacity(), 1);
        assert_structure(&t);
        for i in 0..5 {
            assert_eq!(t.get(&i.to_string()), Some(&i));
        }
    }

    /// Invariant: a resize requested while one is in flight is an `Ok` no-op.
    #[test]
    fn nested_resize_is_noop() {
        let mut t = small(8);
        t.put("a", 1).unwrap();
        t.resize_state = ResizeState::Resizing;
        assert_eq!(t.resize(64), Ok(()));
        assert_eq!(t.capacity(), 8);
        t.resize_state = ResizeState::Idle;
        t.resize(64).unwrap();
        assert_eq!(t.capacity(), 64);
    }

    /// Invariant: `clear` and drop run the destructor once per live value.
    #[test]
    fn clear_and_drop_destroy_every_value() {
        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();
        let mut t = HashTable::with_destructor(move |_v: i32| c.set(c.get() + 1));
        for i in 0..40 {
            t.put(&format!("k{}", i), i).unwrap();
        }
        t.clear();
        assert_eq!(calls.get(), 40);
        assert!(t.is_empty());
        assert!(t.iter().next().is_none());

        t.put("again", 1).unwrap();
        t.put("again", 2).unwrap(); // overwrite: +1
        drop(t);
        assert_eq!(calls.get(), 42);
    }

    /// Invariant: the stored key is an independent copy of the caller's.
    #[test]
    fn key_is_copied() {
        let mut t = HashTable::new();
        let mut key = String::from("clave");
        t.put(&key, 1).unwrap();
        key.clear();
        key.push_str("otra");
        assert_eq!(t.get("clave"), Some(&1));
        assert!(!t.contains("otra"));
    }

    #[test]
    fn config_errors_surface() {
        let cfg = TableConfig::new().initial_capacity(0);
        assert!(matches!(
            HashTable::<i32>::with_config(cfg),
            Err(TableError::InvalidArgument(_))
        ));
        let t: HashTable<i32> = HashTable::new();
        assert_eq!(t.capacity(), DEFAULT_INITIAL_CAPACITY);
        assert_eq!(t.load_factor(), 0.0);
    }

    #[test]
    fn debug_extend_and_collect() {
        let t: HashTable<i32> = vec![("a", 1)].into_iter().collect();
        assert_eq!(format!("{:?}", t), r#"{"a": 1}"#);

        let mut t2 = small(8);
        t2.extend([("x".to_string(), 1), ("y".to_string(), 2)]);
        assert_eq!(t2.count(), 2);
        assert_eq!(t2.get("y"), Some(&2));
    }
}
