//! External cursor over a `HashTable`, plus `Iterator` adapters on top.
//!
//! `HashIter` walks slots in increasing index order and, inside a slot, the
//! chain in insertion order. It borrows the table's slot array and node
//! arena, so the table cannot be mutated (or dropped) while a cursor is
//! alive.

use crate::destructor::Destructor;
use crate::list::{Cursor, Ends, Nodes};
use crate::table::{Entry, HashTable};
use core::iter::FusedIterator;

/// Pull-based cursor: `current_key`, `advance`, `at_end`.
///
/// ```
/// use chained_hashtable::HashTable;
///
/// let mut t = HashTable::new();
/// t.put("a", 1).unwrap();
/// t.put("b", 2).unwrap();
///
/// let mut it = t.cursor();
/// let mut seen = Vec::new();
/// while !it.at_end() {
///     seen.push(it.current_key().unwrap().to_string());
///     it.advance();
/// }
/// seen.sort();
/// assert_eq!(seen, ["a", "b"]);
/// ```
pub struct HashIter<'a, V> {
    nodes: &'a Nodes<Entry<V>>,
    slots: &'a [Ends],
    slot: usize,
    cursor: Option<Cursor<'a, Entry<V>>>,
    // 1-based position of the current entry; `snapshot + 1` once exhausted.
    items_visited: usize,
    snapshot: usize,
}

impl<'a, V> HashIter<'a, V> {
    /// Position a cursor on the first entry of `table`, or at the end if the
    /// table is empty.
    pub fn new<D, S>(table: &'a HashTable<V, D, S>) -> Self
    where
        D: Destructor<V>,
    {
        let mut it = Self {
            nodes: table.nodes(),
            slots: table.slots(),
            slot: 0,
            cursor: None,
            items_visited: 1,
            snapshot: table.snapshot_count(),
        };
        it.restart();
        it
    }

    /// Go back to the first entry.
    pub fn restart(&mut self) {
        self.items_visited = 1;
        self.cursor = None;
        if self.snapshot == 0 || !self.seek_from(0) {
            self.finish();
        }
    }

    // Point at the head of the first occupied slot at or after `start`.
    fn seek_from(&mut self, start: usize) -> bool {
        let (slots, nodes) = (self.slots, self.nodes);
        for (i, chain) in slots.iter().enumerate().skip(start) {
            if !chain.is_empty() {
                self.slot = i;
                self.cursor = Some(chain.cursor(nodes));
                return true;
            }
        }
        false
    }

    fn finish(&mut self) {
        self.slot = self.slots.len();
        self.cursor = None;
        self.items_visited = self.snapshot + 1;
    }

    pub fn at_end(&self) -> bool {
        self.items_visited > self.snapshot
    }

    /// Move to the next entry. Returns `false`, and leaves the cursor at the
    /// end, when there is none; calling it at the end is a no-op.
    pub fn advance(&mut self) -> bool {
        if self.at_end() {
            return false;
        }
        if let Some(cursor) = self.cursor.as_mut() {
            if cursor.advance() {
                self.items_visited += 1;
                return true;
            }
        }
        if self.seek_from(self.slot + 1) {
            self.items_visited += 1;
            return true;
        }
        self.finish();
        false
    }

    fn current(&self) -> Option<&'a Entry<V>> {
        if self.at_end() {
            return None;
        }
        self.cursor.as_ref()?.current()
    }

    /// Key under the cursor, borrowed from the table.
    pub fn current_key(&self) -> Option<&'a str> {
        self.current().map(|e| &*e.key)
    }

    pub fn current_value(&self) -> Option<&'a V> {
        self.current().map(|e| &e.value)
    }

    pub fn current_entry(&self) -> Option<(&'a str, &'a V)> {
        self.current().map(|e| (&*e.key, &e.value))
    }

    /// Entries visited so far, counting the current one.
    pub fn items_visited(&self) -> usize {
        self.items_visited
    }
}

/// Iterator over `(key, value)` pairs.
pub struct Iter<'a, V> {
    cursor: HashIter<'a, V>,
    remaining: usize,
}

impl<'a, V> Iter<'a, V> {
    pub(crate) fn new(cursor: HashIter<'a, V>, remaining: usize) -> Self {
        Self { cursor, remaining }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a str, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let item = self.cursor.current_entry()?;
        self.cursor.advance();
        self.remaining -= 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}
impl<V> FusedIterator for Iter<'_, V> {}

/// Iterator over keys.
pub struct Keys<'a, V> {
    inner: Iter<'a, V>,
}

impl<'a, V> Keys<'a, V> {
    pub(crate) fn new(inner: Iter<'a, V>) -> Self {
        Self { inner }
    }
}

impl<'a, V> Iterator for Keys<'a, V> {
    type Item = &'a str;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for Keys<'_, V> {}
impl<V> FusedIterator for Keys<'_, V> {}

/// Iterator over values.
pub struct Values<'a, V> {
    inner: Iter<'a, V>,
}

impl<'a, V> Values<'a, V> {
    pub(crate) fn new(inner: Iter<'a, V>) -> Self {
        Self { inner }
    }
}

impl<'a, V> Iterator for Values<'a, V> {
    type Item = &'a V;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for Values<'_, V> {}
impl<V> FusedIterator for Values<'_, V> {}
