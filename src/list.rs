//! Singly-linked chains whose nodes live in a `SlotMap` arena.
//!
//! A chain's own state is just `Ends`: the keys of its first and last node.
//! Nodes point at their successor by generational key, so relinking never
//! touches raw pointers, and any number of chains can share one arena. The
//! hash table keeps every bucket in a single arena this way; `LinkedList`
//! pairs an arena with one chain for standalone use.

use core::fmt;
use slotmap::{DefaultKey, SlotMap};

#[derive(Debug)]
pub(crate) struct Node<T> {
    value: T,
    next: Option<DefaultKey>,
}

impl<T> Node<T> {
    pub(crate) fn value(&self) -> &T {
        &self.value
    }
}

/// Node storage shared by every chain built over it.
pub(crate) type Nodes<T> = SlotMap<DefaultKey, Node<T>>;

/// First and last node of one chain. Both are `None` exactly when the chain
/// is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Ends {
    head: Option<DefaultKey>,
    tail: Option<DefaultKey>,
}

impl Ends {
    pub(crate) const EMPTY: Ends = Ends {
        head: None,
        tail: None,
    };

    pub(crate) fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub(crate) fn push_front<T>(&mut self, nodes: &mut Nodes<T>, value: T) {
        let k = nodes.insert(Node {
            value,
            next: self.head,
        });
        if self.tail.is_none() {
            self.tail = Some(k);
        }
        self.head = Some(k);
    }

    pub(crate) fn push_back<T>(&mut self, nodes: &mut Nodes<T>, value: T) {
        let k = nodes.insert(Node { value, next: None });
        self.link_back(nodes, k);
    }

    pub(crate) fn pop_front<T>(&mut self, nodes: &mut Nodes<T>) -> Option<T> {
        let k = self.unlink_front(nodes)?;
        nodes.remove(k).map(|n| n.value)
    }

    /// Detach the first node without freeing it; it stays in the arena until
    /// linked into a chain again or removed.
    pub(crate) fn unlink_front<T>(&mut self, nodes: &mut Nodes<T>) -> Option<DefaultKey> {
        let k = self.head?;
        self.head = nodes.get_mut(k).and_then(|n| n.next.take());
        if self.head.is_none() {
            self.tail = None;
        }
        Some(k)
    }

    /// Append a detached node already in `nodes`.
    pub(crate) fn link_back<T>(&mut self, nodes: &mut Nodes<T>, k: DefaultKey) {
        match self.tail {
            Some(t) => nodes[t].next = Some(k),
            None => self.head = Some(k),
        }
        self.tail = Some(k);
    }

    pub(crate) fn front<'a, T>(&self, nodes: &'a Nodes<T>) -> Option<&'a T> {
        self.head.and_then(|k| nodes.get(k)).map(|n| &n.value)
    }

    pub(crate) fn iter<'a, T>(&self, nodes: &'a Nodes<T>) -> Iter<'a, T> {
        Iter {
            cursor: self.cursor(nodes),
        }
    }

    pub(crate) fn cursor<'a, T>(&self, nodes: &'a Nodes<T>) -> Cursor<'a, T> {
        Cursor {
            nodes,
            current: self.head,
        }
    }

    pub(crate) fn cursor_mut<'a, T>(&'a mut self, nodes: &'a mut Nodes<T>) -> CursorMut<'a, T> {
        CursorMut {
            current: self.head,
            prev: None,
            nodes,
            ends: self,
        }
    }

    pub(crate) fn visit<T, F>(&self, nodes: &mut Nodes<T>, mut f: F) -> bool
    where
        F: FnMut(&mut T) -> bool,
    {
        let mut cur = self.head;
        while let Some(k) = cur {
            let node = &mut nodes[k];
            if !f(&mut node.value) {
                return false;
            }
            cur = node.next;
        }
        true
    }

    pub(crate) fn drain_with<T, F>(&mut self, nodes: &mut Nodes<T>, mut f: F)
    where
        F: FnMut(T),
    {
        while let Some(v) = self.pop_front(nodes) {
            f(v);
        }
    }
}

/// A chain that owns its arena.
pub struct LinkedList<T> {
    nodes: Nodes<T>,
    ends: Ends,
}

impl<T> LinkedList<T> {
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            ends: Ends::EMPTY,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ends.is_empty()
    }

    pub fn push_front(&mut self, value: T) {
        self.ends.push_front(&mut self.nodes, value);
    }

    pub fn push_back(&mut self, value: T) {
        self.ends.push_back(&mut self.nodes, value);
    }

    pub fn pop_front(&mut self) -> Option<T> {
        self.ends.pop_front(&mut self.nodes)
    }

    pub fn front(&self) -> Option<&T> {
        self.ends.front(&self.nodes)
    }

    pub fn iter(&self) -> Iter<'_, T> {
        self.ends.iter(&self.nodes)
    }

    /// Read-only cursor positioned on the first element.
    pub fn cursor(&self) -> Cursor<'_, T> {
        self.ends.cursor(&self.nodes)
    }

    /// Cursor that can insert before, and remove at, its position.
    pub fn cursor_mut(&mut self) -> CursorMut<'_, T> {
        self.ends.cursor_mut(&mut self.nodes)
    }

    /// Visit elements front to back until `f` returns `false`.
    ///
    /// Returns `true` if every element was visited.
    pub fn visit<F>(&mut self, f: F) -> bool
    where
        F: FnMut(&mut T) -> bool,
    {
        self.ends.visit(&mut self.nodes, f)
    }

    /// Empty the list front to back, handing every element to `f`.
    pub fn drain_with<F>(&mut self, f: F)
    where
        F: FnMut(T),
    {
        self.ends.drain_with(&mut self.nodes, f);
    }
}

impl<T> Default for LinkedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for LinkedList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Read-only position inside a chain.
pub struct Cursor<'a, T> {
    nodes: &'a Nodes<T>,
    current: Option<DefaultKey>,
}

impl<'a, T> Cursor<'a, T> {
    pub fn at_end(&self) -> bool {
        self.current.is_none()
    }

    pub fn current(&self) -> Option<&'a T> {
        let nodes = self.nodes;
        self.current.and_then(|k| nodes.get(k)).map(|n| &n.value)
    }

    /// Step to the next element. Returns `true` if the cursor landed on one;
    /// stepping from the end is a no-op returning `false`.
    pub fn advance(&mut self) -> bool {
        let Some(k) = self.current else {
            return false;
        };
        self.current = self.nodes.get(k).and_then(|n| n.next);
        self.current.is_some()
    }
}

impl<T> Clone for Cursor<'_, T> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes,
            current: self.current,
        }
    }
}

/// Mutating position inside a chain.
pub struct CursorMut<'a, T> {
    nodes: &'a mut Nodes<T>,
    ends: &'a mut Ends,
    prev: Option<DefaultKey>,
    current: Option<DefaultKey>,
}

impl<'a, T> CursorMut<'a, T> {
    pub fn at_end(&self) -> bool {
        self.current.is_none()
    }

    pub fn current(&self) -> Option<&T> {
        self.current
            .and_then(|k| self.nodes.get(k))
            .map(|n| &n.value)
    }

    pub fn current_mut(&mut self) -> Option<&mut T> {
        self.current
            .and_then(|k| self.nodes.get_mut(k))
            .map(|n| &mut n.value)
    }

    /// Consume the cursor, keeping a mutable borrow of the current element
    /// for the lifetime of the arena borrow.
    pub fn into_current_mut(self) -> Option<&'a mut T> {
        let nodes = self.nodes;
        self.current
            .and_then(move |k| nodes.get_mut(k))
            .map(|n| &mut n.value)
    }

    pub fn advance(&mut self) -> bool {
        let Some(k) = self.current else {
            return false;
        };
        self.prev = Some(k);
        self.current = self.nodes[k].next;
        self.current.is_some()
    }

    /// Insert `value` before the current position; the cursor then points at
    /// the new element. At the end this appends.
    pub fn insert(&mut self, value: T) {
        let k = self.nodes.insert(Node {
            value,
            next: self.current,
        });
        match self.prev {
            Some(p) => self.nodes[p].next = Some(k),
            None => self.ends.head = Some(k),
        }
        if self.current.is_none() {
            self.ends.tail = Some(k);
        }
        self.current = Some(k);
    }

    /// Unlink the current element and return it; the cursor moves to its
    /// successor.
    pub fn remove(&mut self) -> Option<T> {
        let k = self.current?;
        let node = self.nodes.remove(k)?;
        match self.prev {
            Some(p) => self.nodes[p].next = node.next,
            None => self.ends.head = node.next,
        }
        if self.ends.tail == Some(k) {
            self.ends.tail = self.prev;
        }
        self.current = node.next;
        Some(node.value)
    }
}

/// Iterator over shared references, front to back.
pub struct Iter<'a, T> {
    cursor: Cursor<'a, T>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let v = self.cursor.current()?;
        self.cursor.advance();
        Some(v)
    }
}

impl<T> core::iter::FusedIterator for Iter<'_, T> {}

impl<'a, T> IntoIterator for &'a LinkedList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
