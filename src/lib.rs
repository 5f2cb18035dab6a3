//! chained-hashtable: a separately-chained hash table from string keys to
//! owned values, with an external, restartable cursor over its entries.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: keep each concern small enough to reason about on its own.
//! - Layers:
//!   - list: singly-linked chains whose nodes live in a slotmap arena that
//!     many chains can share; read-only and mutating cursors and a
//!     short-circuiting visit. `LinkedList<T>` is one chain plus its own
//!     arena.
//!   - HashTable<V, D, S>: one node arena for every entry plus a bucket
//!     vector of head/tail key pairs; grows and shrinks by load factor and
//!     hands discarded values to a `Destructor`.
//!   - HashIter: pull-based cursor (`current_key`/`advance`/`at_end`) that
//!     walks slots in index order; `Iter`/`Keys`/`Values` wrap it.
//!
//! Constraints
//! - Single-threaded API: every mutation takes `&mut self`; wrap the table
//!   in a lock to share it.
//! - Keys are copied on insert; callers keep ownership of their buffers.
//! - Capacity is a power of two; a key's slot is `hash & (capacity - 1)`,
//!   and the empty key always lands in slot 0.
//! - A store is a set over keys: `put` on an existing key replaces the
//!   value in place and never grows `count`.
//!
//! Resizing
//! - `put` grows (doubling) once `count / capacity` is above the configured
//!   maximum, before inserting. Failure to grow fails the `put` and leaves
//!   the table untouched.
//! - `remove` halves the table when it gets sparse, but never below the
//!   initial capacity. A failed shrink is ignored; the remove still
//!   succeeds.
//! - Rehashing relinks arena nodes into their new chains through a private
//!   insertion path that never checks load factors or allocates. `ResizeState` additionally turns a nested resize
//!   into a no-op.
//!
//! Values and destructors
//! - Overwritten values, values dropped by `clear`, and values still stored
//!   at drop go to the table's `Destructor` (a plain drop by default, or any
//!   `FnMut(V)`).
//! - `remove` gives the value back to the caller; the destructor is not run.
//! - Absent keys are `None`, so storing an "empty" value such as `None` or
//!   `()` stays distinguishable from a miss.
//!
//! Iteration
//! - Cursors borrow the table, so mutating it while a cursor is alive is a
//!   compile error rather than undefined iteration.
//!
//! Features
//! - `serde`: tables serialize as maps.
//! - `tracing`: resize events are emitted at trace level.

mod config;
mod destructor;
mod error;
mod iter;
pub mod list;
pub mod lookup3;
mod macros;
mod reentrancy;
#[cfg(feature = "serde")]
mod serde_impls;
mod table;
mod table_proptest;

// Public surface
pub use config::{
    TableConfig, DEFAULT_INITIAL_CAPACITY, DEFAULT_MAX_LOAD_FACTOR, DEFAULT_MIN_LOAD_FACTOR,
};
pub use destructor::{Destructor, DropValue};
pub use error::TableError;
pub use iter::{HashIter, Iter, Keys, Values};
pub use lookup3::Lookup3State;
pub use table::HashTable;
