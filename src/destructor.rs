//! Value teardown hook bound to a table at construction.
//!
//! The table hands a value to its destructor when the value is overwritten
//! by `put`, discarded by `clear`, or still stored when the table is
//! dropped. Values returned by `remove` go back to the caller instead.

pub trait Destructor<V> {
    fn destroy(&mut self, value: V);
}

/// Default destructor: lets the value drop normally.
#[derive(Debug, Default, Clone, Copy)]
pub struct DropValue;

impl<V> Destructor<V> for DropValue {
    #[inline]
    fn destroy(&mut self, value: V) {
        drop(value);
    }
}

impl<V, F> Destructor<V> for F
where
    F: FnMut(V),
{
    #[inline]
    fn destroy(&mut self, value: V) {
        self(value)
    }
}
