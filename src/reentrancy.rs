//! Resize gate.
//!
//! Rehashing relocates entries through the table's private insertion path,
//! which never looks at load factors, so a resize cannot trigger another one
//! by itself. The gate additionally records that a resize is in flight: a
//! nested request made while the slot array is half-populated is answered
//! with a successful no-op instead of a second rebuild.

/// Whether a table is in the middle of rebuilding its slot array.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum ResizeState {
    #[default]
    Idle,
    Resizing,
}

impl ResizeState {
    /// Enter a resize. Returns `None` if one is already in progress.
    #[inline]
    pub fn enter(&mut self) -> Option<ResizeGuard<'_>> {
        match *self {
            ResizeState::Resizing => None,
            ResizeState::Idle => {
                *self = ResizeState::Resizing;
                Some(ResizeGuard { state: self })
            }
        }
    }

    pub fn is_resizing(&self) -> bool {
        *self == ResizeState::Resizing
    }
}

/// RAII guard returned by `ResizeState::enter`; returns the state to `Idle`
/// on drop, including when a hasher panics mid-rehash.
pub struct ResizeGuard<'a> {
    state: &'a mut ResizeState,
}

impl Drop for ResizeGuard<'_> {
    fn drop(&mut self) {
        debug_assert!(self.state.is_resizing());
        *self.state = ResizeState::Idle;
    }
}
