// Resize events go through `tracing` when the feature is enabled and
// compile to nothing otherwise.
macro_rules! trace {
    ($($tt:tt)*) => {
        #[cfg(feature = "tracing")] {
            tracing::trace!($($tt)*)
        }
    }
}

pub(crate) use trace;
