//! TableConfig: sizing and load-factor policy fixed at construction.

use crate::error::TableError;

/// Starting slot count when none is configured.
pub const DEFAULT_INITIAL_CAPACITY: usize = 32;

/// Grow once `count / capacity` rises above this.
pub const DEFAULT_MAX_LOAD_FACTOR: f64 = 0.7;

/// Shrink once `count / capacity` falls below this (and the table is larger
/// than its initial capacity).
pub const DEFAULT_MIN_LOAD_FACTOR: f64 = 0.2;

/// Builder-style configuration for `HashTable`.
///
/// ```
/// use chained_hashtable::{HashTable, TableConfig};
///
/// let cfg = TableConfig::new().initial_capacity(8).max_load_factor(0.7);
/// let mut t: HashTable<u32> = HashTable::with_config(cfg).unwrap();
/// t.put("a", 1).unwrap();
/// assert_eq!(t.capacity(), 8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableConfig {
    initial_capacity: usize,
    max_load_factor: f64,
    min_load_factor: f64,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            max_load_factor: DEFAULT_MAX_LOAD_FACTOR,
            min_load_factor: DEFAULT_MIN_LOAD_FACTOR,
        }
    }
}

impl TableConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requested starting slot count; rounded up to a power of two when the
    /// table is built.
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    pub fn max_load_factor(mut self, lf: f64) -> Self {
        self.max_load_factor = lf;
        self
    }

    /// Set to `0.0` to never shrink.
    pub fn min_load_factor(mut self, lf: f64) -> Self {
        self.min_load_factor = lf;
        self
    }

    pub fn get_initial_capacity(&self) -> usize {
        self.initial_capacity
    }

    pub fn get_max_load_factor(&self) -> f64 {
        self.max_load_factor
    }

    pub fn get_min_load_factor(&self) -> f64 {
        self.min_load_factor
    }

    /// Check the policy is usable.
    ///
    /// Shrinking halves the capacity and so doubles the load factor; keeping
    /// `2 * min < max` means a shrink can never land above the grow
    /// threshold.
    pub fn validate(&self) -> Result<(), TableError> {
        if self.initial_capacity == 0 {
            return Err(TableError::InvalidArgument("initial capacity must be positive"));
        }
        if !self.max_load_factor.is_finite() || self.max_load_factor <= 0.0 {
            return Err(TableError::InvalidArgument(
                "max load factor must be finite and positive",
            ));
        }
        if !self.min_load_factor.is_finite() || self.min_load_factor < 0.0 {
            return Err(TableError::InvalidArgument(
                "min load factor must be finite and non-negative",
            ));
        }
        if self.min_load_factor * 2.0 >= self.max_load_factor {
            return Err(TableError::InvalidArgument(
                "min load factor must be below half the max load factor",
            ));
        }
        Ok(())
    }

    /// Initial capacity rounded up to a power of two.
    pub(crate) fn slot_count(&self) -> Result<usize, TableError> {
        self.initial_capacity
            .checked_next_power_of_two()
            .ok_or(TableError::AllocationFailure)
    }
}
