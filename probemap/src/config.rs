use crate::error::{Result, TableError};
use crate::probe::Strategy;

/// Default initial capacity, a prime so double hashing can use it as is.
pub const DEFAULT_CAPACITY: usize = 11;

/// Default load factor above which an insert is refused rather than
/// extending a collision chain. `1.0` only refuses when there is no free slot.
pub const DEFAULT_LOAD_CEILING: f64 = 1.0;

/// When and how much a [`ResizableTable`](crate::ResizableTable) grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrowthPolicy {
    /// Grow once `len / capacity >= numerator / denominator`.
    pub threshold: (usize, usize),
    /// New capacity is `capacity * factor`.
    pub factor: usize,
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        Self {
            threshold: (2, 3),
            factor: 2,
        }
    }
}

impl GrowthPolicy {
    /// Exact integer comparison, `2/3` must not suffer from float rounding.
    pub fn should_grow(&self, len: usize, capacity: usize) -> bool {
        let (num, den) = self.threshold;
        len as u128 * den as u128 >= capacity as u128 * num as u128
    }

    pub fn grown_capacity(&self, capacity: usize) -> usize {
        capacity.saturating_mul(self.factor)
    }
}

/// Construction parameters shared by [`OpenTable`](crate::OpenTable) and
/// [`ResizableTable`](crate::ResizableTable).
#[derive(Debug, Clone, PartialEq)]
pub struct TableConfig {
    pub initial_capacity: usize,
    pub strategy: Strategy,
    pub load_ceiling: f64,
    pub growth: GrowthPolicy,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_CAPACITY,
            strategy: Strategy::default(),
            load_ceiling: DEFAULT_LOAD_CEILING,
            growth: GrowthPolicy::default(),
        }
    }
}

impl TableConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_load_ceiling(mut self, ceiling: f64) -> Self {
        self.load_ceiling = ceiling;
        self
    }

    pub fn with_growth_threshold(mut self, numerator: usize, denominator: usize) -> Self {
        self.growth.threshold = (numerator, denominator);
        self
    }

    pub fn with_growth_factor(mut self, factor: usize) -> Self {
        self.growth.factor = factor;
        self
    }

    /// Check the parameters before any table is built from them.
    pub fn validate(&self) -> Result<()> {
        if self.initial_capacity == 0 {
            return Err("initial capacity must be at least 1".into());
        }
        if !(self.load_ceiling > 0.0 && self.load_ceiling <= 1.0) {
            return Err(TableError::InvalidConfig(format!(
                "load ceiling must be in (0, 1], got {}",
                self.load_ceiling
            )));
        }
        let (num, den) = self.growth.threshold;
        if den == 0 || num == 0 || num > den {
            return Err(TableError::InvalidConfig(format!(
                "growth threshold must be in (0, 1], got {num}/{den}"
            )));
        }
        if self.growth.factor < 2 {
            return Err(TableError::InvalidConfig(format!(
                "growth factor must be at least 2, got {}",
                self.growth.factor
            )));
        }
        Ok(())
    }
}
