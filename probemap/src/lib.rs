//! Open addressing tables keyed by non-negative integers, with pluggable
//! probe strategies (linear probing, double hashing) and an optional
//! growing wrapper.

pub mod config;
pub mod error;
mod iter;
pub mod primes;
pub mod probe;
pub mod resizable;
pub mod slot;
pub mod table;

#[cfg(test)]
mod test_util;

pub use config::{GrowthPolicy, TableConfig};
pub use error::{Result, TableError};
pub use iter::Iter;
pub use probe::{DoubleHash, Linear, ProbeStrategy, Strategy};
pub use resizable::ResizableTable;
pub use slot::Slot;
pub use table::OpenTable;
