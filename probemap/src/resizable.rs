use std::fmt;
use std::ops::Index;

use log::debug;

use crate::config::{GrowthPolicy, TableConfig};
use crate::error::{Result, TableError};
use crate::iter::Iter;
use crate::probe::{Linear, ProbeStrategy, Strategy};
use crate::table::OpenTable;

/// An [`OpenTable`] that grows by itself.
///
/// After every successful put the load factor is compared against the
/// growth threshold; once it is reached every entry is replayed into a
/// larger table, which then replaces the old one.
pub struct ResizableTable<V, P = Linear> {
    table: OpenTable<V, P>,
    growth: GrowthPolicy,
    resizes: usize,
}

impl<V> ResizableTable<V, Strategy> {
    /// Creates a table from [`TableConfig::default`]
    pub fn new() -> Self {
        Self {
            table: OpenTable::from_config(&TableConfig::default())
                .expect("default config is valid"),
            growth: GrowthPolicy::default(),
            resizes: 0,
        }
    }

    pub fn from_config(config: &TableConfig) -> Result<Self> {
        Ok(Self {
            table: OpenTable::from_config(config)?,
            growth: config.growth,
            resizes: 0,
        })
    }
}

impl<V> Default for ResizableTable<V, Strategy> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, P: ProbeStrategy + Clone> ResizableTable<V, P> {
    /// Wraps a linear or double hashing table with the given growth policy
    pub fn with_strategy(capacity: usize, strategy: P, growth: GrowthPolicy) -> Result<Self> {
        TableConfig::new()
            .with_capacity(capacity)
            .with_growth_threshold(growth.threshold.0, growth.threshold.1)
            .with_growth_factor(growth.factor)
            .validate()?;
        Ok(Self {
            table: OpenTable::with_strategy(capacity, strategy)?,
            growth,
            resizes: 0,
        })
    }

    /// Insert a key-value pair, overwriting the value if the key is present.
    ///
    /// Growth is transparent: a put the inner table would refuse, which
    /// only happens with a load ceiling below the growth threshold, first
    /// grows the table until the key fits.
    pub fn put(&mut self, key: i64, value: V) -> Result<()> {
        while let Err(err) = self.table.check_room(key) {
            match err {
                TableError::TableFull { .. } => self.resize()?,
                other => return Err(other),
            }
        }
        self.table.put(key, value)?;

        if self.growth.should_grow(self.table.len(), self.table.capacity()) {
            self.resize()?;
        }
        Ok(())
    }

    /// Rehash every entry, in slot order, into a table `factor` times larger.
    /// Tombstones are left behind with the old slot array.
    fn resize(&mut self) -> Result<()> {
        let old_capacity = self.table.capacity();
        let grown = OpenTable::build(
            self.growth.grown_capacity(old_capacity),
            self.table.strategy().clone(),
            self.table.load_ceiling(),
        )?;
        debug!(
            "resizing table from {old_capacity} to {} slots ({} entries)",
            grown.capacity(),
            self.table.len()
        );

        let old = std::mem::replace(&mut self.table, grown);
        for (key, value) in old.into_entries() {
            self.table.insert(key, value, false)?;
        }
        self.resizes += 1;
        Ok(())
    }

    pub fn get(&self, key: i64) -> Option<&V> {
        self.table.get(key)
    }

    pub fn get_mut(&mut self, key: i64) -> Option<&mut V> {
        self.table.get_mut(key)
    }

    pub fn contains(&self, key: i64) -> bool {
        self.table.contains(key)
    }

    pub fn delete(&mut self, key: i64) -> bool {
        self.table.delete(key)
    }

    pub fn remove(&mut self, key: i64) -> Option<V> {
        self.table.remove(key)
    }

    pub fn clear(&mut self) {
        self.table.clear()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    pub fn load_factor(&self) -> f64 {
        self.table.load_factor()
    }

    /// Number of times the table has been rehashed into a larger one
    pub fn resizes(&self) -> usize {
        self.resizes
    }

    pub fn iter(&self) -> Iter<'_, V> {
        self.table.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = i64> + '_ {
        self.table.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.table.values()
    }
}

impl<V, P: ProbeStrategy> Index<i64> for ResizableTable<V, P> {
    type Output = V;

    fn index(&self, key: i64) -> &V {
        &self.table[key]
    }
}

impl<'a, V, P: ProbeStrategy> IntoIterator for &'a ResizableTable<V, P> {
    type Item = (i64, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.table.iter()
    }
}

impl<V: fmt::Debug, P: ProbeStrategy> fmt::Debug for ResizableTable<V, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.table, f)
    }
}
