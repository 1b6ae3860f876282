/// State of a single slot in the table.
///
/// `Deleted` is the tombstone left by a removal: lookups walk past it,
/// inserts may reuse it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Slot<V> {
    #[default]
    Empty,
    Deleted,
    Occupied { key: i64, value: V },
}

impl<V> Slot<V> {
    pub fn is_occupied(&self) -> bool {
        matches!(self, Slot::Occupied { .. })
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, Slot::Deleted)
    }

    pub fn key(&self) -> Option<i64> {
        match self {
            Slot::Occupied { key, .. } => Some(*key),
            _ => None,
        }
    }

    pub fn value(&self) -> Option<&V> {
        match self {
            Slot::Occupied { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Replace the slot with a tombstone, handing back what it held.
    pub fn take(&mut self) -> Option<(i64, V)> {
        if !self.is_occupied() {
            return None;
        }
        match std::mem::replace(self, Slot::Deleted) {
            Slot::Occupied { key, value } => Some((key, value)),
            _ => None,
        }
    }
}
