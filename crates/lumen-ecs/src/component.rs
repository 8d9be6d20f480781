use std::any::Any;

/// Marker trait for types that can be stored in the registry.
pub trait Component: 'static + Send + Sync {}

/// Blanket implementation: any `'static + Send + Sync` type is a valid component.
impl<T: 'static + Send + Sync> Component for T {}

/// Type-erased view of one component column.
pub(crate) trait ComponentStorage: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn remove(&mut self, index: u32) -> bool;
    fn has(&self, index: u32) -> bool;
    fn len(&self) -> usize;
    fn rows(&self) -> &[u32];
}

const VACANT: u32 = u32::MAX;

/// One component column: rows map to positions in a packed array through a
/// sparse lookup, so iteration only touches occupied rows.
pub(crate) struct SparseSet<T> {
    /// Row -> position in `values`, `VACANT` when the row has no value
    lookup: Vec<u32>,
    values: Vec<T>,
    /// Row of each packed value, parallel to `values`
    rows: Vec<u32>,
}

impl<T: Component> SparseSet<T> {
    pub fn new() -> Self {
        Self {
            lookup: Vec::new(),
            values: Vec::new(),
            rows: Vec::new(),
        }
    }

    fn position(&self, row: u32) -> Option<usize> {
        match self.lookup.get(row as usize) {
            Some(&pos) if pos != VACANT => Some(pos as usize),
            _ => None,
        }
    }

    /// Store `value` for `row`. True when the row was previously empty.
    pub fn insert(&mut self, row: u32, value: T) -> bool {
        if let Some(pos) = self.position(row) {
            self.values[pos] = value;
            return false;
        }
        if self.lookup.len() <= row as usize {
            self.lookup.resize(row as usize + 1, VACANT);
        }
        self.lookup[row as usize] = self.values.len() as u32;
        self.values.push(value);
        self.rows.push(row);
        true
    }

    pub fn get(&self, row: u32) -> Option<&T> {
        self.position(row).map(|pos| &self.values[pos])
    }

    pub fn get_mut(&mut self, row: u32) -> Option<&mut T> {
        let pos = self.position(row)?;
        Some(&mut self.values[pos])
    }

    /// Detach the value of `row`; the last packed value fills the gap.
    pub fn take(&mut self, row: u32) -> Option<T> {
        let pos = self.position(row)?;
        self.lookup[row as usize] = VACANT;
        self.rows.swap_remove(pos);
        let value = self.values.swap_remove(pos);
        if let Some(&moved) = self.rows.get(pos) {
            self.lookup[moved as usize] = pos as u32;
        }
        Some(value)
    }
}

impl<T: Component> ComponentStorage for SparseSet<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn remove(&mut self, row: u32) -> bool {
        self.take(row).is_some()
    }

    fn has(&self, row: u32) -> bool {
        self.position(row).is_some()
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    fn rows(&self) -> &[u32] {
        &self.rows
    }
}
