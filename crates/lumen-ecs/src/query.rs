#![allow(private_interfaces)]

use std::any::TypeId;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::ptr::NonNull;

use crate::component::{ComponentStorage, SparseSet};
use crate::entity::{Entity, EntityAllocator};

pub(crate) type StorageMap = HashMap<TypeId, Box<dyn ComponentStorage>>;

/// Trait implemented for query parameter types (`&T`, `&mut T`, `Option<&T>`, tuples).
///
/// # Safety
/// Implementors must correctly report the component TypeIds they access.
pub unsafe trait WorldQuery {
    type Item<'w>;

    /// Components that must be present on the entity.
    fn required_type_ids() -> Vec<TypeId>;

    /// Components that are read when present.
    fn optional_type_ids() -> Vec<TypeId>;

    /// Fetch the item for one row.
    ///
    /// # Safety
    /// `storages` must be valid for `'w`, and derived from `&mut StorageMap`
    /// whenever the query hands out `&mut` items. The caller must uphold the
    /// aliasing rules for `&` vs `&mut` items: a row is fetched at most once
    /// per iteration and a mutable query never names the same type twice.
    unsafe fn fetch<'w>(storages: NonNull<StorageMap>, index: u32) -> Option<Self::Item<'w>>;
}

/// Queries that only hand out shared references, usable through `&Registry`.
///
/// # Safety
/// Implementors must never produce a mutable reference from `fetch`.
pub unsafe trait ReadOnlyWorldQuery: WorldQuery {}

fn column<T: 'static + Send + Sync>(storages: &StorageMap) -> Option<&SparseSet<T>> {
    storages
        .get(&TypeId::of::<T>())
        .and_then(|s| s.as_any().downcast_ref::<SparseSet<T>>())
}

unsafe impl<T: 'static + Send + Sync> WorldQuery for &T {
    type Item<'w> = &'w T;

    fn required_type_ids() -> Vec<TypeId> {
        vec![TypeId::of::<T>()]
    }

    fn optional_type_ids() -> Vec<TypeId> {
        vec![]
    }

    unsafe fn fetch<'w>(storages: NonNull<StorageMap>, index: u32) -> Option<Self::Item<'w>> {
        column::<T>(storages.as_ref())?.get(index)
    }
}

unsafe impl<T: 'static + Send + Sync> ReadOnlyWorldQuery for &T {}

unsafe impl<T: 'static + Send + Sync> WorldQuery for &mut T {
    type Item<'w> = &'w mut T;

    fn required_type_ids() -> Vec<TypeId> {
        vec![TypeId::of::<T>()]
    }

    fn optional_type_ids() -> Vec<TypeId> {
        vec![]
    }

    unsafe fn fetch<'w>(storages: NonNull<StorageMap>, index: u32) -> Option<Self::Item<'w>> {
        // Only reachable through `&mut Registry`, which hands in a pointer
        // taken from its own `&mut` borrow.
        let storages: &'w mut StorageMap = &mut *storages.as_ptr();
        storages
            .get_mut(&TypeId::of::<T>())?
            .as_any_mut()
            .downcast_mut::<SparseSet<T>>()?
            .get_mut(index)
    }
}

unsafe impl<T: 'static + Send + Sync> WorldQuery for Option<&T> {
    type Item<'w> = Option<&'w T>;

    fn required_type_ids() -> Vec<TypeId> {
        vec![]
    }

    fn optional_type_ids() -> Vec<TypeId> {
        vec![TypeId::of::<T>()]
    }

    unsafe fn fetch<'w>(storages: NonNull<StorageMap>, index: u32) -> Option<Self::Item<'w>> {
        Some(column::<T>(storages.as_ref()).and_then(|c| c.get(index)))
    }
}

unsafe impl<T: 'static + Send + Sync> ReadOnlyWorldQuery for Option<&T> {}

macro_rules! impl_world_query_tuple {
    ($($name:ident),+) => {
        #[allow(non_snake_case)]
        unsafe impl<$($name: WorldQuery),+> WorldQuery for ($($name,)+) {
            type Item<'w> = ($($name::Item<'w>,)+);

            fn required_type_ids() -> Vec<TypeId> {
                let mut ids = Vec::new();
                $(ids.extend($name::required_type_ids());)+
                ids
            }

            fn optional_type_ids() -> Vec<TypeId> {
                let mut ids = Vec::new();
                $(ids.extend($name::optional_type_ids());)+
                ids
            }

            unsafe fn fetch<'w>(storages: NonNull<StorageMap>, index: u32) -> Option<Self::Item<'w>> {
                Some(($($name::fetch(storages, index)?,)+))
            }
        }

        unsafe impl<$($name: ReadOnlyWorldQuery),+> ReadOnlyWorldQuery for ($($name,)+) {}
    };
}

impl_world_query_tuple!(A);
impl_world_query_tuple!(A, B);
impl_world_query_tuple!(A, B, C);
impl_world_query_tuple!(A, B, C, D);
impl_world_query_tuple!(A, B, C, D, E);
impl_world_query_tuple!(A, B, C, D, E, F);

/// Row candidates for a query: every live row holding all `required` types,
/// in ascending row order.
pub(crate) fn matching_rows(
    entities: &EntityAllocator,
    storages: &StorageMap,
    required: &[TypeId],
) -> Vec<u32> {
    if required.is_empty() {
        return entities.iter().map(|e| e.index).collect();
    }

    let mut columns = Vec::with_capacity(required.len());
    for tid in required {
        match storages.get(tid) {
            Some(storage) => columns.push(storage.as_ref()),
            // A required type was never stored: nothing can match.
            None => return Vec::new(),
        }
    }

    // Drive from the smallest column and filter by the rest.
    columns.sort_by_key(|c| c.len());
    let Some((driver, rest)) = columns.split_first() else {
        return Vec::new();
    };
    let mut rows: Vec<u32> = driver
        .rows()
        .iter()
        .copied()
        .filter(|&row| entities.live_at(row).is_some())
        .filter(|&row| rest.iter().all(|c| c.has(row)))
        .collect();
    rows.sort_unstable();
    rows
}

/// Iterator returned by views and groups. Yields `(Entity, Q::Item)` per matching row.
///
/// Column access goes through a raw pointer carrying the provenance of the
/// borrow the iterator was built from: shared for `view`/`group`, unique for
/// `view_mut`/`group_mut`.
pub struct QueryIter<'w, Q: WorldQuery> {
    entities: &'w EntityAllocator,
    storages: NonNull<StorageMap>,
    rows: Vec<u32>,
    position: usize,
    _marker: PhantomData<(&'w StorageMap, Q)>,
}

impl<'w, Q: ReadOnlyWorldQuery> QueryIter<'w, Q> {
    pub(crate) fn new(entities: &'w EntityAllocator, storages: &'w StorageMap, rows: Vec<u32>) -> Self {
        Self::from_raw(entities, NonNull::from(storages), rows)
    }
}

impl<'w, Q: WorldQuery> QueryIter<'w, Q> {
    pub(crate) fn new_mut(
        entities: &'w EntityAllocator,
        storages: &'w mut StorageMap,
        rows: Vec<u32>,
    ) -> Self {
        Self::from_raw(entities, NonNull::from(storages), rows)
    }

    fn from_raw(entities: &'w EntityAllocator, storages: NonNull<StorageMap>, rows: Vec<u32>) -> Self {
        Self {
            entities,
            storages,
            rows,
            position: 0,
            _marker: PhantomData,
        }
    }
}

impl<'w, Q: WorldQuery> Iterator for QueryIter<'w, Q> {
    type Item = (Entity, Q::Item<'w>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(&index) = self.rows.get(self.position) {
            self.position += 1;

            let Some(entity) = self.entities.live_at(index) else {
                continue;
            };

            // Safety: each row is visited once, so items never alias.
            if let Some(item) = unsafe { Q::fetch(self.storages, index) } {
                return Some((entity, item));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.rows.len() - self.position))
    }
}
