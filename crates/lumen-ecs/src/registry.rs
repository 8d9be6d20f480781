use std::any::{type_name, TypeId};
use std::collections::HashSet;

use crate::component::{Component, SparseSet};
use crate::entity::{Entity, EntityAllocator};
use crate::group::GroupCache;
use crate::query::{matching_rows, QueryIter, ReadOnlyWorldQuery, StorageMap, WorldQuery};

/// The component store. Owns all entities and their component columns.
///
/// Reads through a dead handle return `None`/`false`; `get`/`get_mut` on an
/// absent component and `attach` of an already present one are contract
/// violations.
#[derive(Default)]
pub struct Registry {
    entities: EntityAllocator,
    components: StorageMap,
    groups: GroupCache,
    /// Bumped on every structural change; invalidates cached groups.
    version: u64,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- Entity management ----

    /// Allocate a new, empty row.
    pub fn create(&mut self) -> Entity {
        self.version += 1;
        self.entities.allocate()
    }

    /// Destroy a row and every component attached to it.
    pub fn destroy(&mut self, entity: Entity) -> bool {
        if !self.entities.deallocate(entity) {
            return false;
        }
        for storage in self.components.values_mut() {
            storage.remove(entity.index);
        }
        self.version += 1;
        true
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.len() == 0
    }

    /// All live entities in ascending row order.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.iter()
    }

    /// The live entity occupying `index`, if any.
    pub fn entity_at(&self, index: u32) -> Option<Entity> {
        self.entities.live_at(index)
    }

    // ---- Component management ----

    fn column_mut<T: Component>(&mut self) -> &mut SparseSet<T> {
        self.components
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(SparseSet::<T>::new()))
            .as_any_mut()
            .downcast_mut::<SparseSet<T>>()
            .expect("column registered under a foreign TypeId")
    }

    fn column<T: Component>(&self) -> Option<&SparseSet<T>> {
        self.components
            .get(&TypeId::of::<T>())
            .and_then(|s| s.as_any().downcast_ref::<SparseSet<T>>())
    }

    /// Attach a component that the entity must not already hold.
    pub fn attach<T: Component>(&mut self, entity: Entity, component: T) -> &mut T {
        debug_assert!(
            !self.has::<T>(entity),
            "entity {entity:?} already has a {}",
            type_name::<T>()
        );
        self.attach_or_replace(entity, component)
    }

    /// Attach a component, silently overwriting any existing one.
    pub fn attach_or_replace<T: Component>(&mut self, entity: Entity, component: T) -> &mut T {
        assert!(
            self.entities.is_alive(entity),
            "cannot attach {} to dead entity {entity:?}",
            type_name::<T>()
        );
        let column = self.column_mut::<T>();
        let added = column.insert(entity.index, component);
        if added {
            self.version += 1;
        }
        self.column_mut::<T>()
            .get_mut(entity.index)
            .expect("component was just inserted")
    }

    /// Shared access to a component the caller knows is present.
    pub fn get<T: Component>(&self, entity: Entity) -> &T {
        self.try_get(entity).unwrap_or_else(|| {
            panic!("entity {entity:?} has no {}", type_name::<T>())
        })
    }

    /// Mutable access to a component the caller knows is present.
    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> &mut T {
        match self.try_get_mut(entity) {
            Some(component) => component,
            None => panic!("entity {entity:?} has no {}", type_name::<T>()),
        }
    }

    pub fn try_get<T: Component>(&self, entity: Entity) -> Option<&T> {
        if !self.entities.is_alive(entity) {
            return None;
        }
        self.column::<T>()?.get(entity.index)
    }

    pub fn try_get_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        if !self.entities.is_alive(entity) {
            return None;
        }
        self.components
            .get_mut(&TypeId::of::<T>())?
            .as_any_mut()
            .downcast_mut::<SparseSet<T>>()?
            .get_mut(entity.index)
    }

    /// Detach a component and hand it back.
    pub fn remove<T: Component>(&mut self, entity: Entity) -> Option<T> {
        if !self.entities.is_alive(entity) {
            return None;
        }
        let removed = self
            .components
            .get_mut(&TypeId::of::<T>())?
            .as_any_mut()
            .downcast_mut::<SparseSet<T>>()?
            .take(entity.index);
        if removed.is_some() {
            self.version += 1;
        }
        removed
    }

    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        self.try_get::<T>(entity).is_some()
    }

    // ---- Queries ----

    /// Iterate every live entity holding all components required by `Q`.
    ///
    /// The sequence is lazy, finite, and can be requested again at any time.
    /// Order is ascending row index.
    ///
    /// # Example
    /// ```ignore
    /// for (entity, (transform, sprite)) in registry.view::<(&Transform, &Sprite)>() {
    ///     // ...
    /// }
    /// ```
    pub fn view<Q: ReadOnlyWorldQuery>(&self) -> QueryIter<'_, Q> {
        let rows = matching_rows(&self.entities, &self.components, &Q::required_type_ids());
        QueryIter::new(&self.entities, &self.components, rows)
    }

    /// Mutable variant of [`Registry::view`].
    ///
    /// Components of the queried types must not be attached or removed while
    /// the iterator is alive; the borrow checker enforces this.
    pub fn view_mut<Q: WorldQuery>(&mut self) -> QueryIter<'_, Q> {
        assert_distinct::<Q>();
        let rows = matching_rows(&self.entities, &self.components, &Q::required_type_ids());
        QueryIter::new_mut(&self.entities, &mut self.components, rows)
    }

    /// Cached variant of [`Registry::view`] for combinations scanned every frame.
    ///
    /// Same ordering contract as `view`. Membership is only recomputed after a
    /// structural change to the registry.
    pub fn group<Q: ReadOnlyWorldQuery>(&self) -> QueryIter<'_, Q> {
        let rows = self.group_rows::<Q>();
        QueryIter::new(&self.entities, &self.components, rows)
    }

    /// Mutable variant of [`Registry::group`].
    pub fn group_mut<Q: WorldQuery>(&mut self) -> QueryIter<'_, Q> {
        assert_distinct::<Q>();
        let rows = self.group_rows::<Q>();
        QueryIter::new_mut(&self.entities, &mut self.components, rows)
    }

    fn group_rows<Q: WorldQuery>(&self) -> Vec<u32> {
        let required = Q::required_type_ids();
        self.groups.rows(required.clone(), self.version, || {
            matching_rows(&self.entities, &self.components, &required)
        })
    }
}

/// A query handing out `&mut T` must not name `T` twice.
fn assert_distinct<Q: WorldQuery>() {
    let mut seen = HashSet::new();
    for tid in Q::required_type_ids()
        .into_iter()
        .chain(Q::optional_type_ids())
    {
        assert!(
            seen.insert(tid),
            "query {} names the same component type twice",
            type_name::<Q>()
        );
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("entities", &self.entities.len())
            .field("columns", &self.components.len())
            .field("version", &self.version)
            .finish()
    }
}
