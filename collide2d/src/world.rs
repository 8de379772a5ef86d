use std::any::{Any, TypeId};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Unique identifier for an entity in the world.
///
/// Ids are ordered by creation, which is the order every per-tick pass visits
/// entities in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(u32);

impl EntityId {
    /// Get the underlying integer ID (useful for debugging or logging).
    pub fn to_u32(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Type-erased view of one component column, so despawn can reach every column.
trait Storage: Any {
    fn remove_entity(&mut self, entity: EntityId);
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> Storage for BTreeMap<EntityId, T> {
    fn remove_entity(&mut self, entity: EntityId) {
        self.remove(&entity);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Minimal entity/component store the collision core runs against.
///
/// - Entities are identified by `EntityId`
/// - Each component type lives in its own column keyed by `EntityId`
/// - Iteration is always in ascending `EntityId` order, so two runs over the
///   same world visit entities identically
pub struct World {
    next_id: u32,
    alive: BTreeSet<EntityId>,
    storages: HashMap<TypeId, Box<dyn Storage>>,
}

impl World {
    /// Create a new, empty world.
    pub fn new() -> Self {
        Self {
            next_id: 1,
            alive: BTreeSet::new(),
            storages: HashMap::new(),
        }
    }

    /// Spawn a new entity and return its `EntityId`.
    ///
    /// After the id space wraps, ids still held by living entities are skipped.
    pub fn spawn(&mut self) -> EntityId {
        let mut id = EntityId(self.next_id);
        while self.alive.contains(&id) {
            id = EntityId(Self::after(id.0));
        }
        self.next_id = Self::after(id.0);
        self.alive.insert(id);
        id
    }

    fn after(id: u32) -> u32 {
        id.wrapping_add(1).max(1)
    }

    /// Despawn an entity, removing it and all of its components.
    pub fn despawn(&mut self, entity: EntityId) -> bool {
        if !self.alive.remove(&entity) {
            return false;
        }

        for storage in self.storages.values_mut() {
            storage.remove_entity(entity);
        }

        true
    }

    /// Check if an entity is currently alive.
    pub fn is_alive(&self, entity: EntityId) -> bool {
        self.alive.contains(&entity)
    }

    /// Number of alive entities.
    pub fn len(&self) -> usize {
        self.alive.len()
    }

    /// Returns true if there are no entities in the world.
    pub fn is_empty(&self) -> bool {
        self.alive.is_empty()
    }

    /// Insert a component of type `T` for an entity, overwriting any existing
    /// component of that type. Returns false if the entity is not alive.
    pub fn insert<T: Any>(&mut self, entity: EntityId, component: T) -> bool {
        if !self.is_alive(entity) {
            return false;
        }
        self.column_mut_or_default::<T>().insert(entity, component);
        true
    }

    /// Remove and return a component of type `T` for an entity, if it exists.
    pub fn remove<T: Any>(&mut self, entity: EntityId) -> Option<T> {
        self.column_mut::<T>()?.remove(&entity)
    }

    /// Get an immutable reference to a component of type `T` for an entity.
    pub fn get<T: Any>(&self, entity: EntityId) -> Option<&T> {
        self.column::<T>()?.get(&entity)
    }

    /// Get a mutable reference to a component of type `T` for an entity.
    pub fn get_mut<T: Any>(&mut self, entity: EntityId) -> Option<&mut T> {
        self.column_mut::<T>()?.get_mut(&entity)
    }

    /// All `(EntityId, &T)` pairs in ascending id order.
    pub fn query<T: Any>(&self) -> Vec<(EntityId, &T)> {
        match self.column::<T>() {
            Some(column) => column.iter().map(|(&id, c)| (id, c)).collect(),
            None => Vec::new(),
        }
    }

    /// Ids of entities carrying a `T`, in ascending order.
    ///
    /// Handy when a pass needs to mutate components while walking them.
    pub fn entities_with<T: Any>(&self) -> Vec<EntityId> {
        match self.column::<T>() {
            Some(column) => column.keys().copied().collect(),
            None => Vec::new(),
        }
    }

    fn column<T: Any>(&self) -> Option<&BTreeMap<EntityId, T>> {
        self.storages
            .get(&TypeId::of::<T>())?
            .as_any()
            .downcast_ref::<BTreeMap<EntityId, T>>()
    }

    fn column_mut<T: Any>(&mut self) -> Option<&mut BTreeMap<EntityId, T>> {
        self.storages
            .get_mut(&TypeId::of::<T>())?
            .as_any_mut()
            .downcast_mut::<BTreeMap<EntityId, T>>()
    }

    fn column_mut_or_default<T: Any>(&mut self) -> &mut BTreeMap<EntityId, T> {
        self.storages
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(BTreeMap::<EntityId, T>::new()))
            .as_any_mut()
            .downcast_mut::<BTreeMap<EntityId, T>>()
            .expect("World storage type mismatch")
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
