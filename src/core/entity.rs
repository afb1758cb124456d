//! Battle-scoped unit registry with simple integer IDs

use crate::{Result, SkirmishError};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Simple integer ID for battle entities
///
/// IDs are assigned monotonically and never reused within a battle, so a
/// stale ID can only ever miss, never alias another unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    pub fn new(id: u32) -> Self {
        EntityId(id)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle to a unit in the battle registry
pub type UnitId = EntityId;

/// Central storage for the units of one battle
///
/// Cross-unit relations (melee locks, ownership) store `EntityId` handles
/// into this store instead of references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityStore<T> {
    entities: FxHashMap<EntityId, T>,
    next_id: u32,
}

impl<T> EntityStore<T> {
    /// Create an empty store. The first ID handed out is 1.
    pub fn new() -> Self {
        EntityStore {
            entities: FxHashMap::default(),
            next_id: 1,
        }
    }

    /// Generate a new unique EntityId
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;
        id
    }

    /// Insert an entity with a specific ID
    pub fn insert(&mut self, id: EntityId, entity: T) {
        self.entities.insert(id, entity);
    }

    /// Get an entity by ID
    pub fn get(&self, id: EntityId) -> Result<&T> {
        self.entities
            .get(&id)
            .ok_or(SkirmishError::UnitNotFound(id.as_u32()))
    }

    /// Get a mutable reference to an entity
    pub fn get_mut(&mut self, id: EntityId) -> Result<&mut T> {
        self.entities
            .get_mut(&id)
            .ok_or(SkirmishError::UnitNotFound(id.as_u32()))
    }

    /// Borrow two distinct entities mutably at once
    pub fn get_pair_mut(&mut self, a: EntityId, b: EntityId) -> Result<(&mut T, &mut T)> {
        if a == b {
            return Err(SkirmishError::InvalidAction(format!(
                "unit {a} cannot interact with itself"
            )));
        }
        let mut first = None;
        let mut second = None;
        for (id, entity) in self.entities.iter_mut() {
            if *id == a {
                first = Some(entity);
            } else if *id == b {
                second = Some(entity);
            }
        }
        match (first, second) {
            (Some(x), Some(y)) => Ok((x, y)),
            (None, _) => Err(SkirmishError::UnitNotFound(a.as_u32())),
            (_, None) => Err(SkirmishError::UnitNotFound(b.as_u32())),
        }
    }

    /// Check if an entity exists
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Iterate over all entities (unordered)
    pub fn iter(&self) -> impl Iterator<Item = (&EntityId, &T)> {
        self.entities.iter()
    }

    /// All IDs in ascending order, for deterministic traversal
    pub fn sorted_ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self.entities.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Get count of entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl<T> Default for EntityStore<T> {
    fn default() -> Self {
        Self::new()
    }
}
