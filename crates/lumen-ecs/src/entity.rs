use std::fmt;

/// A generational row handle: slot index plus the generation the slot had
/// when the row was created. Destroying the row bumps the generation, so
/// every copy of the old handle stops resolving.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl Entity {
    pub fn from_raw(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Generation in the high word, index in the low word
    pub fn to_bits(&self) -> u64 {
        (u64::from(self.generation) << 32) | u64::from(self.index)
    }

    /// Inverse of [`Entity::to_bits`].
    pub fn from_bits(bits: u64) -> Self {
        Self {
            index: bits as u32,
            generation: (bits >> 32) as u32,
        }
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({}v{})", self.index, self.generation)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

#[derive(Clone, Copy, Default)]
struct Slot {
    generation: u32,
    occupied: bool,
}

/// Hands out row slots, recycling freed ones under a new generation.
#[derive(Default)]
pub(crate) struct EntityAllocator {
    slots: Vec<Slot>,
    /// Freed slot indices, reused most-recent first
    vacant: Vec<u32>,
    live: usize,
}

impl EntityAllocator {
    pub fn allocate(&mut self) -> Entity {
        self.live += 1;
        let index = match self.vacant.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot::default());
                (self.slots.len() - 1) as u32
            }
        };
        let slot = &mut self.slots[index as usize];
        slot.occupied = true;
        Entity {
            index,
            generation: slot.generation,
        }
    }

    /// Free the entity's slot. False if the handle was already stale.
    pub fn deallocate(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }
        let slot = &mut self.slots[entity.index as usize];
        slot.occupied = false;
        slot.generation = slot.generation.wrapping_add(1);
        self.vacant.push(entity.index);
        self.live -= 1;
        true
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.live_at(entity.index) == Some(entity)
    }

    /// The live entity occupying `index`, if any.
    pub fn live_at(&self, index: u32) -> Option<Entity> {
        self.slots
            .get(index as usize)
            .filter(|slot| slot.occupied)
            .map(|slot| Entity {
                index,
                generation: slot.generation,
            })
    }

    /// Live entities in ascending slot order
    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        (0..self.slots.len() as u32).filter_map(|index| self.live_at(index))
    }

    pub fn len(&self) -> usize {
        self.live
    }
}
