use crate::calabash_assert_simple;
use crate::containers::KeyedVec;
use crate::containers::StorageKey;

/// An integer cell whose value is automatically restored upon backtracking to its value at the
/// world to which backtracking occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RevInt {
    id: u32,
}

/// A boolean cell whose value is automatically restored upon backtracking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RevBool {
    id: u32,
}

/// A single machine word of a [`super::RevBitSet`]. Not exposed outside the reversible memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct RevWord {
    id: u32,
}

macro_rules! impl_storage_key {
    ($name:ident) => {
        impl StorageKey for $name {
            fn index(&self) -> usize {
                self.id as usize
            }

            fn create_from_index(index: usize) -> Self {
                Self { id: index as u32 }
            }
        }
    };
}

impl_storage_key!(RevInt);
impl_storage_key!(RevBool);
impl_storage_key!(RevWord);

/// A cell value together with the world in which it was first written since its creation or since
/// the last commit.
#[derive(Clone, Copy, Debug)]
struct StampedValue<Value> {
    value: Value,
    stamp: u32,
}

/// A write that has to be undone when its world is popped.
#[derive(Clone, Copy, Debug)]
struct TrailedWrite<Key, Value> {
    key: Key,
    old_value: Value,
    old_stamp: u32,
}

/// Copy-on-write storage for one kind of reversible cell.
///
/// Every cell carries a stamp naming the world in which it was first modified. A write in the same
/// world overwrites in place; a write in a later world pushes the previous `(value, stamp)` pair
/// onto the trail first. Popping a world rewinds the trail to the mark recorded when the world was
/// pushed.
#[derive(Clone, Debug)]
pub(crate) struct StampedStore<Key, Value> {
    values: KeyedVec<Key, StampedValue<Value>>,
    trail: Vec<TrailedWrite<Key, Value>>,
    /// At index `w - 1` is the length of the trail when world `w` was pushed.
    world_mark: Vec<usize>,
}

impl<Key, Value> Default for StampedStore<Key, Value> {
    fn default() -> Self {
        StampedStore {
            values: KeyedVec::default(),
            trail: Vec::default(),
            world_mark: Vec::default(),
        }
    }
}

impl<Key: StorageKey, Value: Copy + PartialEq> StampedStore<Key, Value> {
    /// Create a new cell. The stamp is the current world, so writes in the creating world never
    /// touch the trail.
    pub(crate) fn grow(&mut self, initial_value: Value, world: u32) -> Key {
        self.values.push(StampedValue {
            value: initial_value,
            stamp: world,
        })
    }

    pub(crate) fn read(&self, key: Key) -> Value {
        self.values[key].value
    }

    pub(crate) fn write(&mut self, key: Key, value: Value, world: u32) {
        let cell = &mut self.values[key.clone()];
        if cell.value == value {
            return;
        }
        if cell.stamp != world {
            self.trail.push(TrailedWrite {
                key,
                old_value: cell.value,
                old_stamp: cell.stamp,
            });
            cell.stamp = world;
        }
        cell.value = value;
    }

    pub(crate) fn push_world(&mut self) {
        self.world_mark.push(self.trail.len());
    }

    /// Rewind every write performed since the matching [`StampedStore::push_world`].
    pub(crate) fn pop_world(&mut self) {
        let mark = self
            .world_mark
            .pop()
            .expect("pop_world called on the root world");
        for write in self.trail.drain(mark..).rev() {
            let cell = &mut self.values[write.key];
            cell.value = write.old_value;
            cell.stamp = write.old_stamp;
        }
    }

    /// Merge the writes of `world` into its parent. A write whose recorded previous stamp equals
    /// the parent is discarded (the parent already trails the correct previous value); the rest
    /// are kept and now belong to the parent's segment.
    pub(crate) fn commit_world(&mut self, world: u32) {
        calabash_assert_simple!(world > 0, "cannot commit the root world");
        let mark = self
            .world_mark
            .pop()
            .expect("commit_world called on the root world");
        let parent = world - 1;

        let writes: Vec<_> = self.trail.drain(mark..).collect();
        for write in writes {
            let cell = &mut self.values[write.key.clone()];
            if cell.stamp == world {
                cell.stamp = parent;
            }
            if write.old_stamp != parent {
                self.trail.push(write);
            }
        }
    }
}
