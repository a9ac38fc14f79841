use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use super::rev_bit_set::words_for_capacity;
use super::rev_ref::RefStore;
use super::RevBitSet;
use super::RevBool;
use super::RevInt;
use super::RevRef;
use super::RevWord;
use super::StampedStore;
use crate::calabash_assert_simple;
use crate::containers::StorageKey;

/// The reversible memory of one model.
///
/// The environment tracks the current world and hands out reversible cells. Pushing a world
/// records the state of every cell store; popping a world restores the cells to their values at
/// the matching push. Committing a world merges its writes into the parent, which is how the
/// search marks a decision that turned out to be forced.
///
/// Writes while no world is pushed are untrailed mutations of the root world.
pub struct Environment {
    world: u32,
    ints: StampedStore<RevInt, i64>,
    bools: StampedStore<RevBool, bool>,
    words: StampedStore<RevWord, u64>,
    refs: RefStore,
    /// Callbacks to run when the world in which they were saved is popped, most recent first.
    pop_ops: Vec<(u32, Box<dyn FnOnce()>)>,
}

impl Default for Environment {
    fn default() -> Self {
        Environment {
            world: 0,
            ints: StampedStore::default(),
            bools: StampedStore::default(),
            words: StampedStore::default(),
            refs: RefStore::default(),
            pop_ops: Vec::default(),
        }
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("world", &self.world)
            .field("pending_pop_ops", &self.pop_ops.len())
            .finish()
    }
}

impl Environment {
    /// The index of the current world; the root is world 0.
    pub fn current_world(&self) -> u32 {
        self.world
    }

    /// Open a new world. All writes from here on are undone by the matching
    /// [`Environment::pop_world`].
    pub fn push_world(&mut self) {
        self.world += 1;
        self.ints.push_world();
        self.bools.push_world();
        self.words.push_world();
        self.refs.push_world();
    }

    /// Restore every cell to its value when the current world was pushed, running saved operations
    /// first (most recent first).
    pub fn pop_world(&mut self) {
        calabash_assert_simple!(self.world > 0, "cannot pop the root world");

        while let Some((world, _)) = self.pop_ops.last() {
            if *world != self.world {
                break;
            }
            let (_, op) = self.pop_ops.pop().unwrap();
            op();
        }

        self.ints.pop_world();
        self.bools.pop_world();
        self.words.pop_world();
        self.refs.pop_world();
        self.world -= 1;
    }

    /// Merge the current world into its parent. Saved operations of the committed world survive
    /// and run when the parent is popped.
    pub fn commit_world(&mut self) {
        calabash_assert_simple!(self.world > 0, "cannot commit the root world");

        for (world, _) in self.pop_ops.iter_mut() {
            if *world == self.world {
                *world -= 1;
            }
        }

        self.ints.commit_world(self.world);
        self.bools.commit_world(self.world);
        self.words.commit_world(self.world);
        self.refs.commit_world(self.world);
        self.world -= 1;
    }

    /// Record an operation to invoke when the current world is popped. Operations saved at the
    /// root never run.
    pub fn save(&mut self, op: impl FnOnce() + 'static) {
        self.pop_ops.push((self.world, Box::new(op)));
    }

    pub fn make_int(&mut self, initial_value: i64) -> RevInt {
        self.ints.grow(initial_value, self.world)
    }

    pub fn int_value(&self, cell: RevInt) -> i64 {
        self.ints.read(cell)
    }

    pub fn assign_int(&mut self, cell: RevInt, value: i64) {
        self.ints.write(cell, value, self.world);
    }

    pub fn add_assign_int(&mut self, cell: RevInt, addition: i64) {
        self.assign_int(cell, self.int_value(cell) + addition);
    }

    pub fn make_bool(&mut self, initial_value: bool) -> RevBool {
        self.bools.grow(initial_value, self.world)
    }

    pub fn bool_value(&self, cell: RevBool) -> bool {
        self.bools.read(cell)
    }

    pub fn assign_bool(&mut self, cell: RevBool, value: bool) {
        self.bools.write(cell, value, self.world);
    }

    /// Create a reversible bit set over `[0, capacity)`, initially empty.
    pub fn make_bitset(&mut self, capacity: u32) -> RevBitSet {
        let num_words = words_for_capacity(capacity);
        let mut first_word = None;
        for _ in 0..num_words {
            let key = self.words.grow(0, self.world);
            if first_word.is_none() {
                first_word = Some(key);
            }
        }
        RevBitSet::new(
            first_word.map(|key| key.index() as u32).unwrap_or(0),
            num_words,
            capacity,
        )
    }

    pub(crate) fn word_value(&self, key: RevWord) -> u64 {
        self.words.read(key)
    }

    pub(crate) fn assign_word(&mut self, key: RevWord, value: u64) {
        self.words.write(key, value, self.world);
    }

    /// Create a reversible reference cell.
    pub fn make_ref<T: 'static>(&mut self, initial_value: Rc<T>) -> RevRef<T> {
        let id = self.refs.grow(initial_value as Rc<dyn Any>, self.world);
        RevRef {
            id,
            value_type: PhantomData,
        }
    }

    pub fn ref_value<T: 'static>(&self, cell: RevRef<T>) -> Rc<T> {
        Rc::clone(self.refs.read(cell.id))
            .downcast::<T>()
            .expect("reversible reference cell holds a value of its declared type")
    }

    pub fn assign_ref<T: 'static>(&mut self, cell: RevRef<T>, value: Rc<T>) {
        self.refs.write(cell.id, value as Rc<dyn Any>, self.world);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn int_cells_restore_through_nested_worlds() {
        let mut env = Environment::default();
        let c = env.make_int(0);

        env.push_world();
        env.assign_int(c, 5);
        env.push_world();
        env.assign_int(c, 9);

        env.pop_world();
        assert_eq!(5, env.int_value(c));
        env.pop_world();
        assert_eq!(0, env.int_value(c));
    }

    #[test]
    fn bool_cells_restore() {
        let mut env = Environment::default();
        let flag = env.make_bool(true);

        env.push_world();
        env.assign_bool(flag, false);
        assert!(!env.bool_value(flag));

        env.pop_world();
        assert!(env.bool_value(flag));
    }

    #[test]
    fn saved_operations_run_on_pop_in_reverse_order() {
        let mut env = Environment::default();
        let log = Rc::new(Cell::new(0_u32));

        env.push_world();
        let first = Rc::clone(&log);
        env.save(move || first.set(first.get() * 10 + 1));
        let second = Rc::clone(&log);
        env.save(move || second.set(second.get() * 10 + 2));

        env.pop_world();
        // Most recent first.
        assert_eq!(21, log.get());
    }

    #[test]
    fn saved_operations_survive_commit() {
        let mut env = Environment::default();
        let log = Rc::new(Cell::new(0_u32));

        env.push_world();
        env.push_world();
        let op = Rc::clone(&log);
        env.save(move || op.set(7));

        env.commit_world();
        assert_eq!(0, log.get());

        env.pop_world();
        assert_eq!(7, log.get());
    }

    #[test]
    fn commit_merges_writes_into_the_parent() {
        let mut env = Environment::default();
        let c = env.make_int(0);

        env.push_world();
        env.assign_int(c, 1);
        env.push_world();
        env.assign_int(c, 2);

        env.commit_world();
        assert_eq!(1, env.current_world());
        assert_eq!(2, env.int_value(c));

        env.pop_world();
        assert_eq!(0, env.int_value(c));
    }

    #[test]
    fn untrailed_root_writes_are_permanent() {
        let mut env = Environment::default();
        let c = env.make_int(1);
        env.assign_int(c, 2);

        env.push_world();
        env.pop_world();

        assert_eq!(2, env.int_value(c));
    }

    #[test]
    fn randomised_trail_soundness() {
        use rand::rngs::SmallRng;
        use rand::Rng;
        use rand::SeedableRng;

        let mut rng = SmallRng::seed_from_u64(0xCA1A);
        let mut env = Environment::default();
        let cells: Vec<_> = (0..20).map(|i| env.make_int(i)).collect();

        // A stack of snapshots of all cell values, one per pushed world.
        let mut snapshots: Vec<Vec<i64>> = Vec::new();

        for _ in 0..2000 {
            match rng.gen_range(0..10) {
                0..=5 => {
                    let cell = cells[rng.gen_range(0..cells.len())];
                    env.assign_int(cell, rng.gen_range(-1000..1000));
                }
                6..=7 => {
                    snapshots.push(cells.iter().map(|&c| env.int_value(c)).collect());
                    env.push_world();
                }
                _ => {
                    if let Some(snapshot) = snapshots.pop() {
                        env.pop_world();
                        let current: Vec<i64> =
                            cells.iter().map(|&c| env.int_value(c)).collect();
                        assert_eq!(snapshot, current);
                    }
                }
            }
        }

        while let Some(snapshot) = snapshots.pop() {
            env.pop_world();
            let current: Vec<i64> = cells.iter().map(|&c| env.int_value(c)).collect();
            assert_eq!(snapshot, current);
        }
    }
}
