use std::any::Any;
use std::marker::PhantomData;
use std::rc::Rc;

/// A reversible reference cell holding an `Rc<T>`.
///
/// Unlike the scalar cells, the stored values are reference counted so restoring a previous value
/// on backtracking is a pointer swap.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct RevRef<T> {
    pub(super) id: u32,
    pub(super) value_type: PhantomData<T>,
}

impl<T> Clone for RevRef<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for RevRef<T> {}

/// Type-erased storage behind [`RevRef`]; lives in the [`super::Environment`].
#[derive(Clone, Debug, Default)]
pub(super) struct RefStore {
    cells: Vec<StampedRef>,
    trail: Vec<TrailedRefWrite>,
    world_mark: Vec<usize>,
}

#[derive(Clone, Debug)]
struct StampedRef {
    value: Rc<dyn Any>,
    stamp: u32,
}

#[derive(Clone, Debug)]
struct TrailedRefWrite {
    index: u32,
    old_value: Rc<dyn Any>,
    old_stamp: u32,
}

impl RefStore {
    pub(super) fn grow(&mut self, initial_value: Rc<dyn Any>, world: u32) -> u32 {
        self.cells.push(StampedRef {
            value: initial_value,
            stamp: world,
        });
        (self.cells.len() - 1) as u32
    }

    pub(super) fn read(&self, index: u32) -> &Rc<dyn Any> {
        &self.cells[index as usize].value
    }

    pub(super) fn write(&mut self, index: u32, value: Rc<dyn Any>, world: u32) {
        let cell = &mut self.cells[index as usize];
        if Rc::ptr_eq(&cell.value, &value) {
            return;
        }
        if cell.stamp != world {
            self.trail.push(TrailedRefWrite {
                index,
                old_value: Rc::clone(&cell.value),
                old_stamp: cell.stamp,
            });
            cell.stamp = world;
        }
        cell.value = value;
    }

    pub(super) fn push_world(&mut self) {
        self.world_mark.push(self.trail.len());
    }

    pub(super) fn pop_world(&mut self) {
        let mark = self
            .world_mark
            .pop()
            .expect("pop_world called on the root world");
        for write in self.trail.drain(mark..).rev() {
            let cell = &mut self.cells[write.index as usize];
            cell.value = write.old_value;
            cell.stamp = write.old_stamp;
        }
    }

    pub(super) fn commit_world(&mut self, world: u32) {
        let mark = self
            .world_mark
            .pop()
            .expect("commit_world called on the root world");
        let parent = world - 1;

        let writes: Vec<_> = self.trail.drain(mark..).collect();
        for write in writes {
            let cell = &mut self.cells[write.index as usize];
            if cell.stamp == world {
                cell.stamp = parent;
            }
            if write.old_stamp != parent {
                self.trail.push(write);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::super::Environment;

    #[test]
    fn references_are_restored_on_pop() {
        let mut env = Environment::default();
        let cell = env.make_ref(Rc::new("root".to_owned()));

        env.push_world();
        env.assign_ref(cell, Rc::new("deeper".to_owned()));
        assert_eq!("deeper", *env.ref_value(cell));

        env.pop_world();
        assert_eq!("root", *env.ref_value(cell));
    }

    #[test]
    fn assigning_the_same_rc_is_a_no_op() {
        let mut env = Environment::default();
        let shared = Rc::new(17_u64);
        let cell = env.make_ref(Rc::clone(&shared));

        env.push_world();
        env.assign_ref(cell, shared);
        env.pop_world();

        assert_eq!(17, *env.ref_value(cell));
    }
}
