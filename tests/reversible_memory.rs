//! Scenarios over the reversible memory through its public interface.

use std::cell::Cell;
use std::rc::Rc;

use calabash_solver::trailed::Environment;

#[test]
fn an_integer_cell_is_restored_world_by_world() {
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
fn bit_sets_and_booleans_follow_the_worlds() {
    let mut env = Environment::default();
    let flag = env.make_bool(false);
    let set = env.make_bitset(130);
    let _ = set.insert(&mut env, 100);

    env.push_world();
    env.assign_bool(flag, true);
    let _ = set.remove(&mut env, 100);
    let _ = set.insert(&mut env, 129);

    assert!(env.bool_value(flag));
    assert!(!set.contains(&env, 100));
    assert_eq!(Some(129), set.next_set(&env, 0));

    env.pop_world();
    assert!(!env.bool_value(flag));
    assert!(set.contains(&env, 100));
    assert_eq!(Some(100), set.prev_set(&env, 129));
}

#[test]
fn reference_cells_swap_back_on_pop() {
    let mut env = Environment::default();
    let cell = env.make_ref(Rc::new(vec![1, 2, 3]));

    env.push_world();
    env.assign_ref(cell, Rc::new(vec![9]));
    assert_eq!(vec![9], *env.ref_value(cell));

    env.pop_world();
    assert_eq!(vec![1, 2, 3], *env.ref_value(cell));
}

#[test]
fn saved_operations_fire_when_their_world_is_popped() {
    let mut env = Environment::default();
    let fired = Rc::new(Cell::new(false));

    env.push_world();
    env.push_world();
    let op = Rc::clone(&fired);
    env.save(move || op.set(true));

    env.pop_world();
    assert!(fired.get());

    env.pop_world();
}

#[test]
fn committing_merges_a_world_into_its_parent() {
    let mut env = Environment::default();
    let c = env.make_int(1);

    env.push_world();
    env.assign_int(c, 2);
    env.push_world();
    env.assign_int(c, 3);

    env.commit_world();
    assert_eq!(1, env.current_world());
    assert_eq!(3, env.int_value(c));

    env.pop_world();
    assert_eq!(1, env.int_value(c));
}
