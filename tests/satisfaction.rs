//! End-to-end satisfaction and enumeration scenarios.

use calabash_solver::constraints;
use calabash_solver::rand::rngs::SmallRng;
use calabash_solver::rand::Rng;
use calabash_solver::rand::SeedableRng;
use calabash_solver::results::IteratedSolution;
use calabash_solver::results::SatisfactionResult;
use calabash_solver::results::Solution;
use calabash_solver::termination::Indefinite;
use calabash_solver::variables::TransformableVariable;
use calabash_solver::Solver;

fn all_solutions(mut solver: Solver) -> Vec<Solution> {
    let mut brancher = solver.default_brancher();
    let mut termination = Indefinite;
    let mut iterator = solver.iterate_solutions(&mut brancher, &mut termination);

    let mut solutions = Vec::new();
    loop {
        match iterator.next_solution() {
            IteratedSolution::Solution(solution) => solutions.push(solution),
            IteratedSolution::Finished | IteratedSolution::Unsatisfiable => return solutions,
            IteratedSolution::Unknown => panic!("the search should conclude"),
        }
    }
}

#[test]
fn sum_of_two_variables() {
    let mut solver = Solver::default();
    let x = solver.new_bounded_integer(1, 3);
    let y = solver.new_bounded_integer(1, 3);
    solver
        .add_constraint(constraints::equals(vec![x, y], 4))
        .expect("consistent at the root");

    let solutions = all_solutions(solver);

    assert_eq!(3, solutions.len());
    for solution in &solutions {
        assert_eq!(4, solution.value(x) + solution.value(y));
    }
}

#[test]
fn doubling_constraint() {
    let mut solver = Solver::default();
    let x = solver.new_bounded_integer(0, 10);
    let y = solver.new_bounded_integer(0, 10);
    // x = 2y
    solver
        .add_constraint(constraints::equals(vec![x.scaled(1), y.scaled(-2)], 0))
        .expect("consistent at the root");

    let solutions = all_solutions(solver);

    assert_eq!(6, solutions.len());
    let mut pairs: Vec<(i32, i32)> = solutions
        .iter()
        .map(|solution| (solution.value(x), solution.value(y)))
        .collect();
    pairs.sort_unstable();
    assert_eq!(vec![(0, 0), (2, 1), (4, 2), (6, 3), (8, 4), (10, 5)], pairs);
}

#[test]
fn all_different_three_variables() {
    let mut solver = Solver::default();
    let variables: Vec<_> = (0..3).map(|_| solver.new_bounded_integer(1, 5)).collect();
    solver
        .add_constraint(constraints::all_different(variables.clone()))
        .expect("consistent at the root");

    let solutions = all_solutions(solver);

    assert_eq!(60, solutions.len());
    for solution in &solutions {
        let values: Vec<i32> = variables.iter().map(|&v| solution.value(v)).collect();
        assert!(values[0] != values[1] && values[0] != values[2] && values[1] != values[2]);
    }
}

#[test]
fn infeasible_instance() {
    let mut solver = Solver::default();
    let x = solver.new_bounded_integer(1, 3);
    let _ = solver.add_constraint(constraints::not_equals(vec![x], 1));
    let _ = solver.add_constraint(constraints::not_equals(vec![x], 2));
    let _ = solver.add_constraint(constraints::not_equals(vec![x], 3));

    let mut brancher = solver.default_brancher();
    let mut termination = Indefinite;
    assert!(matches!(
        solver.satisfy(&mut brancher, &mut termination),
        SatisfactionResult::Unsatisfiable
    ));
}

#[test]
fn sparse_domains_are_enumerated_with_their_holes() {
    let mut solver = Solver::default();
    let x = solver.new_sparse_integer(vec![1, 4, 9]);
    let y = solver.new_sparse_integer(vec![0, 2]);
    solver
        .add_constraint(constraints::less_than_or_equals(vec![x, y], 9))
        .expect("consistent at the root");

    let solutions = all_solutions(solver);

    // (1,0), (1,2), (4,0), (4,2), (9,0).
    assert_eq!(5, solutions.len());
    for solution in &solutions {
        assert!(solution.value(x) + solution.value(y) <= 9);
    }
}

#[test]
fn enumeration_agrees_with_a_brute_force_oracle() {
    let mut rng = SmallRng::seed_from_u64(0x5EED);

    for _ in 0..20 {
        let num_variables = rng.gen_range(2..4_usize);
        let domain_upper_bound = rng.gen_range(1..4_i32);
        let num_constraints = rng.gen_range(1..4_usize);

        let mut solver = Solver::default();
        let variables: Vec<_> = (0..num_variables)
            .map(|_| solver.new_bounded_integer(0, domain_upper_bound))
            .collect();

        // Random constraints of the form `sum +-x_i <= c`.
        let mut constraint_data = Vec::new();
        for _ in 0..num_constraints {
            let signs: Vec<i32> = (0..num_variables)
                .map(|_| if rng.gen_bool(0.5) { 1 } else { -1 })
                .collect();
            let rhs = rng.gen_range(-domain_upper_bound..=2 * domain_upper_bound);
            constraint_data.push((signs, rhs));
        }

        for (signs, rhs) in &constraint_data {
            let terms: Vec<_> = variables
                .iter()
                .zip(signs)
                .map(|(variable, &sign)| variable.scaled(sign))
                .collect();
            // Posting may already be infeasible at the root; the oracle covers that case too.
            let _ = solver.add_constraint(constraints::less_than_or_equals(terms, *rhs));
        }

        // Brute force: enumerate the cross product of the initial domains.
        let mut expected = 0_usize;
        let mut assignment = vec![0_i32; num_variables];
        loop {
            let satisfies_all = constraint_data.iter().all(|(signs, rhs)| {
                let total: i32 = assignment
                    .iter()
                    .zip(signs)
                    .map(|(&value, &sign)| sign * value)
                    .sum();
                total <= *rhs
            });
            if satisfies_all {
                expected += 1;
            }

            // Advance the assignment odometer.
            let mut position = 0;
            loop {
                if position == num_variables {
                    break;
                }
                assignment[position] += 1;
                if assignment[position] <= domain_upper_bound {
                    break;
                }
                assignment[position] = 0;
                position += 1;
            }
            if position == num_variables {
                break;
            }
        }

        assert_eq!(expected, all_solutions(solver).len());
    }
}
