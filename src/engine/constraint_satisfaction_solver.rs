//! Houses the solver which attempts to find a solution to a Constraint Satisfaction Problem (CSP)
//! using a depth-first search with propagation, and optionally lazy clause generation.
use std::cmp::max;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use log::debug;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::basic_types::CSPSolverExecutionFlag;
use crate::basic_types::ConstraintOperationError;
use crate::basic_types::SolutionReference;
use crate::basic_types::StoredConflictInfo;
use crate::branching::Brancher;
use crate::branching::SelectionContext;
use crate::calabash_assert_simple;
use crate::engine::conflict_analysis::ConflictAnalysisContext;
use crate::engine::conflict_analysis::ConflictResolver as Resolver;
use crate::engine::conflict_analysis::NoLearningResolver;
use crate::engine::conflict_analysis::ResolutionResolver;
use crate::engine::predicates::predicate::Predicate;
use crate::engine::propagation::store::PropagatorHandle;
use crate::engine::propagation::Entailment;
use crate::engine::propagation::PropagatorConstructor;
use crate::engine::restart_strategy::RestartOptions;
use crate::engine::restart_strategy::RestartStrategy;
use crate::engine::solver_statistics::SolverStatistics;
use crate::engine::state::State;
use crate::engine::termination::Indefinite;
use crate::engine::termination::TerminationCondition;
use crate::propagators::nogoods::NogoodPropagator;
use crate::propagators::nogoods::NogoodPropagatorArgs;

/// A monotonic counter naming anonymous models; the only process-wide state of the library.
static MODEL_COUNTER: AtomicU64 = AtomicU64::new(0);

/// The mode of conflict resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ConflictResolution {
    /// Chronological backtracking: undo the last decision and try its refutation.
    #[default]
    NoLearning,
    /// First-UIP clause learning: derive a nogood over the trail, backjump, and keep the nogood
    /// for the remainder of the search.
    UIP,
}

/// Options for the [`ConstraintSatisfactionSolver`] which determine how it behaves.
#[derive(Debug)]
pub struct SatisfactionSolverOptions {
    /// The options used by the restart strategy.
    pub restart_options: RestartOptions,
    /// The conflict-resolution mode used upon a conflict.
    pub conflict_resolution: ConflictResolution,
    /// A random number generator which is used by the solver to determine randomised values.
    pub random_generator: SmallRng,
}

impl Default for SatisfactionSolverOptions {
    fn default() -> Self {
        SatisfactionSolverOptions {
            restart_options: RestartOptions::default(),
            conflict_resolution: ConflictResolution::default(),
            random_generator: SmallRng::seed_from_u64(42),
        }
    }
}

/// A solver which attempts to find a solution to a Constraint Satisfaction Problem using a
/// depth-first search with chronological backtracking, and optionally lazy clause generation.
///
/// # Practical
/// The search is a loop over three phases: propagate to a fixed point, take a decision proposed
/// by the [`Brancher`], and on a conflict hand the trail to the configured conflict resolver.
/// With [`ConflictResolution::UIP`] the resolver performs 1UIP resolution and installs the
/// learned nogood in the [`NogoodPropagator`]; restarts then periodically return the search to
/// the root while keeping what was learned.
///
/// The solver continuously changes internal state ([`CSPSolverState`]) during the search, which
/// also tracks the conflict to be resolved.
#[derive(Debug)]
pub struct ConstraintSatisfactionSolver {
    pub(crate) state: State,
    /// The high-level state of the search (solving, conflict, solution found, ...).
    solver_state: CSPSolverState,
    /// Tracks when the solver should undo all decisions and restart from the root. Only
    /// consulted when learning is enabled; without learned nogoods a restart would retrace the
    /// exact same search.
    restart_strategy: RestartStrategy,
    conflict_resolver: Box<dyn Resolver>,
    /// The propagator hosting learned and blocking nogoods.
    nogood_propagator: PropagatorHandle<NogoodPropagator>,
    /// A set of counters updated during the search.
    pub(crate) statistics: SolverStatistics,
    /// Miscellaneous constant parameters used by the solver.
    internal_parameters: SatisfactionSolverOptions,
    /// The name of this model, for log lines; anonymous models are numbered.
    model_name: String,
}

impl Default for ConstraintSatisfactionSolver {
    fn default() -> Self {
        ConstraintSatisfactionSolver::new(SatisfactionSolverOptions::default())
    }
}

impl ConstraintSatisfactionSolver {
    pub fn new(options: SatisfactionSolverOptions) -> Self {
        let mut state = State::default();
        let nogood_propagator = state.add_propagator(NogoodPropagatorArgs);

        let conflict_resolver: Box<dyn Resolver> = match options.conflict_resolution {
            ConflictResolution::NoLearning => Box::new(NoLearningResolver),
            ConflictResolution::UIP => Box::new(ResolutionResolver),
        };

        let model_name = format!("model-{}", MODEL_COUNTER.fetch_add(1, Ordering::Relaxed));
        debug!(
            "created {model_name} with {:?} conflict resolution",
            options.conflict_resolution
        );

        ConstraintSatisfactionSolver {
            state,
            solver_state: CSPSolverState::default(),
            restart_strategy: RestartStrategy::new(options.restart_options),
            conflict_resolver,
            nogood_propagator,
            statistics: SolverStatistics::default(),
            internal_parameters: options,
            model_name,
        }
    }

    pub(crate) fn model_name(&self) -> &str {
        &self.model_name
    }

    fn learning_enabled(&self) -> bool {
        self.internal_parameters.conflict_resolution == ConflictResolution::UIP
    }

    pub(crate) fn current_world(&self) -> u32 {
        self.state.current_world()
    }

    pub(crate) fn get_solution_reference(&self) -> SolutionReference<'_> {
        self.state.get_solution_reference()
    }

    pub(crate) fn is_infeasible(&self) -> bool {
        self.solver_state.is_infeasible()
    }

    /// Whether every posted constraint is satisfied by the current (full) assignment.
    pub(crate) fn all_propagators_entailed(&self) -> bool {
        self.state
            .propagators
            .ids()
            .all(|id| self.state.is_propagator_entailed(id) == Entailment::True)
    }
}

// solving
impl ConstraintSatisfactionSolver {
    /// Run the search until a solution is found, infeasibility is proven, or the termination
    /// condition triggers. On [`CSPSolverExecutionFlag::Feasible`] the domains describe the
    /// solution; they remain so until the next solver call.
    pub fn solve(
        &mut self,
        termination: &mut impl TerminationCondition,
        brancher: &mut impl Brancher,
    ) -> CSPSolverExecutionFlag {
        if self.solver_state.is_infeasible() {
            return CSPSolverExecutionFlag::Infeasible;
        }

        self.solver_state.declare_solving();
        self.solve_internal(termination, brancher)
    }

    fn solve_internal(
        &mut self,
        termination: &mut impl TerminationCondition,
        brancher: &mut impl Brancher,
    ) -> CSPSolverExecutionFlag {
        loop {
            self.propagate(termination);

            if termination.should_stop() {
                self.solver_state.declare_timeout();
                return CSPSolverExecutionFlag::Timeout;
            }

            if self.solver_state.no_conflict() {
                if self.should_restart(brancher) {
                    self.restart_during_search(brancher);
                    continue;
                }

                let decision = {
                    let mut context = SelectionContext::new(
                        &self.state.domains,
                        &mut self.internal_parameters.random_generator,
                    );
                    brancher.next_decision(&mut context)
                };

                let Some(decision) = decision else {
                    // Quiescence with every variable instantiated: a solution.
                    crate::calabash_assert_moderate!(
                        !self
                            .state
                            .domains
                            .domains()
                            .all(|domain| self.state.domains.is_fixed(domain))
                            || self.all_propagators_entailed(),
                        "every posted constraint must be entailed in a total solution"
                    );
                    self.statistics.num_solutions += 1;
                    self.solver_state.declare_solution_found();
                    debug!("{}: solution found", self.model_name);
                    return CSPSolverExecutionFlag::Feasible;
                };

                self.make_decision(termination, decision);
            } else {
                if self.current_world() == 0 {
                    self.solver_state.declare_infeasible();
                    debug!("{}: infeasible at the root", self.model_name);
                    return CSPSolverExecutionFlag::Infeasible;
                }

                self.statistics.num_conflicts += 1;
                self.restart_strategy.notify_conflict();

                let conflict = self.solver_state.take_conflict();
                let resolved = {
                    let mut context = ConflictAnalysisContext {
                        state: &mut self.state,
                        conflict,
                        brancher,
                        nogood_propagator: self.nogood_propagator,
                    };
                    self.conflict_resolver.resolve_conflict(&mut context)
                };
                brancher.on_conflict();

                if !resolved {
                    self.solver_state.declare_infeasible();
                    return CSPSolverExecutionFlag::Infeasible;
                }
                self.solver_state.declare_solving();
            }
        }
    }

    fn make_decision(
        &mut self,
        termination: &mut impl TerminationCondition,
        decision: Predicate,
    ) {
        calabash_assert_simple!(
            self.state.truth_value(decision) != Some(true),
            "the brancher proposed an already-satisfied decision"
        );

        self.statistics.num_decisions += 1;
        termination.decision_has_been_made();

        self.state.push_world();
        self.statistics.peak_depth = max(self.statistics.peak_depth, self.current_world() as u64);

        let update_occurred = self
            .state
            .post(decision)
            .expect("a decision on an unfixed variable cannot empty its domain");
        calabash_assert_simple!(update_occurred);
    }

    /// Main propagation loop: runs the engine to a fixed point and records a conflict in the
    /// solver state if one is found.
    pub(crate) fn propagate(&mut self, termination: &mut impl TerminationCondition) {
        let result = self.state.propagate_to_fixed_point(termination);
        self.statistics.num_propagations = self.state.num_propagations;

        if let Err(conflict) = result {
            self.solver_state.declare_conflict(conflict);
        }
    }

    fn should_restart(&self, brancher: &impl Brancher) -> bool {
        self.current_world() > 0
            && self.learning_enabled()
            && !brancher.is_restart_pointless()
            && self.restart_strategy.should_restart()
    }

    /// Undo all decisions and continue the search from the root, keeping the learned nogoods.
    fn restart_during_search(&mut self, brancher: &mut impl Brancher) {
        debug!("{}: restarting", self.model_name);
        self.statistics.num_restarts += 1;
        brancher.on_restart();
        self.backtrack_to(0, brancher);
        self.restart_strategy.notify_restart();
    }

    pub(crate) fn backtrack_to(&mut self, world: u32, brancher: &mut impl Brancher) {
        brancher.on_backtrack();
        for (domain, value) in self.state.restore_to(world) {
            brancher.on_unassign_integer(domain, value);
        }
        brancher.synchronise(&self.state.domains);
    }

    /// Return the solver to the root, ready for another solve or for posting further
    /// constraints.
    pub fn restore_state_at_root(&mut self, brancher: &mut impl Brancher) {
        if self.current_world() > 0 {
            self.backtrack_to(0, brancher);
            self.solver_state.declare_ready();
        } else if self.solver_state.has_solution() {
            self.solver_state.declare_ready();
        }
    }
}

// posting constraints
impl ConstraintSatisfactionSolver {
    /// Post a propagator and propagate it at the root. A root conflict makes the model
    /// permanently infeasible.
    pub fn add_propagator<Constructor>(
        &mut self,
        constructor: Constructor,
    ) -> Result<(), ConstraintOperationError>
    where
        Constructor: PropagatorConstructor,
        Constructor::PropagatorImpl: 'static,
    {
        if self.solver_state.is_infeasible() {
            return Err(ConstraintOperationError::InfeasibleState);
        }
        calabash_assert_simple!(
            self.current_world() == 0,
            "permanent constraints are posted at the root; use add_temporary_propagator otherwise"
        );

        let _ = self.state.add_propagator(constructor);
        self.propagate_after_posting()
    }

    /// Post a propagator which is unposted automatically when the current world is popped.
    ///
    /// The initial propagation runs immediately; a conflict is recorded in the solver state and
    /// handled by the search like any other conflict.
    pub fn add_temporary_propagator<Constructor>(
        &mut self,
        constructor: Constructor,
    ) -> Result<(), ConstraintOperationError>
    where
        Constructor: PropagatorConstructor,
        Constructor::PropagatorImpl: 'static,
    {
        if self.solver_state.is_infeasible() {
            return Err(ConstraintOperationError::InfeasibleState);
        }

        let _ = self.state.add_temporary_propagator(constructor);
        if self.current_world() == 0 {
            self.propagate_after_posting()
        } else {
            if let Err(conflict) = self.state.propagate_to_fixed_point(&mut Indefinite) {
                self.solver_state.declare_conflict(conflict);
            }
            Ok(())
        }
    }

    /// Post a predicate as a root fact, e.g. an objective cut.
    pub fn add_root_predicate(
        &mut self,
        predicate: Predicate,
    ) -> Result<(), ConstraintOperationError> {
        if self.solver_state.is_infeasible() {
            return Err(ConstraintOperationError::InfeasibleState);
        }
        calabash_assert_simple!(self.current_world() == 0);

        if self.state.post(predicate).is_err() {
            self.solver_state.declare_infeasible();
            return Err(ConstraintOperationError::InfeasibleConstraint);
        }
        self.propagate_after_posting()
    }

    /// Add a nogood over the given predicates at the root, e.g. to block a found solution.
    pub fn add_nogood(
        &mut self,
        predicates: Vec<Predicate>,
    ) -> Result<(), ConstraintOperationError> {
        if self.solver_state.is_infeasible() {
            return Err(ConstraintOperationError::InfeasibleState);
        }
        calabash_assert_simple!(self.current_world() == 0);

        let handle = self.nogood_propagator;
        let result = self
            .state
            .with_propagator_mut(handle, |propagator, mut context| {
                propagator.add_nogood(&mut context, predicates)
            });
        if result.is_err() {
            self.solver_state.declare_infeasible();
            return Err(ConstraintOperationError::InfeasibleConstraint);
        }
        self.propagate_after_posting()
    }

    fn propagate_after_posting(&mut self) -> Result<(), ConstraintOperationError> {
        match self.state.propagate_to_fixed_point(&mut Indefinite) {
            Ok(()) => Ok(()),
            Err(_) => {
                self.solver_state.declare_infeasible();
                Err(ConstraintOperationError::InfeasibleConstraint)
            }
        }
    }
}

#[derive(Debug, Default)]
enum CSPSolverStateInternal {
    #[default]
    Ready,
    Solving,
    ContainsSolution,
    Conflict {
        conflict: StoredConflictInfo,
    },
    Infeasible,
    Timeout,
}

/// The high-level state of the search.
#[derive(Debug, Default)]
pub struct CSPSolverState {
    internal_state: CSPSolverStateInternal,
}

impl CSPSolverState {
    pub fn no_conflict(&self) -> bool {
        !self.is_conflicting()
    }

    pub fn is_conflicting(&self) -> bool {
        matches!(
            self.internal_state,
            CSPSolverStateInternal::Conflict { conflict: _ }
        )
    }

    pub fn is_infeasible(&self) -> bool {
        matches!(self.internal_state, CSPSolverStateInternal::Infeasible)
    }

    pub fn has_solution(&self) -> bool {
        matches!(
            self.internal_state,
            CSPSolverStateInternal::ContainsSolution
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.internal_state, CSPSolverStateInternal::Timeout)
    }

    fn take_conflict(&mut self) -> StoredConflictInfo {
        let state = std::mem::replace(&mut self.internal_state, CSPSolverStateInternal::Solving);
        match state {
            CSPSolverStateInternal::Conflict { conflict } => conflict,
            _ => panic!("expected the solver to be in a conflict state"),
        }
    }

    fn declare_ready(&mut self) {
        self.internal_state = CSPSolverStateInternal::Ready;
    }

    fn declare_solving(&mut self) {
        self.internal_state = CSPSolverStateInternal::Solving;
    }

    fn declare_infeasible(&mut self) {
        self.internal_state = CSPSolverStateInternal::Infeasible;
    }

    fn declare_conflict(&mut self, conflict: StoredConflictInfo) {
        self.internal_state = CSPSolverStateInternal::Conflict { conflict };
    }

    fn declare_solution_found(&mut self) {
        self.internal_state = CSPSolverStateInternal::ContainsSolution;
    }

    fn declare_timeout(&mut self) {
        self.internal_state = CSPSolverStateInternal::Timeout;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints;
    use crate::results::IteratedSolution;
    use crate::termination::Indefinite;
    use crate::Solver;

    fn count_solutions(mut solver: Solver) -> usize {
        let mut brancher = solver.default_brancher();
        let mut termination = Indefinite;
        let mut iterator = solver.iterate_solutions(&mut brancher, &mut termination);

        let mut count = 0;
        loop {
            match iterator.next_solution() {
                IteratedSolution::Solution(_) => count += 1,
                IteratedSolution::Finished | IteratedSolution::Unsatisfiable => return count,
                IteratedSolution::Unknown => panic!("the search should conclude"),
            }
        }
    }

    fn solver_with(conflict_resolution: ConflictResolution) -> Solver {
        Solver::with_options(SatisfactionSolverOptions {
            conflict_resolution,
            ..SatisfactionSolverOptions::default()
        })
    }

    fn sum_instance(solver: &mut Solver) {
        let x = solver.new_bounded_integer(1, 3);
        let y = solver.new_bounded_integer(1, 3);
        solver
            .add_constraint(constraints::equals(vec![x, y], 4))
            .expect("consistent at the root");
    }

    #[test]
    fn the_sum_instance_has_three_solutions() {
        for conflict_resolution in [ConflictResolution::NoLearning, ConflictResolution::UIP] {
            let mut solver = solver_with(conflict_resolution);
            sum_instance(&mut solver);
            assert_eq!(3, count_solutions(solver));
        }
    }

    #[test]
    fn learning_and_chronological_search_agree_on_all_different() {
        for conflict_resolution in [ConflictResolution::NoLearning, ConflictResolution::UIP] {
            let mut solver = solver_with(conflict_resolution);
            let variables: Vec<_> = (0..3).map(|_| solver.new_bounded_integer(1, 5)).collect();
            solver
                .add_constraint(constraints::all_different(variables))
                .expect("consistent at the root");

            assert_eq!(60, count_solutions(solver));
        }
    }

    #[test]
    fn an_infeasible_instance_is_reported_at_the_root() {
        let mut solver = Solver::default();
        let x = solver.new_bounded_integer(1, 3);
        solver
            .add_constraint(constraints::not_equals(vec![x], 1))
            .expect("consistent");
        solver
            .add_constraint(constraints::not_equals(vec![x], 2))
            .expect("consistent");
        let result = solver.add_constraint(constraints::not_equals(vec![x], 3));

        assert!(result.is_err());

        let mut brancher = solver.default_brancher();
        let mut termination = Indefinite;
        assert!(matches!(
            solver.satisfy(&mut brancher, &mut termination),
            crate::results::SatisfactionResult::Unsatisfiable
        ));
    }
}
