use super::outputs::solution_iterator::SolutionIterator;
use super::outputs::OptimisationResult;
use super::outputs::SatisfactionResult;
use crate::basic_types::CSPSolverExecutionFlag;
use crate::basic_types::ConstraintOperationError;
use crate::basic_types::Solution;
use crate::branching::branchers::IndependentVariableValueBrancher;
use crate::branching::value_selection::InDomainMin;
use crate::branching::variable_selection::InputOrder;
use crate::branching::Brancher;
use crate::constraints::Constraint;
use crate::engine::propagation::PropagatorConstructor;
use crate::engine::termination::TerminationCondition;
use crate::engine::ConstraintSatisfactionSolver;
use crate::engine::SatisfactionSolverOptions;
use crate::engine::SolverStatistics;
use crate::optimisation::optimise;
use crate::optimisation::OptimisationDirection;
use crate::statistics::log_statistic_postfix;
use crate::statistics::should_log_statistics;
use crate::variables::DomainId;
use crate::variables::IntegerVariable;
use crate::variables::Literal;

/// The main interaction point which allows the creation of variables, the posting of constraints,
/// and solving.
///
/// # Creating variables
/// Variables are created by bounds ([`Solver::new_bounded_integer`]) or by an explicit value set
/// ([`Solver::new_sparse_integer`]); see [`crate::variables`] for the view types which can be
/// derived from them.
///
/// # Posting constraints
/// The constraints of [`crate::constraints`] are posted through [`Solver::add_constraint`]
/// (permanently), [`Solver::add_temporary_constraint`] (until the current world is popped), or
/// [`Solver::add_implication`] (half-reified).
///
/// # Solving
/// A search is configured by a [`Brancher`] and a [`TerminationCondition`]; see
/// [`Solver::satisfy`], [`Solver::iterate_solutions`], [`Solver::minimise`] and
/// [`Solver::maximise`].
#[derive(Debug, Default)]
pub struct Solver {
    satisfaction_solver: ConstraintSatisfactionSolver,
}

impl Solver {
    /// Creates a solver with the provided configuration.
    pub fn with_options(options: SatisfactionSolverOptions) -> Self {
        Solver {
            satisfaction_solver: ConstraintSatisfactionSolver::new(options),
        }
    }

    /// The counters which were updated during the search so far.
    pub fn statistics(&self) -> &SolverStatistics {
        &self.satisfaction_solver.statistics
    }

    /// Logs the statistics through the configured statistic channel; a no-op unless
    /// [`crate::statistics::configure_statistic_logging`] has been called.
    pub fn log_statistics(&self) {
        if should_log_statistics() {
            self.satisfaction_solver.statistics.log();
            log_statistic_postfix();
        }
    }
}

// variable creation
impl Solver {
    /// Create a new integer variable with the given bounds.
    pub fn new_bounded_integer(&mut self, lower_bound: i32, upper_bound: i32) -> DomainId {
        self.satisfaction_solver
            .state
            .new_interval_variable(lower_bound, upper_bound, None)
    }

    /// Create a new named integer variable with the given bounds.
    pub fn new_named_bounded_integer(
        &mut self,
        lower_bound: i32,
        upper_bound: i32,
        name: impl Into<String>,
    ) -> DomainId {
        self.satisfaction_solver.state.new_interval_variable(
            lower_bound,
            upper_bound,
            Some(name.into()),
        )
    }

    /// Create a new integer variable which has a domain of predefined values; the domain keeps
    /// holes when interior values are removed.
    pub fn new_sparse_integer(&mut self, values: impl Into<Vec<i32>>) -> DomainId {
        self.satisfaction_solver
            .state
            .new_sparse_variable(&values.into(), None)
    }

    /// Create a new named integer variable with a domain of predefined values.
    pub fn new_named_sparse_integer(
        &mut self,
        values: impl Into<Vec<i32>>,
        name: impl Into<String>,
    ) -> DomainId {
        self.satisfaction_solver
            .state
            .new_sparse_variable(&values.into(), Some(name.into()))
    }

    /// Create a variable fixed to `value`; constants never interact with the trail.
    pub fn new_constant(&mut self, value: i32) -> DomainId {
        self.satisfaction_solver.state.new_constant(value)
    }

    /// Create a fresh boolean literal over a new 0-1 integer variable.
    pub fn new_literal(&mut self) -> Literal {
        self.satisfaction_solver.state.new_literal(None)
    }

    pub fn lower_bound<Var: IntegerVariable>(&self, var: &Var) -> i32 {
        var.lower_bound(&self.satisfaction_solver.state.domains)
    }

    pub fn upper_bound<Var: IntegerVariable>(&self, var: &Var) -> i32 {
        var.upper_bound(&self.satisfaction_solver.state.domains)
    }
}

// constraint posting
impl Solver {
    /// Post the constraint permanently.
    ///
    /// Returns a [`ConstraintOperationError`] when posting led to a root-level conflict; the
    /// model is infeasible from then on.
    pub fn add_constraint(
        &mut self,
        constraint: impl Constraint,
    ) -> Result<(), ConstraintOperationError> {
        constraint.post(self)
    }

    /// Post the constraint until the current world is popped.
    pub fn add_temporary_constraint(
        &mut self,
        constraint: impl Constraint,
    ) -> Result<(), ConstraintOperationError> {
        constraint.post_temporary(self)
    }

    /// Post `reification_literal -> constraint`.
    pub fn add_implication(
        &mut self,
        constraint: impl Constraint,
        reification_literal: Literal,
    ) -> Result<(), ConstraintOperationError> {
        constraint.implied_by(self, reification_literal)
    }

    pub(crate) fn add_propagator<Constructor>(
        &mut self,
        constructor: Constructor,
    ) -> Result<(), ConstraintOperationError>
    where
        Constructor: PropagatorConstructor,
        Constructor::PropagatorImpl: 'static,
    {
        self.satisfaction_solver.add_propagator(constructor)
    }

    pub(crate) fn add_temporary_propagator<Constructor>(
        &mut self,
        constructor: Constructor,
    ) -> Result<(), ConstraintOperationError>
    where
        Constructor: PropagatorConstructor,
        Constructor::PropagatorImpl: 'static,
    {
        self.satisfaction_solver.add_temporary_propagator(constructor)
    }
}

/// The brancher used by default: label the variables in creation order, trying the smallest value
/// first.
pub type DefaultBrancher = IndependentVariableValueBrancher<
    DomainId,
    InputOrder<DomainId>,
    InDomainMin,
>;

// solving
impl Solver {
    /// Construct the [`DefaultBrancher`] over all currently-created variables.
    pub fn default_brancher(&self) -> DefaultBrancher {
        let variables: Vec<DomainId> = self
            .satisfaction_solver
            .state
            .domains
            .domains()
            .collect();
        IndependentVariableValueBrancher::new(InputOrder::new(&variables), InDomainMin)
    }

    /// Search for a single solution. On success the solution is returned and the solver is
    /// restored to the root, ready for further constraints or solves.
    pub fn satisfy(
        &mut self,
        brancher: &mut impl Brancher,
        termination: &mut impl TerminationCondition,
    ) -> SatisfactionResult {
        match self.satisfaction_solver.solve(termination, brancher) {
            CSPSolverExecutionFlag::Feasible => {
                let reference = self.satisfaction_solver.get_solution_reference();
                brancher.on_solution(reference);
                let solution: Solution = reference.into();
                self.satisfaction_solver.restore_state_at_root(brancher);
                SatisfactionResult::Satisfiable(solution)
            }
            CSPSolverExecutionFlag::Infeasible => SatisfactionResult::Unsatisfiable,
            CSPSolverExecutionFlag::Timeout => SatisfactionResult::Unknown,
        }
    }

    /// Enumerate solutions one by one; each returned solution is blocked before the search
    /// resumes.
    pub fn iterate_solutions<'this, 'brancher, 'termination, B: Brancher, T: TerminationCondition>(
        &'this mut self,
        brancher: &'brancher mut B,
        termination: &'termination mut T,
    ) -> SolutionIterator<'this, 'brancher, 'termination, B, T> {
        SolutionIterator::new(&mut self.satisfaction_solver, brancher, termination)
    }

    /// Search for the solution minimising the objective variable.
    pub fn minimise(
        &mut self,
        brancher: &mut impl Brancher,
        termination: &mut impl TerminationCondition,
        objective: impl IntegerVariable,
    ) -> OptimisationResult {
        optimise(
            &mut self.satisfaction_solver,
            brancher,
            termination,
            OptimisationDirection::Minimise,
            objective,
        )
    }

    /// Search for the solution maximising the objective variable.
    pub fn maximise(
        &mut self,
        brancher: &mut impl Brancher,
        termination: &mut impl TerminationCondition,
        objective: impl IntegerVariable,
    ) -> OptimisationResult {
        optimise(
            &mut self.satisfaction_solver,
            brancher,
            termination,
            OptimisationDirection::Maximise,
            objective,
        )
    }

    /// Whether every posted constraint reports itself entailed under the current (full)
    /// assignment; intended for validating solutions in tests.
    pub fn all_constraints_entailed(&self) -> bool {
        self.satisfaction_solver.all_propagators_entailed()
    }
}
