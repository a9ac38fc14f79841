use crate::containers::KeyedVec;
use crate::engine::domains::DomainStore;
use crate::engine::variables::DomainId;
use crate::engine::variables::IntegerVariable;
use crate::engine::variables::Literal;

/// A solution which owns a snapshot of every variable's value, taken at a leaf where all
/// variables were instantiated.
#[derive(Clone, Debug, Default)]
pub struct Solution {
    values: KeyedVec<DomainId, i32>,
}

impl Solution {
    pub fn num_domains(&self) -> usize {
        self.values.len()
    }

    /// The user-created domains, skipping the reserved trivially-true variable.
    pub fn domains(&self) -> impl Iterator<Item = DomainId> {
        (1..self.values.len() as u32).map(DomainId::new)
    }

    pub fn value(&self, domain: DomainId) -> i32 {
        self.values[domain]
    }

    pub fn literal_value(&self, literal: Literal) -> bool {
        let predicate = literal.get_true_predicate();
        self.values[predicate.get_domain()] == predicate.get_right_hand_side()
    }
}

/// A solution which keeps a reference to the solver's domains; valid while the solver remains at
/// the leaf. Convert into a [`Solution`] to keep the values.
#[derive(Clone, Copy, Debug)]
pub struct SolutionReference<'a> {
    store: &'a DomainStore,
}

impl<'a> SolutionReference<'a> {
    pub(crate) fn new(store: &'a DomainStore) -> SolutionReference<'a> {
        SolutionReference { store }
    }

    pub fn num_domains(&self) -> usize {
        self.store.num_domains() as usize
    }

    pub fn domains(&self) -> impl Iterator<Item = DomainId> {
        self.store.domains()
    }

    /// The value of the (instantiated) variable in this solution.
    pub fn value<Var: IntegerVariable>(&self, var: &Var) -> i32 {
        debug_assert!(
            var.lower_bound(self.store) == var.upper_bound(self.store),
            "solution values are only defined for instantiated variables"
        );
        var.lower_bound(self.store)
    }

    pub fn literal_value(&self, literal: Literal) -> bool {
        self.store
            .is_predicate_satisfied(literal.get_true_predicate())
    }
}

impl From<SolutionReference<'_>> for Solution {
    fn from(reference: SolutionReference<'_>) -> Solution {
        let mut values = KeyedVec::default();
        for id in 0..reference.store.num_domains() {
            let domain = DomainId::new(id);
            let _ = values.push(reference.store.lower_bound(domain));
        }
        Solution { values }
    }
}
