use crate::basic_types::Random;
use crate::engine::domains::DomainStore;
use crate::engine::variables::DomainId;
use crate::engine::variables::IntegerVariable;

/// The context provided to the selectors, allowing them to inspect the current domains and to
/// draw random numbers.
#[derive(Debug)]
pub struct SelectionContext<'a> {
    store: &'a DomainStore,
    random_generator: &'a mut dyn Random,
}

impl<'a> SelectionContext<'a> {
    pub(crate) fn new(store: &'a DomainStore, random_generator: &'a mut dyn Random) -> Self {
        SelectionContext {
            store,
            random_generator,
        }
    }

    /// Returns a random generator which can be used to generate random values.
    pub fn random(&mut self) -> &mut dyn Random {
        self.random_generator
    }

    /// Returns the number of values in the domain of `var`.
    pub fn get_size_of_domain<Var: IntegerVariable>(&self, var: &Var) -> i64 {
        var.size(self.store)
    }

    pub fn lower_bound<Var: IntegerVariable>(&self, var: &Var) -> i32 {
        var.lower_bound(self.store)
    }

    pub fn upper_bound<Var: IntegerVariable>(&self, var: &Var) -> i32 {
        var.upper_bound(self.store)
    }

    pub fn contains<Var: IntegerVariable>(&self, var: &Var, value: i32) -> bool {
        var.contains(self.store, value)
    }

    pub fn next_value<Var: IntegerVariable>(&self, var: &Var, value: i32) -> Option<i32> {
        var.next_value(self.store, value)
    }

    pub fn is_integer_fixed<Var: IntegerVariable>(&self, var: &Var) -> bool {
        var.lower_bound(self.store) == var.upper_bound(self.store)
    }

    /// All user-created domains.
    pub fn get_domains(&self) -> impl Iterator<Item = DomainId> {
        self.store.domains()
    }

    #[cfg(test)]
    pub(crate) fn create_for_testing(bounds: Vec<(i32, i32)>) -> DomainStore {
        let mut store = DomainStore::default();
        for (lower_bound, upper_bound) in bounds {
            let _ = store.grow_interval(lower_bound, upper_bound);
        }
        store
    }
}
