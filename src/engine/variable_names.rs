use crate::containers::HashMap;
use crate::engine::variables::DomainId;

/// Display names of the variables that were given one at creation.
#[derive(Debug, Default)]
pub(crate) struct VariableNames {
    integers: HashMap<DomainId, String>,
}

impl VariableNames {
    /// Get the name of the domain, if it has one.
    pub(crate) fn get_name(&self, domain_id: DomainId) -> Option<&str> {
        self.integers.get(&domain_id).map(|s| s.as_str())
    }

    pub(crate) fn add(&mut self, domain_id: DomainId, name: String) {
        let previous = self.integers.insert(domain_id, name);
        assert!(previous.is_none(), "a variable can only be named once");
    }
}
