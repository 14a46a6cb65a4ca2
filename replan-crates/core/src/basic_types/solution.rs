use crate::containers::KeyedVec;
use crate::engine::variables::DomainId;
use crate::engine::variables::IntegerVariable;
use crate::engine::Assignments;
use crate::replan_assert_simple;

/// A snapshot of the values of all variables at the moment a solution was found.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Solution {
    values: KeyedVec<DomainId, i32>,
}

impl Solution {
    /// Records the current assignment; every domain must be fixed.
    pub(crate) fn from_assignments(assignments: &Assignments) -> Solution {
        let mut values = KeyedVec::default();
        for domain in assignments.get_domains() {
            replan_assert_simple!(
                assignments.is_domain_assigned(domain),
                "{domain} is not assigned in a solution"
            );
            let _ = values.push(assignments.get_lower_bound(domain));
        }

        Solution { values }
    }

    pub fn num_domains(&self) -> usize {
        self.values.len()
    }

    pub fn get_value(&self, domain: DomainId) -> i32 {
        self.values[domain]
    }

    pub fn get_integer_value<Var: IntegerVariable>(&self, var: Var) -> i32 {
        var.value_in(self)
    }
}
