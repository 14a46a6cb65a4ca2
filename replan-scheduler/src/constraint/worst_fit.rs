use std::cmp::Reverse;

use replan_core::branching::value_selection::ValueSelector;
use replan_core::branching::SelectionContext;
use replan_core::predicate;
use replan_core::predicates::Predicate;
use replan_core::variables::DomainId;

use crate::model::ResourceView;
use crate::problem::ReconfigurationProblem;

/// [`ValueSelector`] for host variables which picks the node with the most free resources, given
/// the VMs already placed. The free amount of a node is its smallest free amount over the
/// resources; ties go to the lowest node.
#[derive(Clone, Debug)]
pub struct WorstFit {
    /// The capacities of every node, per resource.
    capacities: Vec<Vec<i64>>,
    /// The host variables with the amounts the VM needs, per resource.
    demands: Vec<(DomainId, Vec<i64>)>,
}

impl WorstFit {
    pub fn new(problem: &ReconfigurationProblem) -> WorstFit {
        let resources = problem.source_model().resources().collect::<Vec<_>>();
        let capacities = problem
            .nodes()
            .iter()
            .map(|&node| {
                resources
                    .iter()
                    .map(|resource| i64::from(resource.capacity(node)))
                    .collect()
            })
            .collect();
        let demands = problem
            .vm_transitions()
            .filter_map(|transition| transition.d_slice())
            .map(|slice| {
                let heights = resources
                    .iter()
                    .map(|resource| i64::from(slice.height(resource.name())))
                    .collect();
                (slice.host(), heights)
            })
            .collect();

        WorstFit {
            capacities,
            demands,
        }
    }
}

impl ValueSelector<DomainId> for WorstFit {
    fn select_value(
        &mut self,
        context: &mut SelectionContext,
        decision_variable: DomainId,
    ) -> Predicate {
        let mut free = self.capacities.clone();
        for (host, heights) in self.demands.iter() {
            if !context.is_integer_fixed(*host) {
                continue;
            }
            let Some(free_on_node) = usize::try_from(context.lower_bound(*host))
                .ok()
                .and_then(|node| free.get_mut(node))
            else {
                continue;
            };
            for (amount, height) in free_on_node.iter_mut().zip(heights.iter()) {
                *amount -= height;
            }
        }

        let emptiest = context.iterate_domain(decision_variable).max_by_key(|&node| {
            let smallest_free = usize::try_from(node)
                .ok()
                .and_then(|node| free.get(node))
                .and_then(|amounts| amounts.iter().min().copied())
                .unwrap_or(0);
            (smallest_free, Reverse(node))
        });

        match emptiest {
            Some(node) => predicate!(decision_variable == node),
            None => predicate!(decision_variable <= context.lower_bound(decision_variable)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use replan_core::branching::branchers::IndependentVariableValueBrancher;
    use replan_core::branching::variable_selection::InputOrder;
    use replan_core::results::SatisfactionResult;
    use replan_core::termination::Indefinite;

    use super::*;
    use crate::model::Model;
    use crate::model::ShareableResource;
    use crate::problem::host_of;
    use crate::problem::ReconfigurationProblemBuilder;

    #[test]
    fn the_emptiest_node_is_selected() {
        let mut model = Model::default();
        let loaded = model.new_node();
        let empty = model.new_node();
        model.mapping_mut().add_online_node(loaded);
        model.mapping_mut().add_online_node(empty);
        let resident = model.new_vm();
        let placed = model.new_vm();
        assert!(model.mapping_mut().add_running_vm(resident, loaded));
        assert!(model.mapping_mut().add_running_vm(placed, loaded));
        model.attach(ShareableResource::with_defaults("cpu", 10, 3));
        let mut problem = ReconfigurationProblemBuilder::new(&model)
            .with_manageable_vms(BTreeSet::from([placed]))
            .build()
            .expect("valid model");

        let host = host_of(&problem, placed);
        let worst_fit = WorstFit::new(&problem);
        let mut brancher =
            IndependentVariableValueBrancher::new(InputOrder::new(&[host]), worst_fit);
        let result = problem.solver_mut().satisfy(&mut brancher, &mut Indefinite);

        let SatisfactionResult::Satisfiable(solution) = result else {
            panic!("both nodes can host the VM");
        };
        assert_eq!(
            problem.node_index(empty),
            Some(solution.get_value(host))
        );
    }
}
