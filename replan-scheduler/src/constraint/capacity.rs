use replan_core::constraints;

use super::SatConstraint;
use crate::error::SchedulerError;
use crate::problem::ReconfigurationProblem;
use crate::propagators::WeightedCountConstructor;

pub(super) fn inject_max_online(
    constraint: &SatConstraint,
    problem: &mut ReconfigurationProblem,
) -> Result<bool, SchedulerError> {
    let SatConstraint::MaxOnline { nodes, amount } = constraint else {
        return Ok(true);
    };

    let states = nodes
        .iter()
        .map(|&node| {
            problem
                .node_transition(node)
                .map(|transition| transition.state().get_integer_variable())
                .ok_or(SchedulerError::UnknownNode(node))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(problem.post(constraints::less_than_or_equals(states, *amount)))
}

/// RunningCapacity and ResourceCapacity: the VMs running on the nodes at the end of the plan
/// fit in an amount shared by the nodes.
pub(super) fn inject_capacity(
    constraint: &SatConstraint,
    problem: &mut ReconfigurationProblem,
) -> Result<bool, SchedulerError> {
    let (nodes, amount, resource) = match constraint {
        SatConstraint::RunningCapacity { nodes, amount } => (nodes, *amount, None),
        SatConstraint::ResourceCapacity {
            resource,
            nodes,
            amount,
        } => (nodes, *amount, Some(resource)),
        _ => return Ok(true),
    };
    if let Some(resource) = resource {
        if problem.source_model().resource(resource).is_none() {
            return Err(SchedulerError::UnknownResource(resource.clone()));
        }
    }

    let values = nodes
        .iter()
        .map(|&node| problem.node_index(node).ok_or(SchedulerError::UnknownNode(node)))
        .collect::<Result<Vec<_>, _>>()?;
    let terms = problem
        .vm_transitions()
        .filter_map(|transition| {
            let slice = transition.d_slice()?;
            let weight = match resource {
                Some(resource) => slice.height(resource),
                None => 1,
            };
            Some((slice.host(), weight))
        })
        .collect();

    Ok(problem.post(WeightedCountConstructor {
        terms,
        values,
        bound: i64::from(amount),
    }))
}

/// The allocations are requested before the problem is built; nothing is left to inject.
pub(super) fn inject_preserve(
    constraint: &SatConstraint,
    problem: &mut ReconfigurationProblem,
) -> Result<bool, SchedulerError> {
    let SatConstraint::Preserve { resource, .. } = constraint else {
        return Ok(true);
    };
    if problem.source_model().resource(resource).is_none() {
        return Err(SchedulerError::UnknownResource(resource.clone()));
    }
    Ok(!problem.is_infeasible())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::model::Model;
    use crate::model::Node;
    use crate::model::ShareableResource;
    use crate::problem::host_of;
    use crate::problem::ReconfigurationProblemBuilder;

    #[test]
    fn a_saturated_group_of_nodes_accepts_no_more_vms() {
        let mut model = Model::default();
        let n1 = model.new_node();
        let n2 = model.new_node();
        model.mapping_mut().add_online_node(n1);
        model.mapping_mut().add_online_node(n2);
        let pinned = model.new_vm();
        let free = model.new_vm();
        assert!(model.mapping_mut().add_running_vm(pinned, n1));
        assert!(model.mapping_mut().add_running_vm(free, n2));
        model.attach(ShareableResource::with_defaults("mem", 8, 4));
        let mut problem = ReconfigurationProblemBuilder::new(&model)
            .with_manageable_vms(BTreeSet::from([free]))
            .build()
            .expect("valid model");

        let capacity = SatConstraint::ResourceCapacity {
            resource: "mem".to_owned(),
            nodes: BTreeSet::from([n1]),
            amount: 6,
        };

        assert_eq!(Ok(true), inject_capacity(&capacity, &mut problem));
        assert!(!problem.solver().contains(&host_of(&problem, free), 0));
    }

    #[test]
    fn unknown_resources_are_reported() {
        let model = Model::default();
        let mut problem = ReconfigurationProblemBuilder::new(&model)
            .build()
            .expect("empty model");

        let capacity = SatConstraint::ResourceCapacity {
            resource: "gpu".to_owned(),
            nodes: BTreeSet::<Node>::new(),
            amount: 1,
        };

        assert_eq!(
            Err(SchedulerError::UnknownResource("gpu".to_owned())),
            inject_capacity(&capacity, &mut problem)
        );
    }

    #[test]
    fn at_most_one_node_stays_online() {
        let mut model = Model::default();
        let nodes = [model.new_node(), model.new_node()];
        for node in nodes {
            model.mapping_mut().add_online_node(node);
        }
        let mut problem = ReconfigurationProblemBuilder::new(&model)
            .build()
            .expect("valid model");

        let max_online = SatConstraint::MaxOnline {
            nodes: nodes.into_iter().collect(),
            amount: 1,
        };
        assert_eq!(Ok(true), inject_max_online(&max_online, &mut problem));

        let first = problem.node_transitions()[0].state();
        problem
            .solver_mut()
            .post(first.get_true_predicate())
            .expect("feasible");
        let second = problem.node_transitions()[1].state();
        assert_eq!(0, problem.solver().upper_bound(&second));
    }
}
