use std::fmt::Display;
use std::fmt::Formatter;

use super::Action;
use crate::error::PlanApplicationError;
use crate::model::Model;

/// A set of timed actions which reconfigures its origin model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconfigurationPlan {
    origin: Model,
    /// The actions in insertion order.
    actions: Vec<Action>,
}

impl ReconfigurationPlan {
    pub fn new(origin: Model) -> ReconfigurationPlan {
        ReconfigurationPlan {
            origin,
            actions: vec![],
        }
    }

    pub fn origin(&self) -> &Model {
        &self.origin
    }

    pub fn add(&mut self, action: Action) {
        self.actions.push(action);
    }

    /// The actions ordered by start time; actions starting together keep their insertion order.
    pub fn actions(&self) -> Vec<&Action> {
        let mut actions = self.actions.iter().collect::<Vec<_>>();
        actions.sort_by_key(|action| action.start);
        actions
    }

    /// The moment the last action ends.
    pub fn duration(&self) -> i32 {
        self.actions
            .iter()
            .map(|action| action.end)
            .max()
            .unwrap_or(0)
    }

    pub fn size(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Finds two actions which may not be executed simultaneously but overlap.
    ///
    /// Two actions conflict when they manipulate the same VM, when they change the state of the
    /// same node, or when one changes the state of a node the other one takes place on.
    pub fn check_overlaps(&self) -> Option<(&Action, &Action)> {
        for (i, first) in self.actions.iter().enumerate() {
            for second in self.actions[i + 1..].iter() {
                if first.overlaps(second) && conflict(first, second) {
                    return Some((first, second));
                }
            }
        }
        None
    }

    /// Replays the actions in order onto a copy of the origin model.
    pub fn apply(&self) -> Result<Model, PlanApplicationError> {
        let mut model = self.origin.clone();
        for action in self.actions() {
            action.apply(&mut model)?;
        }
        Ok(model)
    }

    pub fn is_applyable(&self) -> bool {
        self.apply().is_ok()
    }
}

fn conflict(first: &Action, second: &Action) -> bool {
    if first.vm().is_some() && first.vm() == second.vm() {
        return true;
    }

    match (first.managed_node(), second.managed_node()) {
        (Some(a), Some(b)) => a == b,
        (Some(node), None) => second.hosting_nodes().contains(&node),
        (None, Some(node)) => first.hosting_nodes().contains(&node),
        (None, None) => false,
    }
}

impl Display for ReconfigurationPlan {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for action in self.actions() {
            writeln!(f, "{action}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Node;
    use crate::model::NodeState;
    use crate::model::Vm;
    use crate::plan::Operation;

    fn origin() -> Model {
        let mut model = Model::default();
        let n1 = model.new_node();
        let n2 = model.new_node();
        let vm = model.new_vm();
        model.mapping_mut().add_online_node(n1);
        model.mapping_mut().add_online_node(n2);
        assert!(model.mapping_mut().add_running_vm(vm, n1));
        model
    }

    fn migration(start: i32, end: i32) -> Action {
        Action::new(
            start,
            end,
            Operation::MigrateVm {
                vm: Vm(0),
                source: Node(0),
                destination: Node(1),
            },
        )
    }

    #[test]
    fn actions_are_sorted_by_start_then_insertion() {
        let mut plan = ReconfigurationPlan::new(origin());
        plan.add(Action::new(
            3,
            4,
            Operation::ShutdownNode { node: Node(0) },
        ));
        plan.add(migration(0, 3));

        let starts = plan.actions().iter().map(|a| a.start).collect::<Vec<_>>();
        assert_eq!(vec![0, 3], starts);
        assert_eq!(4, plan.duration());
        assert!(plan.check_overlaps().is_none());

        let result = plan.apply().expect("applicable");
        assert_eq!(
            Some(NodeState::Offline),
            result.mapping().node_state(Node(0))
        );
    }

    #[test]
    fn a_node_cannot_shut_down_while_a_vm_leaves_it() {
        let mut plan = ReconfigurationPlan::new(origin());
        plan.add(migration(0, 3));
        plan.add(Action::new(
            2,
            4,
            Operation::ShutdownNode { node: Node(0) },
        ));

        assert!(plan.check_overlaps().is_some());
    }

    #[test]
    fn the_empty_plan_reproduces_its_origin() {
        let plan = ReconfigurationPlan::new(origin());

        assert_eq!(0, plan.duration());
        assert_eq!(Ok(origin()), plan.apply());
    }
}
