use std::fmt::Debug;

use enum_map::EnumArray;
use enum_map::EnumMap;

use super::capacity;
use super::min_mttr;
use super::placement;
use super::state;
use super::ConstraintKind;
use super::ObjectiveKind;
use super::OptConstraint;
use super::SatConstraint;
use crate::error::SchedulerError;
use crate::problem::ReconfigurationProblem;

/// Injects a constraint into the problem; returns false when the problem became infeasible.
pub type SatisfactionInjector =
    fn(&SatConstraint, &mut ReconfigurationProblem) -> Result<bool, SchedulerError>;

/// Injects an objective and its search heuristic into the problem.
pub type ObjectiveInjector =
    fn(&OptConstraint, &mut ReconfigurationProblem) -> Result<bool, SchedulerError>;

/// The injector of every kind of constraint and objective.
///
/// ```rust
/// # use replan_scheduler::constraint::ConstraintKind;
/// # use replan_scheduler::constraint::ConstraintMapper;
/// let mut mapper = ConstraintMapper::default();
/// assert!(mapper.is_registered(ConstraintKind::Spread));
///
/// assert!(mapper.unregister(ConstraintKind::Spread));
/// assert!(!mapper.is_registered(ConstraintKind::Spread));
/// ```
#[derive(Clone)]
pub struct ConstraintMapper {
    satisfaction: EnumMap<ConstraintKind, Option<SatisfactionInjector>>,
    objectives: EnumMap<ObjectiveKind, Option<ObjectiveInjector>>,
}

impl Debug for ConstraintMapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstraintMapper")
            .field("satisfaction", &registered(&self.satisfaction))
            .field("objectives", &registered(&self.objectives))
            .finish()
    }
}

fn registered<Kind, Injector>(map: &EnumMap<Kind, Option<Injector>>) -> Vec<Kind>
where
    Kind: EnumArray<Option<Injector>>,
{
    map.iter()
        .filter(|(_, injector)| injector.is_some())
        .map(|(kind, _)| kind)
        .collect()
}

impl Default for ConstraintMapper {
    fn default() -> Self {
        let mut mapper = ConstraintMapper::empty();
        for (kind, injector) in mapper.satisfaction.iter_mut() {
            *injector = Some(default_injector(kind));
        }
        let _ = mapper.register_objective(ObjectiveKind::MinMttr, min_mttr::inject);
        mapper
    }
}

fn default_injector(kind: ConstraintKind) -> SatisfactionInjector {
    match kind {
        ConstraintKind::Running
        | ConstraintKind::Ready
        | ConstraintKind::Sleeping
        | ConstraintKind::Killed => state::inject_vm_state,
        ConstraintKind::Online | ConstraintKind::Offline => state::inject_node_state,
        ConstraintKind::Fence | ConstraintKind::Ban | ConstraintKind::Root => {
            placement::inject_host_restriction
        }
        ConstraintKind::Spread => placement::inject_spread,
        ConstraintKind::Gather => placement::inject_gather,
        ConstraintKind::Lonely => placement::inject_lonely,
        ConstraintKind::Among => placement::inject_among,
        ConstraintKind::Split => placement::inject_split,
        ConstraintKind::Quarantine => placement::inject_quarantine,
        ConstraintKind::MaxOnline => capacity::inject_max_online,
        ConstraintKind::RunningCapacity | ConstraintKind::ResourceCapacity => {
            capacity::inject_capacity
        }
        ConstraintKind::Preserve => capacity::inject_preserve,
    }
}

impl ConstraintMapper {
    /// A mapper without any injector.
    pub fn empty() -> ConstraintMapper {
        ConstraintMapper {
            satisfaction: EnumMap::default(),
            objectives: EnumMap::default(),
        }
    }

    /// Registers the injector of `kind`; returns whether one was registered before.
    pub fn register(&mut self, kind: ConstraintKind, injector: SatisfactionInjector) -> bool {
        self.satisfaction[kind].replace(injector).is_some()
    }

    /// Removes the injector of `kind`; returns whether there was one.
    pub fn unregister(&mut self, kind: ConstraintKind) -> bool {
        self.satisfaction[kind].take().is_some()
    }

    pub fn is_registered(&self, kind: ConstraintKind) -> bool {
        self.satisfaction[kind].is_some()
    }

    pub fn register_objective(&mut self, kind: ObjectiveKind, injector: ObjectiveInjector) -> bool {
        self.objectives[kind].replace(injector).is_some()
    }

    pub fn unregister_objective(&mut self, kind: ObjectiveKind) -> bool {
        self.objectives[kind].take().is_some()
    }

    /// Checks that every constraint and the objective can be injected.
    pub fn check_mapped(
        &self,
        constraints: &[SatConstraint],
        objective: Option<&OptConstraint>,
    ) -> Result<(), SchedulerError> {
        if let Some(unmapped) = constraints
            .iter()
            .map(SatConstraint::kind)
            .find(|&kind| !self.is_registered(kind))
        {
            return Err(SchedulerError::UnmappedConstraint(unmapped));
        }

        match objective.map(OptConstraint::kind) {
            Some(kind) if self.objectives[kind].is_none() => {
                Err(SchedulerError::UnmappedObjective(kind))
            }
            _ => Ok(()),
        }
    }

    /// Injects `constraint`; returns false when the problem became infeasible.
    pub fn inject(
        &self,
        constraint: &SatConstraint,
        problem: &mut ReconfigurationProblem,
    ) -> Result<bool, SchedulerError> {
        let kind = constraint.kind();
        let injector = self.satisfaction[kind].ok_or(SchedulerError::UnmappedConstraint(kind))?;
        injector(constraint, problem)
    }

    pub fn inject_objective(
        &self,
        objective: &OptConstraint,
        problem: &mut ReconfigurationProblem,
    ) -> Result<bool, SchedulerError> {
        let kind = objective.kind();
        let injector = self.objectives[kind].ok_or(SchedulerError::UnmappedObjective(kind))?;
        injector(objective, problem)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::model::Model;
    use crate::problem::ReconfigurationProblemBuilder;

    #[test]
    fn unregistered_kinds_cannot_be_injected() {
        let model = Model::default();
        let mut problem = ReconfigurationProblemBuilder::new(&model)
            .build()
            .expect("empty model");
        let mut mapper = ConstraintMapper::default();
        assert!(mapper.unregister(ConstraintKind::Gather));

        let result = mapper.inject(&SatConstraint::Gather(BTreeSet::new()), &mut problem);

        assert_eq!(
            Err(SchedulerError::UnmappedConstraint(ConstraintKind::Gather)),
            result
        );
    }

    #[test]
    fn the_default_mapper_covers_every_kind() {
        let mapper = ConstraintMapper::default();

        for (kind, injector) in mapper.satisfaction.iter() {
            assert!(injector.is_some(), "{kind:?} is not mapped");
        }
        assert!(mapper
            .check_mapped(&[], Some(&OptConstraint::MinMttr))
            .is_ok());
    }
}
