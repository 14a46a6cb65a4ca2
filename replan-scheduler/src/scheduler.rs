use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::time::Instant;

use log::debug;
use log::info;
use log::warn;
use replan_core::replan_assert_simple;
use replan_core::results::OptimisationDirection;
use replan_core::results::OptimisationResult;
use replan_core::results::SatisfactionResult;
use replan_core::results::Solution;
use replan_core::termination::BacktrackBudget;
use replan_core::termination::Combinator;
use replan_core::termination::DecisionBudget;
use replan_core::termination::TimeBudget;

use crate::constraint::ConstraintMapper;
use crate::constraint::OptConstraint;
use crate::constraint::SatConstraint;
use crate::error::SchedulerError;
use crate::model::Model;
use crate::model::ResourceView;
use crate::model::Vm;
use crate::plan::extractor;
use crate::plan::ReconfigurationPlan;
use crate::problem::NextStates;
use crate::problem::Parameters;
use crate::problem::ReconfigurationProblem;
use crate::problem::ReconfigurationProblemBuilder;
use crate::problem::SolutionStatistics;
use crate::problem::SolvingStatistics;

/// What to solve: the current datacenter, the constraints the final state must satisfy, and
/// optionally what makes one plan better than another.
#[derive(Clone, Debug)]
pub struct Instance {
    pub model: Model,
    pub constraints: Vec<SatConstraint>,
    pub objective: Option<OptConstraint>,
}

impl Instance {
    pub fn new(model: Model, constraints: Vec<SatConstraint>) -> Instance {
        Instance {
            model,
            constraints,
            objective: None,
        }
    }

    pub fn with_objective(mut self, objective: OptConstraint) -> Instance {
        self.objective = Some(objective);
        self
    }
}

/// The outcome of [`ReconfigurationScheduler::solve`].
///
/// `plan` is `None` both when no plan exists and when the search stopped before finding one;
/// [`SolvingStatistics::completed`] tells them apart.
#[derive(Clone, Debug)]
pub struct SolveResult {
    pub plan: Option<ReconfigurationPlan>,
    pub statistics: SolvingStatistics,
}

impl SolveResult {
    /// Whether the instance was proven to have no plan.
    pub fn is_infeasible(&self) -> bool {
        self.plan.is_none() && self.statistics.completed
    }
}

/// Computes reconfiguration plans.
///
/// ```rust
/// # use std::collections::BTreeSet;
/// # use replan_scheduler::constraint::SatConstraint;
/// # use replan_scheduler::model::Model;
/// # use replan_scheduler::Instance;
/// # use replan_scheduler::Parameters;
/// # use replan_scheduler::ReconfigurationScheduler;
/// let mut model = Model::default();
/// let node = model.new_node();
/// model.mapping_mut().add_online_node(node);
/// let vm = model.new_vm();
/// model.mapping_mut().add_ready_vm(vm);
///
/// let instance = Instance::new(model, vec![SatConstraint::Running(BTreeSet::from([vm]))]);
/// let result = ReconfigurationScheduler::new(Parameters::default())
///     .solve(&instance)
///     .expect("well-formed instance");
///
/// let plan = result.plan.expect("the VM can boot");
/// assert_eq!(1, plan.size());
/// ```
#[derive(Clone, Debug)]
pub struct ReconfigurationScheduler {
    parameters: Parameters,
    mapper: ConstraintMapper,
}

impl ReconfigurationScheduler {
    pub fn new(parameters: Parameters) -> ReconfigurationScheduler {
        ReconfigurationScheduler {
            parameters,
            mapper: ConstraintMapper::default(),
        }
    }

    pub fn with_mapper(mut self, mapper: ConstraintMapper) -> ReconfigurationScheduler {
        self.mapper = mapper;
        self
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn mapper(&self) -> &ConstraintMapper {
        &self.mapper
    }

    pub fn mapper_mut(&mut self) -> &mut ConstraintMapper {
        &mut self.mapper
    }

    /// Computes a plan which leads `instance.model` to a state satisfying every constraint.
    ///
    /// An instance without a plan is not an error; only malformed instances are.
    pub fn solve(&self, instance: &Instance) -> Result<SolveResult, SchedulerError> {
        self.parameters.validate()?;
        check_elements(instance)?;
        self.mapper
            .check_mapped(&instance.constraints, instance.objective.as_ref())?;

        let model = &instance.model;
        let mut statistics = SolvingStatistics {
            num_nodes: model.nodes().count(),
            num_vms: model.vms().count(),
            num_constraints: instance.constraints.len(),
            ..SolvingStatistics::default()
        };

        let mut next_states = NextStates::default();
        for (state, vms) in instance
            .constraints
            .iter()
            .filter_map(SatConstraint::requested_state)
        {
            for &vm in vms {
                next_states.request(vm, state)?;
            }
        }

        let mut builder = ReconfigurationProblemBuilder::new(model)
            .with_parameters(self.parameters.clone())
            .with_next_states(next_states)
            .with_allocation_requests(allocation_requests(instance));
        if self.parameters.do_repair {
            let misplaced = misplaced_vms(instance);
            debug!("Repair mode: {} VM(s) may be moved", misplaced.len());
            builder = builder.with_manageable_vms(misplaced);
        }

        let started = Instant::now();
        let mut problem = builder.build()?;
        statistics.core_build_duration = started.elapsed();
        statistics.num_managed_vms = problem.manageable_vms().len();

        let started = Instant::now();
        let feasible = self.specialise(instance, &mut problem)?;
        statistics.specialisation_duration = started.elapsed();
        if !feasible {
            info!("The constraints cannot be satisfied");
            statistics.completed = true;
            return Ok(SolveResult {
                plan: None,
                statistics,
            });
        }

        let solution = self.search(&mut problem, &mut statistics);
        let plan = solution.map(|solution| extractor::extract(&problem, &solution));
        if let Some(plan) = plan.as_ref() {
            replan_assert_simple!(
                plan.check_overlaps().is_none(),
                "the plan contains overlapping actions"
            );
            replan_assert_simple!(plan.is_applyable(), "the plan cannot be applied");
            debug!("Computed a plan of {} action(s):\n{plan}", plan.size());
        }

        Ok(SolveResult { plan, statistics })
    }

    /// Injects the constraints and the objective; returns false when the problem became
    /// infeasible.
    fn specialise(
        &self,
        instance: &Instance,
        problem: &mut ReconfigurationProblem,
    ) -> Result<bool, SchedulerError> {
        if problem.is_infeasible() {
            return Ok(false);
        }
        for constraint in instance.constraints.iter() {
            if !self.mapper.inject(constraint, problem)? {
                debug!("Injecting {constraint:?} made the problem infeasible");
                return Ok(false);
            }
        }

        match instance.objective.as_ref() {
            Some(objective) if self.parameters.do_optimize => {
                self.mapper.inject_objective(objective, problem)
            }
            _ => Ok(!problem.is_infeasible()),
        }
    }

    fn search(
        &self,
        problem: &mut ReconfigurationProblem,
        statistics: &mut SolvingStatistics,
    ) -> Option<Solution> {
        let mut termination = Combinator::new(
            Combinator::new(
                self.parameters.time_limit.map(TimeBudget::starting_now),
                self.parameters.node_limit.map(DecisionBudget::new),
            ),
            self.parameters.backtrack_limit.map(BacktrackBudget::new),
        );
        let mut brancher = problem.take_brancher();
        let objective = problem.objective();

        let started = Instant::now();
        let (solution, completed) = match objective {
            Some(objective) => {
                let solutions = &mut statistics.solutions;
                let result = problem.solver_mut().optimise(
                    &mut brancher,
                    &mut termination,
                    OptimisationDirection::Minimise,
                    objective,
                    |solution, search| {
                        let value = solution.get_value(objective);
                        info!("Found a plan with cost {value}");
                        solutions.push(SolutionStatistics {
                            nodes: search.num_decisions,
                            backtracks: search.num_backtracks,
                            elapsed: search.time_spent,
                            objective: Some(value),
                        });
                    },
                );
                match result {
                    OptimisationResult::Optimal(solution) => (Some(solution), true),
                    OptimisationResult::Satisfiable(solution) => (Some(solution), false),
                    OptimisationResult::Unsatisfiable => (None, true),
                    OptimisationResult::Unknown => (None, false),
                }
            }
            None => {
                let result = problem.solver_mut().satisfy(&mut brancher, &mut termination);
                match result {
                    SatisfactionResult::Satisfiable(solution) => (Some(solution), true),
                    SatisfactionResult::Unsatisfiable => (None, true),
                    SatisfactionResult::Unknown => (None, false),
                }
            }
        };
        statistics.solving_duration = started.elapsed();

        let search = problem.solver().statistics();
        statistics.num_search_nodes = search.num_decisions;
        statistics.num_backtracks = search.num_backtracks;
        statistics.completed = completed;
        if objective.is_none() && solution.is_some() {
            statistics.solutions.push(SolutionStatistics {
                nodes: search.num_decisions,
                backtracks: search.num_backtracks,
                elapsed: search.time_spent,
                objective: None,
            });
        }
        if solution.is_none() && !completed {
            warn!("The search stopped before finding a plan");
        }

        solution
    }
}

/// Rejects the constraints which mention elements absent from the model.
fn check_elements(instance: &Instance) -> Result<(), SchedulerError> {
    let model = &instance.model;
    for constraint in instance.constraints.iter() {
        if let Some(&vm) = constraint
            .involved_vms()
            .iter()
            .find(|&&vm| !model.contains_vm(vm))
        {
            return Err(SchedulerError::UnknownVm(vm));
        }
        if let Some(&node) = constraint
            .involved_nodes()
            .iter()
            .find(|&&node| !model.contains_node(node))
        {
            return Err(SchedulerError::UnknownNode(node));
        }
    }
    Ok(())
}

/// The amounts the VMs under a preserve constraint need by the end of the plan. A VM already
/// consuming more than the preserved amount keeps its consumption.
fn allocation_requests(instance: &Instance) -> BTreeMap<Vm, BTreeMap<String, i32>> {
    let mut requests: BTreeMap<Vm, BTreeMap<String, i32>> = BTreeMap::new();
    for constraint in instance.constraints.iter() {
        let SatConstraint::Preserve {
            vms,
            resource,
            amount,
        } = constraint
        else {
            continue;
        };
        let view = instance.model.resource(resource);
        for &vm in vms {
            let current = view.map_or(0, |view| view.consumption(vm));
            let requested = requests
                .entry(vm)
                .or_default()
                .entry(resource.clone())
                .or_insert(current);
            *requested = (*requested).max(*amount);
        }
    }
    requests
}

/// The VMs violating a constraint or the objective; only they may be moved in repair mode.
fn misplaced_vms(instance: &Instance) -> BTreeSet<Vm> {
    let mut misplaced = instance
        .constraints
        .iter()
        .flat_map(|constraint| constraint.misplaced_vms(&instance.model))
        .collect::<BTreeSet<_>>();
    if let Some(objective) = instance.objective.as_ref() {
        misplaced.extend(objective.misplaced_vms(&instance.model));
    }
    misplaced
}
