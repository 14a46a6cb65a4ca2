use std::collections::BTreeMap;
use std::collections::BTreeSet;

use log::debug;
use replan_core::constraints;
use replan_core::options::SolverOptions;
use replan_core::variables::TransformableVariable;
use replan_core::Solver;

use super::Parameters;
use super::ReconfigurationProblem;
use crate::error::SchedulerError;
use crate::model::Model;
use crate::model::Node;
use crate::model::ResourceView;
use crate::model::Vm;
use crate::model::VmState;
use crate::propagators::ConsumingTask;
use crate::propagators::DemandingTask;
use crate::propagators::ResizingTask;
use crate::propagators::TimeTableCapacityConstructor;
use crate::transition;
use crate::transition::NodeTransition;
use crate::transition::NodeTransitionKind;
use crate::transition::TransitionContext;
use crate::transition::VmTransition;
use crate::transition::VmTransitionKind;

/// The states the VMs are requested to be in at the end of the plan. A VM which is not in any
/// set keeps its current state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NextStates {
    pub ready: BTreeSet<Vm>,
    pub running: BTreeSet<Vm>,
    pub sleeping: BTreeSet<Vm>,
    pub killed: BTreeSet<Vm>,
}

impl NextStates {
    /// Requests `vm` to be in `state`; fails when another state was requested for it.
    pub fn request(&mut self, vm: Vm, state: VmState) -> Result<(), SchedulerError> {
        if let Some(first) = self.state_of(vm) {
            if first == state {
                return Ok(());
            }
            return Err(SchedulerError::ConflictingStateRequest {
                vm,
                first,
                second: state,
            });
        }

        let set = match state {
            VmState::Ready => &mut self.ready,
            VmState::Running => &mut self.running,
            VmState::Sleeping => &mut self.sleeping,
            VmState::Killed => &mut self.killed,
            VmState::Init => {
                return Err(SchedulerError::InvalidParameters(format!(
                    "'{vm}' cannot be requested to go back to {state}"
                )));
            }
        };
        let _ = set.insert(vm);
        Ok(())
    }

    pub fn state_of(&self, vm: Vm) -> Option<VmState> {
        [
            (&self.ready, VmState::Ready),
            (&self.running, VmState::Running),
            (&self.sleeping, VmState::Sleeping),
            (&self.killed, VmState::Killed),
        ]
        .into_iter()
        .find_map(|(set, state)| set.contains(&vm).then_some(state))
    }

    fn vms(&self) -> impl Iterator<Item = Vm> + '_ {
        self.ready
            .iter()
            .chain(self.running.iter())
            .chain(self.sleeping.iter())
            .chain(self.killed.iter())
            .copied()
    }
}

/// Assembles a [`ReconfigurationProblem`] from a model.
///
/// ```rust
/// # use replan_scheduler::model::Model;
/// # use replan_scheduler::problem::NextStates;
/// # use replan_scheduler::problem::ReconfigurationProblemBuilder;
/// let mut model = Model::default();
/// let node = model.new_node();
/// let vm = model.new_vm();
/// model.mapping_mut().add_online_node(node);
/// model.mapping_mut().add_ready_vm(vm);
///
/// let mut next_states = NextStates::default();
/// next_states.request(vm, replan_scheduler::model::VmState::Running).unwrap();
///
/// let problem = ReconfigurationProblemBuilder::new(&model)
///     .with_next_states(next_states)
///     .build()
///     .unwrap();
/// assert!(problem.future_host(vm).is_some());
/// ```
#[derive(Debug)]
pub struct ReconfigurationProblemBuilder<'a> {
    model: &'a Model,
    parameters: Parameters,
    next_states: NextStates,
    manageable: Option<BTreeSet<Vm>>,
    allocations: BTreeMap<Vm, BTreeMap<String, i32>>,
}

impl<'a> ReconfigurationProblemBuilder<'a> {
    pub fn new(model: &'a Model) -> Self {
        ReconfigurationProblemBuilder {
            model,
            parameters: Parameters::default(),
            next_states: NextStates::default(),
            manageable: None,
            allocations: BTreeMap::new(),
        }
    }

    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_next_states(mut self, next_states: NextStates) -> Self {
        self.next_states = next_states;
        self
    }

    /// Restricts the VMs which may change host; by default they all may.
    pub fn with_manageable_vms(mut self, manageable: BTreeSet<Vm>) -> Self {
        self.manageable = Some(manageable);
        self
    }

    /// The amounts of resources to reserve for VMs once the plan is applied, per VM and per
    /// resource.
    pub fn with_allocation_requests(
        mut self,
        allocations: BTreeMap<Vm, BTreeMap<String, i32>>,
    ) -> Self {
        self.allocations = allocations;
        self
    }

    pub fn build(self) -> Result<ReconfigurationProblem, SchedulerError> {
        self.parameters.validate()?;
        self.check_references()?;

        let model = self.model;
        let horizon = self.parameters.max_plan_end;
        let mut solver = Solver::with_options(SolverOptions {
            random_seed: self.parameters.random_seed,
        });

        let named = self.parameters.verbosity > 0;
        let start = solver.new_constant(0);
        let end = if named {
            solver.new_named_bounded_integer(0, horizon, "end")
        } else {
            solver.new_bounded_integer(0, horizon)
        };
        let zero = solver.new_constant(0);
        let one = solver.new_constant(1);
        let end_of_horizon = solver.new_constant(horizon);

        let nodes = model.nodes().collect::<Vec<_>>();
        let manageable = self
            .manageable
            .clone()
            .unwrap_or_else(|| model.vms().collect());

        let mut context = TransitionContext {
            solver: &mut solver,
            model,
            durations: &self.parameters.durations,
            nodes: &nodes,
            horizon,
            named,
            zero,
            one,
            end_of_horizon,
        };

        let node_transitions = nodes
            .iter()
            .map(|&node| NodeTransition::new(&mut context, node))
            .collect::<Result<Vec<_>, _>>()?;

        let no_allocation = BTreeMap::new();
        let mut vm_transitions = BTreeMap::new();
        for vm in model.vms() {
            let future = match self.next_states.state_of(vm) {
                Some(state) => state,
                None => model.vm_state(vm).ok_or(SchedulerError::UnknownVm(vm))?,
            };
            let transition = VmTransition::new(
                &mut context,
                vm,
                future,
                manageable.contains(&vm),
                self.allocations.get(&vm).unwrap_or(&no_allocation),
            )?;
            let _ = vm_transitions.insert(vm, transition);
        }

        let mut problem = ReconfigurationProblem {
            solver,
            source: model.clone(),
            parameters: self.parameters.clone(),
            nodes,
            horizon,
            start,
            end,
            node_transitions,
            vm_transitions,
            manageable,
            objective: None,
            brancher: None,
        };

        bound_by_end(&mut problem);
        link_hosting_windows(&mut problem);
        keep_sleeping_hosts_online(&mut problem);
        post_capacities(&mut problem);

        debug!(
            "Built a problem with {} nodes, {} VMs ({} manageable) and {} propagators",
            problem.nodes.len(),
            problem.vm_transitions.len(),
            problem.manageable.len(),
            problem.solver.num_propagators()
        );
        Ok(problem)
    }

    fn check_references(&self) -> Result<(), SchedulerError> {
        let requested = self
            .next_states
            .vms()
            .chain(self.manageable.iter().flatten().copied())
            .chain(self.allocations.keys().copied());
        for vm in requested {
            if !self.model.contains_vm(vm) {
                return Err(SchedulerError::UnknownVm(vm));
            }
        }

        for resource in self.allocations.values().flat_map(|amounts| amounts.keys()) {
            if self.model.resource(resource).is_none() {
                return Err(SchedulerError::UnknownResource(resource.clone()));
            }
        }

        Ok(())
    }
}

fn bound_by_end(problem: &mut ReconfigurationProblem) {
    let ends = problem
        .vm_transitions
        .values()
        .filter(|transition| transition.kind != VmTransitionKind::Stay)
        .map(|transition| transition.end)
        .chain(problem.node_transitions.iter().map(|transition| transition.end))
        .collect::<Vec<_>>();

    for action_end in ends {
        transition::post(
            &mut problem.solver,
            constraints::binary_less_than_or_equals(action_end, problem.end),
        );
    }
}

/// A VM arrives on a node which is online at the end, once it has booted; a VM leaves a node
/// before it shuts down.
fn link_hosting_windows(problem: &mut ReconfigurationProblem) {
    let states = problem
        .node_transitions
        .iter()
        .map(|transition| transition.state.get_integer_variable())
        .collect::<Vec<_>>();
    let hosting_starts = problem
        .node_transitions
        .iter()
        .map(|transition| transition.hosting_start)
        .collect::<Vec<_>>();
    let one = problem.solver.new_constant(1);

    let arrivals = problem
        .vm_transitions
        .values()
        .filter_map(|transition| transition.d_slice.as_ref())
        .map(|slice| (slice.host, slice.start))
        .collect::<Vec<_>>();
    for (host, arrival) in arrivals {
        let solver = &mut problem.solver;
        transition::post(solver, constraints::element(host, states.clone(), one));

        let hosting_start = solver.new_bounded_integer(0, problem.horizon);
        transition::post(
            solver,
            constraints::element(host, hosting_starts.clone(), hosting_start),
        );
        transition::post(
            solver,
            constraints::binary_less_than_or_equals(hosting_start, arrival),
        );
    }

    let departures = problem
        .vm_transitions
        .values()
        .filter_map(|transition| {
            let slice = transition.c_slice.as_ref()?;
            Some((transition.source_host?, slice.end))
        })
        .collect::<Vec<_>>();
    for (node, departure) in departures {
        let Some(node_transition) = problem
            .node_index(node)
            .and_then(|index| problem.node_transitions.get(index as usize))
        else {
            continue;
        };
        if node_transition.kind != NodeTransitionKind::Shutdownable {
            continue;
        }

        // departure <= node.start unless the node stays online
        let terms = [
            departure.scaled(1),
            node_transition.start.scaled(-1),
            node_transition
                .state
                .get_integer_variable()
                .scaled(-problem.horizon),
        ];
        transition::post(
            &mut problem.solver,
            constraints::less_than_or_equals(terms, 0),
        );
    }
}

fn keep_sleeping_hosts_online(problem: &mut ReconfigurationProblem) {
    let hosts = problem
        .vm_transitions
        .values()
        .filter(|transition| transition.future == VmState::Sleeping)
        .filter_map(|transition| transition.source_host)
        .collect::<BTreeSet<Node>>();

    for node in hosts {
        let Some(transition) = problem.node_transition(node) else {
            continue;
        };
        let online = transition.state.get_true_predicate();
        if problem.solver.post(online).is_err() {
            debug!("{node} hosts sleeping VMs but cannot stay online");
        }
    }
}

/// One time-table per node and resource, over the slices which may be on the node.
///
/// The two slices of a running VM which may stay on its node are linked on that node, so that
/// an allocation changed in place only reserves the difference.
fn post_capacities(problem: &mut ReconfigurationProblem) {
    let resources = problem.source.resources().cloned().collect::<Vec<_>>();
    for resource in resources.iter() {
        let name = resource.name();
        for (index, &node) in problem.nodes.iter().enumerate() {
            let index = index as i32;
            let capacity = resource.capacity(node);

            let mut consuming = vec![];
            let mut demanding = vec![];
            let mut resizing = vec![];
            for transition in problem.vm_transitions.values() {
                let on_source = transition.source_host == Some(node);
                match (transition.c_slice.as_ref(), transition.d_slice.as_ref()) {
                    (Some(current), Some(future))
                        if on_source && transition.kind == VmTransitionKind::Relocatable =>
                    {
                        resizing.push(ResizingTask {
                            host: future.host,
                            start: future.start,
                            end: current.end,
                            current: current.height(name),
                            future: future.height(name),
                        });
                        continue;
                    }
                    _ => {}
                }

                if let Some(slice) = transition.c_slice.as_ref() {
                    let height = slice.height(name);
                    if on_source && height > 0 {
                        consuming.push(ConsumingTask {
                            end: slice.end,
                            height,
                        });
                    }
                }
                if let Some(slice) = transition.d_slice.as_ref() {
                    let height = slice.height(name);
                    if height > 0 && problem.solver.contains(&slice.host, index) {
                        demanding.push(DemandingTask {
                            host: slice.host,
                            start: slice.start,
                            height,
                        });
                    }
                }
            }

            if consuming.is_empty() && demanding.is_empty() && resizing.is_empty() {
                continue;
            }

            let constructor = TimeTableCapacityConstructor {
                node: index,
                capacity,
                horizon: problem.horizon,
                consuming,
                demanding,
                resizing,
            };
            if problem.solver.add_propagator(constructor).is_err() {
                debug!("{node} cannot fit its {name} consumptions");
            }
        }
    }
}

/// The host variables, for the tests of the modules which build on the problem.
#[cfg(test)]
pub(crate) fn host_of(
    problem: &ReconfigurationProblem,
    vm: Vm,
) -> replan_core::variables::DomainId {
    problem
        .future_host(vm)
        .expect("the VM runs at the end of the plan")
}
