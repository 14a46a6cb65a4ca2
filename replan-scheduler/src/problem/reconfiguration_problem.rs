use std::collections::BTreeMap;
use std::collections::BTreeSet;

use replan_core::branching::branchers::DynamicBrancher;
use replan_core::branching::branchers::IndependentVariableValueBrancher;
use replan_core::branching::value_selection::InDomainMin;
use replan_core::branching::value_selection::PreferValue;
use replan_core::branching::value_selection::ValueSelector;
use replan_core::branching::variable_selection::InputOrder;
use replan_core::constraints::Constraint;
use replan_core::variables::DomainId;
use replan_core::Solver;

use super::Parameters;
use crate::model::Model;
use crate::model::Node;
use crate::model::NodeState;
use crate::model::Vm;
use crate::model::VmState;
use crate::transition::NodeTransition;
use crate::transition::VmTransition;
use crate::transition::VmTransitionKind;

/// The CP model of a reconfiguration: one action model per node and per VM over a shared
/// solver, a global `end` bounded by the horizon, and the capacity constraints of the nodes.
///
/// It is created by a [`super::ReconfigurationProblemBuilder`]; the constraints of an instance
/// are then injected through [`ReconfigurationProblem::post`] and friends.
#[derive(Debug)]
pub struct ReconfigurationProblem {
    pub(crate) solver: Solver,
    pub(crate) source: Model,
    pub(crate) parameters: Parameters,
    pub(crate) nodes: Vec<Node>,
    pub(crate) horizon: i32,
    pub(crate) start: DomainId,
    pub(crate) end: DomainId,
    pub(crate) node_transitions: Vec<NodeTransition>,
    pub(crate) vm_transitions: BTreeMap<Vm, VmTransition>,
    pub(crate) manageable: BTreeSet<Vm>,
    pub(crate) objective: Option<DomainId>,
    pub(crate) brancher: Option<DynamicBrancher>,
}

impl ReconfigurationProblem {
    pub fn solver(&self) -> &Solver {
        &self.solver
    }

    pub fn solver_mut(&mut self) -> &mut Solver {
        &mut self.solver
    }

    /// The model the plan starts from.
    pub fn source_model(&self) -> &Model {
        &self.source
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn horizon(&self) -> i32 {
        self.horizon
    }

    /// The beginning of the plan, fixed to 0.
    pub fn start(&self) -> DomainId {
        self.start
    }

    /// The end of the plan: every action ends before it.
    pub fn end(&self) -> DomainId {
        self.end
    }

    /// The nodes; the value denoting a node in host variables is its position.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node_index(&self, node: Node) -> Option<i32> {
        self.nodes
            .iter()
            .position(|&candidate| candidate == node)
            .map(|index| index as i32)
    }

    pub fn node_at(&self, index: i32) -> Option<Node> {
        usize::try_from(index)
            .ok()
            .and_then(|index| self.nodes.get(index))
            .copied()
    }

    pub fn node_transitions(&self) -> &[NodeTransition] {
        &self.node_transitions
    }

    pub fn node_transition(&self, node: Node) -> Option<&NodeTransition> {
        self.node_index(node)
            .and_then(|index| self.node_transitions.get(index as usize))
    }

    pub fn vm_transitions(&self) -> impl Iterator<Item = &VmTransition> + '_ {
        self.vm_transitions.values()
    }

    pub fn vm_transition(&self, vm: Vm) -> Option<&VmTransition> {
        self.vm_transitions.get(&vm)
    }

    /// The VMs which may be placed anywhere; the other running VMs stay on their host.
    pub fn manageable_vms(&self) -> &BTreeSet<Vm> {
        &self.manageable
    }

    /// The VMs which are running at the end of the plan, with the variable of their host.
    pub fn future_hosts(&self) -> impl Iterator<Item = (Vm, DomainId)> + '_ {
        self.vm_transitions
            .values()
            .filter_map(|transition| Some((transition.vm, transition.future_host()?)))
    }

    pub fn future_host(&self, vm: Vm) -> Option<DomainId> {
        self.vm_transitions.get(&vm)?.future_host()
    }

    /// Posts `constraint`; returns false when it makes the problem infeasible.
    pub fn post(&mut self, constraint: impl Constraint) -> bool {
        self.solver.add_constraint(constraint).post().is_ok()
    }

    pub fn is_infeasible(&self) -> bool {
        self.solver.is_infeasible()
    }

    /// Sets the variable to minimise and the search heuristic which goes with it.
    pub fn set_objective(&mut self, objective: DomainId, brancher: DynamicBrancher) {
        self.objective = Some(objective);
        self.brancher = Some(brancher);
    }

    pub fn objective(&self) -> Option<DomainId> {
        self.objective
    }

    /// Decides the hosts with `host_selector`, then the node states (preferring the current
    /// ones), then the starts and the ends of the actions, then the end of the plan.
    pub fn scheduling_brancher<HostSelector>(
        &self,
        hosts: Vec<DomainId>,
        host_selector: HostSelector,
    ) -> DynamicBrancher
    where
        HostSelector: ValueSelector<DomainId> + 'static,
    {
        let mut brancher = DynamicBrancher::new(vec![]);
        add_input_order(&mut brancher, hosts, host_selector);

        let states = self
            .node_transitions
            .iter()
            .map(|transition| {
                let online = self.source.mapping().node_state(transition.node)
                    == Some(NodeState::Online);
                (transition.state.get_domain_id(), i32::from(online))
            })
            .collect::<Vec<_>>();
        add_input_order(
            &mut brancher,
            states.iter().map(|&(state, _)| state).collect(),
            PreferValue::new(states, InDomainMin),
        );

        let actions = self
            .vm_transitions
            .values()
            .filter(|transition| transition.kind != VmTransitionKind::Stay)
            .map(|transition| (transition.start, transition.end))
            .chain(
                self.node_transitions
                    .iter()
                    .map(|transition| (transition.start, transition.end)),
            )
            .collect::<Vec<_>>();
        add_input_order(
            &mut brancher,
            actions.iter().map(|&(start, _)| start).collect(),
            InDomainMin,
        );
        add_input_order(
            &mut brancher,
            actions.iter().map(|&(_, end)| end).collect(),
            InDomainMin,
        );
        add_input_order(&mut brancher, vec![self.end], InDomainMin);

        brancher
    }

    /// The heuristic used without an objective: VMs stay on their host when they can, and go
    /// to the first possible node otherwise.
    pub fn default_brancher(&self) -> DynamicBrancher {
        let hosts = self.future_hosts().map(|(_, host)| host).collect();
        self.scheduling_brancher(hosts, PreferValue::new(self.current_hosts(), InDomainMin))
    }

    /// The host variables of the VMs which run at the end of the plan together with the index of
    /// their current host, for the VMs which are already running.
    pub(crate) fn current_hosts(&self) -> Vec<(DomainId, i32)> {
        self.vm_transitions
            .values()
            .filter(|transition| transition.source == VmState::Running)
            .filter_map(|transition| {
                let host = transition.future_host()?;
                let index = self.node_index(transition.source_host?)?;
                Some((host, index))
            })
            .collect()
    }

    pub(crate) fn take_brancher(&mut self) -> DynamicBrancher {
        match self.brancher.take() {
            Some(brancher) => brancher,
            None => self.default_brancher(),
        }
    }
}

fn add_input_order<Selector>(
    brancher: &mut DynamicBrancher,
    variables: Vec<DomainId>,
    value_selector: Selector,
) where
    Selector: ValueSelector<DomainId> + 'static,
{
    if variables.is_empty() {
        return;
    }

    brancher.add_brancher(Box::new(IndependentVariableValueBrancher::new(
        InputOrder::new(&variables),
        value_selector,
    )));
}
