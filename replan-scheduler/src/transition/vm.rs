use std::collections::BTreeMap;

use replan_core::constraints;
use replan_core::variables::DomainId;
use replan_core::variables::Literal;
use replan_core::variables::TransformableVariable;

use super::Slice;
use super::TransitionContext;
use crate::error::SchedulerError;
use crate::model::Node;
use crate::model::ResourceView;
use crate::model::Vm;
use crate::model::VmState;
use crate::plan::ActionKind;
use crate::plan::Allocation;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VmTransitionKind {
    /// Init to ready.
    Forge,
    /// Ready to running.
    Boot,
    /// Running to running: stay on the host, migrate, or change an allocation in place.
    Relocatable,
    /// Running to ready.
    Shutdown,
    /// Running to sleeping.
    Suspend,
    /// Sleeping to running, on any host.
    Resume,
    /// Any state to killed.
    Kill,
    /// The state does not change and the VM does not need to be hosted.
    Stay,
}

/// The action model of a VM.
#[derive(Clone, Debug)]
pub struct VmTransition {
    pub(crate) vm: Vm,
    pub(crate) kind: VmTransitionKind,
    pub(crate) source: VmState,
    pub(crate) future: VmState,
    pub(crate) source_host: Option<Node>,
    pub(crate) start: DomainId,
    pub(crate) end: DomainId,
    pub(crate) duration: DomainId,
    pub(crate) c_slice: Option<Slice>,
    pub(crate) d_slice: Option<Slice>,
    /// For a relocatable VM, true when the VM leaves its host.
    pub(crate) moves: Option<Literal>,
    /// The allocations which differ from the current consumptions.
    pub(crate) allocations: Vec<Allocation>,
}

impl VmTransition {
    /// Creates the action model moving `vm` to `future`.
    ///
    /// A VM which is not `manageable` and keeps running stays on its host.
    pub(crate) fn new(
        context: &mut TransitionContext<'_>,
        vm: Vm,
        future: VmState,
        manageable: bool,
        allocations: &BTreeMap<String, i32>,
    ) -> Result<VmTransition, SchedulerError> {
        let source = context
            .model
            .vm_state(vm)
            .ok_or(SchedulerError::UnknownVm(vm))?;
        let source_host = context.model.mapping().vm_location(vm);

        let kind = match (source, future) {
            (from, to) if from == to && from != VmState::Running => VmTransitionKind::Stay,
            (VmState::Init, VmState::Ready) => VmTransitionKind::Forge,
            (VmState::Ready, VmState::Running) => VmTransitionKind::Boot,
            (VmState::Running, VmState::Running) => VmTransitionKind::Relocatable,
            (VmState::Running, VmState::Ready) => VmTransitionKind::Shutdown,
            (VmState::Running, VmState::Sleeping) => VmTransitionKind::Suspend,
            (VmState::Sleeping, VmState::Running) => VmTransitionKind::Resume,
            (_, VmState::Killed) => VmTransitionKind::Kill,
            (from, to) => {
                return Err(SchedulerError::IllegalTransition { vm, from, to });
            }
        };

        let mut transition = VmTransition {
            vm,
            kind,
            source,
            future,
            source_host,
            start: context.zero,
            end: context.zero,
            duration: context.zero,
            c_slice: None,
            d_slice: None,
            moves: None,
            allocations: vec![],
        };

        match kind {
            VmTransitionKind::Stay => {}
            VmTransitionKind::Forge => {
                transition.fixed_duration(context, ActionKind::ForgeVm)?;
            }
            VmTransitionKind::Boot => {
                transition.fixed_duration(context, ActionKind::BootVm)?;
                transition.demand(context, allocations);
            }
            VmTransitionKind::Shutdown => {
                transition.fixed_duration(context, ActionKind::ShutdownVm)?;
                transition.consume(context, true)?;
            }
            VmTransitionKind::Suspend => {
                transition.fixed_duration(context, ActionKind::SuspendVm)?;
                transition.consume(context, true)?;
            }
            VmTransitionKind::Resume => {
                transition.fixed_duration(context, ActionKind::ResumeVm)?;
                transition.consume(context, false)?;
                transition.demand(context, allocations);
            }
            VmTransitionKind::Kill => {
                transition.fixed_duration(context, ActionKind::KillVm)?;
                match source {
                    VmState::Running => transition.consume(context, true)?,
                    VmState::Sleeping => transition.consume(context, false)?,
                    _ => {}
                }
            }
            VmTransitionKind::Relocatable => {
                transition.relocatable(context, manageable, allocations)?;
            }
        }

        Ok(transition)
    }

    /// `end = start + d` where `d` is the duration of `action`.
    fn fixed_duration(
        &mut self,
        context: &mut TransitionContext<'_>,
        action: ActionKind,
    ) -> Result<(), SchedulerError> {
        let vm = self.vm;
        let duration = context.duration(action, vm)?;
        let horizon = context.horizon;

        self.start = context.interval(0, horizon, || format!("{vm}.start"));
        self.end = context.interval(0, horizon, || format!("{vm}.end"));
        self.duration = context.solver.new_constant(duration);
        context.post(constraints::equals(
            [self.end.scaled(1), self.start.scaled(-1)],
            duration,
        ));
        Ok(())
    }

    /// The consuming slice on the current host, released at the end of the action. A VM which
    /// does not `use_resources` keeps its host busy without reserving anything.
    fn consume(
        &mut self,
        context: &mut TransitionContext<'_>,
        use_resources: bool,
    ) -> Result<(), SchedulerError> {
        let host = self.source_host.ok_or(SchedulerError::UnknownVm(self.vm))?;
        let heights = if use_resources {
            current_heights(context, self.vm)
        } else {
            BTreeMap::new()
        };

        self.c_slice = Some(Slice {
            host: context.pinned_host(host)?,
            start: context.zero,
            end: self.end,
            heights,
        });
        Ok(())
    }

    /// The demanding slice on a new host, acquired at the start of the action.
    fn demand(&mut self, context: &mut TransitionContext<'_>, allocations: &BTreeMap<String, i32>) {
        let vm = self.vm;
        let host = context.free_host(|| format!("{vm}.host"));
        self.d_slice = Some(Slice {
            host,
            start: self.start,
            end: context.end_of_horizon,
            heights: future_heights(context, vm, allocations),
        });
    }

    /// Either stays on the current host, or migrates. The action lasts for the migration, or for
    /// the in-place change of allocation when there is one, and is empty otherwise.
    fn relocatable(
        &mut self,
        context: &mut TransitionContext<'_>,
        manageable: bool,
        allocations: &BTreeMap<String, i32>,
    ) -> Result<(), SchedulerError> {
        let vm = self.vm;
        let source_host = self.source_host.ok_or(SchedulerError::UnknownVm(vm))?;
        let source_index = context.node_index(source_host)?;
        let horizon = context.horizon;

        let current = current_heights(context, vm);
        self.allocations = allocations
            .iter()
            .filter(|&(resource, amount)| current.get(resource).copied().unwrap_or(0) != *amount)
            .map(|(resource, &amount)| Allocation {
                resource: resource.clone(),
                amount,
            })
            .collect();

        let migration = context.duration(ActionKind::MigrateVm, vm)?;
        let in_place = if self.allocations.is_empty() {
            0
        } else {
            context.duration(ActionKind::Allocate, vm)?
        };

        let host = if manageable {
            context.free_host(|| format!("{vm}.host"))
        } else {
            context.pinned_host(source_host)?
        };

        let moves = context.literal(|| format!("{vm}.moves"));
        let stays_or_moves = (0..context.nodes.len() as i32)
            .map(|index| {
                if index == source_index {
                    context.zero
                } else {
                    context.one
                }
            })
            .collect::<Vec<_>>();
        context.post(constraints::element(host, stays_or_moves, moves));

        self.start = context.interval(0, horizon, || format!("{vm}.start"));
        self.end = context.interval(0, horizon, || format!("{vm}.end"));
        self.duration = context.interval(
            in_place.min(migration),
            in_place.max(migration),
            || format!("{vm}.duration"),
        );
        // duration = in_place + (migration - in_place) * moves
        context.post(constraints::equals(
            [
                self.duration.scaled(1),
                moves.get_integer_variable().scaled(in_place - migration),
            ],
            in_place,
        ));
        context.post(constraints::plus(self.start, self.duration, self.end));
        if in_place == 0 {
            // A VM which stays has nothing to do.
            context.post_implied(constraints::less_than_or_equals([self.start], 0), !moves);
        }

        self.c_slice = Some(Slice {
            host: context.pinned_host(source_host)?,
            start: context.zero,
            end: self.end,
            heights: current,
        });
        self.d_slice = Some(Slice {
            host,
            start: self.start,
            end: context.end_of_horizon,
            heights: future_heights(context, vm, allocations),
        });
        self.moves = Some(moves);
        Ok(())
    }

    pub fn vm(&self) -> Vm {
        self.vm
    }

    pub fn kind(&self) -> VmTransitionKind {
        self.kind
    }

    pub fn source_state(&self) -> VmState {
        self.source
    }

    pub fn future_state(&self) -> VmState {
        self.future
    }

    /// The host in the source model, for running and sleeping VMs.
    pub fn source_host(&self) -> Option<Node> {
        self.source_host
    }

    pub fn start(&self) -> DomainId {
        self.start
    }

    pub fn end(&self) -> DomainId {
        self.end
    }

    pub fn duration(&self) -> DomainId {
        self.duration
    }

    pub fn c_slice(&self) -> Option<&Slice> {
        self.c_slice.as_ref()
    }

    pub fn d_slice(&self) -> Option<&Slice> {
        self.d_slice.as_ref()
    }

    /// The variable of the host the VM runs on at the end of the plan, if it runs.
    pub fn future_host(&self) -> Option<DomainId> {
        self.d_slice.as_ref().map(|slice| slice.host)
    }
}

fn current_heights(context: &TransitionContext<'_>, vm: Vm) -> BTreeMap<String, i32> {
    context
        .model
        .resources()
        .map(|resource| (resource.name().to_owned(), resource.consumption(vm)))
        .collect()
}

fn future_heights(
    context: &TransitionContext<'_>,
    vm: Vm,
    allocations: &BTreeMap<String, i32>,
) -> BTreeMap<String, i32> {
    let mut heights = current_heights(context, vm);
    for (resource, &amount) in allocations.iter() {
        if let Some(height) = heights.get_mut(resource) {
            *height = amount;
        }
    }
    heights
}
