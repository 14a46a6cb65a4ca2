use replan_core::basic_types::Inconsistency;
use replan_core::basic_types::PropagationStatus;
use replan_core::propagation::DomainEvents;
use replan_core::propagation::Priority;
use replan_core::propagation::PropagationContext;
use replan_core::propagation::Propagator;
use replan_core::propagation::PropagatorConstructor;
use replan_core::propagation::PropagatorConstructorContext;
use replan_core::propagation::ReadDomains;
use replan_core::variables::DomainId;

/// A reservation on the node which is active from time 0 until `end`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ConsumingTask {
    pub(crate) end: DomainId,
    pub(crate) height: i32,
}

/// A reservation which is active from `start` until the horizon, on the node selected by `host`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct DemandingTask {
    pub(crate) host: DomainId,
    pub(crate) start: DomainId,
    pub(crate) height: i32,
}

/// A running VM which may stay on the node it runs on, and change its allocation there.
///
/// While the VM is not known to stay, only `current` until `end` is reserved. Once it stays,
/// `min(current, future)` is reserved until the horizon, the surplus of `current` until `end`,
/// and the surplus of `future` from `start`. The node never holds both amounts at once.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ResizingTask {
    pub(crate) host: DomainId,
    pub(crate) start: DomainId,
    pub(crate) end: DomainId,
    pub(crate) current: i32,
    pub(crate) future: i32,
}

/// Constructor for [`TimeTableCapacityPropagator`].
#[derive(Clone, Debug)]
pub(crate) struct TimeTableCapacityConstructor {
    /// The value of the host variables which denotes the node.
    pub(crate) node: i32,
    pub(crate) capacity: i32,
    pub(crate) horizon: i32,
    pub(crate) consuming: Vec<ConsumingTask>,
    pub(crate) demanding: Vec<DemandingTask>,
    pub(crate) resizing: Vec<ResizingTask>,
}

impl PropagatorConstructor for TimeTableCapacityConstructor {
    type PropagatorImpl = TimeTableCapacityPropagator;

    fn create(self, context: &mut PropagatorConstructorContext<'_>) -> Self::PropagatorImpl {
        for task in self.consuming.iter() {
            context.register(&task.end, DomainEvents::BOUNDS);
        }
        for task in self.demanding.iter() {
            context.register(&task.host, DomainEvents::ANY_INT);
            context.register(&task.start, DomainEvents::BOUNDS);
        }
        for task in self.resizing.iter() {
            context.register(&task.host, DomainEvents::ANY_INT);
            context.register(&task.start, DomainEvents::BOUNDS);
            context.register(&task.end, DomainEvents::BOUNDS);
        }

        TimeTableCapacityPropagator {
            node: self.node,
            capacity: i64::from(self.capacity),
            horizon: self.horizon,
            consuming: self
                .consuming
                .into_iter()
                .filter(|task| task.height > 0)
                .collect(),
            demanding: self
                .demanding
                .into_iter()
                .filter(|task| task.height > 0)
                .collect(),
            resizing: self.resizing,
        }
    }
}

/// A maximal interval of the profile over which the height is constant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Segment {
    start: i32,
    end: i32,
    height: i64,
}

/// Time-table propagator for the capacity of one resource of one node: at every instant, the
/// reservations active on the node fit in its capacity.
///
/// The profile is made of the compulsory parts of the reservations; a consuming task is surely
/// active on `[0, lb(end))` and a demanding task hosted by the node on `[ub(start), horizon)`.
/// Consuming tasks are made to end before the first instant at which they would overload the
/// profile, demanding tasks to start after the last one, and nodes are removed from the hosts of
/// demanding tasks which cannot fit until the horizon.
#[derive(Clone, Debug)]
pub(crate) struct TimeTableCapacityPropagator {
    node: i32,
    capacity: i64,
    horizon: i32,
    consuming: Vec<ConsumingTask>,
    demanding: Vec<DemandingTask>,
    resizing: Vec<ResizingTask>,
}

fn reserve(events: &mut Vec<(i32, i64)>, from: i32, to: i32, height: i32) {
    if from < to && height > 0 {
        events.push((from, i64::from(height)));
        events.push((to, -i64::from(height)));
    }
}

impl TimeTableCapacityPropagator {
    fn is_hosted(&self, context: &impl ReadDomains, host: &DomainId) -> bool {
        context.is_fixed(host) && context.lower_bound(host) == self.node
    }

    fn profile(&self, context: &impl ReadDomains) -> Vec<Segment> {
        let mut events = vec![];
        for task in self.consuming.iter() {
            reserve(&mut events, 0, context.lower_bound(&task.end), task.height);
        }
        for task in self.demanding.iter() {
            if self.is_hosted(context, &task.host) {
                let start = context.upper_bound(&task.start);
                reserve(&mut events, start, self.horizon, task.height);
            }
        }
        for task in self.resizing.iter() {
            let end = context.lower_bound(&task.end);
            if self.is_hosted(context, &task.host) {
                let start = context.upper_bound(&task.start);
                let kept = task.current.min(task.future);
                reserve(&mut events, 0, self.horizon, kept);
                reserve(&mut events, 0, end, task.current - kept);
                reserve(&mut events, start, self.horizon, task.future - kept);
            } else {
                reserve(&mut events, 0, end, task.current);
            }
        }
        events.sort_by_key(|&(time, _)| time);

        let mut segments = vec![];
        let mut height = 0;
        let mut index = 0;
        while index < events.len() {
            let time = events[index].0;
            while index < events.len() && events[index].0 == time {
                height += events[index].1;
                index += 1;
            }
            if index < events.len() && height > 0 {
                segments.push(Segment {
                    start: time,
                    end: events[index].0,
                    height,
                });
            }
        }
        segments
    }

    /// The instant before which a reservation of `height` on `[0, end)` must be released, when
    /// it is part of the profile until `compulsory_end`.
    fn latest_end(&self, profile: &[Segment], compulsory_end: i32, height: i32) -> Option<i32> {
        let height = i64::from(height);
        profile
            .iter()
            .find(|segment| {
                let own = if segment.end <= compulsory_end { height } else { 0 };
                segment.height - own + height > self.capacity
            })
            .map(|segment| segment.start)
    }

    /// The instant after which a reservation of `height` on `[start, horizon)` can be acquired,
    /// when it is part of the profile from `compulsory_start`.
    fn earliest_start(
        &self,
        profile: &[Segment],
        compulsory_start: i32,
        height: i32,
    ) -> Option<i32> {
        let height = i64::from(height);
        profile
            .iter()
            .rev()
            .find(|segment| {
                let own = if segment.start >= compulsory_start { height } else { 0 };
                segment.height - own + height > self.capacity
            })
            .map(|segment| segment.end)
    }
}

impl Propagator for TimeTableCapacityPropagator {
    fn name(&self) -> &str {
        "TimeTableCapacity"
    }

    fn priority(&self) -> Priority {
        Priority::Low
    }

    fn propagate(&mut self, mut context: PropagationContext<'_>) -> PropagationStatus {
        let profile = self.profile(&context);
        if profile.iter().any(|segment| segment.height > self.capacity) {
            return Err(Inconsistency::Propagator);
        }

        for task in self.consuming.iter() {
            let compulsory_end = context.lower_bound(&task.end);
            if let Some(end) = self.latest_end(&profile, compulsory_end, task.height) {
                context.set_upper_bound(&task.end, end)?;
            }
        }

        for task in self.demanding.iter() {
            let compulsory_start = context.upper_bound(&task.start);

            if self.is_hosted(&context, &task.host) {
                if let Some(start) = self.earliest_start(&profile, compulsory_start, task.height) {
                    context.set_lower_bound(&task.start, start)?;
                }
            } else if context.contains(&task.host, self.node) {
                let never_fits = profile.iter().any(|segment| {
                    segment.end > compulsory_start
                        && segment.height + i64::from(task.height) > self.capacity
                });
                if never_fits {
                    context.remove(&task.host, self.node)?;
                }
            }
        }

        for task in self.resizing.iter() {
            let compulsory_end = context.lower_bound(&task.end);
            let compulsory_start = context.upper_bound(&task.start);
            let (released, acquired) = if self.is_hosted(&context, &task.host) {
                let kept = task.current.min(task.future);
                (task.current - kept, task.future - kept)
            } else {
                (task.current, 0)
            };

            if released > 0 {
                if let Some(end) = self.latest_end(&profile, compulsory_end, released) {
                    context.set_upper_bound(&task.end, end)?;
                }
            }
            if acquired > 0 {
                if let Some(start) = self.earliest_start(&profile, compulsory_start, acquired) {
                    context.set_lower_bound(&task.start, start)?;
                }
            }
        }

        Ok(())
    }
}
