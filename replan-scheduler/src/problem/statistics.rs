use std::fmt::Display;
use std::fmt::Formatter;
use std::time::Duration;

use replan_core::statistics::Statistic;
use replan_core::statistics::StatisticLogger;

/// A plan found during the search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SolutionStatistics {
    /// The number of search nodes opened before the plan was found.
    pub nodes: u64,
    pub backtracks: u64,
    /// The time elapsed since the search started.
    pub elapsed: Duration,
    /// The value of the objective, if there is one.
    pub objective: Option<i32>,
}

/// The report of a call to [`crate::ReconfigurationScheduler::solve`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SolvingStatistics {
    pub num_nodes: usize,
    pub num_vms: usize,
    /// The number of VMs which were allowed to change host.
    pub num_managed_vms: usize,
    pub num_constraints: usize,
    /// The time spent creating the action models.
    pub core_build_duration: Duration,
    /// The time spent injecting the constraints and the objective.
    pub specialisation_duration: Duration,
    pub solving_duration: Duration,
    pub num_search_nodes: u64,
    pub num_backtracks: u64,
    /// Whether the search explored the whole space, in which case the last plan is optimal or no
    /// plan exists.
    pub completed: bool,
    /// The successive plans, each better than the previous one.
    pub solutions: Vec<SolutionStatistics>,
}

impl SolvingStatistics {
    pub fn log(&self, statistic_logger: StatisticLogger) {
        self.num_nodes
            .log(statistic_logger.attach_to_prefix("numNodes"));
        self.num_vms.log(statistic_logger.attach_to_prefix("numVms"));
        self.num_managed_vms
            .log(statistic_logger.attach_to_prefix("numManagedVms"));
        self.num_constraints
            .log(statistic_logger.attach_to_prefix("numConstraints"));
        self.core_build_duration
            .as_millis()
            .log(statistic_logger.attach_to_prefix("coreBuildInMilliseconds"));
        self.specialisation_duration
            .as_millis()
            .log(statistic_logger.attach_to_prefix("specialisationInMilliseconds"));
        self.solving_duration
            .as_millis()
            .log(statistic_logger.attach_to_prefix("solvingInMilliseconds"));
        self.num_search_nodes
            .log(statistic_logger.attach_to_prefix("numSearchNodes"));
        self.num_backtracks
            .log(statistic_logger.attach_to_prefix("numBacktracks"));
        self.completed
            .log(statistic_logger.attach_to_prefix("completed"));
        self.solutions
            .len()
            .log(statistic_logger.attach_to_prefix("numSolutions"));
    }
}

impl Display for SolvingStatistics {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{} node(s), {} VM(s) ({} managed), {} constraint(s)",
            self.num_nodes, self.num_vms, self.num_managed_vms, self.num_constraints
        )?;
        writeln!(
            f,
            "build: {}ms, specialisation: {}ms, solving: {}ms",
            self.core_build_duration.as_millis(),
            self.specialisation_duration.as_millis(),
            self.solving_duration.as_millis()
        )?;
        write!(
            f,
            "{} search node(s), {} backtrack(s), {}",
            self.num_search_nodes,
            self.num_backtracks,
            if self.completed { "completed" } else { "incomplete" }
        )?;
        for solution in self.solutions.iter() {
            write!(
                f,
                "\n- at {}ms ({} nodes, {} backtracks)",
                solution.elapsed.as_millis(),
                solution.nodes,
                solution.backtracks
            )?;
            if let Some(objective) = solution.objective {
                write!(f, ": {objective}")?;
            }
        }
        Ok(())
    }
}
