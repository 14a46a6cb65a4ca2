use std::time::Duration;

use crate::duration::DurationEvaluators;
use crate::error::SchedulerError;

/// The knobs of a [`crate::ReconfigurationScheduler`].
///
/// ```rust
/// # use std::time::Duration;
/// # use replan_scheduler::Parameters;
/// let parameters = Parameters::default()
///     .with_time_limit(Duration::from_secs(10))
///     .with_repair(true);
///
/// assert!(parameters.do_repair);
/// assert!(parameters.do_optimize);
/// assert_eq!(3600, parameters.max_plan_end);
/// ```
#[derive(Clone, Debug)]
pub struct Parameters {
    /// The wall-clock budget of the search.
    pub time_limit: Option<Duration>,
    /// Look for the best plan rather than for the first one.
    pub do_optimize: bool,
    /// Only let the misplaced VMs move.
    pub do_repair: bool,
    /// The horizon: no action ends after it.
    pub max_plan_end: i32,
    /// Above 0, the variables are named and the search is logged in more detail.
    pub verbosity: u8,
    /// The maximum number of search nodes.
    pub node_limit: Option<u64>,
    /// The maximum number of backtracks.
    pub backtrack_limit: Option<u64>,
    pub random_seed: u64,
    pub durations: DurationEvaluators,
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters {
            time_limit: None,
            do_optimize: true,
            do_repair: false,
            max_plan_end: 3600,
            verbosity: 0,
            node_limit: None,
            backtrack_limit: None,
            random_seed: 42,
            durations: DurationEvaluators::default(),
        }
    }
}

impl Parameters {
    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = Some(time_limit);
        self
    }

    pub fn with_optimize(mut self, do_optimize: bool) -> Self {
        self.do_optimize = do_optimize;
        self
    }

    pub fn with_repair(mut self, do_repair: bool) -> Self {
        self.do_repair = do_repair;
        self
    }

    pub fn with_max_plan_end(mut self, max_plan_end: i32) -> Self {
        self.max_plan_end = max_plan_end;
        self
    }

    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn with_node_limit(mut self, node_limit: u64) -> Self {
        self.node_limit = Some(node_limit);
        self
    }

    pub fn with_backtrack_limit(mut self, backtrack_limit: u64) -> Self {
        self.backtrack_limit = Some(backtrack_limit);
        self
    }

    pub fn with_random_seed(mut self, random_seed: u64) -> Self {
        self.random_seed = random_seed;
        self
    }

    pub fn with_durations(mut self, durations: DurationEvaluators) -> Self {
        self.durations = durations;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), SchedulerError> {
        if self.max_plan_end < 0 {
            return Err(SchedulerError::InvalidParameters(format!(
                "the horizon must not be negative, got {}",
                self.max_plan_end
            )));
        }

        if self.time_limit.is_some_and(|limit| limit.is_zero()) {
            return Err(SchedulerError::InvalidParameters(
                "the time limit must be positive".to_owned(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_negative_horizon_is_rejected() {
        let parameters = Parameters::default().with_max_plan_end(-1);

        assert!(matches!(
            parameters.validate(),
            Err(SchedulerError::InvalidParameters(_))
        ));
    }
}
