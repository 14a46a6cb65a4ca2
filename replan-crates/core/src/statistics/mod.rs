//! Statistics of the search, of propagators, and of the scheduler built on top, written as
//! `name=value` lines.
mod statistic_logging;

use std::fmt::Display;

use itertools::Itertools;

pub use statistic_logging::configure_statistic_logging;
pub use statistic_logging::log_statistic;
pub use statistic_logging::log_statistic_postfix;

/// Something which can write itself out as one or more statistic lines.
pub trait Statistic {
    fn log(&self, statistic_logger: StatisticLogger);
}

impl<Value: Display> Statistic for Value {
    fn log(&self, statistic_logger: StatisticLogger) {
        statistic_logger.log_statistic(self);
    }
}

/// Names statistics by a prefix of `_`-separated parts, e.g. `engine_numConflicts`.
#[derive(Clone, Debug, Default)]
pub struct StatisticLogger {
    prefix: String,
}

impl StatisticLogger {
    pub fn new(parts: impl IntoIterator<Item = impl Display>) -> Self {
        StatisticLogger {
            prefix: parts.into_iter().join("_"),
        }
    }

    /// A logger for a nested statistic, whose name extends this prefix.
    pub fn attach_to_prefix(&self, part: impl Display) -> Self {
        StatisticLogger {
            prefix: format!("{}_{part}", self.prefix),
        }
    }

    pub fn log_statistic(&self, value: impl Display) {
        log_statistic(&self.prefix, value);
    }
}

/// Declares a struct of counters which implements [`Statistic`] by logging every field under
/// its own name.
///
/// ```rust
/// # use replan_core::statistics_counters;
/// statistics_counters!(Counters {
///     calls: usize,
/// });
///
/// assert_eq!(Counters::default().calls, 0);
/// ```
#[macro_export]
macro_rules! statistics_counters {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$field_meta:meta])* $field:ident : $type:ty),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default)]
        pub(crate) struct $name {
            $($(#[$field_meta])* pub(crate) $field: $type,)+
        }

        impl $crate::statistics::Statistic for $name {
            fn log(&self, statistic_logger: $crate::statistics::StatisticLogger) {
                $(
                    $crate::statistics::Statistic::log(
                        &self.$field,
                        statistic_logger.attach_to_prefix(stringify!($field)),
                    );
                )+
            }
        }
    };
}
