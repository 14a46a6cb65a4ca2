//! Assertions grouped by how expensive they are to check.
//!
//! [`SIMPLE`] assertions are always checked. The more expensive levels are checked only under
//! `cfg(test)` or with the `debug-checks` feature.

pub const SIMPLE: u8 = 1;
pub const MODERATE: u8 = 2;
pub const ADVANCED: u8 = 3;
pub const EXTREME: u8 = 4;

/// The most expensive level which is checked in this build.
#[cfg(not(any(test, feature = "debug-checks")))]
pub const ENABLED_LEVEL: u8 = SIMPLE;
#[cfg(any(test, feature = "debug-checks"))]
pub const ENABLED_LEVEL: u8 = MODERATE;

#[macro_export]
#[doc(hidden)]
macro_rules! replan_assert_at {
    ($level:ident, $assertion:ident, $($arg:tt)*) => {
        if $crate::asserts::ENABLED_LEVEL >= $crate::asserts::$level {
            $assertion!($($arg)*);
        }
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! replan_assert_simple {
    ($($arg:tt)*) => {
        $crate::replan_assert_at!(SIMPLE, assert, $($arg)*)
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! replan_assert_eq_simple {
    ($($arg:tt)*) => {
        $crate::replan_assert_at!(SIMPLE, assert_eq, $($arg)*)
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! replan_assert_moderate {
    ($($arg:tt)*) => {
        $crate::replan_assert_at!(MODERATE, assert, $($arg)*)
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! replan_assert_advanced {
    ($($arg:tt)*) => {
        $crate::replan_assert_at!(ADVANCED, assert, $($arg)*)
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! replan_assert_extreme {
    ($($arg:tt)*) => {
        $crate::replan_assert_at!(EXTREME, assert, $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn moderate_assertions_are_checked_in_tests() {
        assert_eq!(super::MODERATE, super::ENABLED_LEVEL);
    }

    #[test]
    #[should_panic(expected = "always checked")]
    fn simple_assertions_are_always_checked() {
        crate::replan_assert_simple!(1 > 2, "always checked");
    }

    #[test]
    fn extreme_assertions_are_skipped_in_tests() {
        crate::replan_assert_extreme!(1 > 2, "never checked");
    }
}
