//! Helpers shared by tests, and tests for generated clients.

use std::fmt::Debug;

mod synthesize;

/// Asserts that an expression matches a pattern, with an optional guard.
macro_rules! assert_matches {
    ($left:expr, $($pattern:pat_param)|+ $(if $guard:expr)? $(,)?) => {
        match $left {
            $($pattern)|+ $(if $guard)? => {}
            ref left => $crate::tests::match_failed(
                left,
                stringify!($($pattern)|+ $(if $guard)?),
            ),
        }
    };
}

pub(crate) use assert_matches;

#[track_caller]
pub(crate) fn match_failed(left: impl Debug, pattern: &str) -> ! {
    panic!(
        "{}",
        indoc::formatdoc! {"
            assertion `left matches pattern` failed
                 left: {left:#?}
              pattern: {pattern}
        "}
    )
}
