//! Helpers shared by tests.

use std::fmt::Debug;

/// Asserts that an expression matches a pattern, with an optional guard.
///
/// Stands in for the unstable `std::assert_matches!`
/// (rust-lang/rust#82775).
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
