//! Parser for the summary line printed by the external interpreter
//!
//! The interpreter reports its run with a line such as
//! `3 tests, 5 assertions, 0 failures, 0 errors`. The four counts always
//! appear in that order, each followed by its label; anything that is not a
//! digit may sit between them, and the line may appear anywhere in the output.

use crate::result::TestResult;
use regex::Regex;
use std::sync::OnceLock;

/// Prefix of the message attached to results built from unreadable output
pub const FAIL_SAFE_PREFIX: &str = "Could not find a test summary in the interpreter output:\n";

fn summary_regex() -> &'static Regex {
    static SUMMARY: OnceLock<Regex> = OnceLock::new();
    SUMMARY.get_or_init(|| {
        Regex::new(
            r"(?i)([0-9]+)[^0-9\n]*?tests?[^0-9\n]*?([0-9]+)[^0-9\n]*?assertions?[^0-9\n]*?([0-9]+)[^0-9\n]*?failures?[^0-9\n]*?([0-9]+)[^0-9\n]*?errors?",
        )
        .expect("summary pattern is valid")
    })
}

/// Parse interpreter output into a [`TestResult`]
///
/// Output without a recognizable summary never counts as a pass: it yields
/// one test with one error, and the message carries [`FAIL_SAFE_PREFIX`]
/// followed by the raw output.
///
/// # Examples
///
/// ```
/// use scriptbridge_rs::parser::parse;
///
/// let result = parse("3 tests, 5 assertions, 0 failures, 0 errors");
/// assert!(result.success());
/// assert_eq!(result.assertion_count(), 5);
///
/// let result = parse("garbage, no numbers here");
/// assert!(!result.success());
/// assert_eq!(result.error_count(), 1);
/// ```
pub fn parse(raw: &str) -> TestResult {
    match parse_summary(raw) {
        Some(result) => result,
        None => {
            tracing::debug!("no test summary found in interpreter output");
            TestResult::fail_safe(format!("{}{}", FAIL_SAFE_PREFIX, raw))
        }
    }
}

/// Parse the first summary line, or `None` if there is no usable one
fn parse_summary(raw: &str) -> Option<TestResult> {
    let caps = summary_regex().captures(raw)?;
    let count = |idx: usize| caps.get(idx)?.as_str().parse::<u32>().ok();

    TestResult::new(count(1)?, count(2)?, count(3)?, count(4)?, raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_passing_summary() {
        let result = parse("3 tests, 5 assertions, 0 failures, 0 errors");
        assert_eq!(result.test_count(), 3);
        assert_eq!(result.assertion_count(), 5);
        assert_eq!(result.failure_count(), 0);
        assert_eq!(result.error_count(), 0);
        assert!(result.success());
        assert_eq!(
            result.raw_message(),
            "3 tests, 5 assertions, 0 failures, 0 errors"
        );
    }

    #[test]
    fn test_parse_failing_summary() {
        let result = parse("1 tests, 2 assertions, 1 failures, 0 errors");
        assert_eq!(result.failure_count(), 1);
        assert!(!result.success());
    }

    #[test]
    fn test_parse_garbage_is_fail_safe() {
        let result = parse("garbage, no numbers here");
        assert_eq!(result.test_count(), 1);
        assert_eq!(result.assertion_count(), 0);
        assert_eq!(result.failure_count(), 0);
        assert_eq!(result.error_count(), 1);
        assert!(!result.success());
        assert!(result.raw_message().starts_with(FAIL_SAFE_PREFIX));
        assert!(result.raw_message().contains("garbage, no numbers here"));
    }

    #[test]
    fn test_parse_summary_inside_multiline_output() {
        let output = "Loading suite...\nok testAdd\nok testSub\n\n\
                      Finished: 2 Tests; 4 Assertions; 0 Failures; 1 Errors\nbye\n";
        let result = parse(output);
        assert_eq!(result.test_count(), 2);
        assert_eq!(result.assertion_count(), 4);
        assert_eq!(result.error_count(), 1);
        assert!(!result.success());
        assert_eq!(result.raw_message(), output);
    }

    #[test]
    fn test_parse_case_insensitive_and_singular() {
        let result = parse("1 TEST, 1 ASSERTION, 0 FAILURES, 0 ERRORS");
        assert!(result.success());
        assert_eq!(result.test_count(), 1);
    }

    #[test]
    fn test_parse_summary_split_across_lines_is_rejected() {
        let result = parse("3 tests, 5 assertions\n0 failures, 0 errors");
        assert!(!result.success());
        assert!(result.raw_message().starts_with(FAIL_SAFE_PREFIX));
    }

    #[test]
    fn test_parse_zero_tests_is_fail_safe() {
        let result = parse("0 tests, 0 assertions, 0 failures, 0 errors");
        assert_eq!(result.test_count(), 1);
        assert_eq!(result.error_count(), 1);
    }

    #[test]
    fn test_parse_overflowing_count_is_fail_safe() {
        let result = parse("99999999999 tests, 1 assertions, 0 failures, 0 errors");
        assert!(!result.success());
        assert!(result.raw_message().starts_with(FAIL_SAFE_PREFIX));
    }

    #[test]
    fn test_parse_empty_output() {
        let result = parse("");
        assert!(!result.success());
        assert_eq!(result.raw_message(), FAIL_SAFE_PREFIX);
    }
}
