//! Parsing of build/run/test harness output into a [`Verdict`].
//!
//! The parser is lenient: unknown or malformed text never makes it fail, it only
//! leaves the corresponding fields at their defaults.

use chrono::{DateTime, Local};
use lazy_regex::{lazy_regex, Lazy, Regex};
use serde::{Deserialize, Serialize};

/// Prefix of the `RESOURCE_USAGE: <seconds> <kilobytes>` marker.
pub const RESOURCE_USAGE_MARKER: &str = "RESOURCE_USAGE:";
/// Printed by a single run when the output equals the expected output.
pub const OUTPUT_MATCHES: &str = "Output matches expected.";
/// Printed by a single run when the output differs from the expected output.
pub const OUTPUT_DOES_NOT_MATCH: &str = "Output does not match expected.";

pub const TIMESTAMP_FORMAT: &str = "%H:%M:%S";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumIter,
)]
pub enum Outcome {
    Accepted,
    #[strum(serialize = "Wrong Answer")]
    WrongAnswer,
    #[strum(serialize = "Runtime Error")]
    RuntimeError,
    /// Never produced by the parser; callers use it when the program could not be run at all.
    #[strum(serialize = "Internal Error")]
    InternalError,
}

impl Outcome {
    pub const fn abbrev(&self) -> &'static str {
        use Outcome::*;
        match self {
            Accepted => "AC",
            WrongAnswer => "WA",
            RuntimeError => "RE",
            InternalError => "IE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SampleResult {
    pub id: u32,
    pub passed: bool,
}

/// Result of one build + run + compare cycle.
///
/// Serialized field names (`verdict`, `passedCount`, ...) are what the web UI reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    #[serde(rename = "verdict")]
    pub outcome: Outcome,
    pub passed_count: u32,
    pub total_count: u32,
    #[serde(rename = "runtime")]
    pub runtime_millis: Option<u64>,
    /// Megabytes with exactly one fractional digit, e.g. `"4.0"`.
    #[serde(rename = "memory")]
    pub memory_kilobytes_as_mb: Option<String>,
    pub timestamp: String,
    #[serde(rename = "samples")]
    pub sample_results: Vec<SampleResult>,
}

impl Verdict {
    fn initial(exit_code: i32, now: DateTime<Local>) -> Self {
        Self {
            outcome: if exit_code == 0 {
                Outcome::Accepted
            } else {
                Outcome::WrongAnswer
            },
            passed_count: 0,
            total_count: 0,
            runtime_millis: None,
            memory_kilobytes_as_mb: None,
            timestamp: now.format(TIMESTAMP_FORMAT).to_string(),
            sample_results: Vec::new(),
        }
    }

    /// Verdict for a cycle whose program could not be started.
    pub fn internal_error(now: DateTime<Local>) -> Self {
        Self {
            outcome: Outcome::InternalError,
            ..Self::initial(1, now)
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.outcome == Outcome::Accepted
    }
}

static RE_ANSI_ESCAPE: Lazy<Regex> = lazy_regex!(r"\x1b\[[0-9;]*[JKmsu]");
static RE_RESOURCE_USAGE_ANY: Lazy<Regex> = lazy_regex!(r"RESOURCE_USAGE:");
static RE_RESOURCE_USAGE: Lazy<Regex> =
    lazy_regex!(r"RESOURCE_USAGE:[ \t]+([0-9]+(?:\.[0-9]*)?|\.[0-9]+)[ \t]+([0-9]+)\b");
static RE_SUMMARY: Lazy<Regex> = lazy_regex!(
    r"Total:[ \t]*([0-9]+)[ \t]*\|[ \t]*Passed:[ \t]*([0-9]+)[ \t]*\|[ \t]*Failed:[ \t]*([0-9]+)"
);
static RE_SAMPLE_LINE: Lazy<Regex> = lazy_regex!(r"Sample #([0-9]+): (PASSED|FAILED)");

/// Remove terminal color/cursor escape sequences.
pub fn strip_ansi(s: &str) -> String {
    RE_ANSI_ESCAPE.replace_all(s, "").into_owned()
}

const NANOS_PER_SEC: u64 = 1_000_000_000;
const NANOS_PER_MILLI: u64 = 1_000_000;

/// Parse a non-negative decimal (`"1.25"`, `"0.5"`, `".5"`, `"3"`) into nanoseconds.
/// Digits beyond nanosecond precision are truncated; that never changes a rounding
/// decision at millisecond precision.
fn parse_seconds_as_nanos(s: &str) -> Option<u64> {
    let (int_part, frac_part) = s.split_once('.').unwrap_or((s, ""));
    let int_part: u64 = if int_part.is_empty() {
        0
    } else {
        int_part.parse().ok()?
    };

    let mut frac_nanos = 0;
    let mut scale = NANOS_PER_SEC / 10;
    for c in frac_part.chars().take(9) {
        frac_nanos += u64::from(c.to_digit(10)?) * scale;
        scale /= 10;
    }
    int_part.checked_mul(NANOS_PER_SEC)?.checked_add(frac_nanos)
}

/// Round half away from zero (all inputs are non-negative).
fn nanos_to_rounded_millis(nanos: u64) -> u64 {
    nanos.saturating_add(NANOS_PER_MILLI / 2) / NANOS_PER_MILLI
}

/// ```
/// use cfw_core::verdict::kilobytes_to_megabytes_string;
///
/// assert_eq!(kilobytes_to_megabytes_string(0), "0.0");
/// assert_eq!(kilobytes_to_megabytes_string(4096), "4.0");
/// assert_eq!(kilobytes_to_megabytes_string(1536), "1.5");
/// assert_eq!(kilobytes_to_megabytes_string(262144), "256.0");
/// ```
pub fn kilobytes_to_megabytes_string(kilobytes: u64) -> String {
    let tenths = (u128::from(kilobytes) * 10 + 512) / 1024;
    format!("{}.{}", tenths / 10, tenths % 10)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct ResourceUsage {
    max_nanos: u64,
    max_kilobytes: u64,
}

fn scan_resource_usage(buf: &str) -> Option<ResourceUsage> {
    let mut usage: Option<ResourceUsage> = None;
    let mut accepted = 0;

    for caps in RE_RESOURCE_USAGE.captures_iter(buf) {
        let (Some(nanos), Ok(kilobytes)) = (parse_seconds_as_nanos(&caps[1]), caps[2].parse::<u64>())
        else {
            continue;
        };
        accepted += 1;
        let u = usage.get_or_insert_with(ResourceUsage::default);
        u.max_nanos = u.max_nanos.max(nanos);
        u.max_kilobytes = u.max_kilobytes.max(kilobytes);
    }

    let total = RE_RESOURCE_USAGE_ANY.find_iter(buf).count();
    if total > accepted {
        log::debug!(
            "Ignored {} malformed '{}' marker(s)",
            total - accepted,
            RESOURCE_USAGE_MARKER
        );
    }
    usage
}

/// Returns `(total, passed)` from the first well-formed summary line.
fn scan_summary(buf: &str) -> Option<(u32, u32)> {
    RE_SUMMARY.captures_iter(buf).find_map(|caps| {
        let total = caps[1].parse::<u32>().ok()?;
        let passed = caps[2].parse::<u32>().ok()?;
        Some((total, passed))
    })
}

fn scan_sample_lines(buf: &str) -> Vec<SampleResult> {
    RE_SAMPLE_LINE
        .captures_iter(buf)
        .filter_map(|caps| {
            let id = caps[1].parse::<u32>().ok()?;
            Some(SampleResult {
                id,
                passed: &caps[2] == "PASSED",
            })
        })
        .collect()
}

/// Parse the output of a build/run/test pipeline, stamping the verdict with the current local time.
pub fn parse_verdict(stdout: &str, stderr: &str, exit_code: i32) -> Verdict {
    parse_verdict_at(stdout, stderr, exit_code, Local::now())
}

/// Same as [`parse_verdict`] with an explicit clock.
pub fn parse_verdict_at(stdout: &str, stderr: &str, exit_code: i32, now: DateTime<Local>) -> Verdict {
    let mut verdict = Verdict::initial(exit_code, now);

    let buf = strip_ansi(&format!("{}\n{}", stdout, stderr));

    if let Some(usage) = scan_resource_usage(&buf) {
        verdict.runtime_millis = Some(nanos_to_rounded_millis(usage.max_nanos));
        verdict.memory_kilobytes_as_mb = Some(kilobytes_to_megabytes_string(usage.max_kilobytes));
    }

    let summary = scan_summary(&buf);
    if let Some((total, passed)) = summary {
        verdict.total_count = total;
        verdict.passed_count = passed.min(total);
        if verdict.passed_count < verdict.total_count {
            verdict.outcome = Outcome::WrongAnswer;
        }
    }

    verdict.sample_results = scan_sample_lines(&buf);

    if verdict.total_count == 0 && verdict.sample_results.is_empty() {
        // A mismatch marker wins if a confused harness printed both.
        let matched = if buf.contains(OUTPUT_DOES_NOT_MATCH) {
            Some(false)
        } else if buf.contains(OUTPUT_MATCHES) {
            Some(true)
        } else {
            None
        };
        if let Some(passed) = matched {
            verdict.total_count = 1;
            verdict.passed_count = u32::from(passed);
            verdict.outcome = if passed {
                Outcome::Accepted
            } else {
                Outcome::WrongAnswer
            };
            verdict.sample_results.push(SampleResult { id: 1, passed });
        }
    }

    if !stderr.is_empty() && exit_code != 0 && summary.is_none() {
        verdict.outcome = Outcome::RuntimeError;
    }

    verdict
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn fixed_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 1, 9, 5, 7).unwrap()
    }

    fn parse(stdout: &str, stderr: &str, exit_code: i32) -> Verdict {
        parse_verdict_at(stdout, stderr, exit_code, fixed_now())
    }

    fn results(v: &[(u32, bool)]) -> Vec<SampleResult> {
        v.iter()
            .map(|&(id, passed)| SampleResult { id, passed })
            .collect()
    }

    #[test]
    fn no_markers_exit_zero_is_accepted() {
        let v = parse("hello\n", "", 0);
        assert_eq!(v.outcome, Outcome::Accepted);
        assert_eq!((v.passed_count, v.total_count), (0, 0));
        assert_eq!(v.runtime_millis, None);
        assert_eq!(v.memory_kilobytes_as_mb, None);
        assert!(v.sample_results.is_empty());
        assert_eq!(v.timestamp, "09:05:07");
    }

    #[test]
    fn no_markers_nonzero_exit_without_stderr_is_wrong_answer() {
        let v = parse("", "", 1);
        assert_eq!(v.outcome, Outcome::WrongAnswer);
    }

    #[test]
    fn resource_usage_takes_maximum_of_each_field() {
        let v = parse("RESOURCE_USAGE: 1.0 2048\n", "RESOURCE_USAGE: 0.2 4096\n", 0);
        assert_eq!(v.runtime_millis, Some(1000));
        assert_eq!(v.memory_kilobytes_as_mb.as_deref(), Some("4.0"));
    }

    #[test]
    fn resource_usage_zero_reading_is_present() {
        let v = parse("RESOURCE_USAGE: 0.00 0", "", 0);
        assert_eq!(v.runtime_millis, Some(0));
        assert_eq!(v.memory_kilobytes_as_mb.as_deref(), Some("0.0"));
    }

    #[test]
    fn runtime_rounds_half_away_from_zero() {
        assert_eq!(parse("RESOURCE_USAGE: 0.0015 1", "", 0).runtime_millis, Some(2));
        assert_eq!(parse("RESOURCE_USAGE: 0.0014999 1", "", 0).runtime_millis, Some(1));
        assert_eq!(parse("RESOURCE_USAGE: .0005 1", "", 0).runtime_millis, Some(1));
        assert_eq!(parse("RESOURCE_USAGE: 2 1", "", 0).runtime_millis, Some(2000));
        assert_eq!(parse("RESOURCE_USAGE: 0.12345678912 1", "", 0).runtime_millis, Some(123));
    }

    #[test]
    fn malformed_resource_usage_is_ignored() {
        let v = parse("RESOURCE_USAGE: abc 12\nRESOURCE_USAGE: 1.5\n", "", 0);
        assert_eq!(v.runtime_millis, None);
        assert_eq!(v.memory_kilobytes_as_mb, None);

        let v = parse("RESOURCE_USAGE: abc 12\nRESOURCE_USAGE: 0.25 1536\n", "", 0);
        assert_eq!(v.runtime_millis, Some(250));
        assert_eq!(v.memory_kilobytes_as_mb.as_deref(), Some("1.5"));
    }

    #[test]
    fn partial_summary_overrides_zero_exit() {
        let v = parse("Total: 3 | Passed: 2 | Failed: 1\n", "", 0);
        assert_eq!(v.outcome, Outcome::WrongAnswer);
        assert_eq!((v.passed_count, v.total_count), (2, 3));
    }

    #[test]
    fn summary_allows_arbitrary_spacing() {
        let v = parse("Total:4|Passed:   4 |  Failed: 0", "", 0);
        assert_eq!(v.outcome, Outcome::Accepted);
        assert_eq!((v.passed_count, v.total_count), (4, 4));
    }

    #[test]
    fn summary_suppresses_single_run_fallback() {
        let v = parse(
            "Output matches expected.\nTotal: 2 | Passed: 1 | Failed: 1\n",
            "",
            0,
        );
        assert_eq!((v.passed_count, v.total_count), (1, 2));
        assert!(v.sample_results.is_empty());
        assert_eq!(v.outcome, Outcome::WrongAnswer);
    }

    #[test]
    fn passed_is_clamped_to_total() {
        let v = parse("Total: 1 | Passed: 5 | Failed: 0", "", 0);
        assert_eq!((v.passed_count, v.total_count), (1, 1));
        assert_eq!(v.outcome, Outcome::Accepted);
    }

    #[test]
    fn batch_run_with_failure() {
        let v = parse(
            "Total: 2 | Passed: 1 | Failed: 1\nSample #1: PASSED\nSample #2: FAILED\n",
            "",
            1,
        );
        assert_eq!(v.outcome, Outcome::WrongAnswer);
        assert_eq!((v.passed_count, v.total_count), (1, 2));
        assert_eq!(v.sample_results, results(&[(1, true), (2, false)]));
    }

    #[test]
    fn sample_lines_keep_text_order_and_duplicates() {
        let v = parse(
            "Sample #3: FAILED\nSample #1: PASSED\nSample #3: PASSED\nsample #4: PASSED\nSample #5: passed\n",
            "",
            0,
        );
        assert_eq!(v.sample_results, results(&[(3, false), (1, true), (3, true)]));
        assert_eq!(v.total_count, 0);
    }

    #[test]
    fn sample_lines_suppress_single_run_fallback() {
        let v = parse("Sample #1: FAILED\nOutput matches expected.\n", "", 0);
        assert_eq!(v.sample_results, results(&[(1, false)]));
        assert_eq!(v.total_count, 0);
        assert_eq!(v.outcome, Outcome::Accepted);
    }

    #[test]
    fn single_run_match() {
        let v = parse("Output matches expected.\n", "", 0);
        assert_eq!(v.outcome, Outcome::Accepted);
        assert_eq!((v.passed_count, v.total_count), (1, 1));
        assert_eq!(v.sample_results, results(&[(1, true)]));
    }

    #[test]
    fn single_run_mismatch_overrides_zero_exit() {
        let v = parse("42\nOutput does not match expected.\n", "", 0);
        assert_eq!(v.outcome, Outcome::WrongAnswer);
        assert_eq!((v.passed_count, v.total_count), (0, 1));
        assert_eq!(v.sample_results, results(&[(1, false)]));
    }

    #[test]
    fn crash_is_runtime_error() {
        let v = parse("", "segmentation fault", 139);
        assert_eq!(v.outcome, Outcome::RuntimeError);
        assert_eq!(v.total_count, 0);
    }

    #[test]
    fn crash_after_single_run_marker_is_runtime_error() {
        let v = parse("Output does not match expected.\n", "terminate called", 134);
        assert_eq!(v.outcome, Outcome::RuntimeError);
        assert_eq!((v.passed_count, v.total_count), (0, 1));
    }

    #[test]
    fn summary_takes_precedence_over_stderr() {
        let v = parse(
            "Total: 2 | Passed: 2 | Failed: 0\n",
            "warning: unused variable\n",
            1,
        );
        assert_eq!(v.outcome, Outcome::WrongAnswer);
        assert_eq!((v.passed_count, v.total_count), (2, 2));
    }

    #[test]
    fn stderr_with_zero_exit_is_not_runtime_error() {
        let v = parse("", "debug: x = 3\n", 0);
        assert_eq!(v.outcome, Outcome::Accepted);
    }

    #[test]
    fn ansi_escapes_are_ignored() {
        let v = parse(
            "\x1b[1;32mTotal: 2 | Passed: 2 | Failed: 0\x1b[0m\n\x1b[32mSample #1: PASSED\x1b[0m\nSample #\x1b[1m2\x1b[m: PASSED\x1b[K\n",
            "\x1b[2JRESOURCE_USAGE: \x1b[33m0.5\x1b[0m 1024\n",
            0,
        );
        assert_eq!(v.outcome, Outcome::Accepted);
        assert_eq!(v.sample_results, results(&[(1, true), (2, true)]));
        assert_eq!(v.runtime_millis, Some(500));
        assert_eq!(v.memory_kilobytes_as_mb.as_deref(), Some("1.0"));
    }

    #[test]
    fn strip_ansi_only_removes_recognized_sequences() {
        assert_eq!(strip_ansi("\x1b[31mred\x1b[0m \x1b[s\x1b[u"), "red ");
        assert_eq!(strip_ansi("\x1b[31Xkeep"), "\x1b[31Xkeep");
    }

    #[test]
    fn internal_error_is_never_parsed() {
        use strum::IntoEnumIterator as _;
        let inputs = [
            ("", "", 0),
            ("", "boom", 2),
            ("Total: 1 | Passed: 0 | Failed: 1", "", 1),
            ("Output matches expected.", "", 0),
        ];
        for (stdout, stderr, code) in inputs {
            assert_ne!(parse(stdout, stderr, code).outcome, Outcome::InternalError);
        }
        assert_eq!(Outcome::iter().count(), 4);
        assert_eq!(
            Verdict::internal_error(fixed_now()).outcome,
            Outcome::InternalError
        );
    }

    #[test]
    fn wire_format() {
        let v = parse(
            "Total: 2 | Passed: 1 | Failed: 1\nSample #1: PASSED\nSample #2: FAILED\n",
            "RESOURCE_USAGE: 0.031 3584\n",
            1,
        );
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "verdict": "WrongAnswer",
                "passedCount": 1,
                "totalCount": 2,
                "runtime": 31,
                "memory": "3.5",
                "timestamp": "09:05:07",
                "samples": [
                    { "id": 1, "passed": true },
                    { "id": 2, "passed": false },
                ],
            })
        );

        let v = parse("", "", 0);
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["runtime"], serde_json::Value::Null);
        assert_eq!(json["memory"], serde_json::Value::Null);
    }

    #[test]
    fn outcome_display() {
        assert_eq!(Outcome::WrongAnswer.to_string(), "Wrong Answer");
        assert_eq!(Outcome::Accepted.abbrev(), "AC");
    }
}
