use std::time::Duration;

use serde::{Deserialize, Serialize, Serializer};

use super::testcase::Testcase;

/// Exit code reported for a run killed by the time limit (same as coreutils `timeout`).
pub const TIME_LIMIT_EXIT_CODE: i32 = 124;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display, strum::EnumIter,
)]
pub enum JudgeCode {
    AC,
    WA,
    TLE,
    RE,
}

/// How program output is compared with the expected output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompareMode {
    Exact,
    /// Trailing whitespace of each line and trailing blank lines are ignored.
    #[default]
    Lenient,
}

impl CompareMode {
    pub fn matches(self, actual: &str, expected: &str) -> bool {
        match self {
            CompareMode::Exact => actual == expected,
            CompareMode::Lenient => lenient_lines(actual) == lenient_lines(expected),
        }
    }
}

fn lenient_lines(s: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = s.lines().map(str::trim_end).collect();
    while lines.last() == Some(&"") {
        lines.pop();
    }
    lines
}

/// Result of one run of the solution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecOutput {
    pub status: Option<i32>,
    pub signal: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    #[serde(rename = "elapsedMs", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
    pub timed_out: bool,
}

fn serialize_millis<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

impl ExecOutput {
    /// Shell-style exit code: 124 on timeout, `128 + signal` when killed by a signal.
    pub fn exit_code(&self) -> i32 {
        if self.timed_out {
            return TIME_LIMIT_EXIT_CODE;
        }
        match (self.status, self.signal) {
            (Some(code), _) => code,
            (None, Some(sig)) => 128 + sig,
            (None, None) => 1,
        }
    }

    pub fn success(&self) -> bool {
        !self.timed_out && self.status == Some(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOutput {
    pub status: Option<i32>,
    /// Compiler stdout followed by stderr.
    pub diagnostics: String,
}

impl CompileOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

pub fn judge(exec: &ExecOutput, expected: &str, compare: CompareMode) -> JudgeCode {
    if exec.timed_out {
        JudgeCode::TLE
    } else if !exec.success() {
        JudgeCode::RE
    } else if compare.matches(&exec.stdout, expected) {
        JudgeCode::AC
    } else {
        JudgeCode::WA
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TestOutcome {
    /// 1-based position in the batch.
    pub id: usize,
    pub judge: JudgeCode,
    pub testcase: Testcase,
    pub exec: ExecOutput,
}

impl TestOutcome {
    pub fn passed(&self) -> bool {
        self.judge == JudgeCode::AC
    }
}
