//! Textual log of a build-and-run pipeline, in the marker format understood by
//! [`crate::verdict::parse_verdict`].

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::result::ExecOutput;
use crate::verdict::{self, Verdict};

/// Raw stdout/stderr/exit code of a pipeline, before interpretation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl RawOutput {
    pub fn verdict(&self) -> Verdict {
        self.verdict_at(Local::now())
    }

    pub fn verdict_at(&self, now: DateTime<Local>) -> Verdict {
        verdict::parse_verdict_at(&self.stdout, &self.stderr, self.exit_code, now)
    }
}

#[derive(Debug, Clone, Default)]
pub struct HarnessLog {
    stdout: String,
    stderr: String,
}

impl HarnessLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push_line(buf: &mut String, line: &str) {
        buf.push_str(line);
        if !line.ends_with('\n') {
            buf.push('\n');
        }
    }

    pub fn sample_result(&mut self, id: usize, passed: bool) {
        let status = if passed { "PASSED" } else { "FAILED" };
        Self::push_line(&mut self.stdout, &format!("Sample #{}: {}", id, status));
    }

    pub fn summary(&mut self, total: usize, passed: usize) {
        let line = format!(
            "Total: {} | Passed: {} | Failed: {}",
            total,
            passed,
            total.saturating_sub(passed)
        );
        Self::push_line(&mut self.stdout, &line);
    }

    pub fn comparison(&mut self, matched: bool) {
        let line = if matched {
            verdict::OUTPUT_MATCHES
        } else {
            verdict::OUTPUT_DOES_NOT_MATCH
        };
        Self::push_line(&mut self.stdout, line);
    }

    /// The program's own stdout, as shown for a single run.
    pub fn program_stdout(&mut self, exec: &ExecOutput) {
        if !exec.stdout.is_empty() {
            Self::push_line(&mut self.stdout, &exec.stdout);
        }
    }

    /// Program stderr, which also carries `RESOURCE_USAGE:` lines of the time wrapper.
    pub fn program_stderr(&mut self, exec: &ExecOutput) {
        if !exec.stderr.is_empty() {
            Self::push_line(&mut self.stderr, &exec.stderr);
        }
    }

    pub fn note(&mut self, line: &str) {
        Self::push_line(&mut self.stderr, line);
    }

    pub fn finish(self, exit_code: i32) -> RawOutput {
        RawOutput {
            stdout: self.stdout,
            stderr: self.stderr,
            exit_code,
        }
    }
}
