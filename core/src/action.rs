pub mod error {
    #[allow(unused_imports)]
    pub(crate) use anyhow::{anyhow, bail, ensure, Context as _};
    pub use anyhow::{Error, Result};
}
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use error::*;
use serde::Serialize;

use crate::config::BuildProfile;
use crate::sample::{extract_samples, Sample};
use crate::storage::{ProblemDir, Repository};
use crate::str_interp::shell_quote;
use crate::testing::{
    judge, ExecOutput, HarnessLog, JudgeCode, RawOutput, TestCommand, TestOutcome, TestRunner,
    Testcase,
};
use crate::verdict::Verdict;

pub fn init_repository(dir: impl AsRef<Path>) -> Result<PathBuf> {
    Repository::init_with_example_config(dir).context("Failed to init cfw repository")
}

/// Create problem `name` from `template`, or from `workspace.default_template` if `None`.
pub fn new_problem(repo: &Repository, name: &str, template: Option<&str>) -> Result<ProblemDir> {
    let template = template.unwrap_or(&repo.workspace.default_template);
    let source = repo.templates().load(template)?;
    let problem = repo
        .problems()
        .create(name, &source)
        .with_context(|| format!("Failed to create problem '{}'", name))?;
    log::info!("Created {:?} from template '{}'", problem.dir(), template);
    Ok(problem)
}

/// Save the statement of `name` and replace its sample testcases by the samples found in it.
/// When no sample is found the existing testcases are left untouched.
pub fn import_statement(repo: &Repository, name: &str, statement: &str) -> Result<Vec<Sample>> {
    let problem = repo.problems().open(name)?;
    problem.save_statement(statement)?;

    let samples = extract_samples(statement);
    if samples.is_empty() {
        log::warn!(
            "No samples found in the statement of '{}'; existing testcases are kept",
            name
        );
        return Ok(samples);
    }
    problem
        .save_samples(&samples)
        .with_context(|| format!("Failed to save samples of '{}'", name))?;
    log::info!("Saved {} samples of '{}'", samples.len(), name);
    Ok(samples)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildReport {
    pub success: bool,
    pub diagnostics: String,
    pub binary: PathBuf,
}

impl BuildReport {
    /// What the verdict parser sees when the build failed.
    fn failure_output(&self) -> RawOutput {
        let stderr = if self.diagnostics.trim().is_empty() {
            "Compile error\n".to_owned()
        } else {
            self.diagnostics.clone()
        };
        RawOutput {
            stdout: String::new(),
            stderr,
            exit_code: 1,
        }
    }
}

fn make_runner(
    repo: &Repository,
    problem: &ProblemDir,
    profile: BuildProfile,
) -> Result<TestRunner> {
    let source = problem.solution_file();
    let binary = problem.binary_file(profile);

    let mut vars: HashMap<&str, String> = HashMap::new();
    vars.insert("sourcePath", shell_quote(&source.to_string_lossy()));
    vars.insert("binPath", shell_quote(&binary.to_string_lossy()));
    vars.insert("problemDir", shell_quote(&problem.dir().to_string_lossy()));
    vars.insert("flags", repo.build.flags(profile).to_owned());

    let run = match &repo.test.time_wrapper {
        Some(wrapper) => format!("{} {}", wrapper, repo.build.run),
        None => repo.build.run.clone(),
    };
    let cmd = TestCommand {
        compile: Some(repo.build.compile.clone()),
        run,
    }
    .interpolate(&vars)
    .context("Invalid build/run command in config")?;

    Ok(TestRunner::new(cmd)
        .shell(&repo.test.shell)
        .execution_time_limit(Duration::from_millis(repo.test.time_limit_ms)))
}

async fn compile(
    problem: &ProblemDir,
    runner: &TestRunner,
    profile: BuildProfile,
) -> Result<BuildReport> {
    let binary = problem.binary_file(profile);
    if let Some(dir) = binary.parent() {
        fsutil::mkdir_all(dir)?;
    }
    if let Some(cmd) = &runner.get_command().compile {
        log::info!("Compiling {} ({})", problem.name(), profile);
        log::info!("{}", cmd);
    }
    let out = runner.compile().await?;
    Ok(BuildReport {
        success: out.success(),
        diagnostics: out.diagnostics,
        binary,
    })
}

/// Compile the solution of `name` with the flags of `profile`.
pub async fn build(repo: &Repository, name: &str, profile: BuildProfile) -> Result<BuildReport> {
    let problem = repo.problems().open(name)?;
    let runner = make_runner(repo, &problem, profile)?;
    compile(&problem, &runner, profile).await
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunInput {
    /// The saved testcase `sample<N>`.
    Sample(usize),
    Custom(String),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub build: BuildReport,
    /// `None` when the build failed.
    pub exec: Option<ExecOutput>,
    pub expected: Option<String>,
    pub raw: RawOutput,
    pub verdict: Verdict,
}

/// Build, then run the solution once on a sample or on custom input.
pub async fn run_single(
    repo: &Repository,
    name: &str,
    profile: BuildProfile,
    input: RunInput,
) -> Result<RunReport> {
    let problem = repo.problems().open(name)?;
    let (input, expected) = match input {
        RunInput::Sample(index) => {
            let t = problem.load_sample(index)?;
            (t.input, Some(t.expected))
        }
        RunInput::Custom(text) => (text, None),
    };

    let runner = make_runner(repo, &problem, profile)?;
    let build = compile(&problem, &runner, profile).await?;
    if !build.success {
        let raw = build.failure_output();
        let verdict = raw.verdict();
        return Ok(RunReport {
            build,
            exec: None,
            expected,
            raw,
            verdict,
        });
    }

    log::info!("Running: {}", runner.get_command().run);
    let exec = runner.run(&input).await?;

    let mut log = HarnessLog::new();
    log.program_stdout(&exec);
    log.program_stderr(&exec);
    if exec.timed_out {
        log.note(&format!(
            "Time limit exceeded ({} ms)",
            runner.get_exec_time_limit().as_millis()
        ));
    }
    if let Some(expected) = &expected {
        log.comparison(!exec.timed_out && repo.test.compare.matches(&exec.stdout, expected));
    }
    let raw = log.finish(exec.exit_code());
    let verdict = raw.verdict();

    Ok(RunReport {
        build,
        exec: Some(exec),
        expected,
        raw,
        verdict,
    })
}

/// Progress callbacks of [`test_all`].
pub trait TestReporter {
    fn on_build_finished(&mut self, _build: &BuildReport) {}
    fn on_start(&mut self, _testcases: &[Testcase]) {}
    fn on_testcase_finished(&mut self, _outcome: &TestOutcome) {}
    fn on_finished(&mut self, _outcomes: &[TestOutcome]) {}
}

pub struct NoopReporter;

impl TestReporter for NoopReporter {}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub build: BuildReport,
    pub outcomes: Vec<TestOutcome>,
    pub raw: RawOutput,
    pub verdict: Verdict,
}

fn judge_note(outcome: &TestOutcome, time_limit: Duration) -> Option<String> {
    let what = match outcome.judge {
        JudgeCode::AC => return None,
        JudgeCode::WA => "Wrong answer".to_owned(),
        JudgeCode::TLE => format!("Time limit exceeded ({} ms)", time_limit.as_millis()),
        JudgeCode::RE => format!("Exited with code {}", outcome.exec.exit_code()),
    };
    Some(format!("[{}] {}", outcome.testcase.name, what))
}

/// Build, then run every saved testcase of `name`.
pub async fn test_all<R: TestReporter>(
    repo: &Repository,
    name: &str,
    profile: BuildProfile,
    reporter: &mut R,
) -> Result<BatchReport> {
    let problem = repo.problems().open(name)?;
    let testcases = problem.load_testcases()?;
    ensure!(
        !testcases.is_empty(),
        "No testcases are saved in {:?}",
        problem.testcase_dir()
    );

    let runner = make_runner(repo, &problem, profile)?;
    let build = compile(&problem, &runner, profile).await?;
    reporter.on_build_finished(&build);
    if !build.success {
        let raw = build.failure_output();
        let verdict = raw.verdict();
        return Ok(BatchReport {
            build,
            outcomes: Vec::new(),
            raw,
            verdict,
        });
    }

    log::info!("Running: {}", runner.get_command().run);
    reporter.on_start(&testcases);

    let mut log = HarnessLog::new();
    let mut outcomes = Vec::with_capacity(testcases.len());
    for (i, t) in testcases.into_iter().enumerate() {
        let exec = runner.run(&t.input).await?;
        let outcome = TestOutcome {
            id: i + 1,
            judge: judge(&exec, &t.expected, repo.test.compare),
            testcase: t,
            exec,
        };

        log.program_stderr(&outcome.exec);
        log.sample_result(outcome.id, outcome.passed());
        if let Some(note) = judge_note(&outcome, runner.get_exec_time_limit()) {
            log.note(&note);
        }
        reporter.on_testcase_finished(&outcome);
        outcomes.push(outcome);
    }
    reporter.on_finished(&outcomes);

    let passed = outcomes.iter().filter(|o| o.passed()).count();
    log.summary(outcomes.len(), passed);
    let raw = log.finish(if passed == outcomes.len() { 0 } else { 1 });
    let verdict = raw.verdict();

    Ok(BatchReport {
        build,
        outcomes,
        raw,
        verdict,
    })
}
