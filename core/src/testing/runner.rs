use std::{
    collections::HashMap,
    io::ErrorKind,
    path::{Path, PathBuf},
    process::{ExitStatus, Stdio},
    time::Duration,
};

use anyhow::{bail, Context};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    process::Command,
};

use super::result::*;
use crate::str_interp::{interp, InterpError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCommand {
    pub compile: Option<String>,
    pub run: String,
}

impl TestCommand {
    /// Expand `#{var}` in both commands.
    pub fn interpolate<V: AsRef<str>>(
        self,
        vars: &HashMap<&str, V>,
    ) -> std::result::Result<Self, InterpError> {
        Ok(Self {
            compile: self.compile.map(|fmt| interp(&fmt, vars)).transpose()?,
            run: interp(&self.run, vars)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct TestRunner {
    cmd: TestCommand,
    shell: PathBuf,
    execution_time_limit: Duration,
}

impl TestRunner {
    const DEFAULT_SHELL: &str = "/bin/sh";
    const DEFAULT_EXEC_TIME_LIMIT: Duration = Duration::from_millis(2000);

    pub fn new(cmd: TestCommand) -> Self {
        Self {
            cmd,
            shell: Self::DEFAULT_SHELL.into(),
            execution_time_limit: Self::DEFAULT_EXEC_TIME_LIMIT,
        }
    }

    pub fn shell(mut self, shell: impl Into<PathBuf>) -> Self {
        self.shell = shell.into();
        self
    }

    pub fn execution_time_limit(mut self, limit: Duration) -> Self {
        self.execution_time_limit = limit;
        self
    }

    pub fn get_shell(&self) -> &Path {
        &self.shell
    }

    pub fn get_command(&self) -> &TestCommand {
        &self.cmd
    }

    pub fn get_exec_time_limit(&self) -> Duration {
        self.execution_time_limit
    }

    fn shell_command(&self, cmd: &str) -> Command {
        let mut c = Command::new(&self.shell);
        c.args(["-c", cmd]);
        c
    }

    fn spawn_error_context(&self, cmd: &str) -> String {
        format!("Failed to spawn '{} -c {}'", self.shell.to_string_lossy(), cmd)
    }

    pub async fn compile(&self) -> anyhow::Result<CompileOutput> {
        let Some(cmd) = &self.cmd.compile else {
            bail!("Undefined compile command")
        };

        let output = self
            .shell_command(cmd)
            .stdin(Stdio::null())
            .output()
            .await
            .with_context(|| self.spawn_error_context(cmd))?;

        let mut diagnostics = String::from_utf8_lossy(&output.stdout).into_owned();
        diagnostics.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(CompileOutput {
            status: output.status.code(),
            diagnostics,
        })
    }

    /// Run the program with `input` on stdin.
    /// Exceeding the time limit is not an error: the process is killed and
    /// the returned output has `timed_out` set.
    pub async fn run(&self, input: &str) -> anyhow::Result<ExecOutput> {
        let cmd = &self.cmd.run;
        let mut proc = self
            .shell_command(cmd)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| self.spawn_error_context(cmd))?;
        let mut stdin = proc.stdin.take().context("Failed to open stdin")?;
        let mut stdout = proc.stdout.take().context("Failed to open stdout")?;
        let mut stderr = proc.stderr.take().context("Failed to open stderr")?;

        let mut stdout_buf = Vec::new();
        let mut stderr_buf = Vec::new();

        let start_at = tokio::time::Instant::now();

        let res = tokio::time::timeout(self.execution_time_limit, async {
            // stdin is closed when this future completes
            let fut_stdin = async move {
                match stdin.write_all(input.as_bytes()).await {
                    Err(e) if e.kind() == ErrorKind::BrokenPipe => Ok(()),
                    res => res,
                }
            };
            tokio::try_join!(
                fut_stdin,
                stdout.read_to_end(&mut stdout_buf),
                stderr.read_to_end(&mut stderr_buf),
                proc.wait(),
            )
            .context("Failed to communicate with subprocess")
        })
        .await;

        let elapsed = start_at.elapsed();

        let (status, signal, timed_out) = match res {
            Err(_) => {
                proc.kill()
                    .await
                    .unwrap_or_else(|e| log::warn!("Failed to kill TLE process: {:#}", e));
                (None, None, true)
            }
            Ok(Err(e)) => return Err(e),
            Ok(Ok((_, _, _, exit_status))) => {
                (exit_status.code(), exit_signal(&exit_status), false)
            }
        };

        Ok(ExecOutput {
            status,
            signal,
            stdout: String::from_utf8_lossy(&stdout_buf).into_owned(),
            stderr: String::from_utf8_lossy(&stderr_buf).into_owned(),
            elapsed,
            timed_out,
        })
    }
}

#[cfg(unix)]
fn exit_signal(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn exit_signal(_status: &ExitStatus) -> Option<i32> {
    None
}

#[cfg(test)]
mod test {
    use super::*;
    use maplit::hashmap;

    fn runner(run: &str) -> TestRunner {
        let cmd = TestCommand {
            compile: None,
            run: run.to_owned(),
        };
        TestRunner::new(cmd).execution_time_limit(Duration::from_millis(500))
    }

    #[tokio::test]
    async fn captures_stdout_and_stderr() {
        let out = runner(r#"read x; echo "hello_$x"; echo warn >&2"#)
            .run("123\n")
            .await
            .unwrap();
        assert_eq!(out.status, Some(0));
        assert_eq!(out.stdout, "hello_123\n");
        assert_eq!(out.stderr, "warn\n");
        assert!(!out.timed_out);
        assert!(out.success());
    }

    #[tokio::test]
    async fn stdin_need_not_be_read() {
        let out = runner("echo hello_123").run("123\n").await.unwrap();
        assert_eq!(out.stdout, "hello_123\n");
        assert_eq!(out.exit_code(), 0);
    }

    #[tokio::test]
    async fn large_input_does_not_deadlock() {
        let input = "0123456789\n".repeat(100_000);
        let out = runner("cat").run(&input).await.unwrap();
        assert_eq!(out.stdout.len(), input.len());
        assert!(out.success());
    }

    #[tokio::test]
    async fn non_zero_exit_is_reported() {
        let out = runner("echo 3; exit 42").run("").await.unwrap();
        assert_eq!(out.status, Some(42));
        assert_eq!(out.stdout, "3\n");
        assert_eq!(out.exit_code(), 42);
        assert!(!out.success());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn killed_by_signal() {
        let out = runner("kill -9 $$").run("").await.unwrap();
        assert_eq!(out.status, None);
        assert_eq!(out.signal, Some(9));
        assert_eq!(out.exit_code(), 137);
    }

    #[tokio::test]
    async fn time_limit_exceeded() {
        let r = runner("sleep 2").execution_time_limit(Duration::from_millis(200));
        let out = r.run("").await.unwrap();
        assert!(out.timed_out);
        assert_eq!(out.exit_code(), TIME_LIMIT_EXIT_CODE);
        assert!(out.elapsed < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn spawn_failure_is_error() {
        let r = runner("true").shell("/nonexistent/shell");
        assert!(r.run("").await.is_err());
    }

    #[tokio::test]
    async fn compile_collects_diagnostics() {
        let cmd = TestCommand {
            compile: Some("echo 'main.cpp:1: error' >&2; exit 1".to_owned()),
            run: "true".to_owned(),
        };
        let out = TestRunner::new(cmd).compile().await.unwrap();
        assert!(!out.success());
        assert_eq!(out.status, Some(1));
        assert_eq!(out.diagnostics, "main.cpp:1: error\n");

        assert!(runner("true").compile().await.is_err());
    }

    #[test]
    fn interpolate_both_commands() {
        let cmd = TestCommand {
            compile: Some("g++ #{flags} -o #{binPath} #{sourcePath}".to_owned()),
            run: "#{binPath}".to_owned(),
        };
        let vars = hashmap! {
            "flags" => "-O2",
            "binPath" => "build/main",
            "sourcePath" => "main.cpp",
        };
        let got = cmd.interpolate(&vars).unwrap();
        assert_eq!(got.compile.as_deref(), Some("g++ -O2 -o build/main main.cpp"));
        assert_eq!(got.run, "build/main");

        let bad = TestCommand {
            compile: None,
            run: "#{nope}".to_owned(),
        };
        assert!(bad.interpolate(&vars).is_err());
    }
}
