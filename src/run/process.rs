//! Invocation of the external interpreter

use crate::config::Config;
use crate::descriptor::Variant;
use crate::error::{Error, Result};
use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

/// How often a process with a timeout is polled for exit
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Captured result of one interpreter run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Standard output, decoded lossily as UTF-8
    pub stdout: String,
    /// Exit code, or `None` when the process was ended by a signal
    pub exit_code: Option<i32>,
}

/// Builds and runs interpreter invocations
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    interpreter: String,
    suppress_display_flag: String,
    timeout: Option<Duration>,
}

impl ProcessRunner {
    pub fn new(interpreter: impl Into<String>) -> Self {
        ProcessRunner {
            interpreter: interpreter.into(),
            suppress_display_flag: crate::config::DEFAULT_SUPPRESS_DISPLAY_FLAG.to_string(),
            timeout: None,
        }
    }

    /// Take the interpreter, flag and timeout from a configuration
    pub fn from_config(config: &Config) -> Self {
        ProcessRunner {
            interpreter: config.interpreter.clone(),
            suppress_display_flag: config.suppress_display_flag.clone(),
            timeout: config.timeout,
        }
    }

    pub fn suppress_display_flag(mut self, flag: impl Into<String>) -> Self {
        self.suppress_display_flag = flag.into();
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Arguments passed to the interpreter
    pub fn arguments(
        &self,
        script_path: &Path,
        test_method_name: &str,
        variant: Variant,
        suppress_display: bool,
    ) -> Vec<String> {
        let mut args = vec![
            script_path.to_string_lossy().into_owned(),
            format!("--name={}", test_method_name),
        ];
        if variant == Variant::Suppressible && suppress_display {
            args.push(self.suppress_display_flag.clone());
        }
        args
    }

    /// Run the script and wait for it to exit
    ///
    /// The exit code is reported but never treated as a failure; only the
    /// parsed summary decides the outcome.
    pub fn run(
        &self,
        script_path: &Path,
        test_method_name: &str,
        variant: Variant,
        working_dir: &Path,
        suppress_display: bool,
    ) -> Result<ProcessOutput> {
        let args = self.arguments(script_path, test_method_name, variant, suppress_display);
        tracing::debug!(
            interpreter = %self.interpreter,
            ?args,
            cwd = %working_dir.display(),
            "starting interpreter"
        );

        let mut command = Command::new(&self.interpreter);
        command
            .args(&args)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());

        let child = command.spawn().map_err(|source| {
            eprintln!("Cannot start '{}': {}", self.interpreter, source);
            Error::ProcessInvocation {
                command: self.interpreter.clone(),
                source,
            }
        })?;

        let output = match self.timeout {
            None => {
                let output = child.wait_with_output()?;
                ProcessOutput {
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    exit_code: output.status.code(),
                }
            }
            Some(timeout) => self.wait_with_timeout(child, timeout)?,
        };

        match output.exit_code {
            Some(0) => tracing::debug!("interpreter exited cleanly"),
            code => tracing::debug!(?code, "interpreter exited with non-zero status"),
        }
        Ok(output)
    }

    fn wait_with_timeout(&self, mut child: Child, timeout: Duration) -> Result<ProcessOutput> {
        let deadline = Instant::now() + timeout;

        // Drain stdout on a helper thread so a chatty process can't fill the pipe.
        // A background grandchild may keep the pipe open after the child exits,
        // so the read is bounded by the same deadline.
        let (tx, rx) = mpsc::channel();
        if let Some(mut stdout) = child.stdout.take() {
            thread::spawn(move || {
                let mut buf = Vec::new();
                let _ = stdout.read_to_end(&mut buf);
                let _ = tx.send(buf);
            });
        }

        let status = loop {
            match child.try_wait()? {
                Some(status) => break status,
                None if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(self.timed_out(timeout));
                }
                None => thread::sleep(POLL_INTERVAL),
            }
        };

        let remaining = deadline.saturating_duration_since(Instant::now());
        let stdout = match rx.recv_timeout(remaining) {
            Ok(buf) => buf,
            Err(mpsc::RecvTimeoutError::Disconnected) => Vec::new(),
            Err(mpsc::RecvTimeoutError::Timeout) => {
                tracing::debug!("stdout still open after the interpreter exited");
                return Err(self.timed_out(timeout));
            }
        };
        Ok(ProcessOutput {
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            exit_code: status.code(),
        })
    }

    fn timed_out(&self, timeout: Duration) -> Error {
        Error::Timeout {
            command: self.interpreter.clone(),
            timeout,
        }
    }
}
