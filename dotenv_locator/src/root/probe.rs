//! Running an external tool and capturing its standard output.

use std::io::{self, Read};
use std::path::PathBuf;
use std::process::{Child, ChildStdout, Command, ExitStatus, Output, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::error::ProbeError;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// A single invocation of an external program whose stdout answers a
/// question, e.g. `git rev-parse --show-toplevel`.
///
/// Standard input is closed and standard error is discarded. When a timeout
/// is set the child is polled and killed once the deadline passes.
///
/// # Examples
///
/// ```rust,no_run
/// use std::time::Duration;
/// use dotenv_locator::root::ProbeCommand;
///
/// if let Ok(stdout) = ProbeCommand::new("git")
///     .args(["rev-parse", "--show-toplevel"])
///     .timeout(Some(Duration::from_secs(2)))
///     .run()
/// {
///     println!("working tree: {}", stdout.trim_end());
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeCommand {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
    timeout: Option<Duration>,
}

impl ProbeCommand {
    /// Creates a probe for `program` with no arguments.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            timeout: None,
        }
    }

    /// Appends arguments passed to the program.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Runs the program in `dir` instead of the process working directory.
    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Kills the program if it has not exited after `timeout`. `None` waits
    /// indefinitely.
    #[must_use]
    pub const fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Name of the program this probe runs.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Runs the program and returns its standard output.
    ///
    /// # Errors
    ///
    /// Returns a [`ProbeError`] when the program cannot be spawned, exits
    /// unsuccessfully, or exceeds the configured timeout.
    pub fn run(&self) -> Result<String, ProbeError> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }

        let child = command.spawn().map_err(|source| ProbeError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        let output = match self.timeout {
            Some(timeout) => self.wait_with_deadline(child, timeout)?,
            None => child.wait_with_output().map_err(|source| self.wait_error(source))?,
        };

        if !output.status.success() {
            return Err(ProbeError::Exit {
                program: self.program.clone(),
                status: output.status,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn wait_with_deadline(&self, mut child: Child, timeout: Duration) -> Result<Output, ProbeError> {
        // Drain stdout while polling so a chatty child cannot fill the pipe
        // and stall until the deadline.
        let reader = child.stdout.take().map(spawn_reader);
        let status = self.wait_for_exit(&mut child, timeout)?;
        let stdout = match reader {
            Some(handle) => self.join_reader(handle)?,
            None => Vec::new(),
        };
        Ok(Output {
            status,
            stdout,
            stderr: Vec::new(),
        })
    }

    /// Polls `child` until it exits or `timeout` elapses. On timeout the
    /// reader thread is left to finish on its own, since a grandchild may
    /// still hold the pipe open.
    fn wait_for_exit(&self, child: &mut Child, timeout: Duration) -> Result<ExitStatus, ProbeError> {
        let deadline = Instant::now().checked_add(timeout);
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) if deadline.is_some_and(|limit| Instant::now() >= limit) => {
                    self.terminate(child);
                    return Err(ProbeError::TimedOut {
                        program: self.program.clone(),
                        timeout,
                    });
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(source) => {
                    self.terminate(child);
                    return Err(self.wait_error(source));
                }
            }
        }
    }

    fn join_reader(&self, handle: JoinHandle<io::Result<Vec<u8>>>) -> Result<Vec<u8>, ProbeError> {
        handle
            .join()
            .map_err(|_| self.wait_error(io::Error::other("stdout reader thread panicked")))?
            .map_err(|source| self.wait_error(source))
    }

    fn terminate(&self, child: &mut Child) {
        if let Err(err) = child.kill() {
            tracing::debug!(program = %self.program, error = %err, "failed to kill probe");
        }
        if let Err(err) = child.wait() {
            tracing::debug!(program = %self.program, error = %err, "failed to reap probe");
        }
    }

    fn wait_error(&self, source: io::Error) -> ProbeError {
        ProbeError::Wait {
            program: self.program.clone(),
            source,
        }
    }
}

fn spawn_reader(mut pipe: ChildStdout) -> JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        pipe.read_to_end(&mut buffer)?;
        Ok(buffer)
    })
}
