use crate::command::{ProcessSpawner, ProcessWaiter, SpawnError, Termination};
use crate::config::{ShellConfig, SpawnFailurePolicy};
use crate::input::LineSource;
use crate::launcher::ForkExecLauncher;
use crate::lexer::ArgVector;
use crate::usage::UsageCollector;
use anyhow::Result;
use log::warn;
use std::io::Write;

const SPAWN_FAILED_MESSAGE: &str = "Uh-oh. There was an error!";
const FAREWELL: &str = "Goodbye!";

/// What happened to a single command line.
#[derive(Debug)]
pub enum Outcome {
    /// Nothing to run; the line was blank.
    Empty,
    /// The quit keyword was entered.
    Quit,
    /// A child ran and has been reaped.
    Finished(Termination),
    /// The command never started, and the session goes on.
    Rejected(SpawnError),
}

/// Read-spawn-wait-report loop.
///
/// The interpreter owns the argument buffer and is generic over how processes are
/// started and reaped, so the loop can be exercised without real children.
///
/// Example
/// ```
/// use rusage_shell::{Interpreter, Outcome};
/// let mut sh: Interpreter = Interpreter::default();
/// match sh.eval("true").unwrap() {
///     Outcome::Finished(t) => assert!(t.success()),
///     other => panic!("unexpected outcome {:?}", other),
/// }
/// ```
pub struct Interpreter<S = ForkExecLauncher, W = UsageCollector> {
    config: ShellConfig,
    argv: ArgVector,
    spawner: S,
    waiter: W,
}

impl<S: ProcessSpawner, W: ProcessWaiter> Interpreter<S, W> {
    /// Create an interpreter with custom process capabilities.
    pub fn new(config: ShellConfig, spawner: S, waiter: W) -> Self {
        Self {
            argv: ArgVector::with_capacity(config.max_args),
            config,
            spawner,
            waiter,
        }
    }

    /// Run one command line to completion.
    ///
    /// Returns an error only for failures that end the session: a fork failure under
    /// [`SpawnFailurePolicy::Exit`], or a failed wait.
    pub fn eval(&mut self, line: &str) -> Result<Outcome> {
        let line = self.truncate(line);
        if line == self.config.quit_word {
            return Ok(Outcome::Quit);
        }
        if self.argv.fill(line) == 0 {
            return Ok(Outcome::Empty);
        }

        let spawned = self.spawner.spawn(&self.argv);
        let result = match spawned {
            Ok(child) => self.waiter.wait(child).map(Outcome::Finished),
            Err(err)
                if err.is_fatal() && self.config.on_spawn_failure == SpawnFailurePolicy::Exit =>
            {
                Err(err.into())
            }
            Err(err) => {
                warn!("could not run {:?}: {}", self.argv.program(), err);
                Ok(Outcome::Rejected(err))
            }
        };
        self.argv.clear();
        result
    }

    /// Interactive loop: greet, then read and run commands until quit or end of input.
    pub fn repl(&mut self, input: &mut dyn LineSource, out: &mut dyn Write) -> Result<()> {
        writeln!(
            out,
            "Welcome! Type \"{}\" to close the shell.",
            self.config.quit_word
        )?;

        loop {
            let line = match input.read_line(&self.config.prompt, out)? {
                Some(line) => line,
                None => {
                    // End of input leaves the cursor after the prompt.
                    writeln!(out)?;
                    break;
                }
            };
            out.flush()?;
            match self.eval(&line) {
                Ok(Outcome::Quit) => break,
                Ok(outcome) => render(&outcome, out)?,
                Err(err) => {
                    if err.is::<SpawnError>() {
                        writeln!(out, "{}", SPAWN_FAILED_MESSAGE)?;
                    }
                    out.flush()?;
                    return Err(err);
                }
            }
        }

        writeln!(out, "{}", FAREWELL)?;
        out.flush()?;
        Ok(())
    }

    fn truncate<'a>(&self, line: &'a str) -> &'a str {
        match line.char_indices().nth(self.config.line_limit) {
            Some((cut, _)) => {
                warn!(
                    "input line longer than {} characters was truncated",
                    self.config.line_limit
                );
                &line[..cut]
            }
            None => line,
        }
    }
}

impl Default for Interpreter {
    /// Interpreter with the default limits that runs real processes.
    fn default() -> Self {
        Self::new(ShellConfig::default(), ForkExecLauncher, UsageCollector)
    }
}

/// Print the user-facing result of one command.
///
/// Statistics are shown only for children that exited successfully.
pub fn render(outcome: &Outcome, out: &mut dyn Write) -> std::io::Result<()> {
    match outcome {
        Outcome::Empty | Outcome::Quit => {}
        Outcome::Finished(t) if !t.success() => {}
        Outcome::Finished(t) => {
            writeln!(out)?;
            writeln!(out, "Child process with PID {} finished.", t.pid)?;
            writeln!(
                out,
                "Child process took {} microseconds user time.",
                t.usage.user_micros()
            )?;
            writeln!(
                out,
                "It also had {} involuntary context switches.",
                t.usage.involuntary_switches
            )?;
            writeln!(out)?;
        }
        Outcome::Rejected(_) => {
            writeln!(out, "{}", SPAWN_FAILED_MESSAGE)?;
            writeln!(out)?;
        }
    }
    Ok(())
}
