use crate::builtin;
use crate::command::Registry;
use crate::line_reader::{LineReader, ReadOutcome, read_command};
use crate::parser::tokenize;
use crate::session::Session;
use anyhow::Result;
use log::{debug, error};
use std::io::{self, Write};

/// Printed when the shell loop ends.
pub const FAREWELL: &str = "Au revoir, mes amis!";

/// Reads command lines and runs them against a [`Session`].
///
/// Example
/// ```
/// use easy_shell::{Interpreter, OsFileSystem, Session};
/// let dir = std::env::temp_dir();
/// let fs = OsFileSystem::detached(&dir).unwrap();
/// let session = Session::new(Box::new(fs), &dir).unwrap();
/// let mut sh = Interpreter::new(session);
/// let mut out = Vec::new();
/// sh.dispatch("exit", &mut out).unwrap();
/// assert!(sh.session().exit_requested);
/// ```
pub struct Interpreter {
    session: Session,
    registry: Registry,
}

impl Interpreter {
    /// Create an interpreter; `mail` is registered only if the session has a task sink.
    pub fn new(session: Session) -> Self {
        let registry = if session.has_task_sink() {
            Registry::with_mail()
        } else {
            Registry::core()
        };
        Self { session, registry }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Parse and run one logical command line.
    ///
    /// Only failures to write to `out` are returned; command failures are
    /// printed and the session keeps going.
    pub fn dispatch(&mut self, line: &str, out: &mut dyn Write) -> io::Result<()> {
        let invocation = tokenize(line);
        if invocation.is_empty() {
            return Ok(());
        }

        let Some(cmd) = self.registry.lookup(&invocation.name) else {
            return writeln!(out, "easy shell: command not found '{}'", invocation.name);
        };

        debug!("{} with {:?}", cmd.name(), invocation.args);
        if let Err(err) = builtin::execute(cmd, &invocation, &mut self.session, &self.registry, out)
        {
            writeln!(out, "{}: {:#}", cmd.name(), err)?;
        }
        Ok(())
    }

    pub fn print_intro(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "easy shell {}", env!("CARGO_PKG_VERSION"))?;
        writeln!(
            out,
            "Enter 'help' for more information about the usage of this program"
        )
    }

    /// Farewell line, preceded by a blank line when the input simply ran out.
    pub fn print_outro(&self, out: &mut dyn Write) -> io::Result<()> {
        if !self.session.input_good {
            writeln!(out)?;
        }
        writeln!(out, "{FAREWELL}")
    }

    /// Read-eval loop until `exit` or end of input.
    pub fn repl<R: LineReader + ?Sized>(&mut self, reader: &mut R, out: &mut dyn Write) -> Result<()> {
        while !self.session.exit_requested {
            self.session.update_prompt();
            out.flush()?;
            match read_command(reader, self.session.prompt()) {
                Ok(ReadOutcome::Line(line)) => self.dispatch(&line, out)?,
                Ok(ReadOutcome::Interrupted) => continue,
                Ok(ReadOutcome::Eof) => {
                    self.session.input_good = false;
                    self.session.exit_requested = true;
                }
                Err(err) => {
                    error!("reading input failed: {err:#}");
                    self.session.input_good = false;
                    self.session.exit_requested = true;
                }
            }
        }
        self.print_outro(out)?;
        out.flush()?;
        Ok(())
    }
}
