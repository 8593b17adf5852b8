//! Sources of command lines: the interactive editor and plain scripts.

use crate::parser::{join_continuation, needs_continuation};
use anyhow::Result;
use rustyline::completion::FilenameCompleter;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Completer, Editor, Helper, Highlighter, Hinter, Validator};
use std::io::BufRead;

/// Prompt shown while a line continued with `\` is being completed.
pub const CONTINUATION_PROMPT: &str = "> ";

/// What a single read produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Line(String),
    /// The user pressed Ctrl-C; the partial line is dropped.
    Interrupted,
    Eof,
}

/// Yields physical input lines.
pub trait LineReader {
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome>;
}

/// Read one logical command line, joining backslash continuations.
///
/// A dangling backslash right before end of input is dropped.
pub fn read_command<R: LineReader + ?Sized>(reader: &mut R, prompt: &str) -> Result<ReadOutcome> {
    let mut line = match reader.read_line(prompt)? {
        ReadOutcome::Line(line) => line,
        other => return Ok(other),
    };
    while needs_continuation(&line) {
        match reader.read_line(CONTINUATION_PROMPT)? {
            ReadOutcome::Line(next) => join_continuation(&mut line, &next),
            ReadOutcome::Interrupted => return Ok(ReadOutcome::Interrupted),
            ReadOutcome::Eof => {
                line.pop();
                break;
            }
        }
    }
    Ok(ReadOutcome::Line(line))
}

#[derive(Helper, Completer, Hinter, Highlighter, Validator)]
struct ShellHelper {
    #[rustyline(Completer)]
    completer: FilenameCompleter,
}

/// Line editor with history and filename completion on Tab.
pub struct InteractiveReader {
    editor: Editor<ShellHelper, DefaultHistory>,
}

impl InteractiveReader {
    pub fn new() -> Result<Self> {
        let mut editor = Editor::new()?;
        editor.set_helper(Some(ShellHelper {
            completer: FilenameCompleter::new(),
        }));
        Ok(Self { editor })
    }
}

impl LineReader for InteractiveReader {
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    self.editor.add_history_entry(line.as_str())?;
                }
                Ok(ReadOutcome::Line(line))
            }
            Err(ReadlineError::Interrupted) => Ok(ReadOutcome::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadOutcome::Eof),
            Err(err) => Err(err.into()),
        }
    }
}

/// Reads lines from any buffered source without echoing a prompt.
pub struct ScriptReader<R> {
    input: R,
}

impl<R: BufRead> ScriptReader<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }
}

impl<R: BufRead> LineReader for ScriptReader<R> {
    fn read_line(&mut self, _prompt: &str) -> Result<ReadOutcome> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(ReadOutcome::Eof);
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(ReadOutcome::Line(line))
    }
}
