use crate::command::{Builtin, Registry};
use crate::error::CommandError;
use crate::grep;
use crate::guard::ResolvedPath;
use crate::parser::CommandInvocation;
use crate::session::Session;
use crate::style::Style;
use crate::task_sink::MailTask;
use anyhow::{Context, Result};
use log::debug;
use std::io::{self, Write};

/// Width of the usage column in `help`.
const HELP_COLUMN: usize = 45;

/// Run `cmd` with the parsed invocation.
///
/// Errors local to the command (syntax, access, missing paths) are printed
/// here. An `Err` return means something unexpected failed; the dispatcher
/// prints it and the session continues.
pub(crate) fn execute(
    cmd: Builtin,
    invocation: &CommandInvocation,
    session: &mut Session,
    registry: &Registry,
    out: &mut dyn Write,
) -> Result<()> {
    let args = invocation.args.as_slice();
    let balanced = invocation.quotes_balanced;
    match cmd {
        Builtin::Cat => {
            if !balanced || args.len() != 1 {
                return syntax_error(cmd, args, out);
            }
            cat(&args[0], session, out)
        }
        Builtin::Cd => {
            if !balanced || args.len() != 1 {
                return syntax_error(cmd, args, out);
            }
            cd(&args[0], session, out)
        }
        // Extra arguments to exit and help are ignored.
        Builtin::Exit => {
            session.exit_requested = true;
            Ok(())
        }
        Builtin::Help => help(registry, out),
        Builtin::Ls => {
            if !balanced || args.len() > 1 {
                return syntax_error(cmd, args, out);
            }
            ls(args.first().map(String::as_str), session, out)
        }
        Builtin::Grep => match grep::GrepArgs::parse(args) {
            Some(grep_args) if balanced => grep::run(&grep_args, session, out),
            _ => syntax_error(cmd, args, out),
        },
        Builtin::Mail => {
            if !balanced || args.len() != 2 {
                return syntax_error(cmd, args, out);
            }
            mail(&args[0], &args[1], session, out)
        }
    }
}

/// Echo the attempted call, then the usage line.
pub(crate) fn syntax_error(cmd: Builtin, args: &[String], out: &mut dyn Write) -> Result<()> {
    write!(out, "{}", cmd.name())?;
    for arg in args {
        write!(out, " <{arg}>")?;
    }
    writeln!(out)?;
    writeln!(out, "{}", CommandError::Syntax { usage: cmd.usage() })?;
    Ok(())
}

pub(crate) fn report(cmd: Builtin, err: &CommandError, out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "{}: {}", cmd.name(), err)
}

/// Resolve `raw` inside the jail, printing the reason when it can't be used.
pub(crate) fn guarded(
    cmd: Builtin,
    raw: &str,
    session: &Session,
    out: &mut dyn Write,
) -> io::Result<Option<ResolvedPath>> {
    match session.resolve(raw) {
        Ok(path) => Ok(Some(path)),
        Err(err) => {
            report(cmd, &CommandError::from_guard(raw, &err), out)?;
            Ok(None)
        }
    }
}

fn cat(raw: &str, session: &mut Session, out: &mut dyn Write) -> Result<()> {
    let cmd = Builtin::Cat;
    let Some(file) = guarded(cmd, raw, session, out)? else {
        return Ok(());
    };
    let fs = session.fs();
    if !fs.exists(file.as_path()) {
        report(cmd, &CommandError::NotFound { path: raw.into() }, out)?;
        return Ok(());
    }
    if fs.is_directory(file.as_path()) {
        report(cmd, &CommandError::IsADirectory { path: raw.into() }, out)?;
        return Ok(());
    }

    let mut reader = match fs.open(file.as_path()) {
        Ok(reader) => reader,
        Err(err) => {
            report(cmd, &CommandError::Io(err), out)?;
            return Ok(());
        }
    };
    io::copy(&mut reader, out).with_context(|| format!("reading {file}"))?;
    Ok(())
}

fn cd(raw: &str, session: &mut Session, out: &mut dyn Write) -> Result<()> {
    let cmd = Builtin::Cd;
    let Some(target) = guarded(cmd, raw, session, out)? else {
        return Ok(());
    };
    if !session.fs().exists(target.as_path()) {
        report(cmd, &CommandError::NotFound { path: raw.into() }, out)?;
        return Ok(());
    }
    if !session.fs().is_directory(target.as_path()) {
        report(cmd, &CommandError::NotADirectory { path: raw.into() }, out)?;
        return Ok(());
    }

    match session.set_current_dir(&target) {
        Ok(()) => debug!("working directory is now {target}"),
        Err(err) => report(cmd, &CommandError::Io(err), out)?,
    }
    Ok(())
}

fn ls(raw: Option<&str>, session: &mut Session, out: &mut dyn Write) -> Result<()> {
    let cmd = Builtin::Ls;
    let shown = match raw {
        Some(raw) => raw.to_string(),
        None => session
            .current_dir()
            .context("can't read the working directory")?
            .display()
            .to_string(),
    };
    let Some(dir) = guarded(cmd, &shown, session, out)? else {
        return Ok(());
    };
    let fs = session.fs();
    if !fs.exists(dir.as_path()) {
        report(cmd, &CommandError::NotFound { path: shown }, out)?;
        return Ok(());
    }
    if !fs.is_directory(dir.as_path()) {
        report(cmd, &CommandError::NotADirectory { path: shown }, out)?;
        return Ok(());
    }

    let mut children = match fs.list_children(dir.as_path()) {
        Ok(children) => children,
        Err(err) => {
            report(cmd, &CommandError::Io(err), out)?;
            return Ok(());
        }
    };
    children.sort_by(|a, b| a.name.cmp(&b.name));

    let palette = session.palette();
    for child in children {
        let name = child.name.to_string_lossy();
        if child.is_dir {
            writeln!(out, "{}", palette.paint(Style::Directory, &format!("{name}/")))?;
        } else {
            writeln!(out, "{name}")?;
        }
    }
    Ok(())
}

fn help(registry: &Registry, out: &mut dyn Write) -> Result<()> {
    writeln!(out, "Available commands:")?;
    for cmd in registry.commands() {
        for (usage, description) in cmd.help_rows() {
            let column = if usage.is_empty() {
                String::new()
            } else {
                format!("  {usage}")
            };
            writeln!(out, "{column:<width$}{description}", width = HELP_COLUMN)?;
        }
    }
    Ok(())
}

fn mail(raw: &str, destination: &str, session: &mut Session, out: &mut dyn Write) -> Result<()> {
    let cmd = Builtin::Mail;
    let Some(file) = guarded(cmd, raw, session, out)? else {
        return Ok(());
    };
    if !session.fs().exists(file.as_path()) {
        report(cmd, &CommandError::NotFound { path: raw.into() }, out)?;
        return Ok(());
    }
    if session.fs().is_directory(file.as_path()) {
        report(cmd, &CommandError::IsADirectory { path: raw.into() }, out)?;
        return Ok(());
    }
    if !session.fs().is_regular_file(file.as_path()) {
        report(cmd, &CommandError::NotARegularFile { path: raw.into() }, out)?;
        return Ok(());
    }

    let file_name = file
        .as_path()
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let task = MailTask {
        path: file.into_path_buf(),
        file_name,
        destination: destination.to_string(),
    };
    let sink = session
        .task_sink()
        .context("no mail queue is configured")?;
    sink.append(&task)?;
    writeln!(out, "mail: queued {raw:?} for {destination}")?;
    Ok(())
}
