//! `grep [-r] <pattern> <path...>` and match highlighting.

use crate::builtin::{guarded, report};
use crate::command::Builtin;
use crate::error::CommandError;
use crate::fs::FileSystem;
use crate::guard::{ResolvedPath, relative_to};
use crate::session::Session;
use crate::style::{Palette, Style};
use anyhow::{Context, Result};
use log::{debug, trace};
use regex::bytes::{Match, Regex};
use std::collections::BTreeSet;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

/// Parsed `grep` arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrepArgs {
    pub recursive: bool,
    pub pattern: String,
    pub paths: Vec<String>,
}

impl GrepArgs {
    /// `[-r] <pattern> <path...>`; `None` when the pattern or every path is missing.
    pub fn parse(args: &[String]) -> Option<Self> {
        let (recursive, rest) = match args.split_first() {
            Some((flag, rest)) if flag == "-r" => (true, rest),
            _ => (false, args),
        };
        let (pattern, paths) = rest.split_first()?;
        if paths.is_empty() {
            return None;
        }
        Some(Self {
            recursive,
            pattern: pattern.clone(),
            paths: paths.to_vec(),
        })
    }
}

/// A piece of a matching line, as raw bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'t> {
    Plain(&'t [u8]),
    Match(&'t [u8]),
}

/// Splits a line into plain and matched segments, in order.
///
/// Matches never overlap. Empty matches are skipped by stepping one byte
/// forward, so the scan always ends.
pub struct Highlights<'r, 't> {
    re: &'r Regex,
    text: &'t [u8],
    /// Everything before this offset has been yielded.
    emitted: usize,
    /// Next offset to search from; `None` once no match is left.
    search: Option<usize>,
    pending: Option<Match<'t>>,
}

impl<'r, 't> Highlights<'r, 't> {
    pub fn new(re: &'r Regex, text: &'t [u8]) -> Self {
        Self {
            re,
            text,
            emitted: 0,
            search: Some(0),
            pending: None,
        }
    }

    fn next_match(&mut self) -> Option<Match<'t>> {
        while let Some(start) = self.search {
            if start > self.text.len() {
                self.search = None;
                break;
            }
            let Some(found) = self.re.find_at(self.text, start) else {
                self.search = None;
                break;
            };
            if found.is_empty() {
                self.search = Some(found.start() + 1);
                continue;
            }
            self.search = Some(found.end());
            return Some(found);
        }
        None
    }
}

impl<'t> Iterator for Highlights<'_, 't> {
    type Item = Segment<'t>;

    fn next(&mut self) -> Option<Segment<'t>> {
        if let Some(found) = self.pending.take() {
            self.emitted = found.end();
            return Some(Segment::Match(found.as_bytes()));
        }

        match self.next_match() {
            Some(found) if found.start() > self.emitted => {
                let plain = &self.text[self.emitted..found.start()];
                self.emitted = found.start();
                self.pending = Some(found);
                Some(Segment::Plain(plain))
            }
            Some(found) => {
                self.emitted = found.end();
                Some(Segment::Match(found.as_bytes()))
            }
            None if self.emitted < self.text.len() => {
                let rest = &self.text[self.emitted..];
                self.emitted = self.text.len();
                Some(Segment::Plain(rest))
            }
            None => None,
        }
    }
}

pub(crate) fn run(args: &GrepArgs, session: &Session, out: &mut dyn Write) -> Result<()> {
    let cmd = Builtin::Grep;
    let re = match Regex::new(&args.pattern) {
        Ok(re) => re,
        Err(err) => {
            report(cmd, &CommandError::Pattern(err), out)?;
            return Ok(());
        }
    };

    let fs = session.fs();
    let mut files = BTreeSet::new();
    for raw in &args.paths {
        let Some(path) = guarded(cmd, raw, session, out)? else {
            continue;
        };
        if !fs.exists(path.as_path()) {
            report(cmd, &CommandError::NotFound { path: raw.clone() }, out)?;
        } else if fs.is_regular_file(path.as_path()) {
            files.insert(path);
        } else if fs.is_directory(path.as_path()) {
            if args.recursive {
                collect_files(fs, &path, &mut files, out)?;
            } else {
                report(cmd, &CommandError::IsADirectory { path: raw.clone() }, out)?;
            }
        }
    }
    debug!("grep {:?} over {} file(s)", args.pattern, files.len());

    let cwd = session
        .current_dir()
        .context("can't read the working directory")?;
    let show_names = args.paths.len() > 1 || args.recursive;
    let palette = session.palette();
    for file in &files {
        let shown = relative_to(file.as_path(), &cwd);
        let prefix = show_names.then_some(shown.as_path());
        scan_file(fs, file, &shown, prefix, &re, palette, out)?;
    }
    Ok(())
}

/// Collect regular, non-symlink files below `dir`. Symlinked directories are
/// not descended into.
fn collect_files(
    fs: &dyn FileSystem,
    dir: &ResolvedPath,
    files: &mut BTreeSet<ResolvedPath>,
    out: &mut dyn Write,
) -> io::Result<()> {
    let children = match fs.list_children(dir.as_path()) {
        Ok(children) => children,
        Err(err) => return report(Builtin::Grep, &CommandError::Io(err), out),
    };
    for child in children {
        if child.is_symlink {
            continue;
        }
        let Some(path) = ResolvedPath::child_of(dir, child.path) else {
            continue;
        };
        if child.is_plain_file {
            files.insert(path);
        } else if child.is_dir {
            collect_files(fs, &path, files, out)?;
        }
    }
    Ok(())
}

fn scan_file(
    fs: &dyn FileSystem,
    file: &ResolvedPath,
    shown: &Path,
    prefix: Option<&Path>,
    re: &Regex,
    palette: Palette,
    out: &mut dyn Write,
) -> io::Result<()> {
    trace!("scanning {file}");
    let mut reader = match fs.open(file.as_path()) {
        Ok(reader) => BufReader::new(reader),
        Err(_) => return writeln!(out, "grep: Couldn't open {:?}", shown.display().to_string()),
    };

    let mut raw = Vec::new();
    loop {
        raw.clear();
        match reader.read_until(b'\n', &mut raw) {
            Ok(0) => break,
            Ok(_) => {}
            Err(err) => return report(Builtin::Grep, &CommandError::Io(err), out),
        }
        if raw.last() == Some(&b'\n') {
            raw.pop();
        }
        if !re.is_match(&raw) {
            continue;
        }

        if let Some(name) = prefix {
            write!(
                out,
                "{}{}",
                palette.paint(Style::FileName, &name.display().to_string()),
                palette.paint(Style::Separator, ":")
            )?;
        }
        for segment in Highlights::new(re, &raw) {
            match segment {
                Segment::Plain(bytes) => out.write_all(bytes)?,
                Segment::Match(bytes) => palette.paint_bytes(Style::Match, bytes, out)?,
            }
        }
        writeln!(out)?;
    }
    Ok(())
}
