use anyhow::{Context, Result};
use easy_shell::config::LOG_ENV;
use easy_shell::line_reader::{InteractiveReader, ScriptReader};
use easy_shell::style::Palette;
use easy_shell::task_sink::FileTaskSink;
use easy_shell::{Config, FileSystem, Interpreter, OsFileSystem, Session};
use log::info;
use std::io::{self, IsTerminal, Write};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or(LOG_ENV, "warn")).init();
    let config = Config::from_env();

    let mut fs = OsFileSystem::process();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    // A bad start directory is reported and the shell stays where it is.
    if let Some(dir) = &config.start_dir {
        if let Err(err) = fs.set_current_dir(dir) {
            writeln!(out, "cd: {}: {err}", dir.display())?;
        }
    }
    let jail = fs
        .current_dir()
        .context("can't read the current directory")?;
    info!("jail root is {}", jail.display());

    let palette = Palette::new(config.color && io::stdout().is_terminal());
    let mut session = Session::new(Box::new(fs), jail)?.with_palette(palette);
    if let Some(queue) = &config.mail_queue {
        info!("mail tasks go to {}", queue.display());
        session = session.with_task_sink(Box::new(FileTaskSink::new(queue)));
    }
    let mut sh = Interpreter::new(session);

    if io::stdin().is_terminal() {
        sh.print_intro(&mut out)?;
        let mut reader = InteractiveReader::new()?;
        sh.repl(&mut reader, &mut out)
    } else {
        let mut reader = ScriptReader::new(io::stdin().lock());
        sh.repl(&mut reader, &mut out)
    }
}
