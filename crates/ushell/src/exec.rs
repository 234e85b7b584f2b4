//! Spawns a [`Pipeline`] as a chain of real child processes. Grounded
//! on `execute_pipeline` in `myshell.c`, with `fork`/`pipe`/`dup2`
//! replaced by `std::process::Command`'s own `Stdio::piped()` chaining
//! — idiomatic Rust gets the same pipe topology without touching raw
//! file descriptors.

use crate::error::ShellError;
use crate::parser::Pipeline;
use std::fs::{File, OpenOptions};
use std::os::unix::process::ExitStatusExt;
use std::process::{Child, ExitStatus, Stdio};

/// Runs every command in the pipeline, wiring each one's stdout to the
/// next one's stdin. Foreground pipelines block until the last command
/// exits and return its status; background pipelines (`&`) spawn every
/// child, reap them on a detached thread so they never become zombies,
/// and return immediately with a success status.
pub fn execute(pipeline: &Pipeline) -> Result<ExitStatus, ShellError> {
    let mut children = Vec::with_capacity(pipeline.commands.len());
    let mut stdin_from_prev: Option<Stdio> = None;

    for (i, command) in pipeline.commands.iter().enumerate() {
        let is_last = i + 1 == pipeline.commands.len();
        let mut builder = std::process::Command::new(&command.args[0]);
        builder.args(&command.args[1..]);

        builder.stdin(match (&command.redirect_in, stdin_from_prev.take()) {
            (Some(path), _) => Stdio::from(open_in(path)?),
            (None, Some(piped)) => piped,
            (None, None) => Stdio::inherit(),
        });

        builder.stdout(match &command.redirect_out {
            Some(path) => Stdio::from(create_out(path)?),
            None if is_last => Stdio::inherit(),
            None => Stdio::piped(),
        });

        let mut child = builder.spawn().map_err(|source| ShellError::Spawn {
            command: command.args[0].clone(),
            source,
        })?;

        if !is_last && command.redirect_out.is_none() {
            stdin_from_prev = Some(Stdio::from(child.stdout.take().expect("piped stdout")));
        }
        children.push(child);
    }

    if pipeline.background {
        log::info!("backgrounding pipeline of {} command(s)", children.len());
        std::thread::spawn(move || reap_all(children));
        return Ok(ExitStatus::from_raw(0));
    }

    reap_all(children)
        .into_iter()
        .last()
        .expect("a pipeline always has at least one command")
}

fn reap_all(children: Vec<Child>) -> Vec<Result<ExitStatus, ShellError>> {
    children
        .into_iter()
        .map(|mut child| child.wait().map_err(ShellError::Wait))
        .collect()
}

fn open_in(path: &str) -> Result<File, ShellError> {
    OpenOptions::new()
        .read(true)
        .open(path)
        .map_err(|source| ShellError::Redirect { path: path.to_string(), source })
}

fn create_out(path: &str) -> Result<File, ShellError> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map_err(|source| ShellError::Redirect { path: path.to_string(), source })
}
