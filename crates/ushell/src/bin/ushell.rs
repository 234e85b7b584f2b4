//! Interactive front door for `ushell`. Grounded on `main` in
//! `myshell.c`: prints a prompt (unless invoked with `-n`), reads one
//! line at a time, parses and executes it, and exits cleanly on EOF.

use std::io::{self, BufRead, Write};

fn main() {
    env_logger::init();

    let show_prompt = std::env::args().nth(1).as_deref() != Some("-n");
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    if show_prompt {
        print!("my_shell$");
        let _ = stdout.flush();
    }

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(_) => break,
        };

        match ushell::parse(&line) {
            Ok(pipeline) => match ushell::execute(&pipeline) {
                Ok(status) => {
                    if !status.success() {
                        log::warn!("pipeline exited with {status}");
                    }
                }
                Err(err) => eprintln!("my_shell: {err}"),
            },
            Err(ushell::ShellError::Empty) => {}
            Err(err) => eprintln!("my_shell: {err}"),
        }

        if show_prompt {
            print!("my_shell$");
            let _ = stdout.flush();
        }
    }
    println!();
}
