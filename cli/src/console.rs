//! Interactive terminal console.
//!
//! Output and prompts go to stdout, warnings and the spinner to stderr.
//! Ctrl-C while waiting for an answer is reported as an interrupt rather
//! than ending the process.

use crate::progress::Spinner;
use crossterm::style::Stylize;
use refshelf_engine::{Console, Diff, DiffLine, Input, Progress};
use std::io::{self, IsTerminal, Write};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

pub struct TerminalConsole {
    input: Lines<BufReader<Stdin>>,
    spinner: Option<Spinner>,
    show_progress: bool,
}

impl TerminalConsole {
    pub fn new() -> Self {
        Self {
            input: BufReader::new(tokio::io::stdin()).lines(),
            spinner: None,
            show_progress: io::stderr().is_terminal(),
        }
    }
}

impl Default for TerminalConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for TerminalConsole {
    fn say(&mut self, line: &str) {
        println!("{}", line);
    }

    fn warn(&mut self, line: &str) {
        eprintln!("{}", line.red());
    }

    fn show_diff(&mut self, diff: &Diff) {
        for line in diff.lines() {
            match &line {
                DiffLine::Removed(_) => println!("{}", line.to_string().red()),
                DiffLine::Added(_) => println!("{}", line.to_string().green()),
            }
        }
    }

    async fn read_line(&mut self, prompt: &str) -> Input {
        print!("{}", prompt);
        let _ = io::stdout().flush();

        tokio::select! {
            line = self.input.next_line() => match line {
                Ok(Some(line)) => Input::Line(line),
                Ok(None) => {
                    println!();
                    Input::EndOfInput
                }
                Err(e) => {
                    tracing::warn!(error = %e, "could not read from stdin");
                    println!();
                    Input::EndOfInput
                }
            },
            Ok(()) = tokio::signal::ctrl_c() => {
                println!();
                Input::Interrupted
            }
        }
    }

    fn start_progress(&mut self, label: &str, progress: &Progress) {
        if self.show_progress && self.spinner.is_none() {
            self.spinner = Some(Spinner::start(label, progress.clone()));
        }
    }

    async fn stop_progress(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.stop().await;
        }
    }
}
