//! Yes/no confirmation.

use std::io::{self, BufRead, Write};

/// A source of yes/no answers for transfer confirmations.
pub trait Confirm {
    /// Asks `message` and returns the answer.
    fn confirm(&mut self, message: &str) -> io::Result<bool>;
}

/// Answers yes to everything (`--yes`).
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoConfirm;

impl Confirm for AutoConfirm {
    fn confirm(&mut self, _message: &str) -> io::Result<bool> {
        Ok(true)
    }
}

/// Prompts on a writer and reads answers line by line from a reader.
///
/// Accepts `y`, `yes`, `n` and `no` in any case; anything else re-prompts.
/// End of input is an error, since no answer can ever arrive.
pub struct LinePrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl LinePrompt<io::StdinLock<'static>, io::Stdout> {
    /// A prompt bound to the process's stdin and stdout.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Confirm for LinePrompt<R, W> {
    fn confirm(&mut self, message: &str) -> io::Result<bool> {
        let mut answer = String::new();

        loop {
            answer.clear();
            write!(self.output, "{} [y/n]: ", message)?;
            self.output.flush()?;

            if self.input.read_line(&mut answer)? == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "input closed before an answer was given",
                ));
            }

            match answer.trim().to_lowercase().as_str() {
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => continue,
            }
        }
    }
}
