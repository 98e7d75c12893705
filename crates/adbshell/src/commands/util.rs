//! Shared helpers for command handlers.

use std::io::{self, BufRead, IsTerminal, Write};

use crate::error::CliError;

/// Yes/no questions asked from inside the loop. Swapped out in tests.
pub trait Prompter: Send + Sync {
    fn confirm(&self, message: &str) -> Result<bool, CliError>;
}

/// Prompts on the controlling terminal, or reads the answer as the next
/// input line when stdin is piped.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn confirm(&self, message: &str) -> Result<bool, CliError> {
        tokio::task::block_in_place(|| {
            let stdin = io::stdin();
            if stdin.is_terminal() {
                confirm(message)
            } else {
                confirm_from_lines(message, &mut stdin.lock())
            }
        })
    }
}

/// Ask a yes/no question, defaulting to no.
pub fn confirm(message: &str) -> Result<bool, CliError> {
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(prompt_err)?;
    Ok(confirmed)
}

/// Ask on stdout and take the answer from the next line of `input`.
/// End of input counts as no.
pub fn confirm_from_lines(message: &str, input: &mut impl BufRead) -> Result<bool, CliError> {
    let mut stdout = io::stdout().lock();
    write!(stdout, "{message} (y/N): ")?;
    stdout.flush()?;

    let mut answer = Vec::new();
    if input.read_until(b'\n', &mut answer)? == 0 {
        writeln!(stdout)?;
        return Ok(false);
    }
    Ok(is_yes(&String::from_utf8_lossy(&answer)))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Prompt(e.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn piped_answer_is_read_from_next_line() {
        let mut input = Cursor::new(b"Y\ndevices\n".to_vec());
        assert!(confirm_from_lines("Disconnect?", &mut input).unwrap());

        let mut rest = String::new();
        input.read_line(&mut rest).unwrap();
        assert_eq!(rest, "devices\n");
    }

    #[test]
    fn anything_but_yes_is_no() {
        for answer in ["n\n", "no\n", "\n", "maybe\n", "nah"] {
            let mut input = Cursor::new(answer.as_bytes().to_vec());
            assert!(!confirm_from_lines("Disconnect?", &mut input).unwrap(), "{answer:?}");
        }
        assert!(confirm_from_lines("Disconnect?", &mut Cursor::new(b" yes \r\n".to_vec())).unwrap());
    }

    #[test]
    fn end_of_input_answers_no() {
        let mut input = Cursor::new(Vec::new());
        assert!(!confirm_from_lines("Disconnect?", &mut input).unwrap());
    }

    #[test]
    fn prompt_failures_read_as_prompt_errors() {
        let err = prompt_err("not a terminal");
        assert!(matches!(err, CliError::Prompt(_)));
        assert_eq!(err.to_string(), "Prompt failed: not a terminal");
    }
}
