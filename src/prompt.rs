//! Interactive line prompts.
//!
//! Every place the tool needs operator input (downloads folder, account email,
//! bearer token) goes through the [`Prompter`] trait so the re-authentication
//! loop and the ledger bootstrap can be driven by canned answers in tests.

use std::io::{self, BufRead, Write};
#[cfg(test)]
use std::{collections::VecDeque, sync::Mutex};

/// Prompt shown when the ledger is created for the first time.
pub const DOWNLOADS_FOLDER_PROMPT: &str = "Enter a downloads folder: ";

/// Prompt for the account identifier.
pub const EMAIL_PROMPT: &str =
    "Please enter your email address associated with your Megascans account:";

/// Prompt for the bearer credential.
pub const TOKEN_PROMPT: &str = "Enter an authentication token Bearer:";

/// Source of free-text operator answers.
///
/// Implementations return the answer with surrounding whitespace removed.
/// An `Err` means no further input can be obtained and is treated as fatal by
/// callers.
pub trait Prompter: Send + Sync {
    /// Shows `message` and reads one line of input.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the input source is closed or unreadable.
    fn prompt(&self, message: &str) -> io::Result<String>;
}

/// Reads answers from the process stdin, printing prompts to stdout.
#[derive(Debug, Default)]
pub struct StdinPrompter;

impl StdinPrompter {
    /// Creates a stdin-backed prompter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Prompter for StdinPrompter {
    fn prompt(&self, message: &str) -> io::Result<String> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{message}")?;
        stdout.flush()?;

        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "stdin closed while waiting for input",
            ));
        }
        Ok(line.trim().to_string())
    }
}

/// Replays a fixed list of answers, in order.
///
/// Once the answers run out every further prompt fails with
/// [`io::ErrorKind::UnexpectedEof`], which ends any retry loop waiting on
/// operator input. Integration tests carry their own copy in `tests/support`.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct ScriptedPrompter {
    answers: Mutex<VecDeque<String>>,
    asked: Mutex<Vec<String>>,
}

#[cfg(test)]
impl ScriptedPrompter {
    /// Creates a prompter that will hand out `answers` one per prompt.
    pub(crate) fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: Mutex::new(answers.into_iter().map(Into::into).collect()),
            asked: Mutex::new(Vec::new()),
        }
    }

    /// Messages that have been shown so far.
    pub(crate) fn asked(&self) -> Vec<String> {
        self.asked
            .lock()
            .map(|asked| asked.clone())
            .unwrap_or_default()
    }

    /// Number of answers not yet consumed.
    pub(crate) fn remaining(&self) -> usize {
        self.answers.lock().map(|answers| answers.len()).unwrap_or(0)
    }
}

#[cfg(test)]
impl Prompter for ScriptedPrompter {
    fn prompt(&self, message: &str) -> io::Result<String> {
        if let Ok(mut asked) = self.asked.lock() {
            asked.push(message.to_string());
        }
        let next = self
            .answers
            .lock()
            .map_err(|_| io::Error::other("scripted prompter lock poisoned"))?
            .pop_front();
        next.map(|answer| answer.trim().to_string()).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("no scripted answer left for prompt: {message}"),
            )
        })
    }
}
