use std::collections::VecDeque;
use std::io;
use std::sync::Mutex;

use megascans_sync::Prompter;

/// Canned operator answers, handed out one per prompt.
///
/// Runs dry with `UnexpectedEof`, the same error a closed stdin produces.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    state: Mutex<Script>,
}

#[derive(Debug, Default)]
struct Script {
    answers: VecDeque<String>,
    asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<'a>(answers: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            state: Mutex::new(Script {
                answers: answers.into_iter().map(str::to_string).collect(),
                asked: Vec::new(),
            }),
        }
    }

    /// Prompts shown so far, oldest first.
    pub fn asked(&self) -> Vec<String> {
        self.state.lock().unwrap().asked.clone()
    }

    pub fn remaining(&self) -> usize {
        self.state.lock().unwrap().answers.len()
    }
}

impl Prompter for ScriptedPrompter {
    fn prompt(&self, message: &str) -> io::Result<String> {
        let mut script = self.state.lock().unwrap();
        script.asked.push(message.to_string());
        script
            .answers
            .pop_front()
            .map(|answer| answer.trim().to_string())
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted"))
    }
}
