use std::io::{self, BufRead};

/// Source of the yes/no answer for `-overwrite=select`.
pub trait OverwritePrompt {
    /// Blocks until an answer is available. `None` means no more input.
    fn read_answer(&mut self) -> Option<String>;
}

/// Reads one line from standard input per question.
pub struct StdinPrompt;

impl OverwritePrompt for StdinPrompt {
    fn read_answer(&mut self) -> Option<String> {
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line),
            Err(e) => {
                log::debug!("failed to read answer from stdin: {}", e);
                None
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
    Unrecognized(String),
}

pub fn interpret(answer: Option<&str>) -> Answer {
    let Some(answer) = answer else {
        return Answer::Unrecognized(String::new());
    };
    let trimmed = answer.trim();
    if trimmed.eq_ignore_ascii_case("y") || trimmed.eq_ignore_ascii_case("yes") {
        Answer::Yes
    } else if trimmed.eq_ignore_ascii_case("n") || trimmed.eq_ignore_ascii_case("no") {
        Answer::No
    } else {
        Answer::Unrecognized(trimmed.to_string())
    }
}

/// Replays canned answers; counts how often it was asked.
#[cfg(test)]
pub struct ScriptedPrompt {
    answers: std::collections::VecDeque<String>,
    pub asked: usize,
}

#[cfg(test)]
impl ScriptedPrompt {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|a| a.to_string()).collect(),
            asked: 0,
        }
    }
}

#[cfg(test)]
impl OverwritePrompt for ScriptedPrompt {
    fn read_answer(&mut self) -> Option<String> {
        self.asked += 1;
        self.answers.pop_front()
    }
}
