//! User-facing prompts
//!
//! Runners never talk to a toolkit directly. Confirmations, errors and
//! progress notes go through [`Prompt`], so the CLI can use native dialogs
//! and tests can script the answers.

use dialog::{Choice, DialogBox};

pub trait Prompt: Send + Sync {
    /// Show an informational or error message.
    fn msg(&self, title: &str, contents: &str);

    /// Ask a yes/no question. Anything but an explicit yes is a no.
    fn yesno(&self, title: &str, contents: &str) -> bool;
}

/// Native dialogs through zenity/kdialog/dialog, whichever is available.
pub struct DialogPrompt;

impl Prompt for DialogPrompt {
    fn msg(&self, title: &str, contents: &str) {
        if let Err(e) = dialog::Message::new(contents).title(title).show() {
            tracing::warn!("Could not show dialog '{title}': {e}");
            eprintln!("{title}: {contents}");
        }
    }

    fn yesno(&self, title: &str, contents: &str) -> bool {
        if let Ok(prompt) = dialog::Question::new(contents).title(title).show() {
            if prompt == Choice::Yes {
                return true;
            }
        }
        false
    }
}

/// Prompt for non-interactive use: logs messages and answers every question.
pub struct AutoPrompt {
    pub answer: bool,
}

impl Prompt for AutoPrompt {
    fn msg(&self, title: &str, contents: &str) {
        tracing::info!(title, "{contents}");
    }

    fn yesno(&self, title: &str, contents: &str) -> bool {
        tracing::info!(title, answer = self.answer, "{contents}");
        self.answer
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    use super::*;
    use std::sync::Mutex;

    /// Records every prompt and answers questions with `answer`.
    #[derive(Default)]
    pub struct FakePrompt {
        pub answer: bool,
        pub messages: Mutex<Vec<String>>,
        pub questions: Mutex<Vec<String>>,
    }

    impl FakePrompt {
        pub fn answering(answer: bool) -> Self {
            Self {
                answer,
                ..Default::default()
            }
        }

        pub fn messages(&self) -> Vec<String> {
            self.messages.lock().unwrap().clone()
        }

        pub fn questions(&self) -> Vec<String> {
            self.questions.lock().unwrap().clone()
        }
    }

    impl Prompt for FakePrompt {
        fn msg(&self, _title: &str, contents: &str) {
            self.messages.lock().unwrap().push(contents.to_string());
        }

        fn yesno(&self, _title: &str, contents: &str) -> bool {
            self.questions.lock().unwrap().push(contents.to_string());
            self.answer
        }
    }
}
