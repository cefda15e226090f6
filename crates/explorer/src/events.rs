//! Discrete UI events delivered to the session

use citescope_common::errors::AppError;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// Run a search
    Search(String),
    /// Select a paper from the results
    OpenPaper(String),
    /// Click on a node of the citation graph
    NodeClicked(String),
    /// Send a message to the assistant about the open paper
    SendMessage(String),
    /// Abandon the reply currently streaming
    CancelChat,
    /// Print the render graph
    ShowGraph,
    /// Print the transcript
    ShowTranscript,
    Help,
    Quit,
}

impl FromStr for UiEvent {
    type Err = AppError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (command, arg) = match line.split_once(char::is_whitespace) {
            Some((command, arg)) => (command, arg.trim()),
            None => (line, ""),
        };

        let required = |name: &str| {
            if arg.is_empty() {
                Err(AppError::Validation {
                    message: format!("`{}` needs an argument", name),
                    field: Some(name.to_string()),
                })
            } else {
                Ok(arg.to_string())
            }
        };

        match command.to_ascii_lowercase().as_str() {
            "search" | "s" => required("search").map(UiEvent::Search),
            "open" | "o" => required("open").map(UiEvent::OpenPaper),
            "click" => required("click").map(UiEvent::NodeClicked),
            "chat" | "ask" => required("chat").map(UiEvent::SendMessage),
            "cancel" => Ok(UiEvent::CancelChat),
            "graph" | "g" => Ok(UiEvent::ShowGraph),
            "transcript" | "t" => Ok(UiEvent::ShowTranscript),
            "help" | "?" => Ok(UiEvent::Help),
            "quit" | "exit" | "q" => Ok(UiEvent::Quit),
            other => Err(AppError::Validation {
                message: format!("unknown command `{}` (try `help`)", other),
                field: None,
            }),
        }
    }
}
