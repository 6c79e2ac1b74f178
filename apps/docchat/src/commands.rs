//! Terminal input parsed into session actions.

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Open(PathBuf),
    Upload,
    Ask(Option<String>),
    Status,
    Help,
    Quit,
    /// Free text: becomes the question and is submitted.
    Question(String),
    Invalid(String),
}

pub fn parse_line(line: &str) -> Command {
    let line = line.trim_end_matches(['\r', '\n']);
    let Some(rest) = line.trim_start().strip_prefix(':') else {
        return Command::Question(line.to_string());
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    match name {
        "open" if arg.is_empty() => Command::Invalid(":open needs a file path".to_string()),
        "open" => Command::Open(PathBuf::from(arg)),
        "upload" => Command::Upload,
        "ask" if arg.is_empty() => Command::Ask(None),
        "ask" => Command::Ask(Some(arg.to_string())),
        "status" => Command::Status,
        "help" | "h" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        other => Command::Invalid(format!("unknown command ':{other}' (try :help)")),
    }
}

pub const HELP: &str = "\
Commands:
  :open <path>   select a document
  :upload        upload the selected document
  :ask [text]    ask the current question, or <text>
  :status        show the current session
  :quit          exit
Any other line is asked as a question.";
