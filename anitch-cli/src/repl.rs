//! Line-level commands understood by the terminal front-end

use std::path::PathBuf;

/// One input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// Free text for the command interpreter
    Submit(String),
    Drop(Vec<PathBuf>),
    ExitMeditation,
    Reset,
    Status,
    Help,
    Quit,
    Empty,
    /// A `:`-prefixed line we do not know
    Invalid(String),
}

impl ReplCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return ReplCommand::Empty;
        }
        let Some(rest) = line.strip_prefix(':') else {
            return ReplCommand::Submit(line.to_string());
        };

        let mut parts = rest.split_whitespace();
        match parts.next().unwrap_or_default() {
            "drop" => {
                let paths: Vec<PathBuf> = parts.map(PathBuf::from).collect();
                if paths.is_empty() {
                    ReplCommand::Invalid("usage: :drop <path> [path...]".to_string())
                } else {
                    ReplCommand::Drop(paths)
                }
            }
            "exit" => ReplCommand::ExitMeditation,
            "reset" => ReplCommand::Reset,
            "status" => ReplCommand::Status,
            "help" | "h" => ReplCommand::Help,
            "quit" | "q" => ReplCommand::Quit,
            other => ReplCommand::Invalid(format!("unknown command ':{}' (try :help)", other)),
        }
    }
}

pub const HELP: &str = "\
Type a command, e.g. 'analyze project', 'manifest a cube', 'ask how do stars form',
'connect bridge' or 'meditate'.

  :drop <paths...>  submit project files for analysis
  :exit             leave meditation
  :reset            return to idle
  :status           show the current session
  :quit             leave";
