//! Command grammar: a command word followed by space separated arguments

use std::fmt;

use super::theme::Theme;

/// A recognised command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Ping,
    Clear,
    Color(Theme),
    Close,
    Minimize,
    Echo(String),
    Snake,
    About,
}

/// Input the interpreter refuses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command word (lowercased)
    NotFound(String),
    /// Command needs an argument that was not given
    MissingArgument {
        what: &'static str,
        usage: &'static str,
    },
    /// `color` with a name outside the theme list
    InvalidColor(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::NotFound(command) => write!(
                f,
                "Error: Command not found \"{command}\". Type 'help' for available commands."
            ),
            CommandError::MissingArgument { what, usage } => {
                write!(f, "Error: Missing {what} parameter. Usage: {usage}")
            }
            CommandError::InvalidColor(color) => write!(
                f,
                "Error: Invalid color \"{color}\". Available: {}",
                Theme::names()
            ),
        }
    }
}

impl std::error::Error for CommandError {}

const COLOR_USAGE: &str = "color [black|white|green|blue|red|yellow|purple|cyan|pink]";
const ECHO_USAGE: &str = "echo [text]";

/// Parse one input line. Blank lines parse to `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start()),
        None => (line, ""),
    };
    let word = word.to_lowercase();

    let command = match word.as_str() {
        "help" => Command::Help,
        "ping" => Command::Ping,
        "clear" => Command::Clear,
        "color" => {
            let Some(name) = rest.split_whitespace().next() else {
                return Err(CommandError::MissingArgument {
                    what: "color",
                    usage: COLOR_USAGE,
                });
            };
            match Theme::parse(name) {
                Some(theme) => Command::Color(theme),
                None => return Err(CommandError::InvalidColor(name.to_lowercase())),
            }
        }
        "close" => Command::Close,
        "minimize" => Command::Minimize,
        "echo" => {
            if rest.is_empty() {
                return Err(CommandError::MissingArgument {
                    what: "text",
                    usage: ECHO_USAGE,
                });
            }
            Command::Echo(rest.to_string())
        }
        "snake" => Command::Snake,
        "about" => Command::About,
        _ => return Err(CommandError::NotFound(word)),
    };

    Ok(Some(command))
}
