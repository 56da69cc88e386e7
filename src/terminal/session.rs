//! Terminal session state

use super::command::{Command, parse_command};
use super::theme::Theme;

pub const BANNER: &str = "Terminal v1.0.0 - Type \"help\" for available commands";

/// Oldest lines are dropped past this
pub const MAX_HISTORY: usize = 200;

const HELP_TEXT: &str = "Available commands:
- ping: Test connectivity
- clear: Clear console
- color [name]: Change terminal color
- close: Close the terminal
- minimize: Minimize the terminal
- echo [text]: Echo text back
- snake: Play snake game
- about: About this terminal";

const ABOUT_TEXT: &str = "czch terminal v1.0.0
Built with Rust & WebAssembly
Created by @lucasczch
Type 'help' for commands";

/// Kind of a history line (drives styling)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    System,
    Command,
    Output,
    Error,
}

impl LineKind {
    pub fn css_class(&self) -> &'static str {
        match self {
            LineKind::System => "term-system",
            LineKind::Command => "term-command",
            LineKind::Output => "term-output",
            LineKind::Error => "term-error",
        }
    }
}

/// One line of terminal history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub kind: LineKind,
    pub content: String,
}

impl Line {
    fn new(kind: LineKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }
}

/// Window-level effects the host has to carry out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalEffect {
    Close,
    Minimize,
    LaunchSnake,
    ThemeChanged(Theme),
}

/// Terminal window state
#[derive(Debug, Clone)]
pub struct Terminal {
    pub history: Vec<Line>,
    pub theme: Theme,
    pub minimized: bool,
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new(Theme::default())
    }
}

impl Terminal {
    pub fn new(theme: Theme) -> Self {
        Self {
            history: vec![Line::new(LineKind::System, BANNER)],
            theme,
            minimized: false,
        }
    }

    /// Run one submitted line. Blank input is ignored entirely.
    pub fn execute(&mut self, input: &str) -> Option<TerminalEffect> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return None;
        }

        self.push(LineKind::Command, trimmed);

        let command = match parse_command(trimmed) {
            Ok(Some(command)) => command,
            Ok(None) => return None,
            Err(e) => {
                self.push(LineKind::Error, e.to_string());
                return None;
            }
        };

        match command {
            Command::Help => {
                self.push(LineKind::Output, HELP_TEXT);
                None
            }
            Command::Ping => {
                self.push(LineKind::Output, "pong!");
                None
            }
            Command::Clear => {
                self.history = vec![Line::new(LineKind::System, BANNER)];
                None
            }
            Command::Color(theme) => {
                self.theme = theme;
                self.push(
                    LineKind::Output,
                    format!("Terminal theme changed to {}", theme.name()),
                );
                Some(TerminalEffect::ThemeChanged(theme))
            }
            Command::Close => Some(TerminalEffect::Close),
            Command::Minimize => {
                self.minimized = true;
                Some(TerminalEffect::Minimize)
            }
            Command::Echo(text) => {
                self.push(LineKind::Output, text);
                None
            }
            Command::Snake => {
                self.push(
                    LineKind::Output,
                    "Starting snake... arrow keys/WASD on desktop, swipe on mobile.",
                );
                Some(TerminalEffect::LaunchSnake)
            }
            Command::About => {
                self.push(LineKind::Output, ABOUT_TEXT);
                None
            }
        }
    }

    pub fn toggle_minimized(&mut self) {
        self.minimized = !self.minimized;
    }

    fn push(&mut self, kind: LineKind, content: impl Into<String>) {
        self.history.push(Line::new(kind, content));
        if self.history.len() > MAX_HISTORY {
            let excess = self.history.len() - MAX_HISTORY;
            self.history.drain(..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn last(term: &Terminal) -> &Line {
        term.history.last().unwrap()
    }

    #[test]
    fn test_starts_with_banner() {
        let term = Terminal::default();
        assert_eq!(term.history, vec![Line::new(LineKind::System, BANNER)]);
    }

    #[test]
    fn test_ping_and_echo() {
        let mut term = Terminal::default();
        assert_eq!(term.execute("ping"), None);
        assert_eq!(term.history[1], Line::new(LineKind::Command, "ping"));
        assert_eq!(last(&term), &Line::new(LineKind::Output, "pong!"));

        term.execute("echo  hi there ");
        assert_eq!(last(&term), &Line::new(LineKind::Output, "hi there"));
    }

    #[test]
    fn test_errors_leave_state_alone() {
        let mut term = Terminal::default();
        term.execute("color mauve");
        assert_eq!(last(&term).kind, LineKind::Error);
        assert_eq!(term.theme, Theme::Black);
        assert!(!term.minimized);

        term.execute("frobnicate");
        assert_eq!(last(&term).kind, LineKind::Error);
    }

    #[test]
    fn test_color_changes_theme() {
        let mut term = Terminal::default();
        let effect = term.execute("color pink");
        assert_eq!(effect, Some(TerminalEffect::ThemeChanged(Theme::Pink)));
        assert_eq!(term.theme, Theme::Pink);
        assert_eq!(last(&term).content, "Terminal theme changed to pink");
    }

    #[test]
    fn test_clear_resets_to_banner() {
        let mut term = Terminal::default();
        term.execute("help");
        term.execute("about");
        term.execute("clear");
        assert_eq!(term.history.len(), 1);
        assert_eq!(term.history[0].content, BANNER);
    }

    #[test]
    fn test_window_effects() {
        let mut term = Terminal::default();
        assert_eq!(term.execute("close"), Some(TerminalEffect::Close));
        assert_eq!(term.execute("minimize"), Some(TerminalEffect::Minimize));
        assert!(term.minimized);
        assert_eq!(term.execute("snake"), Some(TerminalEffect::LaunchSnake));
    }

    #[test]
    fn test_blank_input_ignored() {
        let mut term = Terminal::default();
        assert_eq!(term.execute("   "), None);
        assert_eq!(term.history.len(), 1);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut term = Terminal::default();
        for i in 0..MAX_HISTORY {
            term.execute(&format!("echo {i}"));
        }
        assert_eq!(term.history.len(), MAX_HISTORY);
        assert_eq!(last(&term).content, format!("{}", MAX_HISTORY - 1));
    }
}
