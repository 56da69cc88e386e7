//! Terminal colour themes

use serde::{Deserialize, Serialize};

/// Named terminal themes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Black,
    White,
    Green,
    Blue,
    Red,
    Yellow,
    Purple,
    Cyan,
    Pink,
}

/// CSS colours for one theme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemePalette {
    pub background: &'static str,
    pub border: &'static str,
    pub header: &'static str,
    pub text: &'static str,
    /// `$` prompt colour
    pub prompt: &'static str,
}

impl Theme {
    pub const ALL: [Theme; 9] = [
        Theme::Black,
        Theme::White,
        Theme::Green,
        Theme::Blue,
        Theme::Red,
        Theme::Yellow,
        Theme::Purple,
        Theme::Cyan,
        Theme::Pink,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Theme::Black => "black",
            Theme::White => "white",
            Theme::Green => "green",
            Theme::Blue => "blue",
            Theme::Red => "red",
            Theme::Yellow => "yellow",
            Theme::Purple => "purple",
            Theme::Cyan => "cyan",
            Theme::Pink => "pink",
        }
    }

    /// Case-insensitive lookup by name
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.to_lowercase();
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    /// Comma separated list for error messages
    pub fn names() -> String {
        Self::ALL.map(|t| t.name()).join(", ")
    }

    pub fn is_light(&self) -> bool {
        matches!(self, Theme::White)
    }

    pub fn palette(&self) -> ThemePalette {
        match self {
            Theme::Black => ThemePalette {
                background: "rgba(10, 10, 15, 0.8)",
                border: "rgba(63, 63, 70, 0.5)",
                header: "rgba(24, 24, 27, 0.7)",
                text: "#ffffff",
                prompt: "#9ca3af",
            },
            Theme::White => ThemePalette {
                background: "rgba(255, 255, 255, 0.9)",
                border: "rgba(209, 213, 219, 0.5)",
                header: "rgba(243, 244, 246, 0.7)",
                text: "#000000",
                prompt: "#1f2937",
            },
            Theme::Green => ThemePalette {
                background: "rgba(10, 15, 10, 0.8)",
                border: "rgba(21, 128, 61, 0.5)",
                header: "rgba(20, 83, 45, 0.7)",
                text: "#ffffff",
                prompt: "#22c55e",
            },
            Theme::Blue => ThemePalette {
                background: "rgba(10, 10, 15, 0.8)",
                border: "rgba(29, 78, 216, 0.5)",
                header: "rgba(30, 58, 138, 0.7)",
                text: "#ffffff",
                prompt: "#3b82f6",
            },
            Theme::Red => ThemePalette {
                background: "rgba(15, 10, 10, 0.8)",
                border: "rgba(185, 28, 28, 0.5)",
                header: "rgba(127, 29, 29, 0.7)",
                text: "#ffffff",
                prompt: "#ef4444",
            },
            Theme::Yellow => ThemePalette {
                background: "rgba(15, 15, 10, 0.8)",
                border: "rgba(161, 98, 7, 0.5)",
                header: "rgba(113, 63, 18, 0.7)",
                text: "#ffffff",
                prompt: "#eab308",
            },
            Theme::Purple => ThemePalette {
                background: "rgba(15, 10, 15, 0.8)",
                border: "rgba(126, 34, 206, 0.5)",
                header: "rgba(88, 28, 135, 0.7)",
                text: "#ffffff",
                prompt: "#a855f7",
            },
            Theme::Cyan => ThemePalette {
                background: "rgba(10, 15, 15, 0.8)",
                border: "rgba(14, 116, 144, 0.5)",
                header: "rgba(22, 78, 99, 0.7)",
                text: "#ffffff",
                prompt: "#06b6d4",
            },
            Theme::Pink => ThemePalette {
                background: "rgba(15, 10, 13, 0.8)",
                border: "rgba(190, 24, 93, 0.5)",
                header: "rgba(131, 24, 67, 0.7)",
                text: "#ffffff",
                prompt: "#ec4899",
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_theme() {
        assert_eq!(Theme::parse("Cyan"), Some(Theme::Cyan));
        assert_eq!(Theme::parse("orange"), None);
        for theme in Theme::ALL {
            assert_eq!(Theme::parse(theme.name()), Some(theme));
        }
    }

    #[test]
    fn test_theme_names_list() {
        assert_eq!(
            Theme::names(),
            "black, white, green, blue, red, yellow, purple, cyan, pink"
        );
    }

    #[test]
    fn test_theme_serde_is_lowercase() {
        assert_eq!(serde_json::to_string(&Theme::Purple).unwrap(), "\"purple\"");
    }
}
