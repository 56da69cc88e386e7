//! Page navigation, static page content and small view helpers
//!
//! Markup is produced as strings here so the browser shell only has to
//! assign `innerHTML`.

use glam::Vec2;

use crate::sim::{GamePhase, SnakeGame};
use crate::terminal::{Line, LineKind};

/// Top-level page tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Home,
    Projects,
    Contact,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Home, Tab::Projects, Tab::Contact];

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Home => "home",
            Tab::Projects => "projects",
            Tab::Contact => "contact",
        }
    }

    /// From a nav label or URL hash (`#projects`)
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().trim_start_matches('#').to_lowercase();
        Self::ALL.into_iter().find(|t| t.label() == s)
    }

    /// Id of the section element shown for this tab
    pub fn section_id(&self) -> String {
        format!("page-{}", self.label())
    }
}

/// Entry on the projects page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Project {
    pub name: &'static str,
    pub badge: Option<&'static str>,
    pub description: &'static str,
    pub logo_url: &'static str,
    pub url: &'static str,
    pub tags: &'static [&'static str],
}

pub const PROJECTS: &[Project] = &[Project {
    name: "BoltBot⚡",
    badge: Some("250k+ users"),
    description: "Discord chatbot focused on features & intelligence.",
    logo_url: "https://cdn.discordapp.com/avatars/1250114494081007697/04cad5a420ee2399dc59235893a7b668.webp?size=1024",
    url: "https://discord.com/oauth2/authorize?client_id=1250114494081007697&permissions=8&scope=bot+applications.commands",
    tags: &["Node.js", "NextJS"],
}];

/// Project cards for the projects page
pub fn projects_html(projects: &[Project]) -> String {
    projects
        .iter()
        .map(|p| {
            let badge = p
                .badge
                .map(|b| format!("<span class=\"project-badge\">{}</span>", escape_html(b)))
                .unwrap_or_default();
            let tags: String = p
                .tags
                .iter()
                .map(|t| format!("<span class=\"project-tag\">{}</span>", escape_html(t)))
                .collect();
            format!(
                "<a class=\"project\" href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">\
                 <img class=\"project-logo\" src=\"{}\" alt=\"{}\">\
                 <div class=\"project-body\"><div class=\"project-title\">{}{}</div>\
                 <p>{}</p><div class=\"project-tags\">{}</div></div></a>",
                escape_html(p.url),
                escape_html(p.logo_url),
                escape_html(p.name),
                escape_html(p.name),
                badge,
                escape_html(p.description),
                tags,
            )
        })
        .collect()
}

/// Escape text for interpolation into HTML
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Terminal history as one `<div>` per line
pub fn terminal_html(history: &[Line]) -> String {
    history
        .iter()
        .map(|line| {
            format!(
                "<div class=\"term-line {}\">{}{}</div>",
                line.kind.css_class(),
                if line.kind == LineKind::Command {
                    "<span class=\"term-prompt\">$ </span>"
                } else {
                    ""
                },
                escape_html(&line.content)
            )
        })
        .collect()
}

/// The snake window's main button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnakeAction {
    Start,
    Pause,
    Resume,
    PlayAgain,
}

impl SnakeAction {
    pub fn for_phase(phase: GamePhase) -> Self {
        match phase {
            GamePhase::Idle => SnakeAction::Start,
            GamePhase::Playing => SnakeAction::Pause,
            GamePhase::Paused => SnakeAction::Resume,
            GamePhase::GameOver => SnakeAction::PlayAgain,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SnakeAction::Start => "Start",
            SnakeAction::Pause => "Pause",
            SnakeAction::Resume => "Resume",
            SnakeAction::PlayAgain => "Play Again",
        }
    }

    pub fn apply(&self, game: &mut SnakeGame) {
        match self {
            SnakeAction::Start | SnakeAction::Resume => game.start(),
            SnakeAction::Pause => game.pause(),
            SnakeAction::PlayAgain => game.play_again(),
        }
    }
}

/// Banner under the board: game over or paused
pub fn snake_banner(game: &SnakeGame) -> Option<String> {
    match game.phase {
        GamePhase::GameOver => Some(format!(
            "<div class=\"snake-over\"><div>Game Over!</div><div>Score: {}</div></div>",
            game.score
        )),
        GamePhase::Paused => Some("<div class=\"snake-paused\">Paused</div>".to_string()),
        _ => None,
    }
}

/// Header drag for the floating terminal and snake windows
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WindowDrag {
    /// Top-left corner in client pixels
    pub pos: Vec2,
    /// Pointer offset from the corner while a drag is active
    offset: Option<Vec2>,
    moved: bool,
}

impl WindowDrag {
    /// Grab the window whose corner is at `corner`
    pub fn begin(&mut self, pointer: Vec2, corner: Vec2) {
        self.pos = corner;
        self.offset = Some(pointer - corner);
        self.moved = false;
    }

    pub fn is_dragging(&self) -> bool {
        self.offset.is_some()
    }

    /// Follow the pointer, keeping a `size` window inside `viewport`.
    /// Returns the new corner while dragging.
    pub fn drag_to(&mut self, pointer: Vec2, viewport: Vec2, size: Vec2) -> Option<Vec2> {
        let offset = self.offset?;
        let pos = clamp_window(pointer - offset, viewport, size);
        if pos != self.pos {
            self.moved = true;
        }
        self.pos = pos;
        Some(pos)
    }

    pub fn end(&mut self) {
        self.offset = None;
    }

    /// Whether the last drag actually moved the window. Cleared on read so
    /// the click that ends a drag can be told apart from a plain click.
    pub fn take_moved(&mut self) -> bool {
        std::mem::take(&mut self.moved)
    }
}

/// Corner position that keeps a `size` window on screen. A window larger
/// than the viewport is pinned to the top-left.
pub fn clamp_window(pos: Vec2, viewport: Vec2, size: Vec2) -> Vec2 {
    let max = (viewport - size).max(Vec2::ZERO);
    pos.clamp(Vec2::ZERO, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SnakeConfig;
    use crate::terminal::Terminal;

    #[test]
    fn test_window_drag_follows_pointer_within_viewport() {
        let viewport = Vec2::new(1024.0, 768.0);
        let size = Vec2::new(320.0, 360.0);
        let mut drag = WindowDrag::default();
        assert_eq!(drag.drag_to(Vec2::new(50.0, 50.0), viewport, size), None);

        drag.begin(Vec2::new(100.0, 130.0), Vec2::new(80.0, 120.0));
        assert!(drag.is_dragging());
        assert_eq!(
            drag.drag_to(Vec2::new(300.0, 330.0), viewport, size),
            Some(Vec2::new(280.0, 320.0))
        );

        // past the right and bottom edges
        assert_eq!(
            drag.drag_to(Vec2::new(2000.0, 2000.0), viewport, size),
            Some(Vec2::new(704.0, 408.0))
        );
        // past the top-left
        assert_eq!(
            drag.drag_to(Vec2::new(-50.0, 0.0), viewport, size),
            Some(Vec2::ZERO)
        );

        drag.end();
        assert!(!drag.is_dragging());
        assert_eq!(drag.pos, Vec2::ZERO);
        assert!(drag.take_moved());
        assert!(!drag.take_moved());
    }

    #[test]
    fn test_window_drag_without_movement_is_a_click() {
        let mut drag = WindowDrag::default();
        drag.begin(Vec2::new(10.0, 10.0), Vec2::new(5.0, 5.0));
        drag.drag_to(Vec2::new(10.0, 10.0), Vec2::new(800.0, 600.0), Vec2::new(100.0, 100.0));
        drag.end();
        assert!(!drag.take_moved());
    }

    #[test]
    fn test_clamp_window_larger_than_viewport() {
        assert_eq!(
            clamp_window(Vec2::new(40.0, 40.0), Vec2::new(300.0, 200.0), Vec2::new(320.0, 360.0)),
            Vec2::ZERO
        );
    }

    #[test]
    fn test_tab_parse() {
        assert_eq!(Tab::parse("#Projects"), Some(Tab::Projects));
        assert_eq!(Tab::parse("contact"), Some(Tab::Contact));
        assert_eq!(Tab::parse(""), None);
        for tab in Tab::ALL {
            assert_eq!(Tab::parse(tab.label()), Some(tab));
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b onclick="x">'hi' & bye</b>"#),
            "&lt;b onclick=&quot;x&quot;&gt;&#39;hi&#39; &amp; bye&lt;/b&gt;"
        );
    }

    #[test]
    fn test_terminal_html_escapes_input() {
        let mut term = Terminal::default();
        term.execute("echo <script>");
        let html = terminal_html(&term.history);
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("term-command"));
        assert_eq!(html.matches("term-line").count(), 3);
    }

    #[test]
    fn test_snake_action_cycle() {
        let mut game = SnakeGame::new(SnakeConfig::default(), 3, 0);
        let action = SnakeAction::for_phase(game.phase);
        assert_eq!(action.label(), "Start");
        action.apply(&mut game);
        assert_eq!(game.phase, GamePhase::Playing);

        SnakeAction::for_phase(game.phase).apply(&mut game);
        assert_eq!(game.phase, GamePhase::Paused);
        assert!(snake_banner(&game).unwrap().contains("Paused"));

        assert_eq!(SnakeAction::for_phase(game.phase), SnakeAction::Resume);
        SnakeAction::Resume.apply(&mut game);
        assert_eq!(game.phase, GamePhase::Playing);
        assert_eq!(snake_banner(&game), None);

        game.phase = GamePhase::GameOver;
        game.score = 30;
        assert!(snake_banner(&game).unwrap().contains("Score: 30"));
        SnakeAction::for_phase(game.phase).apply(&mut game);
        assert_eq!(game.phase, GamePhase::Playing);
        assert_eq!(game.score, 0);
    }

    #[test]
    fn test_projects_html() {
        let html = projects_html(PROJECTS);
        assert_eq!(html.matches("class=\"project\"").count(), PROJECTS.len());
        assert!(html.contains("BoltBot⚡"));
        assert!(html.contains("250k+ users"));
        assert!(html.contains("&amp;permissions=8"));
        assert_eq!(html.matches("project-tag\"").count(), 2);
    }

    #[test]
    fn test_section_ids_are_unique() {
        let ids: std::collections::HashSet<_> = Tab::ALL.iter().map(|t| t.section_id()).collect();
        assert_eq!(ids.len(), Tab::ALL.len());
    }
}
