//! Terminal User Interface
//!
//! Neon campus-terminal look for the game, built with ratatui

pub mod app;
pub mod widgets;

pub use app::App;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders},
};

/// Color scheme for the game
pub struct Theme {
    pub fg: Color,
    pub accent: Color,
    pub alert: Color,
    pub success: Color,
    pub warning: Color,
    pub info: Color,
    pub border: Color,
    pub header: Color,
    pub muted: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            fg: Color::White,
            accent: Color::Cyan,
            alert: Color::Red,
            success: Color::Green,
            warning: Color::Yellow,
            info: Color::Blue,
            border: Color::DarkGray,
            header: Color::Magenta,
            muted: Color::DarkGray,
        }
    }
}

/// Create a styled border block
pub fn styled_block<'a>(title: &str, theme: &Theme) -> Block<'a> {
    Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
}

/// ASCII art logo
pub const LOGO: &str = r#"
██╗  ██╗ █████╗  ██████╗██╗  ██╗    ████████╗██╗  ██╗███████╗
██║  ██║██╔══██╗██╔════╝██║ ██╔╝    ╚══██╔══╝██║  ██║██╔════╝
███████║███████║██║     █████╔╝        ██║   ███████║█████╗
██╔══██║██╔══██║██║     ██╔═██╗        ██║   ██╔══██║██╔══╝
██║  ██║██║  ██║╚██████╗██║  ██╗       ██║   ██║  ██║███████╗
╚═╝  ╚═╝╚═╝  ╚═╝ ╚═════╝╚═╝  ╚═╝       ╚═╝   ╚═╝  ╚═╝╚══════╝

         ██████╗ █████╗ ███╗   ███╗██████╗ ██╗   ██╗███████╗
        ██╔════╝██╔══██╗████╗ ████║██╔══██╗██║   ██║██╔════╝
        ██║     ███████║██╔████╔██║██████╔╝██║   ██║███████╗
        ██║     ██╔══██║██║╚██╔╝██║██╔═══╝ ██║   ██║╚════██║
        ╚██████╗██║  ██║██║ ╚═╝ ██║██║     ╚██████╔╝███████║
         ╚═════╝╚═╝  ╚═╝╚═╝     ╚═╝╚═╝      ╚═════╝ ╚══════╝

       Interactive CTF training · Cybersecurity challenges
"#;

/// Smaller logo for headers
pub const SMALL_LOGO: &str = " HACK THE CAMPUS ";

/// Help text
pub const HELP_TEXT: &str = r#"
╔═══════════════════════════════════════════════════════════╗
║                       CONTROLS                            ║
╠═══════════════════════════════════════════════════════════╣
║  ↑/↓    Navigate menus and map nodes                      ║
║  Enter  Select / Start terminal / Submit flag             ║
║  Esc    Go back / Close terminal                          ║
║  ?      Toggle this help                                  ║
║  q      Quit (from the main menu)                         ║
╠═══════════════════════════════════════════════════════════╣
║                      IN A TERMINAL                        ║
╠═══════════════════════════════════════════════════════════╣
║  Enter  Start the terminal, then submit the typed flag    ║
║  F2     Reveal the hint (costs time!)                     ║
║  Esc    Close and return to the campus map                ║
╠═══════════════════════════════════════════════════════════╣
║                      ON THE MAP                           ║
╠═══════════════════════════════════════════════════════════╣
║  r      Reset saved progress (asks first)                 ║
╚═══════════════════════════════════════════════════════════╝
"#;

/// About text shown from the main menu
pub const ABOUT_TEXT: &str = r#"
HACK THE CAMPUS

A capture-the-flag training game. Someone calling themselves
ShadowRoot has been creeping through the campus network, and
you are the student who noticed. Follow their trail across
five buildings, crack each terminal before it locks, and
submit the flags you recover.

Flags are case-sensitive and must be submitted exactly,
in the format flag{...}.

Progress is saved in your home directory. Challenge files
land in the downloads folder next to it.
"#;

/// Create the challenge screen layout
pub fn create_challenge_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Header: title + timer
            Constraint::Min(8),     // Story
            Constraint::Length(6),  // Resources
            Constraint::Length(8),  // Flag input + status + hint
            Constraint::Length(1),  // Footer tip
        ])
        .split(area)
        .to_vec()
}

/// Create the roadmap screen layout
pub fn create_roadmap_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Top bar
            Constraint::Length(4),  // Node track
            Constraint::Min(7),     // Node list
            Constraint::Length(2),  // Notices + key hints
        ])
        .split(area)
        .to_vec()
}
