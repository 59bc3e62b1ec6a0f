//! Custom widgets for the game UI

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};

use crate::game::format_clock;

/// Countdown readout, colored by how much of the clock remains.
pub struct TimerBadge {
    seconds: u64,
    total: u64,
}

impl TimerBadge {
    pub fn new(seconds: u64, total: u64) -> Self {
        Self { seconds, total }
    }
}

impl Widget for TimerBadge {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 7 || area.height < 1 {
            return;
        }
        let fraction = if self.total == 0 {
            0.0
        } else {
            self.seconds as f64 / self.total as f64
        };
        let color = if fraction > 0.5 {
            Color::Green
        } else if fraction > 0.2 {
            Color::Yellow
        } else {
            Color::Red
        };
        let text = format!("⏱ {}", format_clock(self.seconds));
        buf.set_string(
            area.x,
            area.y,
            text,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        );
    }
}

/// Per-node display state on the campus map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    Completed,
    Open,
    Locked,
}

impl NodeState {
    pub fn marker(&self) -> &'static str {
        match self {
            NodeState::Completed => "[✔]",
            NodeState::Open => "[▶]",
            NodeState::Locked => "[🔒]",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            NodeState::Completed => Color::Green,
            NodeState::Open => Color::Cyan,
            NodeState::Locked => Color::DarkGray,
        }
    }
}

/// The linear chain of campus nodes, drawn as markers joined by rails.
pub struct RoadmapTrack {
    nodes: Vec<NodeState>,
    highlighted: Option<usize>,
}

impl RoadmapTrack {
    pub fn new(nodes: Vec<NodeState>) -> Self {
        Self {
            nodes,
            highlighted: None,
        }
    }

    pub fn highlight(mut self, index: usize) -> Self {
        self.highlighted = Some(index);
        self
    }
}

impl Widget for RoadmapTrack {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.nodes.is_empty() || area.height < 1 {
            return;
        }
        const RAIL: &str = "━━━━";
        let track_width: u16 = self
            .nodes
            .iter()
            .map(|n| n.marker().chars().count() as u16)
            .sum::<u16>()
            + RAIL.chars().count() as u16 * (self.nodes.len() as u16 - 1);
        let mut x = area.x + area.width.saturating_sub(track_width) / 2;
        let y = area.y + area.height / 2;

        for (i, node) in self.nodes.iter().enumerate() {
            let mut style = Style::default().fg(node.color());
            if self.highlighted == Some(i) {
                style = style.add_modifier(Modifier::BOLD | Modifier::REVERSED);
            }
            buf.set_string(x, y, node.marker(), style);
            x += node.marker().chars().count() as u16;

            if i + 1 < self.nodes.len() {
                let rail_color = if *node == NodeState::Completed {
                    Color::Cyan
                } else {
                    Color::DarkGray
                };
                buf.set_string(x, y, RAIL, Style::default().fg(rail_color));
                x += RAIL.chars().count() as u16;
            }
        }
    }
}

/// A horizontal volume slider for the settings screen.
pub struct VolumeSlider {
    label: String,
    value: u8,
    selected: bool,
}

impl VolumeSlider {
    pub fn new(label: &str, value: u8) -> Self {
        Self {
            label: label.to_string(),
            value,
            selected: false,
        }
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }
}

impl Widget for VolumeSlider {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 12 || area.height < 2 {
            return;
        }
        let label_style = if self.selected {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        let marker = if self.selected { "→ " } else { "  " };
        buf.set_string(
            area.x,
            area.y,
            format!("{}{}: {:>3}%", marker, self.label, self.value),
            label_style,
        );

        let bar_y = area.y + 1;
        let bar_width = area.width.saturating_sub(4);
        let filled = (self.value as u16 * bar_width) / 100;
        buf.set_string(area.x + 2, bar_y, "[", Style::default());
        buf.set_string(area.x + 2 + bar_width + 1, bar_y, "]", Style::default());
        for x in 0..filled {
            buf.set_string(
                area.x + 3 + x,
                bar_y,
                "█",
                Style::default().fg(Color::Cyan),
            );
        }
        for x in filled..bar_width {
            buf.set_string(
                area.x + 3 + x,
                bar_y,
                "░",
                Style::default().fg(Color::DarkGray),
            );
        }
    }
}
