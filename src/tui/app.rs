//! Main application state and rendering

use crate::audio::{Effect, Playback};
use crate::data::levels::LEVEL_LABELS;
use crate::game::{ChallengeRunner, StatusLine, flags_captured, unlocked_nodes};
use crate::store::{AudioSettings, AudioSettingsStore, DataDir, ProgressStore};
use crate::tui::widgets::{NodeState, RoadmapTrack, TimerBadge, VolumeSlider};
use crate::tui::{ABOUT_TEXT, HELP_TEXT, LOGO, SMALL_LOGO, Theme, create_challenge_layout, create_roadmap_layout, styled_block};
use crate::TOTAL_LEVELS;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, List, ListItem, ListState, Paragraph, Wrap},
};
use std::time::{Duration, Instant};
use tracing::info;

/// How long the locked-node notice stays visible on the map.
const NOTICE_TTL: Duration = Duration::from_millis(700);

/// Current screen being displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    MainMenu,
    Roadmap,
    Challenge,
    Settings,
    About,
}

/// Application state
pub struct App {
    pub running: bool,
    pub theme: Theme,
    screen: Screen,
    show_help: bool,

    menu_state: ListState,
    roadmap_state: ListState,
    confirm_reset: bool,
    roadmap_notice: Option<(String, Instant)>,

    progress: Vec<bool>,
    challenge: Option<ChallengeRunner>,

    settings: AudioSettings,
    settings_row: usize,

    data_dir: DataDir,
    progress_store: ProgressStore,
    settings_store: AudioSettingsStore,
    playback: Playback,
}

impl App {
    pub fn new(data_dir: DataDir, playback: Playback) -> Self {
        let progress_store = ProgressStore::new(data_dir.progress_file());
        let settings_store = AudioSettingsStore::new(data_dir.settings_file());
        let settings = settings_store.load();
        let progress = progress_store.load(TOTAL_LEVELS);

        let mut menu_state = ListState::default();
        menu_state.select(Some(0));
        let mut roadmap_state = ListState::default();
        roadmap_state.select(Some(0));

        // background music starts with the app, best-effort
        playback.play_background();

        Self {
            running: true,
            theme: Theme::default(),
            screen: Screen::MainMenu,
            show_help: false,
            menu_state,
            roadmap_state,
            confirm_reset: false,
            roadmap_notice: None,
            progress,
            challenge: None,
            settings,
            settings_row: 0,
            data_dir,
            progress_store,
            settings_store,
            playback,
        }
    }

    /// Advance time-driven state. Called once per UI loop iteration.
    pub fn update(&mut self) {
        if let Some(runner) = self.challenge.as_mut() {
            runner.poll(&self.playback);
        }
        if let Some((_, shown_at)) = &self.roadmap_notice {
            if shown_at.elapsed() >= NOTICE_TTL {
                self.roadmap_notice = None;
            }
        }
    }

    /// Handle keyboard input
    pub fn handle_input(&mut self) -> std::io::Result<bool> {
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    return Ok(true);
                }

                if self.show_help {
                    self.show_help = false;
                    return Ok(true);
                }

                match self.screen {
                    Screen::MainMenu => self.handle_menu_key(key.code),
                    Screen::Roadmap => self.handle_roadmap_key(key.code),
                    Screen::Challenge => self.handle_challenge_key(key.code),
                    Screen::Settings => self.handle_settings_key(key.code),
                    Screen::About => self.handle_about_key(key.code),
                }
            }
        }
        Ok(self.running)
    }

    fn handle_menu_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.running = false;
            }
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Up => self.navigate(&MenuCursor::Main, -1),
            KeyCode::Down => self.navigate(&MenuCursor::Main, 1),
            KeyCode::Enter => {
                self.playback.play(Effect::Click);
                match self.menu_state.selected().unwrap_or(0) {
                    0 => self.enter_roadmap(),
                    1 => self.screen = Screen::About,
                    2 => self.screen = Screen::Settings,
                    _ => self.running = false,
                }
            }
            _ => {}
        }
    }

    fn handle_roadmap_key(&mut self, code: KeyCode) {
        if self.confirm_reset {
            match code {
                KeyCode::Char('y') | KeyCode::Enter => {
                    self.progress_store.clear();
                    self.progress = self.progress_store.load(TOTAL_LEVELS);
                    self.confirm_reset = false;
                    self.playback.play(Effect::Click);
                    info!("progress reset");
                }
                _ => self.confirm_reset = false,
            }
            return;
        }

        match code {
            KeyCode::Esc => self.screen = Screen::MainMenu,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Char('r') => self.confirm_reset = true,
            KeyCode::Up => self.navigate(&MenuCursor::Roadmap, -1),
            KeyCode::Down => self.navigate(&MenuCursor::Roadmap, 1),
            KeyCode::Enter => {
                let index = self.roadmap_state.selected().unwrap_or(0);
                self.open_level(index);
            }
            _ => {}
        }
    }

    fn handle_challenge_key(&mut self, code: KeyCode) {
        let Some(runner) = self.challenge.as_mut() else {
            self.screen = Screen::Roadmap;
            return;
        };
        match code {
            KeyCode::Esc => {
                self.playback.play(Effect::Click);
                runner.close(&self.playback);
                self.challenge = None;
                self.enter_roadmap();
            }
            KeyCode::Enter => {
                self.playback.play(Effect::Click);
                if runner.started() {
                    runner.submit(&self.playback, &self.progress_store);
                } else {
                    runner.start(&self.playback);
                }
            }
            KeyCode::F(2) => runner.use_hint(&self.playback),
            KeyCode::Backspace => runner.pop_input(),
            KeyCode::Char(c) => runner.push_input(c),
            _ => {}
        }
    }

    fn handle_settings_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc | KeyCode::Enter => {
                self.playback.play(Effect::Click);
                self.screen = Screen::MainMenu;
            }
            KeyCode::Up | KeyCode::Down => self.settings_row = 1 - self.settings_row,
            KeyCode::Left => self.adjust_volume(-5),
            KeyCode::Right => self.adjust_volume(5),
            _ => {}
        }
    }

    fn handle_about_key(&mut self, code: KeyCode) {
        if matches!(code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char(_)) {
            self.screen = Screen::MainMenu;
        }
    }

    fn navigate(&mut self, cursor: &MenuCursor, delta: i32) {
        let (state, len) = match cursor {
            MenuCursor::Main => (&mut self.menu_state, MAIN_MENU_ITEMS.len()),
            MenuCursor::Roadmap => (&mut self.roadmap_state, TOTAL_LEVELS),
        };
        let current = state.selected().unwrap_or(0) as i32;
        let next = (current + delta).rem_euclid(len as i32) as usize;
        state.select(Some(next));
    }

    /// Switch to the roadmap, recomputing unlocks from a fresh load.
    fn enter_roadmap(&mut self) {
        self.progress = self.progress_store.load(TOTAL_LEVELS);
        self.screen = Screen::Roadmap;
    }

    fn open_level(&mut self, index: usize) {
        let unlocked = unlocked_nodes(&self.progress);
        if !unlocked.get(index).copied().unwrap_or(false) {
            self.roadmap_notice = Some((
                "Locked. Capture the previous flag first.".to_string(),
                Instant::now(),
            ));
            return;
        }
        self.playback.play(Effect::Click);
        match ChallengeRunner::new(index, self.data_dir.downloads_dir()) {
            Ok(runner) => {
                info!(level = index + 1, "terminal opened");
                self.challenge = Some(runner);
                self.screen = Screen::Challenge;
            }
            Err(err) => {
                self.roadmap_notice = Some((format!("{err}"), Instant::now()));
            }
        }
    }

    /// Persist a volume change and re-apply it to the playback layer
    /// immediately.
    fn adjust_volume(&mut self, delta: i64) {
        let (mut bg, mut fx) = (self.settings.background as i64, self.settings.effects as i64);
        if self.settings_row == 0 {
            bg += delta;
        } else {
            fx += delta;
        }
        self.settings = self.settings_store.save(bg, fx);
        self.playback
            .set_volumes(self.settings.background, self.settings.effects);
    }

    /// Render the current screen
    pub fn render(&mut self, frame: &mut Frame) {
        match self.screen {
            Screen::MainMenu => self.render_main_menu(frame),
            Screen::Roadmap => self.render_roadmap(frame),
            Screen::Challenge => self.render_challenge(frame),
            Screen::Settings => self.render_settings(frame),
            Screen::About => self.render_about(frame),
        }
        if self.show_help {
            self.render_help_overlay(frame);
        }
    }

    fn render_main_menu(&mut self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Clear, area);

        let logo_height = LOGO.lines().count() as u16;
        let menu_height = MAIN_MENU_ITEMS.len() as u16 + 2;
        let start_y = area.height.saturating_sub(logo_height + menu_height + 2) / 2;

        let logo_area = Rect::new(
            area.x,
            start_y,
            area.width,
            logo_height.min(area.height.saturating_sub(start_y)),
        );
        let logo = Paragraph::new(LOGO)
            .style(Style::default().fg(self.theme.accent))
            .alignment(Alignment::Center);
        frame.render_widget(logo, logo_area);

        let menu_y = start_y + logo_height + 1;
        let menu_area = Rect::new(
            area.width / 4,
            menu_y.min(area.height.saturating_sub(menu_height).saturating_sub(1)),
            area.width / 2,
            menu_height.min(area.height.saturating_sub(menu_y).saturating_sub(1)),
        );

        let items: Vec<ListItem> = MAIN_MENU_ITEMS
            .iter()
            .map(|(icon, label)| ListItem::new(format!("  {icon} {label}")))
            .collect();
        let menu = List::new(items)
            .block(styled_block("Main Menu", &self.theme))
            .highlight_style(
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED),
            )
            .highlight_symbol("→ ");
        frame.render_stateful_widget(menu, menu_area, &mut self.menu_state);

        if area.height > 1 {
            let footer = Paragraph::new("Press ? for help | q to quit")
                .style(Style::default().fg(self.theme.border))
                .alignment(Alignment::Center);
            frame.render_widget(
                footer,
                Rect::new(0, area.height.saturating_sub(1), area.width, 1),
            );
        }
    }

    fn render_roadmap(&mut self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Clear, area);
        let layout = create_roadmap_layout(area);

        // Top bar: logo, title, flags captured, wall clock
        let top = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(20),
                Constraint::Min(20),
                Constraint::Length(26),
            ])
            .split(layout[0]);
        let logo = Paragraph::new(SMALL_LOGO)
            .style(Style::default().fg(self.theme.accent).add_modifier(Modifier::BOLD))
            .block(styled_block("", &self.theme));
        frame.render_widget(logo, top[0]);
        let title = Paragraph::new("CAMPUS MAP")
            .style(Style::default().fg(self.theme.header).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center)
            .block(styled_block("", &self.theme));
        frame.render_widget(title, top[1]);
        let status_text = format!(
            " Flags {}/{} | {} ",
            flags_captured(&self.progress),
            TOTAL_LEVELS,
            chrono::Local::now().format("%H:%M:%S"),
        );
        let status = Paragraph::new(status_text)
            .alignment(Alignment::Right)
            .block(styled_block("", &self.theme));
        frame.render_widget(status, top[2]);

        // The chain of nodes
        let unlocked = unlocked_nodes(&self.progress);
        let nodes: Vec<NodeState> = (0..TOTAL_LEVELS)
            .map(|i| {
                if self.progress[i] {
                    NodeState::Completed
                } else if unlocked[i] {
                    NodeState::Open
                } else {
                    NodeState::Locked
                }
            })
            .collect();
        let track = RoadmapTrack::new(nodes.clone())
            .highlight(self.roadmap_state.selected().unwrap_or(0));
        frame.render_widget(track, layout[1]);

        // Node list with labels
        let items: Vec<ListItem> = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| {
                let status = match node {
                    NodeState::Completed => "flag captured",
                    NodeState::Open => "open",
                    NodeState::Locked => "locked",
                };
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("  {} ", node.marker()),
                        Style::default().fg(node.color()),
                    ),
                    Span::styled(
                        format!("Level {}  {:<16}", i + 1, LEVEL_LABELS[i]),
                        Style::default().fg(self.theme.fg),
                    ),
                    Span::styled(status, Style::default().fg(node.color())),
                ]))
            })
            .collect();
        let list = List::new(items)
            .block(styled_block("Buildings", &self.theme))
            .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED))
            .highlight_symbol("→ ");
        frame.render_stateful_widget(list, layout[2], &mut self.roadmap_state);

        // Notice + key hints
        let footer_text = match &self.roadmap_notice {
            Some((notice, _)) => Line::from(Span::styled(
                format!(" {notice} "),
                Style::default().fg(self.theme.alert).add_modifier(Modifier::BOLD),
            )),
            None => Line::from(Span::styled(
                " Enter open terminal | r reset progress | Esc main menu ",
                Style::default().fg(self.theme.muted),
            )),
        };
        frame.render_widget(Paragraph::new(footer_text), layout[3]);

        if self.confirm_reset {
            self.render_reset_popup(frame);
        }
    }

    fn render_challenge(&mut self, frame: &mut Frame) {
        let Some(runner) = &self.challenge else {
            return;
        };
        let mut area = frame.area();
        frame.render_widget(Clear, area);

        // Wrong-flag shake: nudge the whole window sideways while the
        // one-shot is active.
        if runner.shaking() {
            let phase = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_millis() / 60 % 2)
                .unwrap_or(0);
            if phase == 1 && area.width > 2 {
                area = Rect::new(area.x + 1, area.y, area.width - 2, area.height);
            }
        }
        let layout = create_challenge_layout(area);

        // Header: level title, countdown, close hint
        let header = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Min(20),
                Constraint::Length(10),
                Constraint::Length(9),
            ])
            .split(layout[0]);
        let border_color = if runner.shaking() {
            self.theme.alert
        } else {
            self.theme.border
        };
        let title = Paragraph::new(format!(
            "Level {} · {}",
            runner.level_index() + 1,
            runner.title()
        ))
        .style(Style::default().fg(self.theme.accent).add_modifier(Modifier::BOLD))
        .block(styled_block("", &self.theme).border_style(Style::default().fg(border_color)));
        frame.render_widget(title, header[0]);
        frame.render_widget(
            TimerBadge::new(runner.time_left(), runner.duration().max(1)),
            header[1].inner(ratatui::layout::Margin::new(1, 1)),
        );
        let close = Paragraph::new("Esc ✕")
            .alignment(Alignment::Right)
            .style(Style::default().fg(self.theme.muted))
            .block(styled_block("", &self.theme));
        frame.render_widget(close, header[2]);

        // Story
        let story = Paragraph::new(runner.story())
            .wrap(Wrap { trim: false })
            .style(Style::default().fg(self.theme.fg))
            .block(styled_block("Briefing", &self.theme));
        frame.render_widget(story, layout[1]);

        // Resources
        let resource_lines: Vec<Line> = if !runner.started() {
            vec![Line::from(Span::styled(
                "Start the terminal for more information",
                Style::default().fg(self.theme.muted),
            ))]
        } else if runner.resources().is_empty() {
            vec![Line::from(Span::styled(
                "No resources for this level",
                Style::default().fg(self.theme.muted),
            ))]
        } else {
            runner
                .resources()
                .iter()
                .map(|entry| {
                    if entry.is_portal {
                        Line::from(vec![
                            Span::styled("🌐 ", Style::default().fg(self.theme.info)),
                            Span::raw("Here is the link to the site: "),
                            Span::styled(
                                entry.url.clone(),
                                Style::default()
                                    .fg(self.theme.info)
                                    .add_modifier(Modifier::UNDERLINED),
                            ),
                        ])
                    } else {
                        let icon = if entry.is_image { "🖼 " } else { "📄 " };
                        let location = if entry.materialized {
                            format!("saved to {}", entry.url)
                        } else {
                            entry.url.clone()
                        };
                        Line::from(vec![
                            Span::styled(icon, Style::default().fg(self.theme.success)),
                            Span::styled(
                                format!("{}  ", entry.name),
                                Style::default().fg(self.theme.fg).add_modifier(Modifier::BOLD),
                            ),
                            Span::styled(location, Style::default().fg(self.theme.muted)),
                        ])
                    }
                })
                .collect()
        };
        let resources = Paragraph::new(resource_lines)
            .wrap(Wrap { trim: true })
            .block(styled_block("Resources", &self.theme));
        frame.render_widget(resources, layout[2]);

        // Flag input, status, hint
        let mut control_lines: Vec<Line> = Vec::new();
        if runner.started() {
            let input_color = match runner.status() {
                StatusLine::Error(_) => self.theme.alert,
                _ => self.theme.success,
            };
            control_lines.push(Line::from(vec![
                Span::styled("flag> ", Style::default().fg(self.theme.accent)),
                Span::styled(
                    format!("{}_", runner.input()),
                    Style::default().fg(input_color),
                ),
            ]));
            control_lines.push(Line::from(Span::styled(
                "[Enter] submit",
                Style::default().fg(self.theme.muted),
            )));
        } else {
            control_lines.push(Line::from(Span::styled(
                "[Enter] START",
                Style::default().fg(self.theme.success).add_modifier(Modifier::BOLD),
            )));
        }
        if runner.has_hint() {
            let hint_key = if runner.hint_used() {
                Span::styled("[F2] hint used", Style::default().fg(self.theme.muted))
            } else {
                Span::styled("[F2] reveal hint (costs time)", Style::default().fg(self.theme.warning))
            };
            control_lines.push(Line::from(hint_key));
        }
        control_lines.push(status_line(runner.status(), &self.theme));
        if let Some(notice) = runner.hint_notice() {
            control_lines.push(Line::from(Span::styled(
                notice.to_string(),
                Style::default().fg(self.theme.warning),
            )));
        }
        if let Some(hint) = runner.visible_hint() {
            control_lines.push(Line::from(vec![
                Span::styled(
                    "Hint: ",
                    Style::default().fg(self.theme.warning).add_modifier(Modifier::BOLD),
                ),
                Span::styled(hint.to_string(), Style::default().fg(self.theme.fg)),
            ]));
        }
        let controls = Paragraph::new(control_lines)
            .wrap(Wrap { trim: true })
            .block(
                styled_block("Terminal", &self.theme)
                    .border_style(Style::default().fg(border_color)),
            );
        frame.render_widget(controls, layout[3]);

        // Footer tip
        let tip = Paragraph::new("Tip: flags are case-sensitive and must be submitted exactly.")
            .style(Style::default().fg(self.theme.muted));
        frame.render_widget(tip, layout[4]);
    }

    fn render_settings(&mut self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Clear, area);

        let popup = centered_popup(area, 50, 12);
        let block = styled_block("SYSTEM CONFIGURATION", &self.theme);
        let inner = block.inner(popup);
        frame.render_widget(block, popup);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(1),
                Constraint::Length(2),
                Constraint::Min(2),
            ])
            .split(inner);

        frame.render_widget(
            VolumeSlider::new("Background Music", self.settings.background)
                .selected(self.settings_row == 0),
            rows[0],
        );
        frame.render_widget(
            VolumeSlider::new("Sound Effects", self.settings.effects)
                .selected(self.settings_row == 1),
            rows[2],
        );

        let help = Paragraph::new("↑/↓ select | ←/→ adjust | Enter save and close")
            .alignment(Alignment::Center)
            .style(Style::default().fg(self.theme.muted));
        frame.render_widget(help, rows[3]);
    }

    fn render_about(&mut self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Clear, area);

        let popup = centered_popup(area, 64, 20);
        let about = Paragraph::new(ABOUT_TEXT)
            .wrap(Wrap { trim: false })
            .style(Style::default().fg(self.theme.fg))
            .block(styled_block("ABOUT", &self.theme));
        frame.render_widget(about, popup);
    }

    fn render_reset_popup(&self, frame: &mut Frame) {
        let area = frame.area();
        let popup = centered_popup(area, 48, 7);
        frame.render_widget(Clear, popup);

        let text = vec![
            Line::from(""),
            Line::from("Reset saved progress?"),
            Line::from("Only Level 1 will stay unlocked."),
            Line::from(""),
            Line::from(vec![
                Span::styled("y", Style::default().fg(self.theme.success).add_modifier(Modifier::BOLD)),
                Span::raw(" confirm   "),
                Span::styled("any other key", Style::default().fg(self.theme.muted)),
                Span::raw(" cancel"),
            ]),
        ];
        let popup_widget = Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(
                styled_block("Reset Progress", &self.theme)
                    .border_style(Style::default().fg(self.theme.warning)),
            );
        frame.render_widget(popup_widget, popup);
    }

    fn render_help_overlay(&self, frame: &mut Frame) {
        let area = frame.area();
        let popup = centered_popup(area, 63, 22);
        frame.render_widget(Clear, popup);

        let help = Paragraph::new(HELP_TEXT)
            .style(Style::default().fg(self.theme.fg))
            .block(styled_block("Help", &self.theme));
        frame.render_widget(help, popup);
    }
}

enum MenuCursor {
    Main,
    Roadmap,
}

const MAIN_MENU_ITEMS: [(&str, &str); 4] = [
    ("▶", "GAME ROADMAP"),
    ("ℹ", "ABOUT"),
    ("⚙", "SETTINGS"),
    ("✕", "QUIT"),
];

fn status_line<'a>(status: &StatusLine, theme: &Theme) -> Line<'a> {
    match status {
        StatusLine::Idle => Line::from(Span::styled(
            "Awaiting submission",
            Style::default().fg(theme.muted),
        )),
        StatusLine::Info(text) => Line::from(Span::styled(
            text.clone(),
            Style::default().fg(theme.info),
        )),
        StatusLine::Error(text) => Line::from(Span::styled(
            text.clone(),
            Style::default().fg(theme.alert).add_modifier(Modifier::BOLD),
        )),
        StatusLine::Success(text) => Line::from(Span::styled(
            text.clone(),
            Style::default().fg(theme.success).add_modifier(Modifier::BOLD),
        )),
        StatusLine::Timeout(text) => Line::from(Span::styled(
            text.clone(),
            Style::default().fg(theme.alert).add_modifier(Modifier::BOLD),
        )),
    }
}

fn centered_popup(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(2));
    let height = height.min(area.height.saturating_sub(2));
    Rect::new(
        area.x + (area.width.saturating_sub(width)) / 2,
        area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    )
}
