//! Timed challenge lifecycle
//!
//! One `ChallengeRunner` per open level. The runner is a small state
//! machine: `NotStarted -> Running -> Success | TimedOut`, with wrong
//! submissions surfacing an error status while staying in Running. The
//! countdown is an owned handle; every exit path drops it, so a stale
//! timer can never tick into a new instance.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::audio::{Effect, Playback};
use crate::data::{self, LevelSpec, ResourceEntry, levels};
use crate::store::ProgressStore;
use crate::{Result, TOTAL_LEVELS};

/// How long the hint-penalty notice stays on screen.
const HINT_NOTICE_TTL: Duration = Duration::from_millis(4200);

/// How long the wrong-flag shake lasts. Retriggered on every miss.
const SHAKE_DURATION: Duration = Duration::from_millis(600);

/// Lifecycle states of a challenge instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    NotStarted,
    Running,
    Success,
    TimedOut,
}

/// What the status line under the flag input shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusLine {
    Idle,
    Info(String),
    Error(String),
    Success(String),
    Timeout(String),
}

/// Owned countdown handle. Held only while the challenge is running;
/// dropping it releases the timer on every exit path.
struct Countdown {
    last_tick: Instant,
}

impl Countdown {
    fn start() -> Self {
        Self {
            last_tick: Instant::now(),
        }
    }

    /// Whole seconds elapsed since the last accounted tick.
    fn due_ticks(&mut self) -> u64 {
        let ticks = self.last_tick.elapsed().as_secs();
        self.last_tick += Duration::from_secs(ticks);
        ticks
    }
}

/// One active play-through of one level's puzzle.
pub struct ChallengeRunner {
    level_index: usize,
    spec: LevelSpec,
    downloads_dir: PathBuf,

    state: RunnerState,
    status: StatusLine,
    time_left: u64,
    input: String,
    locked: bool,

    hint_used: bool,
    hint_visible: bool,
    hint_notice: Option<(String, Instant)>,
    shake_until: Option<Instant>,

    resources: Vec<ResourceEntry>,
    countdown: Option<Countdown>,
}

impl ChallengeRunner {
    /// Build a fresh instance for a catalog level. All state starts at
    /// defaults; any previous instance (and its countdown) should be
    /// dropped before this one begins.
    pub fn new(level_index: usize, downloads_dir: PathBuf) -> Result<Self> {
        Ok(Self::from_spec(
            level_index,
            levels::level(level_index)?,
            downloads_dir,
        ))
    }

    pub fn from_spec(level_index: usize, spec: LevelSpec, downloads_dir: PathBuf) -> Self {
        let time_left = spec.duration_seconds;
        Self {
            level_index,
            spec,
            downloads_dir,
            state: RunnerState::NotStarted,
            status: StatusLine::Idle,
            time_left,
            input: String::new(),
            locked: false,
            hint_used: false,
            hint_visible: false,
            hint_notice: None,
            shake_until: None,
            resources: Vec::new(),
            countdown: None,
        }
    }

    /// Start the terminal: resolve resources, arm the countdown, kick
    /// off background audio. A second start while already started is a
    /// no-op.
    pub fn start(&mut self, audio: &Playback) {
        if self.state != RunnerState::NotStarted {
            return;
        }
        self.resources = data::resolve_resources(&self.spec, self.level_index, &self.downloads_dir);
        self.state = RunnerState::Running;
        self.status = StatusLine::Idle;
        self.locked = false;
        self.time_left = self.spec.duration_seconds;
        self.countdown = Some(Countdown::start());
        audio.play_background();
    }

    /// Convert wall-clock time into one-second ticks. Called from the
    /// UI loop; does nothing unless the countdown is armed.
    pub fn poll(&mut self, audio: &Playback) {
        let due = match self.countdown.as_mut() {
            Some(countdown) => countdown.due_ticks(),
            None => 0,
        };
        for _ in 0..due {
            if self.countdown.is_none() {
                break;
            }
            self.tick(audio);
        }
    }

    /// Apply one second of countdown. Hitting zero locks the terminal.
    pub fn tick(&mut self, audio: &Playback) {
        if self.state != RunnerState::Running || self.countdown.is_none() {
            return;
        }
        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left == 0 {
            self.countdown = None;
            self.state = RunnerState::TimedOut;
            self.locked = true;
            self.status = StatusLine::Timeout("Time's up! The terminal locked.".to_string());
            audio.stop_background();
        }
    }

    /// Reveal the hint, once per instance, at the configured cost.
    pub fn use_hint(&mut self, audio: &Playback) {
        if self.spec.hint_text.is_none()
            || self.hint_used
            || self.state != RunnerState::Running
            || self.locked
        {
            return;
        }
        self.hint_used = true;
        self.hint_visible = true;
        let penalty = self.spec.hint_penalty_seconds;
        self.time_left = self.time_left.saturating_sub(penalty);
        self.hint_notice = Some((
            format!(
                "Hint used: {} deducted from timer",
                format_penalty(penalty)
            ),
            Instant::now(),
        ));
        self.status = StatusLine::Info("Hint revealed. Time penalty applied.".to_string());
        audio.play(Effect::Click);
    }

    /// Compare the submitted flag against the expected one. Ignored
    /// unless the terminal is running and unlocked.
    pub fn submit(&mut self, audio: &Playback, progress: &ProgressStore) {
        if self.state != RunnerState::Running || self.locked {
            return;
        }
        let trimmed = self.input.trim();
        if trimmed == self.spec.expected_flag {
            self.state = RunnerState::Success;
            self.locked = true;
            self.countdown = None;
            progress.mark_completed(self.level_index, TOTAL_LEVELS);
            audio.play(Effect::Success);
            audio.stop_background();
            self.status = StatusLine::Success(
                "Correct flag! Level complete. Press Esc to return to the map.".to_string(),
            );
            return;
        }
        audio.play(Effect::Wrong);
        self.status = StatusLine::Error("Flag incorrect. Try again.".to_string());
        self.shake_until = Some(Instant::now() + SHAKE_DURATION);
    }

    /// Tear down the instance: cancel the countdown, silence the
    /// background channel. Available in any state; the only way out of
    /// a completed or timed-out terminal.
    pub fn close(&mut self, audio: &Playback) {
        self.countdown = None;
        audio.stop_background();
    }

    pub fn push_input(&mut self, c: char) {
        if self.state == RunnerState::Running && !self.locked {
            self.input.push(c);
        }
    }

    pub fn pop_input(&mut self) {
        if self.state == RunnerState::Running && !self.locked {
            self.input.pop();
        }
    }

    pub fn state(&self) -> RunnerState {
        self.state
    }

    pub fn status(&self) -> &StatusLine {
        &self.status
    }

    pub fn started(&self) -> bool {
        self.state != RunnerState::NotStarted
    }

    pub fn locked(&self) -> bool {
        self.locked
    }

    pub fn time_left(&self) -> u64 {
        self.time_left
    }

    pub fn duration(&self) -> u64 {
        self.spec.duration_seconds
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn level_index(&self) -> usize {
        self.level_index
    }

    pub fn title(&self) -> &str {
        &self.spec.title
    }

    pub fn story(&self) -> &str {
        &self.spec.story
    }

    pub fn resources(&self) -> &[ResourceEntry] {
        &self.resources
    }

    pub fn has_hint(&self) -> bool {
        self.spec.hint_text.is_some()
    }

    pub fn hint_used(&self) -> bool {
        self.hint_used
    }

    /// The hint text, once revealed.
    pub fn visible_hint(&self) -> Option<&str> {
        if self.hint_visible {
            self.spec.hint_text.as_deref()
        } else {
            None
        }
    }

    /// The transient penalty notice, until it expires.
    pub fn hint_notice(&self) -> Option<&str> {
        match &self.hint_notice {
            Some((text, shown_at)) if shown_at.elapsed() < HINT_NOTICE_TTL => Some(text),
            _ => None,
        }
    }

    /// Whether the wrong-flag shake is currently active.
    pub fn shaking(&self) -> bool {
        self.shake_until.is_some_and(|until| Instant::now() < until)
    }
}

/// `MM:SS`, both zero-padded.
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// `M:SS`, minutes unpadded. Used for the hint penalty notice.
fn format_penalty(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::levels;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        audio: Playback,
        progress: ProgressStore,
        downloads: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let progress = ProgressStore::new(dir.path().join("progress.json"));
            let downloads = dir.path().join("downloads");
            Self {
                _dir: dir,
                audio: Playback::disabled(),
                progress,
                downloads,
            }
        }

        fn runner(&self, level_index: usize) -> ChallengeRunner {
            ChallengeRunner::new(level_index, self.downloads.clone()).unwrap()
        }

        fn runner_with(&self, level_index: usize, spec: LevelSpec) -> ChallengeRunner {
            ChallengeRunner::from_spec(level_index, spec, self.downloads.clone())
        }
    }

    fn type_flag(runner: &mut ChallengeRunner, flag: &str) {
        for c in flag.chars() {
            runner.push_input(c);
        }
    }

    #[test]
    fn correct_flag_succeeds_once_and_persists() {
        let fx = Fixture::new();
        let mut runner = fx.runner(0); // Library, 600s, flag{Hello_Campus}
        runner.start(&fx.audio);
        assert_eq!(runner.time_left(), 600);

        type_flag(&mut runner, "flag{Hello_Campus}");
        runner.submit(&fx.audio, &fx.progress);

        assert_eq!(runner.state(), RunnerState::Success);
        assert!(runner.locked());
        assert_eq!(runner.time_left(), 600);
        assert_eq!(
            fx.progress.load(TOTAL_LEVELS),
            vec![true, false, false, false, false]
        );

        // countdown released: further ticks change nothing
        runner.tick(&fx.audio);
        assert_eq!(runner.time_left(), 600);

        // locked terminal ignores another submission
        runner.submit(&fx.audio, &fx.progress);
        assert_eq!(runner.state(), RunnerState::Success);
    }

    #[test]
    fn submitted_flag_is_trimmed_before_comparison() {
        let fx = Fixture::new();
        let mut runner = fx.runner(0);
        runner.start(&fx.audio);
        type_flag(&mut runner, "  flag{Hello_Campus}  ");
        runner.submit(&fx.audio, &fx.progress);
        assert_eq!(runner.state(), RunnerState::Success);
    }

    #[test]
    fn wrong_flag_reports_error_but_keeps_running() {
        let fx = Fixture::new();
        let mut runner = fx.runner(0);
        runner.start(&fx.audio);
        type_flag(&mut runner, "wrong");
        runner.submit(&fx.audio, &fx.progress);

        assert_eq!(runner.state(), RunnerState::Running);
        assert!(!runner.locked());
        assert!(matches!(runner.status(), StatusLine::Error(_)));
        assert!(runner.shaking());
        assert_eq!(fx.progress.load(TOTAL_LEVELS), vec![false; TOTAL_LEVELS]);

        // input stays editable for another attempt
        runner.push_input('!');
        assert_eq!(runner.input(), "wrong!");
    }

    #[test]
    fn case_difference_is_a_mismatch() {
        let fx = Fixture::new();
        let mut runner = fx.runner(0);
        runner.start(&fx.audio);
        type_flag(&mut runner, "flag{hello_campus}");
        runner.submit(&fx.audio, &fx.progress);
        assert_eq!(runner.state(), RunnerState::Running);
    }

    #[test]
    fn hint_applies_penalty_exactly_once() {
        let fx = Fixture::new();
        let mut runner = fx.runner(1); // Server Lab, 480s, penalty 120
        runner.start(&fx.audio);
        assert_eq!(runner.time_left(), 480);

        runner.use_hint(&fx.audio);
        assert_eq!(runner.time_left(), 360);
        assert!(runner.visible_hint().is_some());
        assert!(runner.hint_notice().unwrap().contains("2:00"));

        runner.use_hint(&fx.audio);
        assert_eq!(runner.time_left(), 360);
    }

    #[test]
    fn hint_penalty_floors_at_zero() {
        let fx = Fixture::new();
        let mut spec = levels::level(1).unwrap();
        spec.duration_seconds = 30; // penalty 120 exceeds the clock
        let mut runner = fx.runner_with(1, spec);
        runner.start(&fx.audio);
        runner.use_hint(&fx.audio);
        assert_eq!(runner.time_left(), 0);
        // still Running; the lockout happens on the next tick
        assert_eq!(runner.state(), RunnerState::Running);
        runner.tick(&fx.audio);
        assert_eq!(runner.state(), RunnerState::TimedOut);
    }

    #[test]
    fn hint_is_refused_before_start_and_without_hint_text() {
        let fx = Fixture::new();
        let mut runner = fx.runner(1);
        runner.use_hint(&fx.audio);
        assert!(!runner.hint_used());

        let mut no_hint = fx.runner(0); // Library has no hint
        no_hint.start(&fx.audio);
        no_hint.use_hint(&fx.audio);
        assert!(!no_hint.hint_used());
        assert_eq!(no_hint.time_left(), 600);
    }

    #[test]
    fn countdown_expires_into_timeout() {
        let fx = Fixture::new();
        let mut spec = levels::level(0).unwrap();
        spec.duration_seconds = 1;
        let mut runner = fx.runner_with(0, spec);
        runner.start(&fx.audio);

        runner.tick(&fx.audio);
        assert_eq!(runner.state(), RunnerState::TimedOut);
        assert_eq!(runner.time_left(), 0);
        assert!(runner.locked());
        assert!(matches!(runner.status(), StatusLine::Timeout(_)));
        assert_eq!(fx.progress.load(TOTAL_LEVELS), vec![false; TOTAL_LEVELS]);

        // submissions and further ticks are ignored now
        type_flag(&mut runner, "flag{Hello_Campus}");
        assert_eq!(runner.input(), "");
        runner.submit(&fx.audio, &fx.progress);
        runner.tick(&fx.audio);
        assert_eq!(runner.state(), RunnerState::TimedOut);
        assert_eq!(runner.time_left(), 0);
    }

    #[test]
    fn full_duration_runs_down_without_going_negative() {
        let fx = Fixture::new();
        let mut spec = levels::level(0).unwrap();
        spec.duration_seconds = 5;
        let mut runner = fx.runner_with(0, spec);
        runner.start(&fx.audio);
        for expected in [4, 3, 2, 1, 0] {
            runner.tick(&fx.audio);
            assert_eq!(runner.time_left(), expected);
        }
        assert_eq!(runner.state(), RunnerState::TimedOut);
    }

    #[test]
    fn reentrant_start_is_a_no_op() {
        let fx = Fixture::new();
        let mut runner = fx.runner(0);
        runner.start(&fx.audio);
        runner.tick(&fx.audio);
        assert_eq!(runner.time_left(), 599);

        runner.start(&fx.audio);
        assert_eq!(runner.time_left(), 599);
        assert_eq!(runner.state(), RunnerState::Running);
    }

    #[test]
    fn start_resolves_resources() {
        let fx = Fixture::new();
        let mut runner = fx.runner(0);
        assert!(runner.resources().is_empty());
        runner.start(&fx.audio);
        assert_eq!(runner.resources().len(), 1);
        assert_eq!(runner.resources()[0].name, "level1_secret.txt");
    }

    #[test]
    fn close_releases_the_countdown_in_any_state() {
        let fx = Fixture::new();
        let mut runner = fx.runner(0);
        runner.start(&fx.audio);
        runner.close(&fx.audio);
        runner.tick(&fx.audio);
        // countdown gone: the clock no longer moves
        assert_eq!(runner.time_left(), 600);
    }

    #[test]
    fn clock_formatting_is_zero_padded() {
        assert_eq!(format_clock(600), "10:00");
        assert_eq!(format_clock(59), "00:59");
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_penalty(120), "2:00");
        assert_eq!(format_penalty(90), "1:30");
    }
}
