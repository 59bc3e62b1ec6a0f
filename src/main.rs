//! Hack the Campus
//!
//! A capture-the-flag training game in your terminal: cross the campus
//! map, crack each building's timed terminal, capture the flags.

use anyhow::Result;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use hack_the_campus::audio::Playback;
use hack_the_campus::store::{AudioSettingsStore, DataDir};
use hack_the_campus::tui::App;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io::stdout;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hack-the-campus")]
#[command(about = "Hack the Campus - a CTF training game in your terminal")]
#[command(version)]
struct Cli {
    /// Directory for saved progress, settings and challenge downloads
    /// (defaults to ~/.hack-the-campus)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Disable all audio
    #[arg(long)]
    mute: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let data_dir = DataDir::new(cli.data_dir.unwrap_or_else(DataDir::default_root));
    init_logging(&data_dir, cli.verbose);

    // The playback service is built once here and owned by the app;
    // with no usable output device it stays silent.
    let settings = AudioSettingsStore::new(data_dir.settings_file()).load();
    let playback = if cli.mute {
        Playback::disabled()
    } else {
        Playback::new(settings)
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app
    let mut app = App::new(data_dir, playback);

    // Main loop
    while app.running {
        app.update();

        // Draw
        terminal.draw(|frame| {
            app.render(frame);
        })?;

        // Handle input
        if !app.handle_input()? {
            break;
        }
    }

    // Cleanup
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    println!("\n╔════════════════════════════════════════════════════════╗");
    println!("║  Thanks for playing Hack the Campus!                   ║");
    println!("║                                                        ║");
    println!("║  ShadowRoot is still out there. Stay sharp.            ║");
    println!("╚════════════════════════════════════════════════════════╝\n");

    Ok(())
}

/// Logs go to a file inside the data directory; writing them to stderr
/// would tear up the alternate screen. If the file cannot be opened
/// the game simply runs unlogged.
fn init_logging(data_dir: &DataDir, verbose: bool) {
    if std::fs::create_dir_all(data_dir.root()).is_err() {
        return;
    }
    let Ok(log_file) = std::fs::File::create(data_dir.log_file()) else {
        return;
    };
    let log_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false)
        .init();
}
