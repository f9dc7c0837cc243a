//! ripplepad - terminal gesture surface
//!
//! Drag with the mouse to play; the surface ripples where you touch.
//! Run with: cargo run
//!
//! Set RIPPLEPAD_LOG (an env-filter directive, e.g. "ripplepad=debug") to
//! log to ripplepad.log instead of the terminal.

mod app;
mod ui;

use app::App;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    init_logging()?;

    let mut terminal = ratatui::init();
    let result = App::new().run(&mut terminal);
    ratatui::restore();
    result
}

/// Tracing goes to a file so it never fights the TUI for the terminal.
fn init_logging() -> color_eyre::Result<()> {
    if std::env::var_os("RIPPLEPAD_LOG").is_none() {
        return Ok(());
    }
    let file = std::fs::File::create("ripplepad.log")?;
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("RIPPLEPAD_LOG"))
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
