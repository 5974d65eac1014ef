use aether::core::cortex::Cortex;
use aether::core::scheduler::Scheduler;
use aether::core::state::AetherConfig;
use aether::io::environment::OpenMeteo;
use aether::io::events::Impulse;
use aether::tui::app::App;
use aether::tui::events::{Event, EventHandler};
use aether::tui::ui;

use anyhow::{Context, Result};
use colored::*;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::Terminal;
use std::fs;
use std::io::stdout;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

pub const AETHER_DIR: &str = ".aether";

/// ~30 fps; the phase accumulator is wall-clock driven so the exact rate
/// only affects smoothness, not motion speed.
const TICK_MS: u64 = 33;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing().context("failed to init diagnostic log")?;

    let config = AetherConfig::load(Path::new("aether.toml"));

    println!("{}", "AETHER — ambient lifeform".cyan().bold());
    println!(
        "   {} Cognition: {} (fallback: {})",
        "🧠".cyan(),
        config.primary_model.bold(),
        config.fallback_model
    );

    let cortex = Arc::new(
        Cortex::new(&config.primary_model, &config.fallback_model)
            .context("Failed to init cortex")?,
    );
    let environment = Arc::new(OpenMeteo::new(&config).context("Failed to init environment")?);
    let (handle, scheduler_join) = Scheduler::spawn(cortex, environment, config);

    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(handle.clone());
    let event_handler = EventHandler::new(TICK_MS);
    let result = run_app(&mut terminal, &mut app, event_handler).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Teardown: the scheduler cancels its timers and drops any completion a
    // still-running request sends afterwards.
    let _ = handle.impulse_tx.send(Impulse::SystemInterrupt).await;
    let _ = scheduler_join.await;

    if let Err(e) = result {
        eprintln!("Application error: {}", e);
    }
    println!("{}", "👋 Aether sleeps.".green());
    Ok(())
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    mut event_handler: EventHandler,
) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    loop {
        terminal.draw(|frame| ui::draw(frame, app))?;

        match event_handler.next().await? {
            Event::Tick => app.on_tick(),
            Event::Key(key) => {
                if app.handle_key(key) {
                    return Ok(());
                }
            }
            // The next draw picks up the new size from the frame area.
            Event::Resize(_, _) => {}
        }
    }
}

/// Stdout belongs to the interface, so diagnostics go to a file.
fn init_tracing() -> Result<()> {
    fs::create_dir_all(AETHER_DIR)?;
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(format!("{AETHER_DIR}/aether.log"))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
