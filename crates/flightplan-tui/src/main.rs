mod app;
mod handler;
mod logging;
mod tui;
mod ui;

use anyhow::Result;
use flightplan_core::Config;

use app::App;
use tui::{EventHandler, Tui};

#[tokio::main]
async fn main() -> Result<()> {
    // Best effort: the UI still runs without a log file
    let log_path = logging::init().ok();

    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "could not load config, using defaults");
        Config::new()
    });

    // First run: leave an editable config file behind
    if Config::get_config_path().is_ok_and(|p| !p.exists()) {
        if let Err(e) = config.save() {
            tracing::warn!(error = %e, "could not write default config");
        }
    }

    let mut app = App::new(&config);
    tracing::info!(api_base = %app.api_base, log = ?log_path, "starting flightplan");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    let result = run(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    if let Err(e) = &result {
        tracing::error!(error = %e, "exited with error");
    }
    result
}

async fn run(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event).await?,
            None => break,
        }
    }
    Ok(())
}
