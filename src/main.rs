mod config;
mod controller;
mod error;
mod logging;
mod model;
mod view;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{Event, EventStream},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::watch;

use config::Config;
use controller::{AppController, CommandDispatcher, RefreshOutcome, SearchController, SyncEngine};
use model::{AppModel, HttpPlayerClient, PlayerGateway, SearchSnapshot, SyncSnapshot};
use view::AppView;

const REDRAW_INTERVAL: Duration = Duration::from_millis(250);

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = Config::load()?;

    let _log_guard = match logging::init_logging(&config) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: Failed to initialize logging: {}", e);
            None
        }
    };

    tracing::info!("=== Juicebox-RS Client Starting ===");

    let client = HttpPlayerClient::new(&config)?;
    tracing::debug!(base_url = client.base_url(), "HTTP client ready");
    let gateway: Arc<dyn PlayerGateway> = Arc::new(client);
    let engine = SyncEngine::new(gateway.clone());
    let dispatcher = Arc::new(CommandDispatcher::new(gateway.clone(), engine.clone()));
    let search = Arc::new(SearchController::new(gateway, dispatcher.clone()));
    let model = Arc::new(AppModel::new());

    // Nothing is drawn before the first state is known
    if let RefreshOutcome::Faulted { error, .. } = engine.bootstrap().await {
        model
            .set_error(AppController::format_error(&error))
            .await;
    }

    let poller = engine.spawn_poller(config.poll_interval());
    let sync_rx = engine.subscribe();
    let search_rx = search.subscribe();
    let controller = AppController::new(model, engine, dispatcher, search, config.seek_step_secs);

    tracing::info!("Starting TUI...");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, controller, sync_rx, search_rx).await;

    poller.abort();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        tracing::error!(error = ?err, "Application error");
    }

    tracing::info!("Juicebox-RS Client shutting down");
    res
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    controller: AppController,
    mut sync_rx: watch::Receiver<SyncSnapshot>,
    mut search_rx: watch::Receiver<SearchSnapshot>,
) -> Result<()> {
    let mut events = EventStream::new();
    // Keeps the interpolated progress moving between polls
    let mut redraw = tokio::time::interval(REDRAW_INTERVAL);
    let model = controller.model.clone();

    loop {
        model.auto_clear_old_errors().await;

        let sync = sync_rx.borrow_and_update().clone();
        let search = search_rx.borrow_and_update().clone();
        let results_len = search.results.as_ref().map_or(0, |r| r.songs.len());
        model.clamp_selections(sync.state.playlist.len(), results_len).await;
        let ui_state = model.get_ui_state().await;

        terminal.draw(|f| {
            AppView::render(f, &sync, &search, &ui_state);
        })?;

        if model.should_quit().await {
            break;
        }

        tokio::select! {
            maybe_event = events.next() => match maybe_event {
                Some(Ok(Event::Key(key))) => {
                    if let Err(e) = controller.handle_key_event(key).await {
                        tracing::warn!(error = %e, "Key handling failed");
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => break,
            },
            Ok(()) = sync_rx.changed() => {}
            Ok(()) = search_rx.changed() => {}
            _ = redraw.tick() => {}
        }
    }

    Ok(())
}
