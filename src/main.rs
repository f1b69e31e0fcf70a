// Firedeck entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load settings and pre-fill the connect/auth forms
// 3. Create mpsc channels
// 4. Spawn the app orchestration task
// 5. Run the TUI event loop (blocking until the user quits)
// 6. Cleanup on exit

use firedeck::app;
use firedeck::config::Settings;
use firedeck::tui;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing (log to file, not terminal)
    init_tracing()?;
    info!("Firedeck starting up");

    // 2. Load settings; a missing settings file means empty forms.
    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            warn!("Failed to load settings, starting with defaults: {e}");
            Settings::default()
        }
    };

    let mut view_state = tui::ViewState::default();
    if let Some(blob) = settings.read_config_blob() {
        info!("Pre-filled project config from settings");
        view_state.config_text = blob;
    }
    if let Some(collection) = &settings.connection.collection {
        view_state.collection_text = collection.clone();
    }
    if let Some(email) = &settings.auth.email {
        view_state.email_text = email.clone();
    }

    // 3. Create mpsc channels
    let (backend_tx, backend_rx) = mpsc::channel(256);
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (ui_tx, ui_rx) = mpsc::channel(256);

    let app_state = app::AppState::new(settings, backend_tx);

    // 4. Spawn the app orchestration task
    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(backend_rx, cmd_rx, ui_tx, app_state).await {
            error!("Application loop error: {e}");
        }
    });

    // 5. Run the TUI event loop (blocking until the user quits)
    if let Err(e) = tui::run(ui_rx, cmd_tx, view_state).await {
        error!("TUI error: {e}");
    }

    // 6. Cleanup: wait for the app task to finish (with timeout)
    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), async {
        let _ = app_handle.await;
    })
    .await;

    info!("Firedeck shut down cleanly");
    Ok(())
}

/// Initialize tracing to log to a file (not the terminal, which is used by the TUI).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("firedeck.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("firedeck=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
