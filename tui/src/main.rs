use clap::Parser;

use crate::{
    clipboard::SystemClipboard,
    config::Config,
    shutdown::Shutdown,
    speech::{CommandRecognizer, RecognitionConfig, SpeechRecognizer},
    state_store::{StateStore, StoreOptions},
    ui_management::UiManager,
};

mod clipboard;
mod config;
mod error;
mod logging;
mod shutdown;
mod speech;
mod state_store;
mod ui_management;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    // dropping the guard flushes what is still queued for the log file
    let _log_guard = logging::init(&config.log_file)?;

    let speech = config.speech_command.as_deref().map(|command| {
        let (recognizer, speech_rx) =
            CommandRecognizer::new(command, RecognitionConfig::new(&config.speech_lang));

        (Box::new(recognizer) as Box<dyn SpeechRecognizer>, speech_rx)
    });

    tracing::info!(
        server = %config.server,
        speech = speech.is_some(),
        "starting client"
    );

    let shutdown = Shutdown::new();
    shutdown.trigger_on_ctrl_c();
    let (state_store, state_rx) = StateStore::new(StoreOptions {
        server_addr: config.server.clone(),
        room_id: config.room.clone(),
        username: config.username.clone(),
        clipboard: Box::new(SystemClipboard::new()),
        speech,
    });
    let (ui_manager, action_rx) = UiManager::new();

    let ui_shutdown_rx = shutdown.subscribe();
    let (reason, _) = tokio::try_join!(
        state_store.main_loop(shutdown, action_rx),
        ui_manager.main_loop(state_rx, ui_shutdown_rx),
    )?;

    tracing::info!(%reason, "exited");

    Ok(())
}
