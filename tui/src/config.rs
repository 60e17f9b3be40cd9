use std::path::PathBuf;

use clap::Parser;

/// Terminal client for shared code editing rooms
#[derive(Debug, Clone, Parser)]
#[command(name = "codeshare-tui", version, about)]
pub struct Config {
    /// Host and port of the relay server
    #[arg(long, env = "CODESHARE_SERVER", default_value = "localhost:8080")]
    pub server: String,
    /// Room to open, the entry form is pre-filled with it
    #[arg(long)]
    pub room: Option<String>,
    /// Display name, entering the room right away when a room is given too
    #[arg(long)]
    pub username: Option<String>,
    /// Transcriber command used for speech input, speech input is disabled without it
    #[arg(long, env = "CODESHARE_SPEECH_COMMAND")]
    pub speech_command: Option<String>,
    /// Language passed to the transcriber
    #[arg(long, default_value = "en-US")]
    pub speech_lang: String,
    /// File to write logs to, the terminal itself is owned by the UI
    #[arg(long, env = "CODESHARE_LOG_FILE", default_value = "codeshare-tui.log")]
    pub log_file: PathBuf,
}
