use std::process::Stdio;

use anyhow::Context;
use serde::Deserialize;
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, BufReader},
    process::Command,
    sync::mpsc,
    task::JoinHandle,
};

use crate::error::ClientError;

use super::{RecognitionConfig, RecognitionEvent, RecognitionResult, SpeechEvent, SpeechRecognizer};

/// One line of transcriber output
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EngineLine {
    Error { error: String },
    Result(RecognitionResult),
}

/// [CommandRecognizer] runs an external transcriber through the shell and reads
/// its results from stdout, one JSON object per line:
///
/// - `{"resultIndex": 0, "results": [{"transcript": "hello", "isFinal": true}]}`
/// - `{"error": "no-speech"}`
///
/// The configuration reaches the transcriber as `SPEECH_LANG`, `SPEECH_CONTINUOUS`
/// and `SPEECH_INTERIM_RESULTS` environment variables. Stopping kills the process.
pub struct CommandRecognizer {
    command: String,
    config: RecognitionConfig,
    events_tx: mpsc::UnboundedSender<SpeechEvent>,
    running: Option<JoinHandle<()>>,
    /// Number of the latest run, zero before the first start
    run: u64,
}

impl CommandRecognizer {
    pub fn new(
        command: &str,
        config: RecognitionConfig,
    ) -> (Self, mpsc::UnboundedReceiver<SpeechEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        (
            CommandRecognizer {
                command: String::from(command),
                config,
                events_tx,
                running: None,
                run: 0,
            },
            events_rx,
        )
    }
}

impl SpeechRecognizer for CommandRecognizer {
    fn start(&mut self) -> Result<u64, ClientError> {
        self.stop();

        let mut child = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .env("SPEECH_LANG", &self.config.lang)
            .env("SPEECH_CONTINUOUS", self.config.continuous.to_string())
            .env("SPEECH_INTERIM_RESULTS", self.config.interim_results.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ClientError::Speech {
                reason: format!("could not start '{}': {}", self.command, e),
            })?;

        let stdout = child.stdout.take().ok_or_else(|| ClientError::Speech {
            reason: String::from("transcriber has no stdout"),
        })?;

        self.run += 1;
        let run = self.run;
        tracing::info!(command = %self.command, lang = %self.config.lang, run, "speech recognition started");

        let events_tx = self.events_tx.clone();
        self.running = Some(tokio::spawn(async move {
            // the child is owned by the task, aborting the task kills the transcriber
            let outcome = forward_engine_output(stdout, run, &events_tx).await;
            let event = match outcome {
                Ok(()) => match child.wait().await {
                    Ok(status) if status.success() => RecognitionEvent::Ended,
                    Ok(status) => RecognitionEvent::Error(format!("transcriber exited with {}", status)),
                    Err(err) => RecognitionEvent::Error(err.to_string()),
                },
                Err(err) => RecognitionEvent::Error(format!("{:#}", err)),
            };

            let _ = events_tx.send(SpeechEvent { run, event });
        }));

        Ok(run)
    }

    fn stop(&mut self) {
        if let Some(running) = self.running.take() {
            running.abort();
            tracing::info!("speech recognition stopped");
        }
    }
}

impl Drop for CommandRecognizer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Reads engine lines until the output ends or an error is reported
async fn forward_engine_output<R: AsyncRead + Unpin>(
    output: R,
    run: u64,
    events_tx: &mpsc::UnboundedSender<SpeechEvent>,
) -> anyhow::Result<()> {
    let mut lines = BufReader::new(output).lines();

    while let Some(line) = lines
        .next_line()
        .await
        .context("could not read transcriber output")?
    {
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<EngineLine>(&line)
            .with_context(|| format!("unexpected transcriber output: {}", line))?
        {
            EngineLine::Result(result) => {
                let _ = events_tx.send(SpeechEvent {
                    run,
                    event: RecognitionEvent::Result(result),
                });
            }
            EngineLine::Error { error } => return Err(anyhow::anyhow!(error)),
        }
    }

    Ok(())
}
