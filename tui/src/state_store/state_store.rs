use std::time::Duration;

use nanoid::nanoid;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::{
    clipboard::Clipboard,
    error::ClientError,
    speech::{RecognitionEvent, SpeechEvent, SpeechRecognizer},
    shutdown::{Shutdown, ShutdownReason},
};

use super::{action::Action, EntryForm, Route, RoomSession, SpeechToggle, State};

/// Everything the store needs besides the channels
pub struct StoreOptions {
    /// Host and port of the relay
    pub server_addr: String,
    /// Room to open right away, it is only entered together with a username
    pub room_id: Option<String>,
    pub username: Option<String>,
    pub clipboard: Box<dyn Clipboard>,
    /// The speech engine and its event channel, None when speech input is not available
    pub speech: Option<(
        Box<dyn SpeechRecognizer>,
        UnboundedReceiver<SpeechEvent>,
    )>,
}

pub struct StateStore {
    state_tx: UnboundedSender<State>,
    options: StoreOptions,
}

impl StateStore {
    pub fn new(options: StoreOptions) -> (Self, UnboundedReceiver<State>) {
        let (state_tx, state_rx) = mpsc::unbounded_channel::<State>();

        (StateStore { state_tx, options }, state_rx)
    }
}

/// What the main loop has to do after handling something while in a room
enum Step {
    Stay,
    Leave,
    ConnectionLost(anyhow::Error),
    Exit(ShutdownReason),
}

impl StateStore {
    pub async fn main_loop(
        self,
        shutdown: Shutdown,
        mut action_rx: UnboundedReceiver<Action>,
    ) -> anyhow::Result<ShutdownReason> {
        let StateStore { state_tx, options } = self;
        let mut shutdown_rx = shutdown.subscribe();
        let StoreOptions {
            server_addr,
            room_id,
            username,
            mut clipboard,
            speech,
        } = options;
        let (mut recognizer, mut speech_rx) = match speech {
            Some((recognizer, speech_rx)) => (Some(recognizer), speech_rx),
            // a receiver which never yields, the sender is dropped right away
            None => (None, mpsc::unbounded_channel().1),
        };

        let mut opt_session: Option<RoomSession> = None;
        // the engine run whose events are applied, None while capture is off
        let mut speech_run: Option<u64> = None;
        let mut state = State::new(EntryForm {
            room_id: room_id.clone().unwrap_or_default(),
            username: username.clone().unwrap_or_default(),
            revision: 0,
        });

        // the initial state once
        state_tx.send(state.clone())?;

        let mut ticker = tokio::time::interval(Duration::from_secs(1));

        if let Some(room_id) = room_id {
            let route = Route::editor(&room_id, username.as_deref());
            opt_session = enter_room(&mut state, &state_tx, &server_addr, route, recognizer.is_some()).await?;
            ticker.reset();

            state_tx.send(state.clone())?;
        }

        let result = loop {
            if let Some(session) = opt_session.as_mut() {
                let step = tokio::select! {
                    // Handle the server events as they come in
                    maybe_event = session.next_event() => match maybe_event {
                        Ok(event) => match state.handle_server_event(&event) {
                            Some(reply) => match session.send(&reply).await {
                                Ok(()) => Step::Stay,
                                Err(err) => Step::ConnectionLost(err),
                            },
                            None => Step::Stay,
                        },
                        // server disconnected or sent garbage, there is no retry
                        Err(err) => Step::ConnectionLost(err),
                    },
                    // Handle the actions coming from the UI
                    // and process them to do async operations
                    maybe_action = action_rx.recv() => match maybe_action {
                        Some(Action::EditCode { code }) => match state.edit_code(code) {
                            Some(command) => match session.send(&command).await {
                                Ok(()) => Step::Stay,
                                Err(err) => Step::ConnectionLost(err),
                            },
                            None => Step::Stay,
                        },
                        Some(Action::ToggleSpeech) => {
                            if let Some(recognizer) = recognizer.as_mut() {
                                match state.toggle_speech() {
                                    Some(SpeechToggle::Start) => match recognizer.start() {
                                        Ok(run) => speech_run = Some(run),
                                        Err(err) => state.speech_failed(err),
                                    },
                                    Some(SpeechToggle::Stop) => {
                                        recognizer.stop();
                                        speech_run = None;
                                    },
                                    None => (),
                                }
                            }
                            Step::Stay
                        },
                        Some(Action::CopyRoomId) => {
                            let result = clipboard.write_text(session.room_id());
                            state.room_id_copied(result);
                            Step::Stay
                        },
                        Some(Action::Leave) => Step::Leave,
                        Some(Action::Exit) | None => {
                            shutdown.trigger(ShutdownReason::UserExit);

                            Step::Exit(ShutdownReason::UserExit)
                        },
                        Some(Action::SubmitEntry { .. } | Action::GenerateRoomId) => Step::Stay,
                    },
                    // Handle results and failures of the speech engine
                    Some(SpeechEvent { run, event }) = speech_rx.recv() => match event {
                        _ if speech_run != Some(run) => {
                            tracing::debug!(run, "dropping event of a finished speech run");
                            Step::Stay
                        },
                        RecognitionEvent::Result(result) => match state.apply_recognition_result(&result) {
                            Some(command) => match session.send(&command).await {
                                Ok(()) => Step::Stay,
                                Err(err) => Step::ConnectionLost(err),
                            },
                            None => Step::Stay,
                        },
                        RecognitionEvent::Error(reason) => {
                            speech_run = None;
                            state.speech_failed(ClientError::Speech { reason });
                            Step::Stay
                        },
                        RecognitionEvent::Ended => {
                            speech_run = None;
                            state.speech_ended();
                            Step::Stay
                        },
                    },
                    // Tick to terminate the select every N milliseconds
                    _ = ticker.tick() => {
                        state.tick_timer();
                        Step::Stay
                    },
                    // a signal, or the UI leaving on its own
                    Ok(reason) = shutdown_rx.recv() => Step::Exit(reason),
                };

                match step {
                    Step::Stay => (),
                    Step::Leave => {
                        leave_room(&mut opt_session, recognizer.as_mut()).await;
                        speech_run = None;
                        state.navigate(Route::Entry);
                    }
                    Step::ConnectionLost(err) => {
                        leave_room(&mut opt_session, recognizer.as_mut()).await;
                        speech_run = None;
                        state.connection_failed(ClientError::connection(&err));
                    }
                    Step::Exit(reason) => {
                        leave_room(&mut opt_session, recognizer.as_mut()).await;
                        break reason;
                    }
                }
            } else {
                tokio::select! {
                    maybe_action = action_rx.recv() => match maybe_action {
                        Some(Action::SubmitEntry { room_id, username }) => {
                            if let Some(route) = state.submit_entry(&room_id, &username) {
                                opt_session = enter_room(&mut state, &state_tx, &server_addr, route, recognizer.is_some()).await?;
                                // ticker needs to be resetted to avoid showing time spent connecting to the server
                                ticker.reset();
                            }
                        },
                        Some(Action::GenerateRoomId) => {
                            state.generate_room_id(nanoid!());
                        },
                        Some(Action::Exit) | None => {
                            shutdown.trigger(ShutdownReason::UserExit);

                            break ShutdownReason::UserExit;
                        },
                        Some(_) => (),
                    },
                    // a result may still arrive after the room was left, it belongs to no document
                    Some(_) = speech_rx.recv() => (),
                    Ok(reason) = shutdown_rx.recv() => {
                        break reason;
                    }
                }
            }

            state_tx.send(state.clone())?;
        };

        Ok(result)
    }
}

/// Navigates to the given route and, if it is the editor page, connects to the room.
/// Returns the session when the room could be joined.
async fn enter_room(
    state: &mut State,
    state_tx: &UnboundedSender<State>,
    server_addr: &str,
    route: Route,
    speech_available: bool,
) -> anyhow::Result<Option<RoomSession>> {
    state.navigate(route);

    let (room_id, username) = match state.route.clone() {
        Route::Editor { room_id, username } => (room_id, username),
        // missing navigation state, stay on the entry page without a word
        Route::Entry => return Ok(None),
    };

    state.mark_connection_request_start();
    // emit event to re-render any part depending on the connection status
    state_tx.send(state.clone())?;

    match RoomSession::connect(server_addr, &room_id, &username).await {
        Ok(session) => {
            state.process_connection_request_result(Ok(String::from(server_addr)));
            state.set_speech_available(speech_available);

            Ok(Some(session))
        }
        Err(err) => {
            state.process_connection_request_result(Err(ClientError::connection(&err)));

            Ok(None)
        }
    }
}

/// Tears the room down: speech capture stops and the connection is closed
async fn leave_room(
    opt_session: &mut Option<RoomSession>,
    recognizer: Option<&mut Box<dyn SpeechRecognizer>>,
) {
    if let Some(recognizer) = recognizer {
        recognizer.stop();
    }

    if let Some(session) = opt_session.take() {
        session.close().await;
    }
}
