use circular_queue::CircularQueue;
use comms::{
    command::{self, UserCommand},
    event::{self, Participant},
};

use crate::{
    error::ClientError,
    speech::{self, RecognitionResult},
};

const MAX_NOTIFICATIONS_TO_STORE: usize = 20;

/// The page the user is on
#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    Entry,
    Editor { room_id: String, username: String },
}

impl Route {
    /// Route to the editor page of a room. There is nothing to join with
    /// without a username or a room id, so those fall back to the entry page.
    pub fn editor(room_id: &str, username: Option<&str>) -> Route {
        let room_id = room_id.trim();

        match username.map(str::trim) {
            Some(username) if !username.is_empty() && !room_id.is_empty() => Route::Editor {
                room_id: String::from(room_id),
                username: String::from(username),
            },
            _ => Route::Entry,
        }
    }

    pub fn room_id(&self) -> Option<&str> {
        match self {
            Route::Editor { room_id, .. } => Some(room_id),
            Route::Entry => None,
        }
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            Route::Editor { username, .. } => Some(username),
            Route::Entry => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// A short lived message for the user, the terminal version of a toast
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    /// Value of the timer when the notification was raised
    pub at: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionStatus {
    Idle,
    Connecting,
    Connected { addr: String },
    Errored { err: String },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpeechStatus {
    /// No speech engine is configured
    Unavailable,
    Idle,
    Listening,
}

impl SpeechStatus {
    pub fn is_listening(&self) -> bool {
        *self == SpeechStatus::Listening
    }
}

/// What the speech engine should do after a toggle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpeechToggle {
    Start,
    Stop,
}

/// Values the entry form should show. `revision` changes whenever the store
/// wants to overwrite what the user typed into the form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryForm {
    pub room_id: String,
    pub username: String,
    pub revision: usize,
}

/// State holds the state of the application
#[derive(Debug, Clone)]
pub struct State {
    /// The active page
    pub route: Route,
    pub connection_status: ConnectionStatus,
    /// Prefill of the entry page
    pub entry: EntryForm,
    /// Connection id the server gave us
    pub socket_id: Option<String>,
    /// Roster of the room, in the order the server sent it
    pub clients: Vec<Participant>,
    /// Shared document text, None until someone types or syncs
    pub code: Option<String>,
    /// Changes whenever the document is replaced by something other than a local edit
    pub code_revision: usize,
    pub speech: SpeechStatus,
    /// Most recent notifications
    pub notifications: CircularQueue<Notification>,
    /// Seconds since the room was entered
    pub timer: usize,
}

impl Default for State {
    fn default() -> Self {
        State {
            route: Route::Entry,
            connection_status: ConnectionStatus::Idle,
            entry: EntryForm::default(),
            socket_id: None,
            clients: Vec::new(),
            code: None,
            code_revision: 0,
            speech: SpeechStatus::Unavailable,
            notifications: CircularQueue::with_capacity(MAX_NOTIFICATIONS_TO_STORE),
            timer: 0,
        }
    }
}

impl State {
    pub fn new(entry: EntryForm) -> Self {
        State {
            entry,
            ..Default::default()
        }
    }

    pub fn room_id(&self) -> Option<&str> {
        self.route.room_id()
    }

    pub fn username(&self) -> Option<&str> {
        self.route.username()
    }

    pub fn notify(&mut self, kind: NotificationKind, message: impl Into<String>) {
        self.notifications.push(Notification {
            kind,
            message: message.into(),
            at: self.timer,
        });
    }

    pub fn notify_error(&mut self, err: &ClientError) {
        tracing::warn!(reason = err.reason(), "{}", err);
        self.notify(NotificationKind::Error, err.to_string());
    }

    /// Switch pages. Going back to the entry page forgets everything about the room,
    /// but keeps its id in the entry form.
    pub fn navigate(&mut self, route: Route) {
        if route == Route::Entry {
            if let Some(room_id) = self.route.room_id() {
                self.entry.room_id = String::from(room_id);
                self.entry.revision += 1;
            }

            self.connection_status = ConnectionStatus::Idle;
            self.socket_id = None;
            self.clients.clear();
            self.code = None;
            self.code_revision += 1;
            if self.speech.is_listening() {
                self.speech = SpeechStatus::Idle;
            }
        }

        self.route = route;
    }

    /// Validates the entry form, returns the route to go to when it can be submitted
    pub fn submit_entry(&mut self, room_id: &str, username: &str) -> Option<Route> {
        match Route::editor(room_id, Some(username)) {
            Route::Entry => {
                self.notify(NotificationKind::Error, "ROOM ID & username is required");
                None
            }
            route => {
                self.entry.room_id = String::from(room_id.trim());
                self.entry.username = String::from(username.trim());
                Some(route)
            }
        }
    }

    pub fn generate_room_id(&mut self, room_id: String) {
        self.entry.room_id = room_id;
        self.entry.revision += 1;
        self.notify(NotificationKind::Success, "Created a new room");
    }

    pub fn mark_connection_request_start(&mut self) {
        self.connection_status = ConnectionStatus::Connecting;
    }

    /// Processes the result of a connection request to change the state of the application
    pub fn process_connection_request_result(&mut self, result: Result<String, ClientError>) {
        match result {
            Ok(addr) => self.connection_status = ConnectionStatus::Connected { addr },
            Err(err) => self.connection_failed(err),
        }
    }

    /// Any transport failure is shown to the user and sends them back to the entry page
    pub fn connection_failed(&mut self, err: ClientError) {
        self.notify_error(&err);
        self.navigate(Route::Entry);
        self.connection_status = ConnectionStatus::Errored {
            err: err.reason().map(String::from).unwrap_or_default(),
        };
    }

    /// Applies an event from the server, returns the command to answer it with, if any
    pub fn handle_server_event(&mut self, event: &event::Event) -> Option<UserCommand> {
        match event {
            event::Event::Welcome(event) => {
                self.socket_id = Some(event.socket_id.clone());
                None
            }
            event::Event::Joined(event) => {
                if self.username() != Some(event.username.as_str()) {
                    self.notify(
                        NotificationKind::Success,
                        format!("{} joined the room.", event.username),
                    );
                    tracing::info!(username = %event.username, "participant joined");
                }

                self.clients = event.clients.clone();

                // bring the newcomer up to date with our copy of the document
                if self.socket_id.as_deref() != Some(event.socket_id.as_str()) {
                    Some(UserCommand::SyncCode(command::SyncCodeCommand {
                        code: self.code.clone(),
                        socket_id: Some(event.socket_id.clone()),
                    }))
                } else {
                    None
                }
            }
            event::Event::Disconnected(event) => {
                self.notify(
                    NotificationKind::Success,
                    format!("{} left the room.", event.username),
                );
                self.clients
                    .retain(|client| client.socket_id != event.socket_id);
                None
            }
            event::Event::CodeChange(event) => {
                if let Some(code) = event.code.as_ref() {
                    self.code = Some(code.clone());
                    self.code_revision += 1;
                }
                None
            }
        }
    }

    /// Records a local edit, returns the command relaying it to the room
    pub fn edit_code(&mut self, code: String) -> Option<UserCommand> {
        let room_id = String::from(self.room_id()?);
        self.code = Some(code.clone());

        Some(UserCommand::CodeChange(command::CodeChangeCommand {
            room_id,
            code,
        }))
    }

    /// Called when the editor page is entered, tells whether speech input can be used
    pub fn set_speech_available(&mut self, available: bool) {
        if available {
            self.speech = SpeechStatus::Idle;
        } else {
            self.speech = SpeechStatus::Unavailable;
            self.notify_error(&ClientError::SpeechUnsupported);
        }
    }

    /// Flips the speech indicator, returns what the engine should do. Does nothing without an engine
    pub fn toggle_speech(&mut self) -> Option<SpeechToggle> {
        match self.speech {
            SpeechStatus::Unavailable => None,
            SpeechStatus::Idle => {
                self.speech = SpeechStatus::Listening;
                self.notify(
                    NotificationKind::Success,
                    "Speech recognition started. Speak now!",
                );
                Some(SpeechToggle::Start)
            }
            SpeechStatus::Listening => {
                self.speech = SpeechStatus::Idle;
                self.notify(NotificationKind::Success, "Speech recognition stopped.");
                Some(SpeechToggle::Stop)
            }
        }
    }

    /// Appends the finalized part of a result to the document.
    /// Returns the command sharing the new document, tagged with our connection id
    pub fn apply_recognition_result(&mut self, result: &RecognitionResult) -> Option<UserCommand> {
        let transcript = speech::final_transcript(result)?;

        let code = format!("{}{}", self.code.as_deref().unwrap_or_default(), transcript);
        self.code = Some(code.clone());
        self.code_revision += 1;
        self.notify(NotificationKind::Success, "Text added from speech input!");

        Some(UserCommand::SyncCode(command::SyncCodeCommand {
            code: Some(code),
            socket_id: self.socket_id.clone(),
        }))
    }

    /// The engine failed, it is not restarted automatically
    pub fn speech_failed(&mut self, err: ClientError) {
        self.notify_error(&err);
        self.speech_ended();
    }

    pub fn speech_ended(&mut self) {
        if self.speech.is_listening() {
            self.speech = SpeechStatus::Idle;
        }
    }

    pub fn room_id_copied(&mut self, result: Result<(), ClientError>) {
        match result {
            Ok(()) => self.notify(
                NotificationKind::Success,
                "Room ID has been copied to your clipboard",
            ),
            Err(err) => self.notify_error(&err),
        }
    }

    pub fn tick_timer(&mut self) {
        self.timer += 1;
    }
}
