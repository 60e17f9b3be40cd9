pub mod action;
mod room_session;
mod state;
#[allow(clippy::module_inception)]
mod state_store;

pub use self::room_session::RoomSession;
pub use self::state::{
    ConnectionStatus, EntryForm, Notification, NotificationKind, Route, SpeechStatus,
    SpeechToggle, State,
};
pub use self::state_store::{StateStore, StoreOptions};
