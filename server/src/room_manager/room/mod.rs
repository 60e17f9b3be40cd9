mod code_room;
mod participant_handle;
mod participant_registry;

pub use self::code_room::CodeRoom;
pub use self::participant_handle::ParticipantHandle;
