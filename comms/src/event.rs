use serde::{Deserialize, Serialize};

/// A connection that takes part in a room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    /// Unique id of the connection, assigned by the server
    pub socket_id: String,
    /// Display name chosen by the user
    pub username: String,
}

/// First event of every connection, tells the client its own connection id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WelcomeReplyEvent {
    pub socket_id: String,
}

/// Someone joined the room. Sent to every member, including the one who joined
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinedBroadcastEvent {
    /// Snapshot of every member of the room after the join, in join order
    pub clients: Vec<Participant>,
    /// The username of the participant that has joined
    pub username: String,
    /// The connection id of the participant that has joined
    pub socket_id: String,
}

/// A participant has left the room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisconnectedBroadcastEvent {
    /// The connection id of the participant that has left
    pub socket_id: String,
    /// The username of the participant that has left
    pub username: String,
}

/// The document text was replaced by another participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeChangeEvent {
    /// Whole document text, absent when the sender had nothing typed yet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "kebab-case")]
/// Events that can be sent to the client
/// Events may be replies to the connection itself or broadcasts from a room, the recipient is a single connection
pub enum Event {
    Welcome(WelcomeReplyEvent),
    Joined(JoinedBroadcastEvent),
    Disconnected(DisconnectedBroadcastEvent),
    CodeChange(CodeChangeEvent),
}
