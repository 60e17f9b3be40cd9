use serde::{Deserialize, Serialize};

/// User Command for joining a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinCommand {
    // The room to join.
    pub room_id: String,
    // The display name to appear with in the room roster.
    pub username: String,
}

/// User Command for pushing the full document text to a single connection.
///
/// When `socket_id` is absent, or names the sender itself, the server hands the
/// text to every other participant of the sender's room instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncCodeCommand {
    // Document text, absent when nothing has been typed yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    // The connection to deliver the text to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub socket_id: Option<String>,
}

/// User Command for relaying a local edit to the rest of the room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeChangeCommand {
    // The room the edit belongs to.
    pub room_id: String,
    // The whole document text after the edit.
    pub code: String,
}

/// User Command for leaving the room and closing the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuitCommand;

/// A user command which can be sent to the server by a single connection.
/// All commands are processed in the context of the relay paired with an individual connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_ct", rename_all = "kebab-case")]
pub enum UserCommand {
    Join(JoinCommand),
    SyncCode(SyncCodeCommand),
    CodeChange(CodeChangeCommand),
    Quit(QuitCommand),
}

#[cfg(test)]
mod tests {
    use super::*;

    // given a command enum, and an expect string, asserts that command is serialized / deserialized appropiately
    fn assert_command_serialization(command: &UserCommand, expected: &str) {
        let serialized = serde_json::to_string(&command).unwrap();
        assert_eq!(serialized, expected);
        let deserialized: UserCommand = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, *command);
    }

    #[test]
    fn test_join_command() {
        let command = UserCommand::Join(JoinCommand {
            room_id: "room-1".to_string(),
            username: "ada".to_string(),
        });

        assert_command_serialization(
            &command,
            r#"{"_ct":"join","roomId":"room-1","username":"ada"}"#,
        );
    }

    #[test]
    fn test_sync_code_command() {
        let command = UserCommand::SyncCode(SyncCodeCommand {
            code: Some("fn main() {}".to_string()),
            socket_id: Some("abc".to_string()),
        });

        assert_command_serialization(
            &command,
            r#"{"_ct":"sync-code","code":"fn main() {}","socketId":"abc"}"#,
        );
    }

    #[test]
    fn test_sync_code_command_without_code() {
        let command = UserCommand::SyncCode(SyncCodeCommand {
            code: None,
            socket_id: Some("abc".to_string()),
        });

        assert_command_serialization(&command, r#"{"_ct":"sync-code","socketId":"abc"}"#);

        // a null code sent by an older client is read as absent
        let deserialized: UserCommand =
            serde_json::from_str(r#"{"_ct":"sync-code","code":null,"socketId":"abc"}"#).unwrap();
        assert_eq!(deserialized, command);
    }

    #[test]
    fn test_code_change_command() {
        let command = UserCommand::CodeChange(CodeChangeCommand {
            room_id: "room-1".to_string(),
            code: "let x = 1;".to_string(),
        });

        assert_command_serialization(
            &command,
            r#"{"_ct":"code-change","roomId":"room-1","code":"let x = 1;"}"#,
        );
    }

    #[test]
    fn test_quit_command() {
        let command = UserCommand::Quit(QuitCommand);

        assert_command_serialization(&command, r#"{"_ct":"quit"}"#);
    }
}
