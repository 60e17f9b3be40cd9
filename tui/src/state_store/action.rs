#[derive(Debug, Clone)]
pub enum Action {
    /// Entry form submitted, both fields are validated by the store
    SubmitEntry { room_id: String, username: String },
    /// Fill the entry form with a freshly generated room id
    GenerateRoomId,
    /// The editor contents changed locally
    EditCode { code: String },
    ToggleSpeech,
    CopyRoomId,
    Leave,
    Exit,
}
