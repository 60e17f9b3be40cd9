use serde::Deserialize;

use crate::error::ClientError;

pub use self::command_recognizer::CommandRecognizer;

mod command_recognizer;

/// How the speech engine is asked to transcribe
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionConfig {
    /// Keep listening after a pause instead of stopping at the first result
    pub continuous: bool,
    /// Report partial segments while the speaker is still talking
    pub interim_results: bool,
    /// BCP 47 language tag
    pub lang: String,
}

impl RecognitionConfig {
    pub fn new(lang: &str) -> Self {
        RecognitionConfig {
            continuous: true,
            interim_results: true,
            lang: String::from(lang),
        }
    }
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        RecognitionConfig::new("en-US")
    }
}

/// A piece of transcribed speech, final segments will not be revised by the engine anymore
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptSegment {
    pub transcript: String,
    #[serde(default)]
    pub is_final: bool,
}

/// The engine's current list of segments, `result_index` is the first one that changed
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionResult {
    #[serde(default)]
    pub result_index: usize,
    pub results: Vec<TranscriptSegment>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecognitionEvent {
    Result(RecognitionResult),
    Error(String),
    /// The engine stopped on its own without an error
    Ended,
}

/// An event together with the run of the engine that produced it. Every start
/// begins a new run, events of earlier runs may still be queued in the channel.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechEvent {
    pub run: u64,
    pub event: RecognitionEvent,
}

/// Text that should be appended to the document for a result: every final
/// segment from the result index onward, each followed by a single space.
/// None when there is nothing but whitespace to add.
pub fn final_transcript(result: &RecognitionResult) -> Option<String> {
    let transcript: String = result
        .results
        .iter()
        .skip(result.result_index)
        .filter(|segment| segment.is_final)
        .map(|segment| format!("{} ", segment.transcript))
        .collect();

    if transcript.trim().is_empty() {
        None
    } else {
        Some(transcript)
    }
}

/// A speech engine that can be started and stopped. Events are delivered through
/// the channel handed to the engine when it was created.
pub trait SpeechRecognizer {
    /// Starts a new run and returns its number, the events of this run carry it
    fn start(&mut self) -> Result<u64, ClientError>;
    fn stop(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(transcript: &str, is_final: bool) -> TranscriptSegment {
        TranscriptSegment {
            transcript: transcript.into(),
            is_final,
        }
    }

    #[test]
    fn final_segments_are_joined_with_trailing_spaces() {
        let result = RecognitionResult {
            result_index: 0,
            results: vec![segment("hello", true), segment("wor", false), segment("world", true)],
        };

        assert_eq!(final_transcript(&result), Some("hello world ".into()));
    }

    #[test]
    fn segments_before_the_result_index_are_skipped() {
        let result = RecognitionResult {
            result_index: 1,
            results: vec![segment("already added", true), segment("def", true)],
        };

        assert_eq!(final_transcript(&result), Some("def ".into()));
    }

    #[test]
    fn interim_or_blank_results_add_nothing() {
        let interim = RecognitionResult {
            result_index: 0,
            results: vec![segment("maybe", false)],
        };
        let blank = RecognitionResult {
            result_index: 0,
            results: vec![segment("  ", true)],
        };

        assert_eq!(final_transcript(&interim), None);
        assert_eq!(final_transcript(&blank), None);
    }

    #[test]
    fn default_config_is_continuous_english_with_interim_results() {
        let config = RecognitionConfig::default();

        assert!(config.continuous);
        assert!(config.interim_results);
        assert_eq!(config.lang, "en-US");
    }
}
