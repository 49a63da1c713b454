use super::audio_clip::AudioClip;

/// Domain interface for speech-to-text transcription.
///
/// Implementations turn a recorded reading attempt into plain text; word
/// timing is not needed for evaluation.
pub trait SpeechTranscriber: Send + Sync {
    fn transcribe(&self, clip: &AudioClip) -> Result<String, Box<dyn std::error::Error>>;
}
