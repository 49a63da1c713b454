pub mod aligner;
pub mod alignment_result;
pub mod audio_clip;
pub mod coaching;
pub mod normalizer;
pub mod reading_coach;
pub mod speech_transcriber;
pub mod token;
