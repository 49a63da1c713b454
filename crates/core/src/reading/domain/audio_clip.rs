use std::fs;
use std::path::Path;

pub const DEFAULT_AUDIO_FILENAME: &str = "audio.webm";
pub const DEFAULT_AUDIO_MIME: &str = "audio/webm";

/// A recorded reading attempt held in memory.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioClip {
    bytes: Vec<u8>,
    filename: String,
    mime_type: String,
}

impl AudioClip {
    pub fn new(bytes: Vec<u8>, filename: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            filename: filename.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Reads an audio file, inferring the MIME type from its extension.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = fs::read(path)?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(DEFAULT_AUDIO_FILENAME)
            .to_string();
        Ok(Self::new(bytes, filename, mime_for_path(path)))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// MIME type for a recording, keyed on file extension. Unknown extensions
/// fall back to `audio/webm`, the format browsers record in.
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());
    match ext.as_deref() {
        Some("wav") => "audio/wav",
        Some("mp3") | Some("mpeg") | Some("mpga") => "audio/mpeg",
        Some("m4a") => "audio/mp4",
        Some("mp4") => "video/mp4",
        Some("ogg") | Some("oga") => "audio/ogg",
        Some("flac") => "audio/flac",
        _ => DEFAULT_AUDIO_MIME,
    }
}
