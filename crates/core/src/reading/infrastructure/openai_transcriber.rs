use reqwest::blocking::multipart::{Form, Part};
use serde::Deserialize;

use crate::reading::domain::audio_clip::AudioClip;
use crate::reading::domain::speech_transcriber::SpeechTranscriber;
use crate::shared::settings::Settings;

use super::service_error::{build_client, check_status, ServiceError};

const TRANSCRIPTIONS_PATH: &str = "audio/transcriptions";

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    text: String,
}

/// Speech transcriber backed by an OpenAI-compatible
/// `/audio/transcriptions` endpoint.
#[derive(Debug)]
pub struct OpenAiTranscriber {
    client: reqwest::blocking::Client,
    url: String,
    api_key: String,
    model: String,
}

impl OpenAiTranscriber {
    pub fn new(settings: &Settings, api_key: Option<String>) -> Result<Self, ServiceError> {
        let api_key = api_key.ok_or(ServiceError::MissingApiKey)?;
        Ok(Self {
            client: build_client(settings.request_timeout_secs)?,
            url: settings.endpoint(TRANSCRIPTIONS_PATH),
            api_key,
            model: settings.transcription_model.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn form(&self, clip: &AudioClip) -> Result<Form, ServiceError> {
        let part = Part::bytes(clip.bytes().to_vec())
            .file_name(clip.filename().to_string())
            .mime_str(clip.mime_type())
            .map_err(|e| ServiceError::InvalidMime {
                filename: clip.filename().to_string(),
                mime: clip.mime_type().to_string(),
                source: e,
            })?;
        Ok(Form::new()
            .part("file", part)
            .text("model", self.model.clone()))
    }
}

impl SpeechTranscriber for OpenAiTranscriber {
    fn transcribe(&self, clip: &AudioClip) -> Result<String, Box<dyn std::error::Error>> {
        if clip.is_empty() {
            return Err(format!("Audio clip {} is empty", clip.filename()).into());
        }

        log::info!(
            "Transcribing {} ({} bytes, {}) with {}",
            clip.filename(),
            clip.bytes().len(),
            clip.mime_type(),
            self.model
        );

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .multipart(self.form(clip)?)
            .send()
            .map_err(|e| ServiceError::Request {
                url: self.url.clone(),
                source: e,
            })?;

        let body: TranscriptionResponse =
            check_status(&self.url, response)?
                .json()
                .map_err(|e| ServiceError::Decode {
                    url: self.url.clone(),
                    source: e,
                })?;

        log::debug!("Transcript: {}", body.text);
        Ok(body.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcriber() -> OpenAiTranscriber {
        OpenAiTranscriber::new(&Settings::default(), Some("test-key".to_string())).unwrap()
    }

    #[test]
    fn test_new_without_api_key_returns_error() {
        let result = OpenAiTranscriber::new(&Settings::default(), None);
        assert!(matches!(result, Err(ServiceError::MissingApiKey)));
    }

    #[test]
    fn test_new_uses_settings() {
        let settings = Settings {
            api_base_url: "http://localhost:9000/v1".to_string(),
            transcription_model: "whisper-large".to_string(),
            ..Settings::default()
        };
        let t = OpenAiTranscriber::new(&settings, Some("k".to_string())).unwrap();
        assert_eq!(t.url(), "http://localhost:9000/v1/audio/transcriptions");
        assert_eq!(t.model(), "whisper-large");
    }

    #[test]
    fn test_empty_clip_is_rejected_before_request() {
        let clip = AudioClip::new(Vec::new(), "silence.webm", "audio/webm");
        let err = transcriber().transcribe(&clip).unwrap_err();
        assert!(err.to_string().contains("empty"), "got: {err}");
    }

    #[test]
    fn test_form_accepts_clip_mime_type() {
        let clip = AudioClip::new(vec![1, 2, 3], "take.wav", "audio/wav");
        assert!(transcriber().form(&clip).is_ok());
    }

    #[test]
    fn test_form_rejects_malformed_mime_type() {
        let clip = AudioClip::new(vec![1, 2, 3], "take.bin", "not a mime type");
        let err = transcriber().form(&clip).err().unwrap();
        assert!(
            matches!(&err, ServiceError::InvalidMime { mime, .. } if mime == "not a mime type")
        );
        assert!(err.to_string().contains("take.bin"));
    }

    #[test]
    fn test_response_missing_text_defaults_to_empty() {
        let body: TranscriptionResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(body.text, "");
        let body: TranscriptionResponse =
            serde_json::from_str(r#"{"text": "the cat sat"}"#).unwrap();
        assert_eq!(body.text, "the cat sat");
    }
}
