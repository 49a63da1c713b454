use serde::{Deserialize, Serialize};

use crate::reading::domain::coaching::{CoachingFeedback, CoachingRequest};
use crate::reading::domain::reading_coach::ReadingCoach;
use crate::shared::settings::Settings;

use super::service_error::{build_client, check_status, ServiceError};

const CHAT_COMPLETIONS_PATH: &str = "chat/completions";
const SYSTEM_PROMPT: &str = "You speak simply and kindly to children.";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Reading coach backed by an OpenAI-compatible `/chat/completions`
/// endpoint in JSON-object mode.
#[derive(Debug)]
pub struct OpenAiCoach {
    client: reqwest::blocking::Client,
    url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl OpenAiCoach {
    pub fn new(settings: &Settings, api_key: Option<String>) -> Result<Self, ServiceError> {
        let api_key = api_key.ok_or(ServiceError::MissingApiKey)?;
        Ok(Self {
            client: build_client(settings.request_timeout_secs)?,
            url: settings.endpoint(CHAT_COMPLETIONS_PATH),
            api_key,
            model: settings.coach_model.clone(),
            temperature: settings.coach_temperature,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn chat_request(&self, request: &CoachingRequest) -> ChatRequest<'_> {
        ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: build_prompt(request),
                },
            ],
            temperature: self.temperature,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        }
    }
}

impl ReadingCoach for OpenAiCoach {
    fn coach(
        &self,
        request: &CoachingRequest,
    ) -> Result<CoachingFeedback, Box<dyn std::error::Error>> {
        log::info!(
            "Requesting coaching for {} misread words ({}, {})",
            request.misread_words.len(),
            grade_label(request.grade_level),
            self.model
        );

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&self.chat_request(request))
            .send()
            .map_err(|e| ServiceError::Request {
                url: self.url.clone(),
                source: e,
            })?;

        let body = check_status(&self.url, response)?
            .text()
            .map_err(|e| ServiceError::Decode {
                url: self.url.clone(),
                source: e,
            })?;

        Ok(feedback_from_body(&body))
    }
}

/// Extracts feedback from a chat-completions response body.
///
/// Anything unusable (bad envelope, missing content, content that is not the
/// expected JSON object) degrades to [`CoachingFeedback::fallback`].
fn feedback_from_body(body: &str) -> CoachingFeedback {
    let content = serde_json::from_str::<ChatResponse>(body)
        .ok()
        .and_then(|r| r.choices.into_iter().next())
        .and_then(|c| c.message.content);

    let Some(content) = content else {
        log::warn!("Coach response had no message content: {body}");
        return CoachingFeedback::fallback();
    };

    match CoachingFeedback::parse(&content) {
        Some(feedback) => {
            log::debug!("Coach feedback: {feedback:?}");
            feedback
        }
        None => {
            log::warn!("Could not parse coach feedback: {content}");
            CoachingFeedback::fallback()
        }
    }
}

/// User prompt for one reading attempt.
pub fn build_prompt(request: &CoachingRequest) -> String {
    let (min_age, max_age) = age_range(request.grade_level);
    let misreads = if request.misread_words.is_empty() {
        "none".to_string()
    } else {
        request.misread_words.join(", ")
    };

    format!(
        "You are a kind reading tutor for a {min_age}-{max_age} year old child ({grade}).\n\
         Always respond ONLY with a valid JSON object that has these exact keys:\n\
         encouragement (string),\n\
         tips (list of objects {{word, tip}}),\n\
         questions (list of 2 short comprehension questions).\n\
         TARGET PASSAGE: {target}\n\
         CHILD'S TRANSCRIPT: {transcript}\n\
         MISREAD WORDS: {misreads}",
        grade = grade_label(request.grade_level),
        target = request.target,
        transcript = request.transcript,
    )
}

/// Typical age range for a school grade; grade 0 is kindergarten.
pub fn age_range(grade_level: u8) -> (u8, u8) {
    (grade_level.saturating_add(5), grade_level.saturating_add(6))
}

fn grade_label(grade_level: u8) -> String {
    match grade_level {
        0 => "kindergarten".to_string(),
        g => format!("grade {g}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading::domain::coaching::FALLBACK_ENCOURAGEMENT;

    fn request(misreads: &[&str], grade: u8) -> CoachingRequest {
        CoachingRequest {
            target: "The cat sat on the mat.".to_string(),
            transcript: "the cat sit on the mat".to_string(),
            misread_words: misreads.iter().map(|s| s.to_string()).collect(),
            grade_level: grade,
        }
    }

    fn coach() -> OpenAiCoach {
        OpenAiCoach::new(&Settings::default(), Some("test-key".to_string())).unwrap()
    }

    fn chat_body(content: &str) -> String {
        serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        })
        .to_string()
    }

    #[test]
    fn test_new_without_api_key_returns_error() {
        let result = OpenAiCoach::new(&Settings::default(), None);
        assert!(matches!(result, Err(ServiceError::MissingApiKey)));
    }

    #[test]
    fn test_url_from_settings() {
        assert_eq!(coach().url(), "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn test_prompt_lists_misreads() {
        let prompt = build_prompt(&request(&["sat", "mat."], 2));
        assert!(prompt.contains("MISREAD WORDS: sat, mat."));
        assert!(prompt.contains("TARGET PASSAGE: The cat sat on the mat."));
        assert!(prompt.contains("CHILD'S TRANSCRIPT: the cat sit on the mat"));
        assert!(prompt.contains("tips (list of objects {word, tip})"));
    }

    #[test]
    fn test_prompt_without_misreads_says_none() {
        let prompt = build_prompt(&request(&[], 3));
        assert!(prompt.contains("MISREAD WORDS: none"));
    }

    #[test]
    fn test_prompt_is_conditioned_on_grade() {
        assert!(build_prompt(&request(&[], 3)).contains("8-9 year old child (grade 3)"));
        assert!(build_prompt(&request(&[], 0)).contains("5-6 year old child (kindergarten)"));
    }

    #[test]
    fn test_chat_request_shape() {
        let c = coach();
        let req = request(&["sat"], 2);
        let json = serde_json::to_value(c.chat_request(&req)).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["response_format"]["type"], "json_object");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert!(json["messages"][1]["content"]
            .as_str()
            .unwrap()
            .contains("sat"));
    }

    #[test]
    fn test_feedback_from_valid_body() {
        let body = chat_body(
            r#"{"encouragement": "Wonderful!", "tips": [{"word": "sat", "tip": "Short a."}], "questions": ["Who sat?"]}"#,
        );
        let fb = feedback_from_body(&body);
        assert_eq!(fb.encouragement, "Wonderful!");
        assert_eq!(fb.tips[0].word, "sat");
        assert_eq!(fb.questions, vec!["Who sat?".to_string()]);
    }

    #[test]
    fn test_feedback_from_partial_content_is_defaulted() {
        let fb = feedback_from_body(&chat_body(r#"{"encouragement": "Yay!"}"#));
        assert_eq!(fb.encouragement, "Yay!");
        assert!(fb.tips.is_empty());
        assert!(fb.questions.is_empty());
    }

    #[test]
    fn test_feedback_from_prose_content_falls_back() {
        let fb = feedback_from_body(&chat_body("Great reading today!"));
        assert_eq!(fb.encouragement, FALLBACK_ENCOURAGEMENT);
    }

    #[test]
    fn test_feedback_from_bad_envelope_falls_back() {
        assert_eq!(feedback_from_body("<html>oops</html>"), CoachingFeedback::fallback());
        assert_eq!(
            feedback_from_body(r#"{"choices": []}"#),
            CoachingFeedback::fallback()
        );
    }
}
