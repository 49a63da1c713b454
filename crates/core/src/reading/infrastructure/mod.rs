pub mod openai_coach;
pub mod openai_transcriber;
pub mod service_error;
