pub const OPENAI_API_BASE_URL: &str = "https://api.openai.com/v1";
pub const API_KEY_ENV_VAR: &str = "OPENAI_API_KEY";

pub const TRANSCRIPTION_MODEL: &str = "whisper-1";
pub const COACH_MODEL: &str = "gpt-4o-mini";
pub const COACH_TEMPERATURE: f32 = 0.6;

pub const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Grade assumed when none is configured (ages 8-9).
pub const DEFAULT_GRADE_LEVEL: u8 = 3;
pub const MAX_GRADE_LEVEL: u8 = 12;

pub const MAX_BATCH_WORKERS: usize = 8;

pub const SETTINGS_DIR_NAME: &str = "ReadTogether";
pub const SETTINGS_FILE_NAME: &str = "settings.json";
