use {
    serde::{Deserialize, Serialize},
    std::fmt,
};

// Audio window constants
pub const SAMPLE_RATE: usize = 16000;
pub const CHUNK_SECONDS: usize = 30;
pub const N_SAMPLES: usize = CHUNK_SECONDS * SAMPLE_RATE; // 480000

// Control token ids, see the model's added-tokens table
pub const END_OF_TEXT: i64 = 50257;
pub const START_OF_TRANSCRIPT: i64 = 50258;
pub const NO_TIMESTAMPS: i64 = 50363;

/// Transcription language, carrying the model's language control token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum Language {
    English,
    German,
    French,
}

impl Language {
    pub fn token_id(self) -> i64 {
        match self {
            Language::English => 50259,
            Language::German => 50261,
            Language::French => 50265,
        }
    }

    /// Parse an IETF BCP 47 language tag (e.g. `"en"`) into a `Language`.
    ///
    /// Matching is case-insensitive; region subtags are ignored.
    pub fn from_ietf(tag: &str) -> Option<Language> {
        let primary = tag.split('-').next().unwrap_or(tag);
        match primary.to_ascii_lowercase().as_str() {
            "en" => Some(Language::English),
            "de" => Some(Language::German),
            "fr" => Some(Language::French),
            _ => None,
        }
    }

    pub fn to_ietf(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::German => "de",
            Language::French => "fr",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::English => write!(f, "English"),
            Language::German => write!(f, "German"),
            Language::French => write!(f, "French"),
        }
    }
}

/// Decode task, carrying the model's task control token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum Task {
    Transcribe,
    Translate,
}

impl Task {
    pub fn token_id(self) -> i64 {
        match self {
            Task::Transcribe => 50359,
            Task::Translate => 50358,
        }
    }
}

/// Decode configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub language: Language,
    pub task: Task,
    /// Token buffer capacity of one decode session.
    pub max_tokens: usize,
    pub decoder_layers: usize,
    pub vocab_size: usize,
}

impl Config {
    /// Configuration for the whisper-tiny four-model export.
    pub fn tiny() -> Self {
        Self {
            language: Language::English,
            task: Task::Transcribe,
            max_tokens: 100,
            decoder_layers: 4,
            vocab_size: 51865,
        }
    }

    /// The fixed three-token control prefix every session starts with.
    pub fn control_prefix(&self) -> [i64; 3] {
        [
            START_OF_TRANSCRIPT,
            self.language.token_id(),
            self.task.token_id(),
        ]
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::tiny()
    }
}
