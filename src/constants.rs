//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Bounds exposed to the user for generation settings
pub mod settings {
    /// Smallest accepted response length (words)
    pub const LENGTH_MIN: u32 = 40;

    /// Largest accepted response length (words)
    pub const LENGTH_MAX: u32 = 150;

    /// Default response length (words)
    pub const LENGTH_DEFAULT: u32 = 90;

    /// Lowest creativity (sampling temperature)
    pub const CREATIVITY_MIN: f64 = 0.0;

    /// Highest creativity (sampling temperature)
    pub const CREATIVITY_MAX: f64 = 1.5;

    /// Default creativity
    pub const CREATIVITY_DEFAULT: f64 = 0.7;
}

/// Token budget conversion factors
pub mod budget {
    /// max_new_tokens = round(words * MAX_TOKENS_PER_WORD)
    pub const MAX_TOKENS_PER_WORD: f64 = 1.5;

    /// min_new_tokens = round(words * MIN_TOKENS_PER_WORD)
    pub const MIN_TOKENS_PER_WORD: f64 = 0.5;
}

/// Generation request defaults
pub mod generation {
    /// Characters of user input sent to the classifier
    pub const CLASSIFIER_PREFIX_CHARS: usize = 256;

    /// Forbid repeating n-grams of this size in the output
    pub const NO_REPEAT_NGRAM_SIZE: u32 = 3;

    /// Forbid copying n-grams of this size from the prompt
    pub const ENCODER_NO_REPEAT_NGRAM_SIZE: u32 = 3;

    /// Penalty applied to already generated tokens
    pub const REPETITION_PENALTY: f64 = 1.1;

    /// Marker some generators echo before the actual reply
    pub const RESPONSE_MARKER: &str = "### Response";
}

/// Language detection constants
pub mod language {
    /// Sentinel returned when no language could be identified
    pub const UNKNOWN: &str = "unknown";
}

/// HTTP/Network constants
pub mod network {
    /// Default request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
}
