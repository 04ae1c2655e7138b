use std::fmt;

/// Parameter-domain violations, caught before any audio starts.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// An envelope duration was zero, negative or not finite.
    NonPositiveDuration { name: &'static str, value: f32 },
    /// A level fell outside `[0, 1]`.
    LevelOutOfRange { name: &'static str, value: f32 },
    /// A frequency was zero, negative or not finite.
    InvalidFrequency { name: &'static str, value: f32 },
    /// The stop margin was negative or not finite.
    InvalidMargin(f32),
    /// The config file could not be read or parsed.
    Load(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NonPositiveDuration { name, value } => {
                write!(f, "{} must be a positive number of seconds, got {}", name, value)
            }
            ConfigError::LevelOutOfRange { name, value } => {
                write!(f, "{} must be within [0, 1], got {}", name, value)
            }
            ConfigError::InvalidFrequency { name, value } => {
                write!(f, "{} must be a positive frequency in Hz, got {}", name, value)
            }
            ConfigError::InvalidMargin(value) => {
                write!(f, "stop_margin must be zero or more seconds, got {}", value)
            }
            ConfigError::Load(reason) => write!(f, "failed to load config: {}", reason),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Misuse of a single-use tone generator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeneratorError {
    AlreadyStopped,
}

impl fmt::Display for GeneratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneratorError::AlreadyStopped => write!(f, "tone generator has already been stopped"),
        }
    }
}

impl std::error::Error for GeneratorError {}
