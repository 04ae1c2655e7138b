pub mod clock;
pub mod config;
pub mod controller;
pub mod core;
pub mod envelope;
pub mod error;
pub mod note;
pub mod oscillator;
pub mod output;

pub use self::config::{AdsrParams, SynthConfig};
pub use self::controller::{NoteController, NoteState};
pub use self::core::Synth;
pub use self::error::{ConfigError, GeneratorError};
