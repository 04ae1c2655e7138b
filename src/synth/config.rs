use super::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable naming an optional JSON config file.
pub const CONFIG_ENV_VAR: &str = "TRIANGLE_SYNTH_CONFIG";

/// Validated attack/decay/sustain/release settings for the amplitude envelope.
/// Durations are in seconds, sustain is a level in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdsrParams {
    attack: f32,
    decay: f32,
    sustain: f32,
    release: f32,
}

impl AdsrParams {
    pub fn new(attack: f32, decay: f32, sustain: f32, release: f32) -> Result<Self, ConfigError> {
        check_duration("attack", attack)?;
        check_duration("decay", decay)?;
        check_level("sustain", sustain)?;
        check_duration("release", release)?;
        Ok(Self {
            attack,
            decay,
            sustain,
            release,
        })
    }

    pub fn attack(&self) -> f32 {
        self.attack
    }

    pub fn decay(&self) -> f32 {
        self.decay
    }

    pub fn sustain(&self) -> f32 {
        self.sustain
    }

    pub fn release(&self) -> f32 {
        self.release
    }
}

impl Default for AdsrParams {
    fn default() -> Self {
        let config = SynthConfig::default();
        Self {
            attack: config.attack,
            decay: config.decay,
            sustain: config.sustain,
            release: config.release,
        }
    }
}

/// Process-wide settings, fixed at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
    /// Pitch of the first trigger key.
    pub frequency: f32,
    /// Pitch of the second trigger key.
    pub second_frequency: f32,
    pub master_volume: f32,
    /// Seconds the generator keeps running after the release ramp reaches silence.
    pub stop_margin: f32,
}

impl SynthConfig {
    /// Reads the file named by [`CONFIG_ENV_VAR`], falling back to defaults when unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::load(Path::new(&path)),
            None => {
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_json(&text)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| ConfigError::Load(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects any value that would produce a negative-duration ramp or an out-of-range level.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.adsr()?;
        check_frequency("frequency", self.frequency)?;
        check_frequency("second_frequency", self.second_frequency)?;
        check_level("master_volume", self.master_volume)?;
        if !self.stop_margin.is_finite() || self.stop_margin < 0.0 {
            return Err(ConfigError::InvalidMargin(self.stop_margin));
        }
        Ok(())
    }

    pub fn adsr(&self) -> Result<AdsrParams, ConfigError> {
        AdsrParams::new(self.attack, self.decay, self.sustain, self.release)
    }
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            attack: 0.01,
            decay: 0.1,
            sustain: 0.8,
            release: 0.3,
            frequency: 220.0,
            second_frequency: 440.0,
            master_volume: 0.5,
            stop_margin: 0.01,
        }
    }
}

fn check_duration(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositiveDuration { name, value })
    }
}

fn check_level(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::LevelOutOfRange { name, value })
    }
}

fn check_frequency(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidFrequency { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SynthConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.frequency, 220.0);
        assert_eq!(config.master_volume, 0.5);
    }

    #[test]
    fn test_rejects_non_positive_durations() {
        assert_eq!(
            AdsrParams::new(0.0, 0.1, 0.5, 0.2),
            Err(ConfigError::NonPositiveDuration {
                name: "attack",
                value: 0.0
            })
        );
        assert!(AdsrParams::new(0.1, -0.1, 0.5, 0.2).is_err());
        assert!(AdsrParams::new(0.1, 0.1, 0.5, f32::NAN).is_err());
    }

    #[test]
    fn test_rejects_sustain_out_of_range() {
        assert!(AdsrParams::new(0.1, 0.1, 1.5, 0.2).is_err());
        assert!(AdsrParams::new(0.1, 0.1, -0.1, 0.2).is_err());
        assert!(AdsrParams::new(0.1, 0.1, 0.0, 0.2).is_ok());
        assert!(AdsrParams::new(0.1, 0.1, 1.0, 0.2).is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = SynthConfig::from_json(r#"{ "attack": 0.1, "sustain": 0.3 }"#).unwrap();
        assert_eq!(config.attack, 0.1);
        assert_eq!(config.sustain, 0.3);
        assert_eq!(config.release, SynthConfig::default().release);
    }

    #[test]
    fn test_json_with_bad_values_is_rejected() {
        let err = SynthConfig::from_json(r#"{ "release": -1.0 }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::NonPositiveDuration {
                name: "release",
                ..
            }
        ));
        assert!(matches!(
            SynthConfig::from_json(r#"{ "frequency": 0.0 }"#),
            Err(ConfigError::InvalidFrequency { .. })
        ));
        assert!(matches!(
            SynthConfig::from_json("not json"),
            Err(ConfigError::Load(_))
        ));
    }
}
