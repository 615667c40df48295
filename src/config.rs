// Practice configuration - Initial session settings loaded from a RON file

use std::fs;
use std::path::Path;

use ron::ser::PrettyConfig;
use serde::{Deserialize, Serialize};

use crate::audio::trigger::TriggerGate;
use crate::sequencer::sequence::{DEFAULT_FILL_MAX_INSTANCES, DEFAULT_FILL_TARGET};
use crate::sequencer::tempo::{DEFAULT_BPM, Tempo};
use crate::sequencer::tempo_ramp::{RampCycles, TempoRampState};

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("RON parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("RON error: {0}")]
    Ron(#[from] ron::Error),

    #[error("Ramp cycles must be one of 4, 8, 16 or 32, got {0}")]
    InvalidCycles(u32),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Automatic tempo ramp settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoRampConfig {
    pub enabled: bool,
    /// Loops per tempo step
    pub cycles: u32,
}

impl Default for AutoRampConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            cycles: RampCycles::default().count(),
        }
    }
}

/// Initial settings of a practice session
///
/// Every field is optional in the file; missing ones take the defaults below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PracticeConfig {
    pub bpm: u32,
    pub click_enabled: bool,
    pub sound_enabled: bool,
    pub kick_enabled: bool,
    /// Allow rests in random fills
    pub include_rest: bool,
    pub auto_ramp: AutoRampConfig,
    pub fill_target: usize,
    pub fill_max_instances: usize,
}

impl Default for PracticeConfig {
    fn default() -> Self {
        Self {
            bpm: DEFAULT_BPM,
            click_enabled: true,
            sound_enabled: false,
            kick_enabled: false,
            include_rest: false,
            auto_ramp: AutoRampConfig::default(),
            fill_target: DEFAULT_FILL_TARGET,
            fill_max_instances: DEFAULT_FILL_MAX_INSTANCES,
        }
    }
}

impl PracticeConfig {
    /// Parse and validate a RON document
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(source)?;
        config.validate()
    }

    /// Load and validate a RON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)?;
        let config = Self::from_ron_str(&source)?;
        log::info!("Loaded practice config from {}", path.display());
        Ok(config)
    }

    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(self, PrettyConfig::default())?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        fs::write(path, self.to_ron_string()?)?;
        Ok(())
    }

    /// Check the settings, snapping the tempo to a playable control value
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        if RampCycles::from_count(self.auto_ramp.cycles).is_none() {
            return Err(ConfigError::InvalidCycles(self.auto_ramp.cycles));
        }
        if self.fill_target == 0 {
            return Err(ConfigError::InvalidValue {
                field: "fill_target",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.fill_max_instances == 0 {
            return Err(ConfigError::InvalidValue {
                field: "fill_max_instances",
                reason: "must be at least 1".to_string(),
            });
        }

        let tempo = Tempo::from_control(self.bpm);
        if tempo.bpm() != self.bpm {
            log::warn!("Configured tempo {} BPM adjusted to {}", self.bpm, tempo);
        }
        self.bpm = tempo.bpm();
        Ok(self)
    }

    pub fn tempo(&self) -> Tempo {
        Tempo::from_control(self.bpm)
    }

    pub fn gate(&self) -> TriggerGate {
        TriggerGate::new(self.click_enabled, self.sound_enabled)
    }

    pub fn ramp_cycles(&self) -> RampCycles {
        RampCycles::from_count(self.auto_ramp.cycles).unwrap_or_default()
    }

    pub fn ramp_state(&self) -> TempoRampState {
        TempoRampState::new(self.auto_ramp.enabled, self.ramp_cycles())
    }
}
