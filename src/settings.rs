//! Page settings and preferences
//!
//! Persisted as JSON under one storage key, separate from the snake best score.

use serde::{Deserialize, Serialize};

use crate::particles::{ConnectionMode, FieldConfig};
use crate::platform::KeyValueStore;
use crate::terminal::Theme;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Next preset for the cycling quality button
    pub fn next(&self) -> Self {
        match self {
            QualityPreset::Low => QualityPreset::Medium,
            QualityPreset::Medium => QualityPreset::High,
            QualityPreset::High => QualityPreset::Low,
        }
    }

    /// Upper bound on background particles. Only Low caps the field;
    /// the other presets keep the full density count.
    pub fn max_particles(&self) -> Option<usize> {
        match self {
            QualityPreset::Low => Some(80),
            QualityPreset::Medium | QualityPreset::High => None,
        }
    }

    /// Whether constellation lines are drawn at all
    pub fn connections_enabled(&self) -> bool {
        !matches!(self, QualityPreset::Low)
    }
}

/// What drives the background reactivity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ReactiveMode {
    /// Particles shy away from the pointer
    #[default]
    Pointer,
    /// Particles follow the music player
    Audio,
}

impl ReactiveMode {
    pub fn label(&self) -> &'static str {
        match self {
            ReactiveMode::Pointer => "Pointer",
            ReactiveMode::Audio => "Music",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            ReactiveMode::Pointer => ReactiveMode::Audio,
            ReactiveMode::Audio => ReactiveMode::Pointer,
        }
    }
}

/// Page settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,
    /// Background input source
    pub reactive_mode: ReactiveMode,
    /// Freeze pulsing and beat flashes
    pub reduced_motion: bool,
    /// Music player volume (0 - 100)
    pub volume: u8,
    /// Terminal colour theme
    pub terminal_theme: Theme,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            reactive_mode: ReactiveMode::Pointer,
            reduced_motion: false,
            volume: 50,
            terminal_theme: Theme::Black,
        }
    }
}

impl Settings {
    /// Storage key
    const STORAGE_KEY: &'static str = "czch_settings";

    /// Effective particle cap
    pub fn max_particles(&self) -> Option<usize> {
        self.quality.max_particles()
    }

    /// Effective beat flash (respects reduced_motion)
    pub fn effective_flash(&self) -> bool {
        !self.reduced_motion
    }

    /// Background field configuration for the current preferences
    pub fn field_config(&self) -> FieldConfig {
        let base = match self.reactive_mode {
            ReactiveMode::Pointer => FieldConfig::default(),
            ReactiveMode::Audio => FieldConfig::reactive(),
        };
        FieldConfig {
            max_particles: self.max_particles(),
            connections: if self.quality.connections_enabled() {
                base.connections
            } else {
                ConnectionMode::Off
            },
            pulse: !self.reduced_motion,
            flash: self.effective_flash(),
            ..base
        }
    }

    /// Load settings, falling back to defaults on anything unexpected
    pub fn load(store: &dyn KeyValueStore) -> Self {
        if let Some(json) = store.get(Self::STORAGE_KEY) {
            match serde_json::from_str::<Settings>(&json) {
                Ok(mut settings) => {
                    settings.volume = settings.volume.min(100);
                    log::info!("Loaded settings");
                    return settings;
                }
                Err(e) => log::warn!("Ignoring stored settings: {}", e),
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Persist settings; failures are logged only
    pub fn save(&self, store: &mut dyn KeyValueStore) {
        match serde_json::to_string(self) {
            Ok(json) => match store.set(Self::STORAGE_KEY, &json) {
                Ok(()) => log::info!("Settings saved"),
                Err(e) => log::warn!("Settings not saved: {}", e),
            },
            Err(e) => log::warn!("Settings not serialised: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStore;

    #[test]
    fn test_quality_parse() {
        assert_eq!(QualityPreset::parse("HIGH"), Some(QualityPreset::High));
        assert_eq!(QualityPreset::parse("med"), Some(QualityPreset::Medium));
        assert_eq!(QualityPreset::parse("ultra"), None);
        assert_eq!(QualityPreset::High.next(), QualityPreset::Low);
        assert_eq!(ReactiveMode::Pointer.toggled(), ReactiveMode::Audio);
    }

    #[test]
    fn test_settings_round_trip_through_store() {
        let mut store = MemoryStore::new();
        let settings = Settings {
            quality: QualityPreset::High,
            reactive_mode: ReactiveMode::Audio,
            reduced_motion: true,
            volume: 80,
            terminal_theme: Theme::Cyan,
        };
        settings.save(&mut store);
        assert_eq!(Settings::load(&store), settings);
    }

    #[test]
    fn test_field_config_follows_preferences() {
        let config = Settings::default().field_config();
        assert!(!config.reactive);
        assert_eq!(config.max_particles, None);
        assert_eq!(config.connections, ConnectionMode::Always);

        let config = Settings {
            quality: QualityPreset::Low,
            reactive_mode: ReactiveMode::Audio,
            reduced_motion: true,
            ..Settings::default()
        }
        .field_config();
        assert!(config.reactive);
        assert_eq!(config.max_particles, Some(80));
        assert_eq!(config.connections, ConnectionMode::Off);
        assert!(!config.pulse);
        assert!(!config.flash);
    }

    #[test]
    fn test_default_settings_keep_density_count_on_large_screens() {
        use crate::consts::{PARTICLE_DENSITY, REACTIVE_DENSITY_MULTIPLIER};
        use crate::particles::ParticleField;

        let (w, h) = (2560.0f32, 1440.0f32);
        let base = (w * h / PARTICLE_DENSITY).floor();

        let pointer = Settings::default();
        let mut field = ParticleField::new(pointer.field_config(), 1);
        field.resize(w, h);
        assert_eq!(field.particle_count(), base as usize);

        let audio = Settings {
            reactive_mode: ReactiveMode::Audio,
            ..Settings::default()
        };
        let mut field = ParticleField::new(audio.field_config(), 1);
        field.resize(w, h);
        assert_eq!(
            field.particle_count(),
            (base * REACTIVE_DENSITY_MULTIPLIER).floor() as usize
        );

        let high = Settings {
            quality: QualityPreset::High,
            ..Settings::default()
        };
        let mut field = ParticleField::new(high.field_config(), 1);
        field.resize(2560.0, 1600.0);
        assert_eq!(field.particle_count(), 273);
    }

    #[test]
    fn test_partial_or_corrupt_settings() {
        let mut store = MemoryStore::new();
        store
            .set(Settings::STORAGE_KEY, r#"{"reactive_mode":"Audio"}"#)
            .unwrap();
        let settings = Settings::load(&store);
        assert_eq!(settings.reactive_mode, ReactiveMode::Audio);
        assert_eq!(settings.volume, 50);

        store.set(Settings::STORAGE_KEY, "{not json").unwrap();
        assert_eq!(Settings::load(&store), Settings::default());
    }
}
