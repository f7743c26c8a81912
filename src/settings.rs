//! Game settings and preferences
//!
//! Process-wide toggles set by the surrounding UI. Persisted in LocalStorage
//! on the web; the native build always starts from defaults.

use serde::{Deserialize, Serialize};

/// Three-step master volume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum VolumeLevel {
    Muted,
    Low,
    #[default]
    High,
}

impl VolumeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            VolumeLevel::Muted => "Muted",
            VolumeLevel::Low => "Low",
            VolumeLevel::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "muted" | "mute" | "off" => Some(VolumeLevel::Muted),
            "low" => Some(VolumeLevel::Low),
            "high" => Some(VolumeLevel::High),
            _ => None,
        }
    }

    /// Gain multiplier applied to the master bus
    pub fn gain(&self) -> f32 {
        match self {
            VolumeLevel::Muted => 0.0,
            VolumeLevel::Low => 0.8,
            VolumeLevel::High => 1.6,
        }
    }

    /// Next step of the volume toggle (High wraps to Muted)
    pub fn cycle(&self) -> Self {
        match self {
            VolumeLevel::Muted => VolumeLevel::Low,
            VolumeLevel::Low => VolumeLevel::High,
            VolumeLevel::High => VolumeLevel::Muted,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Practice mode: widgets pulse completion instead of locking
    #[serde(default)]
    pub zen_mode: bool,
    /// Master volume step
    #[serde(default)]
    pub volume: VolumeLevel,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            zen_mode: false,
            volume: VolumeLevel::High,
        }
    }
}

impl Settings {
    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "tap_toys_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
