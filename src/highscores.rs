//! High score persistence
//!
//! A single numeric best score, persisted to LocalStorage on the web and
//! held in memory elsewhere.

use serde::{Deserialize, Serialize};

/// Port through which the simulation reads and writes the best score
pub trait ScorePersistence {
    fn high_score(&self) -> u32;
    fn set_high_score(&mut self, score: u32);
}

/// The persisted best score
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HighScore {
    pub value: u32,
}

impl HighScore {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "quiz_runner_highscore";

    pub fn new(value: u32) -> Self {
        Self { value }
    }

    /// Load the best score from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(raw)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(value) = raw.parse::<u32>() {
                    log::info!("Loaded high score {value}");
                    return Self { value };
                }
            }
        }

        log::info!("No high score found, starting fresh");
        Self::default()
    }

    /// Save the best score to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            let _ = storage.set_item(Self::STORAGE_KEY, &self.value.to_string());
            log::info!("High score saved ({})", self.value);
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

impl ScorePersistence for HighScore {
    fn high_score(&self) -> u32 {
        self.value
    }

    fn set_high_score(&mut self, score: u32) {
        if score > self.value {
            self.value = score;
            self.save();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_only_raises() {
        let mut hs = HighScore::new(50);
        hs.set_high_score(30);
        assert_eq!(hs.high_score(), 50);
        hs.set_high_score(60);
        assert_eq!(hs.high_score(), 60);
    }
}
