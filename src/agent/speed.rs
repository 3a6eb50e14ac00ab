use crate::agent::emotion::EmotionState;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const TURBO_DELAY_MS: u64 = 5;
pub const EMOTION_BASE_DELAY_MS: u64 = 30;
/// Ticks a chosen speed stays in effect.
pub const OVERRIDE_STEPS: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedLevel {
    Instant,
    Fast,
    #[default]
    Normal,
    Slow,
    VerySlow,
}

impl SpeedLevel {
    const ORDER: [SpeedLevel; 5] = [
        SpeedLevel::Instant,
        SpeedLevel::Fast,
        SpeedLevel::Normal,
        SpeedLevel::Slow,
        SpeedLevel::VerySlow,
    ];

    pub fn delay_ms(self) -> u64 {
        match self {
            SpeedLevel::Instant => 5,
            SpeedLevel::Fast => 30,
            SpeedLevel::Normal => 80,
            SpeedLevel::Slow => 200,
            SpeedLevel::VerySlow => 400,
        }
    }

    fn index(self) -> usize {
        Self::ORDER.iter().position(|s| *s == self).unwrap_or(2)
    }

    pub fn faster(self) -> Self {
        Self::ORDER[self.index().saturating_sub(1)]
    }

    pub fn slower(self) -> Self {
        Self::ORDER[(self.index() + 1).min(Self::ORDER.len() - 1)]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpeedControl {
    level: SpeedLevel,
    override_remaining: u32,
    turbo: bool,
}

impl SpeedControl {
    pub fn with_level(level: SpeedLevel) -> Self {
        Self {
            level,
            ..Self::default()
        }
    }

    pub fn level(&self) -> SpeedLevel {
        self.level
    }

    pub fn turbo(&self) -> bool {
        self.turbo
    }

    pub fn toggle_turbo(&mut self) -> bool {
        self.turbo = !self.turbo;
        tracing::info!(turbo = self.turbo, "turbo mode toggled");
        self.turbo
    }

    pub fn faster(&mut self) {
        self.choose(self.level.faster());
    }

    pub fn slower(&mut self) {
        self.choose(self.level.slower());
    }

    fn choose(&mut self, level: SpeedLevel) {
        self.level = level;
        self.override_remaining = OVERRIDE_STEPS;
        tracing::info!(?level, delay_ms = level.delay_ms(), "speed chosen");
    }

    /// Delay before the next tick. Consumes one step of a chosen-speed override.
    pub fn next_delay(&mut self, fixed_ms: Option<u64>, mood: &EmotionState) -> Duration {
        let ms = if let Some(fixed) = fixed_ms {
            fixed
        } else if self.turbo {
            TURBO_DELAY_MS
        } else if self.override_remaining > 0 {
            self.override_remaining -= 1;
            self.level.delay_ms()
        } else if mood.is_energetic() {
            EMOTION_BASE_DELAY_MS / 2
        } else if mood.is_calm() {
            EMOTION_BASE_DELAY_MS * 2
        } else {
            EMOTION_BASE_DELAY_MS
        };
        Duration::from_millis(ms)
    }

    /// Delay the next tick would use, without consuming anything.
    pub fn current_delay_ms(&self, fixed_ms: Option<u64>, mood: &EmotionState) -> u64 {
        self.clone().next_delay(fixed_ms, mood).as_millis() as u64
    }
}
