//! Mood model: eight categories with five intensity words each, steered by
//! decaying influences from what happens during a session.

use serde::{Deserialize, Serialize};

/// Steps between two mood evaluations.
pub const PROCESS_EVERY_STEPS: u64 = 50;
const SHIFT_COOLDOWN: u32 = 10;
const INFLUENCE_DECAY: f64 = 0.95;
const MAX_DEPTH: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Joy,
    Curiosity,
    Peace,
    Energy,
    Contemplation,
    Creativity,
    Melancholy,
    Wonder,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Joy,
        Category::Curiosity,
        Category::Peace,
        Category::Energy,
        Category::Contemplation,
        Category::Creativity,
        Category::Melancholy,
        Category::Wonder,
    ];

    pub fn words(self) -> [&'static str; 5] {
        match self {
            Category::Joy => ["content", "happy", "joyful", "elated", "euphoric"],
            Category::Curiosity => ["interested", "curious", "fascinated", "absorbed", "obsessed"],
            Category::Peace => ["calm", "peaceful", "serene", "tranquil", "zen"],
            Category::Energy => ["active", "energetic", "excited", "exhilarated", "electric"],
            Category::Contemplation => [
                "thoughtful",
                "contemplative",
                "reflective",
                "philosophical",
                "profound",
            ],
            Category::Creativity => [
                "inspired",
                "creative",
                "imaginative",
                "visionary",
                "transcendent",
            ],
            Category::Melancholy => ["wistful", "nostalgic", "melancholic", "longing", "bittersweet"],
            Category::Wonder => ["amazed", "wondering", "astonished", "awestruck", "mystified"],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Dreams,
    Chat,
    Music,
    Artwork,
    Creating,
}

impl Source {
    fn index(self) -> usize {
        match self {
            Source::Dreams => 0,
            Source::Chat => 1,
            Source::Music => 2,
            Source::Artwork => 3,
            Source::Creating => 4,
        }
    }
}

/// Session facts the mood evaluation looks at.
#[derive(Debug, Clone, Copy, Default)]
pub struct Activity {
    pub continuous_draws: u32,
    pub distinct_recent_colors: usize,
    pub skip_count: u64,
    pub turbo: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmotionState {
    category: Category,
    depth: usize,
    influences: [f64; 5],
    cooldown: u32,
}

impl Default for EmotionState {
    fn default() -> Self {
        Self {
            category: Category::Curiosity,
            depth: 1,
            influences: [0.0; 5],
            cooldown: 0,
        }
    }
}

impl EmotionState {
    /// Restores the mood that produces `word`, defaulting when unknown.
    pub fn from_word(word: &str) -> Self {
        Category::ALL
            .into_iter()
            .find_map(|category| {
                category
                    .words()
                    .iter()
                    .position(|w| *w == word)
                    .map(|depth| Self {
                        category,
                        depth,
                        ..Self::default()
                    })
            })
            .unwrap_or_default()
    }

    pub fn word(&self) -> &'static str {
        self.category.words()[self.depth]
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn influence(&self, source: Source) -> f64 {
        self.influences[source.index()]
    }

    pub fn influence_by(&mut self, source: Source, amount: f64) {
        let slot = &mut self.influences[source.index()];
        *slot = (*slot + amount).clamp(-1.0, 1.0);
    }

    pub fn is_energetic(&self) -> bool {
        matches!(
            self.word(),
            "energetic" | "excited" | "exhilarated" | "electric"
        )
    }

    pub fn is_calm(&self) -> bool {
        matches!(self.word(), "contemplative" | "peaceful" | "tranquil" | "zen")
    }

    pub fn energy_label(&self) -> &'static str {
        match self.word() {
            "energetic" | "excited" | "exhilarated" => "high",
            "curious" | "creative" | "happy" => "medium",
            _ => "low",
        }
    }

    /// Re-evaluates the mood. Returns `true` when the category changed.
    pub fn process(&mut self, activity: Activity) -> bool {
        let overall = self.influences.iter().sum::<f64>() / self.influences.len() as f64;
        let target = if overall > 0.5 {
            if activity.continuous_draws > 20 {
                Category::Energy
            } else if activity.distinct_recent_colors > 10 {
                Category::Creativity
            } else {
                Category::Joy
            }
        } else if overall > 0.2 {
            if activity.skip_count > 5 {
                Category::Contemplation
            } else {
                Category::Curiosity
            }
        } else if overall > -0.2 {
            Category::Peace
        } else if overall > -0.5 {
            Category::Melancholy
        } else {
            Category::Contemplation
        };

        let target_depth = if activity.continuous_draws > 30 || activity.turbo {
            4
        } else if activity.continuous_draws > 10 {
            3
        } else if activity.skip_count > 10 {
            1
        } else {
            2
        };

        let mut shifted = false;
        if self.cooldown == 0 {
            if target != self.category {
                self.category = target;
                self.cooldown = SHIFT_COOLDOWN;
                shifted = true;
                tracing::info!(category = ?target, "emotional state shifts");
            }
            if target_depth > self.depth {
                self.depth = (self.depth + 1).min(MAX_DEPTH);
            } else if target_depth < self.depth {
                self.depth = self.depth.saturating_sub(1);
            }
        } else {
            self.cooldown -= 1;
        }

        for value in &mut self.influences {
            *value *= INFLUENCE_DECAY;
        }
        shifted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn influences_are_clamped() {
        let mut mood = EmotionState::default();
        mood.influence_by(Source::Music, 0.8);
        mood.influence_by(Source::Music, 0.8);
        assert_eq!(mood.influence(Source::Music), 1.0);
        mood.influence_by(Source::Chat, -3.0);
        assert_eq!(mood.influence(Source::Chat), -1.0);
    }

    #[test]
    fn neutral_mood_settles_into_peace() {
        let mut mood = EmotionState::default();
        assert_eq!(mood.word(), "curious");
        assert!(mood.process(Activity::default()));
        assert_eq!(mood.category(), Category::Peace);
        assert_eq!(mood.word(), "serene");
    }

    #[test]
    fn cooldown_blocks_immediate_second_shift() {
        let mut mood = EmotionState::default();
        mood.process(Activity::default());
        for source in [Source::Dreams, Source::Chat, Source::Music, Source::Artwork, Source::Creating] {
            mood.influence_by(source, 1.0);
        }
        assert!(!mood.process(Activity::default()));
        assert_eq!(mood.category(), Category::Peace);
    }

    #[test]
    fn influences_decay_after_processing() {
        let mut mood = EmotionState::default();
        mood.influence_by(Source::Artwork, 0.5);
        mood.process(Activity::default());
        assert!((mood.influence(Source::Artwork) - 0.475).abs() < 1e-9);
    }

    #[test]
    fn restores_from_word() {
        let mood = EmotionState::from_word("tranquil");
        assert_eq!(mood.category(), Category::Peace);
        assert!(mood.is_calm());
        assert_eq!(EmotionState::from_word("???"), EmotionState::default());
    }
}
