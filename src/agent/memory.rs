use crate::agent::scheduler::SleepPhase;
use crate::draw::model::{ColorId, ToolId};
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

pub const CODE_HISTORY_LIMIT: usize = 1000;
pub const DREAM_HISTORY_LIMIT: usize = 100;

/// FIFO history that evicts its oldest entries beyond `limit`.
#[derive(Debug, Clone, PartialEq)]
pub struct Bounded<T> {
    items: VecDeque<T>,
    limit: usize,
}

impl<T> Bounded<T> {
    pub fn new(limit: usize) -> Self {
        Self {
            items: VecDeque::new(),
            limit,
        }
    }

    /// Keeps the most recent `limit` entries of `items`.
    pub fn from_vec(items: Vec<T>, limit: usize) -> Self {
        let mut bounded = Self::new(limit);
        bounded.extend(items);
        bounded
    }

    pub fn push(&mut self, item: T) {
        self.items.push_back(item);
        while self.items.len() > self.limit {
            self.items.pop_front();
        }
    }

    pub fn extend(&mut self, items: impl IntoIterator<Item = T>) {
        for item in items {
            self.push(item);
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.items.iter()
    }

    pub fn last(&self) -> Option<&T> {
        self.items.back()
    }

    /// Up to `n` most recent entries, oldest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &T> {
        self.items.iter().skip(self.items.len().saturating_sub(n))
    }
}

impl<T: Clone> Bounded<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeContext {
    pub emotion: String,
    pub x: i32,
    pub y: i32,
    pub color: ColorId,
    pub pen_down: bool,
    pub pixels_drawn: usize,
    pub tool: ToolId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeMemory {
    pub code: String,
    pub context: CodeContext,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dream {
    pub content: String,
    pub phase: SleepPhase,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub context_snapshot: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum RetentionPolicy {
    /// Every session dream is kept, in shuffled order.
    #[default]
    RetainAll,
    /// Keeps a uniform sample of `fraction` of the session dreams.
    Fraction { fraction: f64 },
}

impl RetentionPolicy {
    pub fn sample_size(self, available: usize) -> usize {
        match self {
            RetentionPolicy::RetainAll => available,
            RetentionPolicy::Fraction { fraction } => {
                ((available as f64) * fraction.clamp(0.0, 1.0)).round() as usize
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionMemory {
    pub code_history: Bounded<CodeMemory>,
    pub dreams: Bounded<Dream>,
    pub session_dreams: Vec<Dream>,
}

impl Default for SessionMemory {
    fn default() -> Self {
        Self {
            code_history: Bounded::new(CODE_HISTORY_LIMIT),
            dreams: Bounded::new(DREAM_HISTORY_LIMIT),
            session_dreams: Vec::new(),
        }
    }
}

impl SessionMemory {
    pub fn restore(code_history: Vec<CodeMemory>, dreams: Vec<Dream>) -> Self {
        Self {
            code_history: Bounded::from_vec(code_history, CODE_HISTORY_LIMIT),
            dreams: Bounded::from_vec(dreams, DREAM_HISTORY_LIMIT),
            session_dreams: Vec::new(),
        }
    }

    pub fn remember_code(&mut self, code: String, context: CodeContext, now: DateTime<Utc>) {
        self.code_history.push(CodeMemory {
            code,
            context,
            timestamp: now,
        });
    }

    pub fn record_dream(&mut self, dream: Dream) {
        self.session_dreams.push(dream);
    }

    /// Moves a sample of the session dreams into long-term history and clears
    /// the session list. Returns how many were kept.
    pub fn retain_dreams<R: Rng + ?Sized>(&mut self, policy: RetentionPolicy, rng: &mut R) -> usize {
        if let RetentionPolicy::Fraction { fraction } = policy {
            tracing::warn!(fraction, "dream retention uses a partial sample");
        }
        let amount = policy.sample_size(self.session_dreams.len());
        let mut session = std::mem::take(&mut self.session_dreams);
        let (kept, _) = session.partial_shuffle(rng, amount);
        let kept = kept.to_vec();
        let count = kept.len();
        self.dreams.extend(kept);
        tracing::info!(kept = count, total = self.dreams.len(), "dreams retained");
        count
    }

    /// Code strings of the last `n` cycles, oldest first.
    pub fn recent_codes(&self, n: usize) -> Vec<&str> {
        self.code_history.recent(n).map(|m| m.code.as_str()).collect()
    }

    /// True when the last three recorded codes are identical.
    pub fn is_repeating(&self) -> bool {
        let recent = self.recent_codes(3);
        recent.len() == 3 && recent.iter().all(|c| *c == recent[0])
    }

    pub fn recent_pixels(&self, n: usize) -> usize {
        self.code_history
            .recent(n)
            .map(|m| m.context.pixels_drawn)
            .sum()
    }
}
