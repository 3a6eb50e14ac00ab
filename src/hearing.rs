//! Ambient listening toggle. No capture device is opened, so enabling it only
//! arms the listener: audio handed to `on_samples` is counted and dropped, and
//! nothing here touches the canvas or the scheduler.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct Shared {
    enabled: AtomicBool,
    samples: AtomicU64,
}

#[derive(Debug, Clone, Default)]
pub struct AmbientListener {
    shared: Arc<Shared>,
}

impl AmbientListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&self) -> bool {
        let enabled = !self.shared.enabled.fetch_xor(true, Ordering::SeqCst);
        tracing::info!(enabled, "hearing toggled");
        enabled
    }

    pub fn is_enabled(&self) -> bool {
        self.shared.enabled.load(Ordering::SeqCst)
    }

    /// Audio callback entry point. Samples are dropped after counting.
    pub fn on_samples(&self, samples: &[f32]) {
        if self.is_enabled() {
            self.shared
                .samples
                .fetch_add(samples.len() as u64, Ordering::Relaxed);
        }
    }

    pub fn samples_heard(&self) -> u64 {
        self.shared.samples.load(Ordering::Relaxed)
    }

    /// Status line shown after the hearing key is pressed.
    pub fn status(&self) -> String {
        if self.is_enabled() {
            format!(
                "hearing armed, no input device ({} samples)",
                self.samples_heard()
            )
        } else {
            "hearing off".to_string()
        }
    }
}
