use crate::agent::memory::RetentionPolicy;
use crate::agent::scheduler::SchedulerConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelBackend {
    /// llama.cpp compatible HTTP server.
    Http,
    /// Offline scripted model.
    Demo,
}

impl Default for ModelBackend {
    fn default() -> Self {
        ModelBackend::Http
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSettings {
    #[serde(default)]
    pub backend: ModelBackend,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            backend: ModelBackend::default(),
            endpoint: default_endpoint(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// When enabled the application initialises the logger at debug level.
    #[serde(default)]
    pub debug_logging: bool,
    /// Folder holding `canvas/` state and `snapshots/`.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub model: ModelSettings,
    #[serde(default = "default_screen_width")]
    pub screen_width: u32,
    #[serde(default = "default_screen_height")]
    pub screen_height: u32,
    #[serde(default = "default_true")]
    pub fullscreen: bool,
    #[serde(default = "default_checkin_interval")]
    pub checkin_interval_secs: u64,
    #[serde(default = "default_break_duration")]
    pub break_duration_secs: u64,
    #[serde(default = "default_rest_duration")]
    pub rest_duration_secs: u64,
    #[serde(default = "default_chat_follow_up")]
    pub chat_follow_up_secs: u64,
    /// Invalid check-in answers tolerated before drawing resumes.
    #[serde(default = "default_max_choice_retries")]
    pub max_choice_retries: u32,
    /// Overrides every other inter-tick delay when set.
    #[serde(default)]
    pub fixed_delay_ms: Option<u64>,
    #[serde(default = "default_save_every_steps")]
    pub save_every_steps: u64,
    #[serde(default)]
    pub dream_retention: RetentionPolicy,
    #[serde(default = "default_true")]
    pub sound_enabled: bool,
}

fn default_endpoint() -> String {
    "http://127.0.0.1:8080".into()
}

fn default_request_timeout() -> u64 {
    120
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("aurora_data")
}

fn default_screen_width() -> u32 {
    1920
}

fn default_screen_height() -> u32 {
    1080
}

fn default_true() -> bool {
    true
}

fn default_checkin_interval() -> u64 {
    45 * 60
}

fn default_break_duration() -> u64 {
    20 * 60
}

fn default_rest_duration() -> u64 {
    60 * 60
}

fn default_chat_follow_up() -> u64 {
    10 * 60
}

fn default_max_choice_retries() -> u32 {
    5
}

fn default_save_every_steps() -> u64 {
    100
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug_logging: false,
            data_dir: default_data_dir(),
            model: ModelSettings::default(),
            screen_width: default_screen_width(),
            screen_height: default_screen_height(),
            fullscreen: true,
            checkin_interval_secs: default_checkin_interval(),
            break_duration_secs: default_break_duration(),
            rest_duration_secs: default_rest_duration(),
            chat_follow_up_secs: default_chat_follow_up(),
            max_choice_retries: default_max_choice_retries(),
            fixed_delay_ms: None,
            save_every_steps: default_save_every_steps(),
            dream_retention: RetentionPolicy::default(),
            sound_enabled: true,
        }
    }
}

impl Settings {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn screen(&self) -> (u32, u32) {
        (self.screen_width.max(1), self.screen_height.max(1))
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        let secs = |s: u64| chrono::Duration::seconds(s.min(i64::MAX as u64) as i64);
        SchedulerConfig {
            checkin_interval: secs(self.checkin_interval_secs),
            break_duration: secs(self.break_duration_secs),
            rest_duration: secs(self.rest_duration_secs),
            chat_follow_up: secs(self.chat_follow_up_secs),
            max_choice_retries: self.max_choice_retries.max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("settings.json");
        let loaded = Settings::load(&path.to_string_lossy()).expect("load");
        assert_eq!(loaded, Settings::default());
    }

    #[test]
    fn partial_file_fills_remaining_fields() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"model": {"backend": "demo"}, "fixed_delay_ms": 10, "dream_retention": {"policy": "fraction", "fraction": 0.5}}"#,
        )
        .expect("write settings");
        let loaded = Settings::load(&path.to_string_lossy()).expect("load");
        assert_eq!(loaded.model.backend, ModelBackend::Demo);
        assert_eq!(loaded.model.endpoint, default_endpoint());
        assert_eq!(loaded.fixed_delay_ms, Some(10));
        assert_eq!(loaded.rest_duration_secs, 3600);
        assert_eq!(
            loaded.dream_retention,
            RetentionPolicy::Fraction { fraction: 0.5 }
        );
    }

    #[test]
    fn save_then_load_roundtrip() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("settings.json");
        let mut settings = Settings::default();
        settings.debug_logging = true;
        settings.save_every_steps = 7;
        settings.save(&path.to_string_lossy()).expect("save");
        let loaded = Settings::load(&path.to_string_lossy()).expect("load");
        assert_eq!(loaded, settings);
    }

    #[test]
    fn scheduler_config_uses_seconds() {
        let config = Settings::default().scheduler_config();
        assert_eq!(config.checkin_interval, chrono::Duration::seconds(2700));
        assert_eq!(config.break_duration, chrono::Duration::seconds(1200));
        assert_eq!(config.rest_duration, chrono::Duration::seconds(3600));
    }
}
