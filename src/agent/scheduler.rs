//! Timed mode state machine: drawing, check-in choice, chat break and rest.
//!
//! All decisions take the current time as an argument so the machine can be
//! driven by a fake clock.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

const LIGHT_PHASE_SECS: i64 = 1200;
const REM_PHASE_SECS: i64 = 2400;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SleepPhase {
    #[default]
    Light,
    Rem,
    Waking,
}

impl SleepPhase {
    pub fn for_elapsed(elapsed: Duration) -> Self {
        if elapsed < Duration::seconds(LIGHT_PHASE_SECS) {
            SleepPhase::Light
        } else if elapsed < Duration::seconds(REM_PHASE_SECS) {
            SleepPhase::Rem
        } else {
            SleepPhase::Waking
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SleepPhase::Light => "light",
            SleepPhase::Rem => "rem",
            SleepPhase::Waking => "waking",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Drawing,
    AwaitingChoice,
    Chatting,
    Resting(SleepPhase),
}

/// Persisted name of a mode; the sleep phase is stored separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeKind {
    #[default]
    Drawing,
    AwaitingChoice,
    Chatting,
    Resting,
}

impl Mode {
    pub fn kind(self) -> ModeKind {
        match self {
            Mode::Drawing => ModeKind::Drawing,
            Mode::AwaitingChoice => ModeKind::AwaitingChoice,
            Mode::Chatting => ModeKind::Chatting,
            Mode::Resting(_) => ModeKind::Resting,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeChoice {
    Chat,
    Dream,
    Draw,
}

impl ModeChoice {
    /// Exact match after trimming, ignoring case.
    pub fn parse(answer: &str) -> Option<Self> {
        match answer.trim().to_uppercase().as_str() {
            "CHAT" => Some(ModeChoice::Chat),
            "DREAM" => Some(ModeChoice::Dream),
            "DRAW" => Some(ModeChoice::Draw),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceOutcome {
    Accepted(ModeChoice),
    Invalid { attempts: u32 },
    /// Too many invalid answers in a row; drawing resumes.
    Defaulted,
}

/// What the session should do on this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    Draw,
    AskChoice,
    ChatOpening,
    ChatFollowUp,
    ChatIdle,
    Dream(SleepPhase),
}

/// Timer-driven transitions reported by [`Scheduler::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    CheckIn,
    ChatEnded,
    PhaseChanged(SleepPhase),
    /// Rest is over; the caller runs dream retention.
    RestEnded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub checkin_interval: Duration,
    pub break_duration: Duration,
    pub rest_duration: Duration,
    pub chat_follow_up: Duration,
    pub max_choice_retries: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            checkin_interval: Duration::seconds(2700),
            break_duration: Duration::seconds(1200),
            rest_duration: Duration::seconds(3600),
            chat_follow_up: Duration::seconds(600),
            max_choice_retries: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerSnapshot {
    pub mode: ModeKind,
    pub mode_start_time: DateTime<Utc>,
    pub sleep_phase: SleepPhase,
    pub sleep_phase_start: DateTime<Utc>,
    pub last_checkin_time: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Scheduler {
    config: SchedulerConfig,
    mode: Mode,
    mode_start: DateTime<Utc>,
    sleep_phase_start: DateTime<Utc>,
    last_checkin: DateTime<Utc>,
    chat_messages: u32,
    invalid_choices: u32,
}

pub fn can_transition(from: Mode, to: Mode) -> bool {
    matches!(
        (from, to),
        (Mode::Drawing, Mode::AwaitingChoice)
            | (Mode::AwaitingChoice, Mode::Drawing)
            | (Mode::AwaitingChoice, Mode::Chatting)
            | (Mode::AwaitingChoice, Mode::Resting(SleepPhase::Light))
            | (Mode::Chatting, Mode::Drawing)
            | (Mode::Resting(SleepPhase::Light), Mode::Resting(SleepPhase::Rem))
            | (Mode::Resting(SleepPhase::Light), Mode::Resting(SleepPhase::Waking))
            | (Mode::Resting(SleepPhase::Rem), Mode::Resting(SleepPhase::Waking))
            | (Mode::Resting(_), Mode::AwaitingChoice)
    ) || from == to
}

impl Scheduler {
    pub fn new(config: SchedulerConfig, now: DateTime<Utc>) -> Self {
        Self {
            config,
            mode: Mode::Drawing,
            mode_start: now,
            sleep_phase_start: now,
            last_checkin: now,
            chat_messages: 0,
            invalid_choices: 0,
        }
    }

    pub fn restore(config: SchedulerConfig, snapshot: &SchedulerSnapshot) -> Self {
        let mode = match snapshot.mode {
            ModeKind::Drawing => Mode::Drawing,
            ModeKind::AwaitingChoice => Mode::AwaitingChoice,
            ModeKind::Chatting => Mode::Chatting,
            ModeKind::Resting => Mode::Resting(snapshot.sleep_phase),
        };
        Self {
            config,
            mode,
            mode_start: snapshot.mode_start_time,
            sleep_phase_start: snapshot.sleep_phase_start,
            last_checkin: snapshot.last_checkin_time,
            chat_messages: 0,
            invalid_choices: 0,
        }
    }

    pub fn snapshot(&self) -> SchedulerSnapshot {
        let sleep_phase = match self.mode {
            Mode::Resting(phase) => phase,
            _ => SleepPhase::Light,
        };
        SchedulerSnapshot {
            mode: self.mode.kind(),
            mode_start_time: self.mode_start,
            sleep_phase,
            sleep_phase_start: self.sleep_phase_start,
            last_checkin_time: self.last_checkin,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn last_checkin(&self) -> DateTime<Utc> {
        self.last_checkin
    }

    fn enter(&mut self, to: Mode, now: DateTime<Utc>) {
        if !can_transition(self.mode, to) {
            tracing::warn!(from = ?self.mode, ?to, "unexpected mode transition");
        }
        tracing::info!(from = ?self.mode, ?to, "mode transition");
        self.mode = to;
        self.mode_start = now;
    }

    /// Applies any transition whose timer has expired.
    pub fn poll(&mut self, now: DateTime<Utc>) -> Option<Transition> {
        match self.mode {
            Mode::Drawing if now - self.last_checkin >= self.config.checkin_interval => {
                self.invalid_choices = 0;
                self.enter(Mode::AwaitingChoice, now);
                Some(Transition::CheckIn)
            }
            Mode::Chatting if now - self.mode_start >= self.config.break_duration => {
                self.enter(Mode::Drawing, now);
                self.last_checkin = now;
                Some(Transition::ChatEnded)
            }
            Mode::Resting(_) if now - self.mode_start >= self.config.rest_duration => {
                self.invalid_choices = 0;
                self.enter(Mode::AwaitingChoice, now);
                Some(Transition::RestEnded)
            }
            Mode::Resting(phase) => {
                let next = SleepPhase::for_elapsed(now - self.mode_start);
                if next == phase {
                    return None;
                }
                self.mode = Mode::Resting(next);
                self.sleep_phase_start = now;
                tracing::info!(phase = next.name(), "sleep phase changed");
                Some(Transition::PhaseChanged(next))
            }
            _ => None,
        }
    }

    pub fn activity(&self, now: DateTime<Utc>) -> Activity {
        match self.mode {
            Mode::Drawing => Activity::Draw,
            Mode::AwaitingChoice => Activity::AskChoice,
            Mode::Chatting => match self.chat_messages {
                0 => Activity::ChatOpening,
                1 if now - self.mode_start >= self.config.chat_follow_up => Activity::ChatFollowUp,
                _ => Activity::ChatIdle,
            },
            Mode::Resting(phase) => Activity::Dream(phase),
        }
    }

    pub fn chat_message_sent(&mut self) {
        self.chat_messages += 1;
    }

    pub fn apply_choice(&mut self, answer: &str, now: DateTime<Utc>) -> ChoiceOutcome {
        if self.mode != Mode::AwaitingChoice {
            tracing::warn!(mode = ?self.mode, "choice received outside of a check-in");
            return ChoiceOutcome::Invalid { attempts: 0 };
        }
        let Some(choice) = ModeChoice::parse(answer) else {
            self.invalid_choices += 1;
            tracing::warn!(answer, attempts = self.invalid_choices, "invalid mode choice");
            if self.invalid_choices >= self.config.max_choice_retries {
                tracing::warn!("too many invalid choices, resuming drawing");
                self.choose(ModeChoice::Draw, now);
                return ChoiceOutcome::Defaulted;
            }
            return ChoiceOutcome::Invalid {
                attempts: self.invalid_choices,
            };
        };
        self.choose(choice, now);
        ChoiceOutcome::Accepted(choice)
    }

    fn choose(&mut self, choice: ModeChoice, now: DateTime<Utc>) {
        self.invalid_choices = 0;
        match choice {
            ModeChoice::Chat => {
                self.enter(Mode::Chatting, now);
                self.chat_messages = 0;
            }
            ModeChoice::Dream => {
                self.enter(Mode::Resting(SleepPhase::Light), now);
                self.sleep_phase_start = now;
            }
            ModeChoice::Draw => {
                self.enter(Mode::Drawing, now);
                self.last_checkin = now;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
            .single()
            .expect("date time")
    }

    #[test]
    fn choice_parsing_is_exact_after_trim() {
        assert_eq!(ModeChoice::parse("  chat\n"), Some(ModeChoice::Chat));
        assert_eq!(ModeChoice::parse("Dream"), Some(ModeChoice::Dream));
        assert_eq!(ModeChoice::parse("DRAW."), None);
        assert_eq!(ModeChoice::parse("I choose CHAT"), None);
    }

    #[test]
    fn checkin_fires_once_per_crossing() {
        let mut scheduler = Scheduler::new(SchedulerConfig::default(), t0());
        assert_eq!(scheduler.poll(t0() + Duration::seconds(2699)), None);
        assert_eq!(
            scheduler.poll(t0() + Duration::seconds(2700)),
            Some(Transition::CheckIn)
        );
        assert_eq!(scheduler.poll(t0() + Duration::seconds(2800)), None);
        assert_eq!(scheduler.mode(), Mode::AwaitingChoice);
    }

    #[test]
    fn chat_break_returns_to_drawing() {
        let mut scheduler = Scheduler::new(SchedulerConfig::default(), t0());
        scheduler.poll(t0() + Duration::seconds(2700));
        let start = t0() + Duration::seconds(2701);
        assert_eq!(
            scheduler.apply_choice("CHAT", start),
            ChoiceOutcome::Accepted(ModeChoice::Chat)
        );
        assert_eq!(scheduler.activity(start), Activity::ChatOpening);
        scheduler.chat_message_sent();
        assert_eq!(scheduler.activity(start + Duration::seconds(10)), Activity::ChatIdle);
        assert_eq!(
            scheduler.activity(start + Duration::seconds(600)),
            Activity::ChatFollowUp
        );
        scheduler.chat_message_sent();
        assert_eq!(
            scheduler.poll(start + Duration::seconds(1200)),
            Some(Transition::ChatEnded)
        );
        assert_eq!(scheduler.mode(), Mode::Drawing);
        assert_eq!(scheduler.last_checkin(), start + Duration::seconds(1200));
    }

    #[test]
    fn invalid_choices_default_to_draw() {
        let mut scheduler = Scheduler::new(SchedulerConfig::default(), t0());
        scheduler.poll(t0() + Duration::seconds(3000));
        for attempt in 1..5 {
            assert_eq!(
                scheduler.apply_choice("maybe", t0()),
                ChoiceOutcome::Invalid { attempts: attempt }
            );
            assert_eq!(scheduler.mode(), Mode::AwaitingChoice);
        }
        assert_eq!(scheduler.apply_choice("maybe", t0()), ChoiceOutcome::Defaulted);
        assert_eq!(scheduler.mode(), Mode::Drawing);
    }

    #[test]
    fn snapshot_roundtrip_keeps_rest_phase() {
        let mut scheduler = Scheduler::new(SchedulerConfig::default(), t0());
        scheduler.poll(t0() + Duration::seconds(2700));
        scheduler.apply_choice("DREAM", t0() + Duration::seconds(2700));
        scheduler.poll(t0() + Duration::seconds(2700 + 1300));
        let snapshot = scheduler.snapshot();
        assert_eq!(snapshot.sleep_phase, SleepPhase::Rem);
        let restored = Scheduler::restore(SchedulerConfig::default(), &snapshot);
        assert_eq!(restored.mode(), Mode::Resting(SleepPhase::Rem));
    }

    #[test]
    fn transition_table_rejects_skips() {
        assert!(can_transition(Mode::Drawing, Mode::AwaitingChoice));
        assert!(!can_transition(Mode::Drawing, Mode::Chatting));
        assert!(!can_transition(Mode::Chatting, Mode::Resting(SleepPhase::Light)));
    }
}
