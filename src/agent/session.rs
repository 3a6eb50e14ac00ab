//! The running agent: owns every piece of state and advances it one tick at a
//! time.

use crate::agent::emotion::{self, EmotionState, Source};
use crate::agent::executor::{CycleOutcome, CycleReport, ExecContext, Executor};
use crate::agent::memory::{CodeContext, Dream, RetentionPolicy, SessionMemory};
use crate::agent::prompts::{self, DrawingPrompt, DreamPrompt};
use crate::agent::scanner::{self, Directive, Pitch};
use crate::agent::scheduler::{
    Activity, ChoiceOutcome, Mode, ModeChoice, Scheduler, SleepPhase, Transition,
};
use crate::agent::speed::SpeedControl;
use crate::agent::templates::ActiveTemplate;
use crate::draw::canvas::{CanvasModel, Cursor, MIN_SCALE};
use crate::draw::model::ColorId;
use crate::draw::save::{write_snapshot, SnapshotMeta, SnapshotTargets};
use crate::draw::views::{self, ViewMode};
use crate::model::{GenerationRequest, LanguageModel};
use crate::persist::{PersistedState, StateStore};
use crate::settings::Settings;
use crate::sound::{NullSink, SoundSink};
use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

/// Steps between the extra overview added to the drawing prompt.
const OVERVIEW_EVERY_STEPS: u64 = 50;
const RECENT_COLORS: usize = 5;
const RECENT_CODES: usize = 5;
const CHECKIN_PIXEL_WINDOW: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub enum TickEvent {
    Drew(CycleReport),
    Choice(ChoiceOutcome),
    Chat(String),
    Dreamed(Dream),
    Idle,
    GenerationFailed,
}

pub struct Session {
    canvas: CanvasModel,
    scheduler: Scheduler,
    memory: SessionMemory,
    speed: SpeedControl,
    emotion: EmotionState,
    executor: Executor,
    view_mode: ViewMode,
    template: Option<ActiveTemplate>,
    steps: u64,
    skip_count: u64,
    continuous_draws: u32,
    last_turn_color: Option<ColorId>,
    model: Box<dyn LanguageModel>,
    sound: Box<dyn SoundSink>,
    rng: StdRng,
    store: StateStore,
    data_dir: PathBuf,
    fixed_delay_ms: Option<u64>,
    save_every_steps: u64,
    retention: RetentionPolicy,
    last_message: Option<String>,
}

impl Session {
    pub fn new(settings: &Settings, model: Box<dyn LanguageModel>, now: DateTime<Utc>) -> Self {
        Self {
            canvas: CanvasModel::for_screen(settings.screen(), MIN_SCALE),
            scheduler: Scheduler::new(settings.scheduler_config(), now),
            memory: SessionMemory::default(),
            speed: SpeedControl::default(),
            emotion: EmotionState::default(),
            executor: Executor::new(),
            view_mode: ViewMode::default(),
            template: None,
            steps: 0,
            skip_count: 0,
            continuous_draws: 0,
            last_turn_color: None,
            model,
            sound: Box::new(NullSink),
            rng: StdRng::from_entropy(),
            store: StateStore::new(&settings.data_dir),
            data_dir: settings.data_dir.clone(),
            fixed_delay_ms: settings.fixed_delay_ms,
            save_every_steps: settings.save_every_steps,
            retention: settings.dream_retention,
            last_message: None,
        }
    }

    /// Builds a session and restores whatever was persisted under the data dir.
    pub fn load(settings: &Settings, model: Box<dyn LanguageModel>, now: DateTime<Utc>) -> Self {
        let mut session = Self::new(settings, model, now);
        session.restore(settings);
        session
    }

    pub fn with_canvas(mut self, canvas: CanvasModel) -> Self {
        self.canvas = canvas;
        self
    }

    pub fn with_sound(mut self, sound: Box<dyn SoundSink>) -> Self {
        self.sound = sound;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    fn restore(&mut self, settings: &Settings) {
        self.memory =
            SessionMemory::restore(self.store.load_code_history(), self.store.load_dreams());
        let raster = self.store.load_canvas();
        let Some(state) = self.store.load_state() else {
            if raster.is_some() {
                let cursor = self.canvas.cursor();
                self.canvas.restore(raster.as_ref(), cursor, &[]);
            }
            return;
        };

        self.canvas.rescale(self.canvas.screen(), state.scale_factor);
        let cursor = Cursor {
            x: state.x,
            y: state.y,
            pen_down: state.pen_down,
            color: state.color,
            tool: state.tool,
        };
        self.canvas
            .restore(raster.as_ref(), cursor, &state.color_history);
        self.emotion = EmotionState::from_word(&state.emotion);
        self.speed = SpeedControl::with_level(state.speed);
        self.steps = state.steps;
        self.skip_count = state.skip_count;
        self.last_turn_color = state.last_turn_color;
        self.scheduler = Scheduler::restore(settings.scheduler_config(), &state.scheduler);
        tracing::info!(
            steps = self.steps,
            emotion = self.emotion.word(),
            mode = ?self.scheduler.mode(),
            codes = self.memory.code_history.len(),
            dreams = self.memory.dreams.len(),
            "session restored"
        );
    }

    pub fn canvas(&self) -> &CanvasModel {
        &self.canvas
    }

    pub fn mode(&self) -> Mode {
        self.scheduler.mode()
    }

    pub fn emotion(&self) -> &EmotionState {
        &self.emotion
    }

    pub fn memory(&self) -> &SessionMemory {
        &self.memory
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn skip_count(&self) -> u64 {
        self.skip_count
    }

    pub fn turbo(&self) -> bool {
        self.speed.turbo()
    }

    pub fn toggle_turbo(&mut self) -> bool {
        self.speed.toggle_turbo()
    }

    /// Latest chat message or dream text.
    pub fn last_message(&self) -> Option<&str> {
        self.last_message.as_deref()
    }

    /// Delay before the next tick.
    pub fn next_delay(&mut self) -> Duration {
        self.speed.next_delay(self.fixed_delay_ms, &self.emotion)
    }

    pub fn tick(&mut self, now: DateTime<Utc>) -> TickEvent {
        if let Some(transition) = self.scheduler.poll(now) {
            self.on_transition(transition);
        }
        match self.scheduler.activity(now) {
            Activity::Draw => self.draw_cycle(now),
            Activity::AskChoice => self.ask_choice(now),
            Activity::ChatOpening => self.chat(true),
            Activity::ChatFollowUp => self.chat(false),
            Activity::ChatIdle => TickEvent::Idle,
            Activity::Dream(phase) => self.dream(phase, now),
        }
    }

    fn on_transition(&mut self, transition: Transition) {
        match transition {
            Transition::CheckIn => tracing::info!(steps = self.steps, "check-in time"),
            Transition::ChatEnded => self.last_message = None,
            Transition::PhaseChanged(phase) => {
                tracing::info!(phase = phase.name(), "dreaming deeper")
            }
            Transition::RestEnded => {
                self.memory.retain_dreams(self.retention, &mut self.rng);
                if let Err(e) = self.store.save(
                    &self.memory.dreams.to_vec(),
                    &self.memory.code_history.to_vec(),
                ) {
                    tracing::error!("failed to save memories: {e:#}");
                }
            }
        }
    }

    fn generate(&mut self, request: &GenerationRequest) -> Option<String> {
        match self.model.generate(request) {
            Ok(text) => {
                tracing::debug!(purpose = ?request.purpose, raw = %text, "model output");
                Some(text)
            }
            Err(e) => {
                tracing::error!(purpose = ?request.purpose, "generation failed: {e:#}");
                None
            }
        }
    }

    fn recent_colors(&self) -> Vec<String> {
        let history: Vec<ColorId> = self.canvas.color_history().collect();
        history
            .iter()
            .rev()
            .take(RECENT_COLORS)
            .rev()
            .map(|c| c.name().to_string())
            .collect()
    }

    fn vision(&self) -> String {
        let mut vision = views::local_view(&self.canvas, self.view_mode, false);
        if self.steps % OVERVIEW_EVERY_STEPS == 0 {
            vision.push_str(&format!(
                "\n\n{}\n\n{}",
                views::overview(&self.canvas),
                views::local_view(&self.canvas, ViewMode::Normal, true)
            ));
        }
        vision
    }

    fn draw_cycle(&mut self, now: DateTime<Utc>) -> TickEvent {
        let vision = self.vision();
        let request = prompts::drawing_request(&DrawingPrompt {
            cursor: self.canvas.cursor(),
            vision: &vision,
            template_overlay: self.template.map(|t| t.overlay()),
            emotion: self.emotion.word(),
            step: self.steps,
            repeating: self.memory.is_repeating(),
            skip_count: self.skip_count,
            painted: self.canvas.raster().painted_count(),
            turbo: self.speed.turbo(),
        });
        let Some(raw) = self.generate(&request) else {
            return TickEvent::GenerationFailed;
        };

        let tokens = scanner::scan(&raw);
        let before = self.canvas.cursor();
        let report = self.executor.execute(
            &tokens,
            ExecContext {
                canvas: &mut self.canvas,
                speed: &mut self.speed,
                view_mode: &mut self.view_mode,
                template: &mut self.template,
                sound: self.sound.as_mut(),
                rng: &mut self.rng,
            },
        );

        if let Some(archived) = &report.archived {
            let meta = self.snapshot_meta(now);
            if let Err(e) = write_snapshot(archived, &meta, &self.data_dir) {
                tracing::error!("failed to archive canvas before clearing: {e:#}");
            }
        }

        if report.is_skip() {
            self.skip_count += 1;
        }
        if let CycleOutcome::Observation {
            directive: Directive::LookAround,
            ..
        } = report.outcome
        {
            let coverage = views::overview(&self.canvas).coverage();
            self.emotion.influence_by(Source::Artwork, artwork_influence(coverage));
        }

        if report.is_completed() {
            let cursor = self.canvas.cursor();
            self.memory.remember_code(
                report.code.clone(),
                CodeContext {
                    emotion: self.emotion.word().to_string(),
                    x: cursor.x,
                    y: cursor.y,
                    color: cursor.color,
                    pen_down: cursor.pen_down,
                    pixels_drawn: report.painted,
                    tool: cursor.tool,
                },
                now,
            );
            self.emotion.influence_by(
                Source::Creating,
                creating_influence(report.painted, report.painted_by_color.len()),
            );
            for pitch in &report.tones {
                self.emotion.influence_by(Source::Music, music_influence(*pitch));
            }
        }

        let after = self.canvas.cursor();
        let moved = (after.x, after.y) != (before.x, before.y);
        if after.pen_down && moved {
            self.continuous_draws += 1;
        } else {
            self.continuous_draws = 0;
        }
        self.last_turn_color = Some(after.color);
        self.steps += 1;

        if self.steps % emotion::PROCESS_EVERY_STEPS == 0 {
            let distinct: BTreeSet<ColorId> = self.canvas.color_history().collect();
            let shifted = self.emotion.process(emotion::Activity {
                continuous_draws: self.continuous_draws,
                distinct_recent_colors: distinct.len(),
                skip_count: self.skip_count,
                turbo: self.speed.turbo(),
            });
            if shifted {
                tracing::info!(emotion = self.emotion.word(), "mood shifted");
            }
        }
        if self.save_every_steps > 0 && self.steps % self.save_every_steps == 0 {
            self.save_or_log(now);
        }

        TickEvent::Drew(report)
    }

    fn ask_choice(&mut self, now: DateTime<Utc>) -> TickEvent {
        let overview = views::overview(&self.canvas).to_string();
        let request = prompts::checkin_request(
            self.emotion.word(),
            self.emotion.energy_label(),
            self.memory.recent_pixels(CHECKIN_PIXEL_WINDOW),
            &overview,
            &self.recent_colors(),
        );
        let Some(answer) = self.generate(&request) else {
            return TickEvent::GenerationFailed;
        };
        let outcome = self.scheduler.apply_choice(&answer, now);
        if outcome == ChoiceOutcome::Accepted(ModeChoice::Dream) {
            self.memory.session_dreams.clear();
        }
        TickEvent::Choice(outcome)
    }

    fn chat(&mut self, opening: bool) -> TickEvent {
        let request = if opening {
            let overview = views::overview(&self.canvas).to_string();
            prompts::chat_opening_request(
                self.emotion.word(),
                &overview,
                &self.recent_colors(),
                self.canvas.cursor().tool.name(),
            )
        } else {
            prompts::chat_follow_up_request(self.emotion.word())
        };
        let Some(message) = self.generate(&request) else {
            return TickEvent::GenerationFailed;
        };
        let message = message.trim().to_string();
        self.scheduler.chat_message_sent();
        self.emotion.influence_by(Source::Chat, chat_influence(&message));
        tracing::info!(opening, "aurora says: {message}");
        self.last_message = Some(message.clone());
        TickEvent::Chat(message)
    }

    fn dream(&mut self, phase: SleepPhase, now: DateTime<Utc>) -> TickEvent {
        let overview = views::overview(&self.canvas).to_string();
        let recent_colors = self.recent_colors();
        let recent_codes: Vec<&str> = self.memory.recent_codes(RECENT_CODES);
        let session_dreams: Vec<String> = self
            .memory
            .session_dreams
            .iter()
            .map(|d| d.content.clone())
            .collect();
        let request = prompts::dream_request(&DreamPrompt {
            phase,
            emotion: self.emotion.word(),
            recent_colors: &recent_colors,
            recent_codes: &recent_codes,
            overview: &overview,
            session_dreams: &session_dreams,
        });
        let Some(content) = self.generate(&request) else {
            return TickEvent::GenerationFailed;
        };
        let content = content.trim().to_string();
        if content.is_empty() {
            return TickEvent::Idle;
        }
        let dream = Dream {
            content: content.clone(),
            phase,
            timestamp: now,
            context_snapshot: overview,
        };
        self.memory.record_dream(dream.clone());
        if phase == SleepPhase::Rem {
            self.emotion.influence_by(Source::Dreams, 0.3);
        }
        tracing::info!(phase = phase.name(), "dream: {content}");
        self.last_message = Some(content);
        TickEvent::Dreamed(dream)
    }

    fn snapshot_meta(&self, now: DateTime<Utc>) -> SnapshotMeta {
        let cursor = self.canvas.cursor();
        let colors: BTreeSet<ColorId> = self.canvas.color_history().collect();
        SnapshotMeta {
            timestamp: now.with_timezone(&Local),
            emotion: self.emotion.word().to_string(),
            canvas_width: self.canvas.width(),
            canvas_height: self.canvas.height(),
            scale_factor: self.canvas.scale(),
            position: (cursor.x, cursor.y),
            colors_used: colors.into_iter().collect(),
            tool: cursor.tool,
            steps: self.steps,
            overview: views::overview(&self.canvas).to_string(),
        }
    }

    /// Saves the current canvas as a timestamped snapshot.
    pub fn snapshot(&self, now: DateTime<Utc>) -> Result<SnapshotTargets> {
        write_snapshot(self.canvas.raster(), &self.snapshot_meta(now), &self.data_dir)
    }

    pub fn persisted_state(&self, now: DateTime<Utc>) -> PersistedState {
        let cursor = self.canvas.cursor();
        PersistedState {
            x: cursor.x,
            y: cursor.y,
            pen_down: cursor.pen_down,
            color: cursor.color,
            emotion: self.emotion.word().to_string(),
            steps: self.steps,
            canvas_width: self.canvas.width(),
            canvas_height: self.canvas.height(),
            scale_factor: self.canvas.scale(),
            skip_count: self.skip_count,
            speed: self.speed.level(),
            delay_ms: self.speed.current_delay_ms(self.fixed_delay_ms, &self.emotion),
            tool: cursor.tool,
            color_history: self.canvas.color_history().collect(),
            last_turn_color: self.last_turn_color,
            scheduler: self.scheduler.snapshot(),
            timestamp: now,
        }
    }

    /// Writes canvas, state document and histories.
    pub fn save(&self, now: DateTime<Utc>) -> Result<()> {
        self.store.save_canvas(self.canvas.raster())?;
        self.store.save_state(&self.persisted_state(now))?;
        self.store.save(
            &self.memory.dreams.to_vec(),
            &self.memory.code_history.to_vec(),
        )?;
        tracing::info!(steps = self.steps, dir = %self.store.dir().display(), "session saved");
        Ok(())
    }

    pub fn save_or_log(&self, now: DateTime<Utc>) {
        if let Err(e) = self.save(now) {
            tracing::error!("failed to save session: {e:#}");
        }
    }
}

fn creating_influence(painted: usize, colors: usize) -> f64 {
    if painted > 500 {
        0.2
    } else if painted > 100 {
        0.1
    } else if colors > 2 {
        0.15
    } else {
        0.05
    }
}

fn music_influence(pitch: Option<Pitch>) -> f64 {
    match pitch {
        Some(Pitch::High) => 0.3,
        Some(Pitch::Low) => -0.2,
        None => 0.1,
    }
}

fn artwork_influence(coverage: f64) -> f64 {
    if coverage > 50.0 {
        0.7
    } else if coverage > 20.0 {
        0.3
    } else {
        -0.2
    }
}

fn chat_influence(message: &str) -> f64 {
    let lower = message.to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| lower.contains(w));
    if has(&["happy", "excited", "love", "wonderful"]) {
        0.6
    } else if has(&["sad", "miss", "wish", "lonely"]) {
        -0.4
    } else if has(&["think", "wonder", "curious", "interesting"]) {
        0.3
    } else {
        0.1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ScriptedModel;
    use chrono::Duration as ChronoDuration;

    fn settings(dir: &std::path::Path) -> Settings {
        Settings {
            data_dir: dir.to_path_buf(),
            save_every_steps: 0,
            ..Settings::default()
        }
    }

    fn session(dir: &std::path::Path, answers: &[&str], now: DateTime<Utc>) -> Session {
        let model = ScriptedModel::new(answers.iter().copied());
        Session::new(&settings(dir), Box::new(model), now)
            .with_canvas(CanvasModel::with_size(100, 100))
            .with_seed(1)
    }

    #[test]
    fn drawing_cycle_is_remembered() {
        let dir = tempfile::tempdir().expect("temp dir");
        let now = Utc::now();
        let mut session = session(dir.path(), &["533"], now);
        let TickEvent::Drew(report) = session.tick(now) else {
            panic!("expected a drawing cycle");
        };
        assert_eq!(report.painted, 288);
        assert_eq!(session.memory().code_history.len(), 1);
        assert_eq!(session.steps(), 1);
    }

    #[test]
    fn short_circuited_cycles_are_not_remembered() {
        let dir = tempfile::tempdir().expect("temp dir");
        let now = Utc::now();
        let mut session = session(dir.path(), &["0123456789", "examples", "words only"], now);
        for _ in 0..3 {
            session.tick(now);
        }
        assert!(session.memory().code_history.is_empty());
        assert_eq!(session.skip_count(), 2);
        assert_eq!(session.steps(), 3);
    }

    #[test]
    fn generation_failure_is_a_no_op() {
        let dir = tempfile::tempdir().expect("temp dir");
        let now = Utc::now();
        let mut model = ScriptedModel::default();
        model.push_failure("server down");
        let mut session = Session::new(&settings(dir.path()), Box::new(model), now)
            .with_canvas(CanvasModel::with_size(100, 100));
        assert_eq!(session.tick(now), TickEvent::GenerationFailed);
        assert_eq!(session.steps(), 0);
    }

    #[test]
    fn checkin_then_dream_then_retention() {
        let dir = tempfile::tempdir().expect("temp dir");
        let start = Utc::now();
        let mut session = session(
            dir.path(),
            &["maybe", "DREAM", "blue waves", "red storms"],
            start,
        );
        let checkin = start + ChronoDuration::seconds(2700);
        assert_eq!(
            session.tick(checkin),
            TickEvent::Choice(ChoiceOutcome::Invalid { attempts: 1 })
        );
        assert_eq!(
            session.tick(checkin),
            TickEvent::Choice(ChoiceOutcome::Accepted(ModeChoice::Dream))
        );
        assert!(matches!(session.tick(checkin), TickEvent::Dreamed(_)));
        let rem = checkin + ChronoDuration::seconds(1300);
        let TickEvent::Dreamed(dream) = session.tick(rem) else {
            panic!("expected a dream");
        };
        assert_eq!(dream.phase, SleepPhase::Rem);
        assert_eq!(session.memory().session_dreams.len(), 2);

        let wake = checkin + ChronoDuration::seconds(3600);
        session.tick(wake);
        assert_eq!(session.mode(), Mode::AwaitingChoice);
        assert!(session.memory().session_dreams.is_empty());
        assert_eq!(session.memory().dreams.len(), 2);
        assert!(dir.path().join("canvas").join("dream_memories.json").exists());
    }

    #[test]
    fn chat_break_sends_opening_once() {
        let dir = tempfile::tempdir().expect("temp dir");
        let start = Utc::now();
        let mut session = session(dir.path(), &["CHAT", "I love this", "again"], start);
        let checkin = start + ChronoDuration::seconds(2700);
        session.tick(checkin);
        assert_eq!(session.mode(), Mode::Chatting);
        assert_eq!(
            session.tick(checkin),
            TickEvent::Chat("I love this".into())
        );
        assert_eq!(session.tick(checkin), TickEvent::Idle);
        assert!(session.emotion().influence(Source::Chat) > 0.5);
        let follow_up = checkin + ChronoDuration::seconds(600);
        assert_eq!(session.tick(follow_up), TickEvent::Chat("again".into()));
    }

    #[test]
    fn save_and_load_restore_state() {
        let dir = tempfile::tempdir().expect("temp dir");
        let now = Utc::now();
        let mut session = session(dir.path(), &["red5333", "navy4"], now);
        session.tick(now);
        session.tick(now);
        session.save(now).expect("save");

        let restored = Session::load(
            &settings(dir.path()),
            Box::new(ScriptedModel::default()),
            now,
        );
        let cursor = restored.canvas().cursor();
        assert_eq!(cursor.color, ColorId::Navy);
        assert!(!cursor.pen_down);
        assert_eq!(restored.steps(), 2);
        assert_eq!(restored.memory().code_history.len(), 2);
        assert_eq!(
            restored.canvas().color_history().collect::<Vec<_>>(),
            vec![ColorId::Red, ColorId::Navy]
        );
        assert!(restored.canvas().raster().painted_count() > 0);
    }

    #[test]
    fn clear_all_archives_a_snapshot() {
        let dir = tempfile::tempdir().expect("temp dir");
        let now = Utc::now();
        let mut session = session(dir.path(), &["5333", "clear_all"], now);
        session.tick(now);
        session.tick(now);
        let snapshots = std::fs::read_dir(dir.path().join("snapshots"))
            .expect("snapshot folder")
            .count();
        assert_eq!(snapshots, 2);
        assert_eq!(session.canvas().raster().painted_count(), 0);
    }

    #[test]
    fn influence_tables() {
        assert_eq!(chat_influence("I feel SAD today"), -0.4);
        assert_eq!(chat_influence("hello"), 0.1);
        assert_eq!(music_influence(Some(Pitch::High)), 0.3);
        assert_eq!(artwork_influence(60.0), 0.7);
        assert_eq!(creating_influence(600, 1), 0.2);
        assert_eq!(creating_influence(10, 3), 0.15);
    }
}
