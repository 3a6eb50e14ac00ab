//! Applies scanned tokens to the canvas and the surrounding session state.

use crate::agent::prompts;
use crate::agent::scanner::{Directive, Pitch, Token};
use crate::agent::speed::SpeedControl;
use crate::agent::templates::ActiveTemplate;
use crate::draw::canvas::{CanvasModel, PixelSize, Raster};
use crate::draw::model::ColorId;
use crate::draw::views::{self, ViewMode};
use crate::sound::{tone_frequency, SoundSink, TONE_DURATION};
use rand::rngs::StdRng;
use std::collections::BTreeMap;

/// Everything a cycle is allowed to mutate.
pub struct ExecContext<'a> {
    pub canvas: &'a mut CanvasModel,
    pub speed: &'a mut SpeedControl,
    pub view_mode: &'a mut ViewMode,
    pub template: &'a mut Option<ActiveTemplate>,
    pub sound: &'a mut dyn SoundSink,
    pub rng: &'a mut StdRng,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// Every token ran; the cycle is remembered.
    Completed,
    ThinkPause,
    Observation { directive: Directive, text: String },
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub outcome: CycleOutcome,
    /// Canonical rendering of the scanned tokens.
    pub code: String,
    pub painted: usize,
    pub painted_by_color: BTreeMap<ColorId, usize>,
    /// At least one move with the pen down changed the cursor position.
    pub drew_while_moving: bool,
    /// Pitch of every tone played, in order.
    pub tones: Vec<Option<Pitch>>,
    /// Canvas contents captured by `clear_all` before clearing.
    pub archived: Option<Raster>,
    pub summary: String,
}

impl CycleReport {
    fn new(outcome: CycleOutcome, tokens: &[Token]) -> Self {
        Self {
            outcome,
            code: crate::agent::scanner::render(tokens),
            painted: 0,
            painted_by_color: BTreeMap::new(),
            drew_while_moving: false,
            tones: Vec::new(),
            archived: None,
            summary: summarize(tokens),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.outcome == CycleOutcome::Completed
    }

    /// Think pauses and observations count as skipped turns.
    pub fn is_skip(&self) -> bool {
        matches!(
            self.outcome,
            CycleOutcome::ThinkPause | CycleOutcome::Observation { .. }
        )
    }
}

/// Groups consecutive repeats as `literal×count`.
pub fn summarize(tokens: &[Token]) -> String {
    let mut groups: Vec<(Token, usize)> = Vec::new();
    for token in tokens {
        match groups.last_mut() {
            Some((last, count)) if last == token => *count += 1,
            _ => groups.push((*token, 1)),
        }
    }
    groups
        .iter()
        .map(|(token, count)| {
            if *count > 1 {
                format!("{token}×{count}")
            } else {
                token.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Default)]
pub struct Executor {
    pending_pitch: Option<Pitch>,
}

impl Executor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn execute(&mut self, tokens: &[Token], ctx: ExecContext<'_>) -> CycleReport {
        if tokens.is_empty() {
            return CycleReport::new(CycleOutcome::Empty, tokens);
        }
        if tokens.contains(&Token::ThinkPause) {
            tracing::debug!("think pause");
            return CycleReport::new(CycleOutcome::ThinkPause, tokens);
        }

        let ExecContext {
            canvas,
            speed,
            view_mode,
            template,
            sound,
            rng,
        } = ctx;
        let mut report = CycleReport::new(CycleOutcome::Completed, tokens);

        for token in tokens {
            let Token::Special(directive) = *token else {
                continue;
            };
            tracing::debug!(directive = directive.literal(), "directive");
            match directive {
                Directive::ZoomOut => {
                    canvas.adjust_pixel_size(PixelSize::Smaller);
                }
                Directive::ZoomIn => {
                    canvas.adjust_pixel_size(PixelSize::Larger);
                }
                Directive::LookAround => {
                    let text = format!(
                        "{}\n\n{}",
                        views::local_view(canvas, *view_mode, true),
                        views::overview(canvas)
                    );
                    report.outcome = CycleOutcome::Observation { directive, text };
                }
                Directive::FullCanvas => {
                    report.outcome = CycleOutcome::Observation {
                        directive,
                        text: views::compressed_view(canvas),
                    };
                }
                Directive::Examples => {
                    report.outcome = CycleOutcome::Observation {
                        directive,
                        text: prompts::examples_text(),
                    };
                }
                Directive::Center => canvas.center_cursor(),
                Directive::NormalView => *view_mode = ViewMode::Normal,
                Directive::DensityView => *view_mode = ViewMode::Density,
                Directive::ShapeView => *view_mode = ViewMode::Shape,
                Directive::ClearAll => {
                    report.archived = Some(canvas.raster().clone());
                    canvas.clear();
                    canvas.center_cursor();
                }
                Directive::FillCanvas => canvas.fill(),
                Directive::Faster => speed.faster(),
                Directive::Slower => speed.slower(),
                Directive::Template(difficulty) => {
                    *template = ActiveTemplate::pick(difficulty, rng);
                    if let Some(active) = template {
                        tracing::info!(template = active.template.name, "template chosen");
                    }
                }
                Directive::TemplateOff => *template = None,
                Directive::UseTool(tool) => canvas.set_tool(tool),
            }
            if directive.is_observation() {
                tracing::info!(directive = directive.literal(), "observation ends the cycle");
                return report;
            }
        }

        for token in tokens {
            match *token {
                Token::Move(dir) => {
                    let outcome = canvas.move_cursor(dir);
                    if outcome.moved && canvas.cursor().pen_down {
                        report.drew_while_moving = true;
                        report.painted += outcome.painted;
                        *report
                            .painted_by_color
                            .entry(canvas.cursor().color)
                            .or_default() += outcome.painted;
                    }
                }
                Token::PenUp => canvas.set_pen_down(false),
                Token::PenDown => canvas.set_pen_down(true),
                Token::Color(color) => canvas.set_color(color),
                Token::Pitch(pitch) => self.pending_pitch = Some(pitch),
                Token::Sound(c) => {
                    let pitch = self.pending_pitch.take();
                    if let Some(freq) = tone_frequency(c, pitch) {
                        sound.play_tone(freq, TONE_DURATION);
                        report.tones.push(pitch);
                    }
                }
                Token::Special(_) | Token::ThinkPause => {}
            }
        }

        tracing::info!(
            actions = %report.summary,
            painted = report.painted,
            "cycle executed"
        );
        report
    }
}
