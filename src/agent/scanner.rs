//! Turns raw model output into an ordered list of typed tokens.
//!
//! Scanning is a single left-to-right pass. At each position whole-word
//! directives are tried first, then palette colors, then single-character
//! codes; within each word table the longest literal wins. Anything that
//! does not match is dropped.

use crate::agent::templates::Difficulty;
use crate::draw::model::{ColorId, Direction, ToolId};
use once_cell::sync::Lazy;
use std::fmt;

/// Characters of model output considered per cycle.
pub const MAX_SCAN_CHARS: usize = 160;
pub const SOUND_CHARS: &str = "!@#$%^&*";
const THINK_PATTERNS: [&str; 3] = ["0123456789", "123456789", "9876543210"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pitch {
    /// `++`, one octave down.
    Low,
    /// `--`, one octave up.
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Directive {
    ZoomOut,
    ZoomIn,
    LookAround,
    FullCanvas,
    Center,
    NormalView,
    DensityView,
    ShapeView,
    ClearAll,
    FillCanvas,
    Examples,
    Faster,
    Slower,
    Template(Difficulty),
    TemplateOff,
    UseTool(ToolId),
}

impl Directive {
    pub fn literal(self) -> &'static str {
        match self {
            Directive::ZoomOut => "zoom_out",
            Directive::ZoomIn => "zoom_in",
            Directive::LookAround => "look_around",
            Directive::FullCanvas => "full_canvas",
            Directive::Center => "center",
            Directive::NormalView => "normal_view",
            Directive::DensityView => "density_view",
            Directive::ShapeView => "shape_view",
            Directive::ClearAll => "clear_all",
            Directive::FillCanvas => "fill_canvas",
            Directive::Examples => "examples",
            Directive::Faster => "faster",
            Directive::Slower => "slower",
            Directive::Template(Difficulty::Easy) => "template_easy",
            Directive::Template(Difficulty::Medium) => "template_medium",
            Directive::Template(Difficulty::Hard) => "template_hard",
            Directive::TemplateOff => "template_off",
            Directive::UseTool(tool) => tool.name(),
        }
    }

    /// Observation directives end the cycle once they have run.
    pub fn is_observation(self) -> bool {
        matches!(
            self,
            Directive::LookAround | Directive::FullCanvas | Directive::Examples
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    Move(Direction),
    PenUp,
    PenDown,
    Color(ColorId),
    Sound(char),
    Pitch(Pitch),
    Special(Directive),
    ThinkPause,
}

impl Token {
    pub fn is_directive(&self) -> bool {
        matches!(self, Token::Special(_))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Move(dir) => write!(f, "{}", dir.digit()),
            Token::PenUp => f.write_str("4"),
            Token::PenDown => f.write_str("5"),
            Token::Color(color) => f.write_str(color.name()),
            Token::Sound(c) => write!(f, "{c}"),
            Token::Pitch(Pitch::Low) => f.write_str("++"),
            Token::Pitch(Pitch::High) => f.write_str("--"),
            Token::Special(directive) => f.write_str(directive.literal()),
            Token::ThinkPause => f.write_str(THINK_PATTERNS[0]),
        }
    }
}

fn by_length_desc<T>(mut table: Vec<(&'static str, T)>) -> Vec<(&'static str, T)> {
    table.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    table
}

static DIRECTIVES: Lazy<Vec<(&'static str, Directive)>> = Lazy::new(|| {
    let mut table: Vec<Directive> = vec![
        Directive::ZoomOut,
        Directive::ZoomIn,
        Directive::LookAround,
        Directive::FullCanvas,
        Directive::Center,
        Directive::NormalView,
        Directive::DensityView,
        Directive::ShapeView,
        Directive::ClearAll,
        Directive::FillCanvas,
        Directive::Examples,
        Directive::Faster,
        Directive::Slower,
        Directive::Template(Difficulty::Easy),
        Directive::Template(Difficulty::Medium),
        Directive::Template(Difficulty::Hard),
        Directive::TemplateOff,
    ];
    table.extend(ToolId::ALL.into_iter().map(Directive::UseTool));
    by_length_desc(table.into_iter().map(|d| (d.literal(), d)).collect())
});

static COLORS: Lazy<Vec<(&'static str, ColorId)>> =
    Lazy::new(|| by_length_desc(ColorId::ALL.into_iter().map(|c| (c.name(), c)).collect()));

fn longest<T: Copy>(table: &[(&'static str, T)], rest: &str) -> Option<(usize, T)> {
    table
        .iter()
        .find(|(lit, _)| rest.starts_with(lit))
        .map(|(lit, value)| (lit.len(), *value))
}

/// Truncates already lowercased output to the scan budget.
fn truncate(text: &str) -> &str {
    match text.char_indices().nth(MAX_SCAN_CHARS) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

pub fn is_think_pause(text: &str) -> bool {
    THINK_PATTERNS.iter().any(|p| text.contains(p))
}

/// Scans one cycle of model output. Counting runs anywhere in the output
/// turn the cycle into a think pause; only the first `MAX_SCAN_CHARS`
/// characters are tokenized.
pub fn scan(raw: &str) -> Vec<Token> {
    let lowered = raw.to_lowercase();
    if is_think_pause(&lowered) {
        return vec![Token::ThinkPause];
    }
    let text = truncate(&lowered);

    let mut tokens = Vec::new();
    let mut pos = 0;
    while pos < text.len() {
        let rest = &text[pos..];
        if let Some((len, directive)) = longest(&DIRECTIVES, rest) {
            tokens.push(Token::Special(directive));
            pos += len;
            continue;
        }
        if let Some((len, color)) = longest(&COLORS, rest) {
            tokens.push(Token::Color(color));
            pos += len;
            continue;
        }
        if rest.starts_with("++") || rest.starts_with("--") {
            let pitch = if rest.starts_with("++") {
                Pitch::Low
            } else {
                Pitch::High
            };
            tokens.push(Token::Pitch(pitch));
            pos += 2;
            continue;
        }
        let Some(c) = rest.chars().next() else {
            break;
        };
        pos += c.len_utf8();
        let token = match c {
            '4' => Some(Token::PenUp),
            '5' => Some(Token::PenDown),
            c if SOUND_CHARS.contains(c) => Some(Token::Sound(c)),
            c => Direction::from_digit(c).map(Token::Move),
        };
        if let Some(token) = token {
            tokens.push(token);
        }
    }
    tokens
}

/// Canonical text for a token sequence; scanning it yields the same tokens.
pub fn render(tokens: &[Token]) -> String {
    tokens.iter().map(ToString::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scans_moves_pen_and_colors() {
        assert_eq!(
            scan("red533"),
            vec![
                Token::Color(ColorId::Red),
                Token::PenDown,
                Token::Move(Direction::Right),
                Token::Move(Direction::Right),
            ]
        );
    }

    #[test]
    fn longest_tool_literal_wins() {
        assert_eq!(
            scan("larger_brush large_brush brush"),
            vec![
                Token::Special(Directive::UseTool(ToolId::LargerBrush)),
                Token::Special(Directive::UseTool(ToolId::LargeBrush)),
                Token::Special(Directive::UseTool(ToolId::Brush)),
            ]
        );
    }

    #[test]
    fn directive_occurrences_are_matched_individually() {
        assert_eq!(
            scan("zoom_out3zoom_out"),
            vec![
                Token::Special(Directive::ZoomOut),
                Token::Move(Direction::Right),
                Token::Special(Directive::ZoomOut),
            ]
        );
    }

    #[test]
    fn think_pause_short_circuits() {
        assert_eq!(scan("0123456789red53"), vec![Token::ThinkPause]);
        assert_eq!(scan("hmm 9876543210"), vec![Token::ThinkPause]);
    }

    #[test]
    fn pitch_and_sounds() {
        assert_eq!(
            scan("++!--@+#"),
            vec![
                Token::Pitch(Pitch::Low),
                Token::Sound('!'),
                Token::Pitch(Pitch::High),
                Token::Sound('@'),
                Token::Sound('#'),
            ]
        );
    }

    #[test]
    fn uppercase_and_noise_are_handled() {
        assert_eq!(
            scan("I will draw: BLUE 5 then 3!"),
            vec![
                Token::Color(ColorId::Blue),
                Token::PenDown,
                Token::Move(Direction::Right),
                Token::Sound('!'),
            ]
        );
        assert!(scan("").is_empty());
        assert!(scan("hello there").is_empty());
    }

    #[test]
    fn input_is_truncated_to_budget() {
        let long = "3".repeat(MAX_SCAN_CHARS + 40);
        assert_eq!(scan(&long).len(), MAX_SCAN_CHARS);
    }

    #[test]
    fn counting_past_the_budget_still_pauses() {
        let raw = format!("533{}0123456789", " ".repeat(MAX_SCAN_CHARS - 3));
        assert_eq!(scan(&raw), vec![Token::ThinkPause]);
    }

    #[test]
    fn rendering_scans_back_to_the_same_tokens() {
        let tokens = scan("template_medium flower5 ++! navy0 fill_canvas center 4");
        assert_eq!(scan(&render(&tokens)), tokens);
    }
}
