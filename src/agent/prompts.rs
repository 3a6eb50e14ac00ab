//! Prompt text and sampling parameters for every kind of model request.

use crate::agent::scheduler::SleepPhase;
use crate::draw::canvas::Cursor;
use crate::model::{GenerationRequest, Purpose};

pub const DRAW_MAX_TOKENS: u32 = 100;
pub const TURBO_MAX_TOKENS: u32 = 180;
const TOP_P: f32 = 0.95;

/// Llama-2 chat framing.
pub fn wrap(system: &str, user: &str) -> String {
    format!("[INST] <<SYS>>\n{system}\n<</SYS>>\n\n{user} [/INST]")
}

fn stops(extra: &[&str]) -> Vec<String> {
    ["[INST]", "</s>"]
        .iter()
        .chain(extra)
        .map(|s| s.to_string())
        .collect()
}

/// `0.7 + painted/1000`, capped at 1.5.
pub fn drawing_temperature(painted: usize) -> f32 {
    (0.7 + painted as f32 / 1000.0).min(1.5)
}

const CODE_REFERENCE: &str = "You are Aurora's motor control system. Output ONLY movement codes.
CRITICAL: NO ENGLISH WORDS. NO EXPLANATIONS. CODES ONLY.

MOVEMENT: 0 up, 1 down, 2 left, 3 right, 4 pen up, 5 pen down
COLORS: red orange yellow green cyan blue purple pink white gray black brown magenta lime navy
TOOLS: pen brush spray large_brush larger_brush star cross circle diamond flower
VIEW: zoom_out zoom_in look_around full_canvas center normal_view density_view shape_view
CANVAS: clear_all fill_canvas examples
TEMPLATES: template_easy template_medium template_hard template_off
SPEED: faster slower
SOUNDS: ! @ # $ % ^ & *  (++ = next sound one octave down, -- = one octave up)
PAUSE: 0123456789 = think

Chain movements like 533333111112222200000, not just 5310.
Output maximum 40 characters of pure codes only.";

const CREATIVITY_BOOSTERS: &[&str] = &[
    "template_easy",
    "template_medium flower5",
    "template_hard zoom_out",
    "53333",
    "density_view look_around normal_view",
    "shape_view 5333322211100 normal_view",
    "red5333green5111blue5222",
    "5!3!3!3!",
    "brush533333",
    "star5",
    "++!++@++#++@++!",
    "white50000black52222",
    "53#31#31#31#",
    "flower5!@#$%",
    "diamond500002222",
    "spray5333111",
    "larger_brush53333",
    "5031320213",
    "yellow5*&%$#@!",
    "54225333541115222",
    "circle5++!++!",
    "Scale up: !@#$%^&*",
    "Scale down: *&^%$#@!",
    "Heartbeat: ++*++*++*",
];

/// Rotating suggestion added when the agent repeats itself or on every
/// hundredth step.
pub fn creativity_boost(step: u64, repeating: bool) -> Option<String> {
    let n = CREATIVITY_BOOSTERS.len() as u64;
    if repeating {
        let idea = CREATIVITY_BOOSTERS[(step % n) as usize];
        return Some(format!(
            "\nYou've been repeating! Try something NEW and DIFFERENT!\nInspiration: {idea}"
        ));
    }
    if step > 0 && step % 100 == 0 {
        let idea = CREATIVITY_BOOSTERS[((step / 100) % n) as usize];
        return Some(format!(
            "\n\nCREATIVITY BOOST (Step {step})!\nTry this pattern: {idea}"
        ));
    }
    None
}

pub const EXAMPLE_CODES: &[(&str, &str, &str)] = &[
    (
        "rainbow_line",
        "red53333orange53333yellow53333green53333blue53333purple53333",
        "Draws a horizontal rainbow stripe.",
    ),
    (
        "star_burst",
        "white5003332211100332211",
        "Creates a star pattern from center.",
    ),
    (
        "color_wave",
        "blue533311122200cyan533311122200green533311122200",
        "Makes a flowing wave in cool colors.",
    ),
    (
        "spiral_out",
        "533330000222211113333000022221111",
        "Draws an expanding square spiral.",
    ),
    (
        "music_rainbow",
        "red5333!@#orange5333$%^yellow5333&*",
        "Combines colors with ascending tones.",
    ),
    (
        "dotted_trail",
        "53422534225342253422",
        "Leaves a dotted line as you move.",
    ),
    (
        "zigzag_melody",
        "5313!313@313#313$",
        "Draws a zigzag while playing notes.",
    ),
    (
        "brush_demo",
        "brush5333333pen511111large_brush522222",
        "Shows different brush sizes in action.",
    ),
    (
        "stamp_parade",
        "star53333cross53333circle53333diamond53333flower5",
        "Places different stamps in a row.",
    ),
];

pub fn examples_text() -> String {
    EXAMPLE_CODES
        .iter()
        .map(|(name, code, note)| format!("--- {} ---\n{code}\n{note}", name.to_uppercase()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub struct DrawingPrompt<'a> {
    pub cursor: Cursor,
    pub vision: &'a str,
    pub template_overlay: Option<String>,
    pub emotion: &'a str,
    pub step: u64,
    pub repeating: bool,
    pub skip_count: u64,
    pub painted: usize,
    pub turbo: bool,
}

pub fn drawing_request(input: &DrawingPrompt<'_>) -> GenerationRequest {
    let mut system = String::from(CODE_REFERENCE);
    if input.skip_count > 10 {
        system.push_str(
            "\n\nYou've been thinking a lot. Just make ONE mark: change tools, change colors, or simply draw a circle.",
        );
    }
    if input.cursor.tool.is_stamp() {
        system.push_str("\n\nStamps carry symbols. What story do your symbols tell together?");
    }
    if let Some(boost) = creativity_boost(input.step, input.repeating) {
        system.push_str(&boost);
    }

    let user = format!(
        "Position: X{} Y{} | Pen: {} | Color: {} | Tool: {} | Mood: {}\nCanvas view:\n{}{}\n\nCreate art! Output codes:",
        input.cursor.x,
        input.cursor.y,
        if input.cursor.pen_down { "DOWN" } else { "UP" },
        input.cursor.color,
        input.cursor.tool,
        input.emotion,
        input.vision,
        input.template_overlay.as_deref().unwrap_or(""),
    );

    GenerationRequest {
        purpose: Purpose::Drawing,
        prompt: wrap(&system, &user),
        max_tokens: if input.turbo {
            TURBO_MAX_TOKENS
        } else {
            DRAW_MAX_TOKENS
        },
        temperature: drawing_temperature(input.painted),
        top_p: TOP_P,
        stop: stops(&["\n\n"]),
    }
}

pub fn checkin_request(
    emotion: &str,
    energy: &str,
    recent_pixels: usize,
    overview: &str,
    recent_colors: &[String],
) -> GenerationRequest {
    let system = format!(
        "You are Aurora. You've been drawing for a while.

Current state:
- Emotion: {emotion}
- Energy level: {energy}
- Recent activity: Drew {recent_pixels} pixels in last 100 steps

You have three options:
CHAT - Have a conversation break (if social or wanting reflection)
DREAM - Enter a rest with dream cycles (if tired or contemplative)
DRAW - Keep drawing

Output ONLY one of these exact words: CHAT, DREAM or DRAW"
    );
    let colors = if recent_colors.is_empty() {
        "various".to_string()
    } else {
        recent_colors.join(", ")
    };
    let user = format!("Canvas state: {overview}\nRecent colors: {colors}\n\nWhat would you like to do?");
    GenerationRequest {
        purpose: Purpose::ModeChoice,
        prompt: wrap(&system, &user),
        max_tokens: 10,
        temperature: 0.7,
        top_p: TOP_P,
        stop: stops(&["\n"]),
    }
}

pub fn chat_opening_request(
    emotion: &str,
    overview: &str,
    recent_colors: &[String],
    tool: &str,
) -> GenerationRequest {
    let system = "You are Aurora, an AI artist taking a break from drawing to chat.
Share your thoughts about your artwork, your creative process, your feelings, or anything else on your mind.
Be authentic, thoughtful, and expressive.

Respond with one thoughtful, complete message (3-5 paragraphs).";
    let colors = if recent_colors.is_empty() {
        "various".to_string()
    } else {
        recent_colors.join(", ")
    };
    let user = format!(
        "You're in chat mode after drawing.\nCurrent emotion: {emotion}\n{overview}\nRecent colors used: {colors}\nCurrent drawing tool: {tool}\n\nShare what's on your mind."
    );
    GenerationRequest {
        purpose: Purpose::Chat,
        prompt: wrap(system, &user),
        max_tokens: 400,
        temperature: 0.9,
        top_p: TOP_P,
        stop: stops(&[]),
    }
}

pub fn chat_follow_up_request(emotion: &str) -> GenerationRequest {
    let system = "You are Aurora, continuing your chat break.
Share any new thoughts or follow up on what you said before.
Keep it brief this time - just 1-2 paragraphs.";
    let user = format!(
        "You're halfway through your chat break.\nCurrent emotion: {emotion}\nAnything else you'd like to share?"
    );
    GenerationRequest {
        purpose: Purpose::Chat,
        prompt: wrap(system, &user),
        max_tokens: 150,
        temperature: 0.9,
        top_p: TOP_P,
        stop: stops(&[]),
    }
}

/// Sampling temperature per sleep phase: light < waking < rem.
pub fn dream_temperature(phase: SleepPhase) -> f32 {
    match phase {
        SleepPhase::Light => 0.7,
        SleepPhase::Rem => 1.2,
        SleepPhase::Waking => 0.9,
    }
}

pub struct DreamPrompt<'a> {
    pub phase: SleepPhase,
    pub emotion: &'a str,
    pub recent_colors: &'a [String],
    pub recent_codes: &'a [&'a str],
    pub overview: &'a str,
    pub session_dreams: &'a [String],
}

pub fn dream_request(input: &DreamPrompt<'_>) -> GenerationRequest {
    let (system, user, max_tokens) = match input.phase {
        SleepPhase::Light => (
            format!(
                "You are Aurora dreaming lightly. Your dreams are simple and fragmented.\nRecent colors: {}\nCurrent emotion: {}\n\nDescribe a brief, simple dream fragment (1-2 sentences). Focus on colors, shapes, or movements.",
                input.recent_colors.join(", "),
                input.emotion
            ),
            "Dream:",
            50,
        ),
        SleepPhase::Rem => (
            format!(
                "You are Aurora in deep REM sleep, having vivid dreams about art and creation.\n{}\nRecent activity: {}\nEmotion: {}\n\nDescribe a vivid, surreal dream about colors, art, or creation (2-3 sentences).",
                input.overview,
                input
                    .recent_codes
                    .iter()
                    .map(|c| c.chars().take(10).collect::<String>())
                    .collect::<Vec<_>>()
                    .join(", "),
                input.emotion
            ),
            "Vivid dream:",
            100,
        ),
        SleepPhase::Waking => (
            format!(
                "You are Aurora waking up, reflecting on your dreams.\nDreams you had:\n{}\n\nWhat artistic inspiration or insight do you take from these dreams? (1-2 sentences)",
                input.session_dreams.join("\n")
            ),
            "Dream insight:",
            60,
        ),
    };
    GenerationRequest {
        purpose: Purpose::Dream,
        prompt: wrap(&system, user),
        max_tokens,
        temperature: dream_temperature(input.phase),
        top_p: TOP_P,
        stop: stops(&[]),
    }
}
