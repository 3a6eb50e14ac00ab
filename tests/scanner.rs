use aurora_canvas::agent::scanner::{render, scan, Directive, Pitch, Token, MAX_SCAN_CHARS};
use aurora_canvas::agent::templates::Difficulty;
use aurora_canvas::draw::{ColorId, Direction, ToolId};

#[test]
fn clean_input_renders_and_rescans_identically() {
    for raw in [
        "red533311142220",
        "zoom_out brush5333 look_around",
        "template_hard ++!--@#",
        "larger_brush5magenta511112222",
    ] {
        let tokens = scan(raw);
        assert!(!tokens.is_empty(), "{raw} produced no tokens");
        assert_eq!(scan(&render(&tokens)), tokens, "{raw}");
    }
}

#[test]
fn directives_are_matched_per_occurrence() {
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
fn directives_win_over_colors_and_digits() {
    assert_eq!(
        scan("template_easy"),
        vec![Token::Special(Directive::Template(Difficulty::Easy))]
    );
    assert_eq!(
        scan("pinkpen"),
        vec![
            Token::Color(ColorId::Pink),
            Token::Special(Directive::UseTool(ToolId::Pen)),
        ]
    );
}

#[test]
fn think_pause_replaces_everything() {
    assert_eq!(scan("0123456789red53"), vec![Token::ThinkPause]);
    assert_eq!(scan("red 123456789"), vec![Token::ThinkPause]);
}

#[test]
fn pitch_consumes_two_characters() {
    assert_eq!(
        scan("+-++"),
        vec![Token::Pitch(Pitch::Low)]
    );
}

#[test]
fn output_beyond_the_budget_is_ignored() {
    let raw = format!("{}red", "4".repeat(MAX_SCAN_CHARS));
    let tokens = scan(&raw);
    assert_eq!(tokens.len(), MAX_SCAN_CHARS);
    assert!(tokens.iter().all(|t| *t == Token::PenUp));
}
