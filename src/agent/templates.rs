//! Paint-by-number guides offered to the model in its drawing prompt.

use crate::draw::model::ColorId;
use rand::seq::SliceRandom;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct Template {
    pub name: &'static str,
    pub parts: &'static [(&'static str, ColorId)],
}

const EASY: &[Template] = &[
    Template {
        name: "circle",
        parts: &[("positions", ColorId::Blue)],
    },
    Template {
        name: "square",
        parts: &[("positions", ColorId::Red)],
    },
    Template {
        name: "cross",
        parts: &[("positions", ColorId::Green)],
    },
];

const MEDIUM: &[Template] = &[
    Template {
        name: "flower",
        parts: &[
            ("center", ColorId::Yellow),
            ("petals", ColorId::Red),
            ("stem", ColorId::Green),
            ("leaves", ColorId::Green),
        ],
    },
    Template {
        name: "star",
        parts: &[("points", ColorId::Yellow), ("lines", ColorId::Yellow)],
    },
    Template {
        name: "heart",
        parts: &[
            ("left_curve", ColorId::Purple),
            ("right_curve", ColorId::Purple),
            ("bottom", ColorId::Purple),
            ("fill", ColorId::Purple),
        ],
    },
];

const HARD: &[Template] = &[
    Template {
        name: "house",
        parts: &[
            ("roof", ColorId::Red),
            ("walls", ColorId::White),
            ("door", ColorId::Black),
            ("windows", ColorId::Cyan),
        ],
    },
    Template {
        name: "tree",
        parts: &[("trunk", ColorId::Black), ("canopy", ColorId::Green)],
    },
    Template {
        name: "butterfly",
        parts: &[
            ("body", ColorId::Blue),
            ("left_wing_top", ColorId::Orange),
            ("left_wing_bottom", ColorId::Yellow),
            ("right_wing_top", ColorId::Orange),
            ("right_wing_bottom", ColorId::Yellow),
        ],
    },
];

pub fn templates(difficulty: Difficulty) -> &'static [Template] {
    match difficulty {
        Difficulty::Easy => EASY,
        Difficulty::Medium => MEDIUM,
        Difficulty::Hard => HARD,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveTemplate {
    pub difficulty: Difficulty,
    pub template: &'static Template,
}

impl ActiveTemplate {
    pub fn pick<R: Rng + ?Sized>(difficulty: Difficulty, rng: &mut R) -> Option<Self> {
        templates(difficulty)
            .choose(rng)
            .map(|template| Self {
                difficulty,
                template,
            })
    }

    /// Block appended to the drawing prompt while a template is active.
    pub fn overlay(&self) -> String {
        let colors: Vec<String> = self
            .template
            .parts
            .iter()
            .map(|(part, color)| format!("{part}={color}"))
            .collect();
        format!(
            "\n\n[PAINT-BY-NUMBER TEMPLATE: {} ({})]\nSuggested pattern to follow! Use these colors:\n{}\nTemplate guides your art - follow or improvise!",
            self.template.name.to_uppercase(),
            self.difficulty.name(),
            colors.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn every_difficulty_has_three_templates() {
        for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            assert_eq!(templates(difficulty).len(), 3);
        }
    }

    #[test]
    fn overlay_lists_suggested_colors() {
        let mut rng = StdRng::seed_from_u64(1);
        let active = ActiveTemplate::pick(Difficulty::Hard, &mut rng).expect("template");
        let overlay = active.overlay();
        assert!(overlay.contains("(hard)"));
        assert!(overlay.contains(&active.template.name.to_uppercase()));
        let (part, color) = active.template.parts[0];
        assert!(overlay.contains(&format!("{part}={color}")));
    }
}
