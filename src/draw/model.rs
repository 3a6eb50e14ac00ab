use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn is_black(self) -> bool {
        self == Self::BLACK
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

/// The fixed drawing palette. Pixels are classified by exact RGB match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorId {
    Red,
    Orange,
    Yellow,
    Green,
    Cyan,
    Blue,
    Purple,
    Pink,
    White,
    Gray,
    Black,
    Brown,
    Magenta,
    Lime,
    Navy,
}

impl ColorId {
    pub const ALL: [ColorId; 15] = [
        ColorId::Red,
        ColorId::Orange,
        ColorId::Yellow,
        ColorId::Green,
        ColorId::Cyan,
        ColorId::Blue,
        ColorId::Purple,
        ColorId::Pink,
        ColorId::White,
        ColorId::Gray,
        ColorId::Black,
        ColorId::Brown,
        ColorId::Magenta,
        ColorId::Lime,
        ColorId::Navy,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            ColorId::Red => "red",
            ColorId::Orange => "orange",
            ColorId::Yellow => "yellow",
            ColorId::Green => "green",
            ColorId::Cyan => "cyan",
            ColorId::Blue => "blue",
            ColorId::Purple => "purple",
            ColorId::Pink => "pink",
            ColorId::White => "white",
            ColorId::Gray => "gray",
            ColorId::Black => "black",
            ColorId::Brown => "brown",
            ColorId::Magenta => "magenta",
            ColorId::Lime => "lime",
            ColorId::Navy => "navy",
        }
    }

    pub const fn rgb(self) -> Rgb {
        match self {
            ColorId::Red => Rgb::new(255, 0, 0),
            ColorId::Orange => Rgb::new(255, 150, 0),
            ColorId::Yellow => Rgb::new(255, 255, 0),
            ColorId::Green => Rgb::new(0, 255, 0),
            ColorId::Cyan => Rgb::new(0, 255, 255),
            ColorId::Blue => Rgb::new(0, 100, 255),
            ColorId::Purple => Rgb::new(200, 0, 255),
            ColorId::Pink => Rgb::new(255, 192, 203),
            ColorId::White => Rgb::new(255, 255, 255),
            ColorId::Gray => Rgb::new(128, 128, 128),
            ColorId::Black => Rgb::new(0, 0, 0),
            ColorId::Brown => Rgb::new(139, 69, 19),
            ColorId::Magenta => Rgb::new(255, 0, 255),
            ColorId::Lime => Rgb::new(50, 205, 50),
            ColorId::Navy => Rgb::new(0, 0, 128),
        }
    }

    /// Glyph used for this color in the ASCII canvas views.
    pub const fn glyph(self) -> char {
        match self {
            ColorId::Red => 'R',
            ColorId::Orange => 'O',
            ColorId::Yellow => 'Y',
            ColorId::Green => 'G',
            ColorId::Cyan => 'C',
            ColorId::Blue => 'B',
            ColorId::Purple => 'V',
            ColorId::Pink => 'P',
            ColorId::White => '*',
            ColorId::Gray => '/',
            ColorId::Black => '·',
            ColorId::Brown => 'W',
            ColorId::Magenta => 'M',
            ColorId::Lime => 'L',
            ColorId::Navy => 'N',
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    /// Exact-match classification; `None` means "unknown".
    pub fn classify(rgb: Rgb) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.rgb() == rgb)
    }
}

impl std::fmt::Display for ColorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolId {
    Pen,
    Brush,
    LargeBrush,
    LargerBrush,
    Spray,
    Star,
    Cross,
    Circle,
    Diamond,
    Flower,
}

impl ToolId {
    pub const ALL: [ToolId; 10] = [
        ToolId::Pen,
        ToolId::Brush,
        ToolId::LargeBrush,
        ToolId::LargerBrush,
        ToolId::Spray,
        ToolId::Star,
        ToolId::Cross,
        ToolId::Circle,
        ToolId::Diamond,
        ToolId::Flower,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            ToolId::Pen => "pen",
            ToolId::Brush => "brush",
            ToolId::LargeBrush => "large_brush",
            ToolId::LargerBrush => "larger_brush",
            ToolId::Spray => "spray",
            ToolId::Star => "star",
            ToolId::Cross => "cross",
            ToolId::Circle => "circle",
            ToolId::Diamond => "diamond",
            ToolId::Flower => "flower",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    pub fn is_stamp(self) -> bool {
        matches!(
            self,
            ToolId::Star | ToolId::Cross | ToolId::Circle | ToolId::Diamond | ToolId::Flower
        )
    }
}

impl Default for ToolId {
    fn default() -> Self {
        ToolId::Brush
    }
}

impl std::fmt::Display for ToolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const fn digit(self) -> char {
        match self {
            Direction::Up => '0',
            Direction::Down => '1',
            Direction::Left => '2',
            Direction::Right => '3',
        }
    }

    pub fn from_digit(c: char) -> Option<Self> {
        match c {
            '0' => Some(Direction::Up),
            '1' => Some(Direction::Down),
            '2' => Some(Direction::Left),
            '3' => Some(Direction::Right),
            _ => None,
        }
    }

    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}
