// Fielding positions rated by the full-evaluation report.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Defensive positions in a youth lineup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Pitcher,
    Catcher,
    FirstBase,
    SecondBase,
    ThirdBase,
    ShortStop,
    /// Infielder stationed beside a coach-pitcher.
    PitchersHelper,
    LeftField,
    RightField,
    CenterField,
    LeftCenter,
    RightCenter,
}

/// Positions averaged into the infield roll-up.
pub const INFIELD_POSITIONS: &[Position] = &[
    Position::Catcher,
    Position::FirstBase,
    Position::SecondBase,
    Position::ThirdBase,
    Position::ShortStop,
    Position::PitchersHelper,
];

/// Positions averaged into the outfield roll-up.
pub const OUTFIELD_POSITIONS: &[Position] = &[
    Position::LeftField,
    Position::RightField,
    Position::LeftCenter,
    Position::RightCenter,
    Position::CenterField,
];

impl Position {
    /// Every rated position; the defense roll-up averages all of them.
    pub const ALL: [Position; 12] = [
        Position::Pitcher,
        Position::Catcher,
        Position::FirstBase,
        Position::SecondBase,
        Position::ThirdBase,
        Position::ShortStop,
        Position::PitchersHelper,
        Position::LeftField,
        Position::RightField,
        Position::CenterField,
        Position::LeftCenter,
        Position::RightCenter,
    ];

    /// Parse a scorecard abbreviation ("2B", "PH", "LC", ...).
    pub fn from_str_pos(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "P" => Some(Position::Pitcher),
            "C" => Some(Position::Catcher),
            "1B" => Some(Position::FirstBase),
            "2B" => Some(Position::SecondBase),
            "3B" => Some(Position::ThirdBase),
            "SS" => Some(Position::ShortStop),
            "PH" => Some(Position::PitchersHelper),
            "LF" => Some(Position::LeftField),
            "RF" => Some(Position::RightField),
            "CF" => Some(Position::CenterField),
            "LC" | "LCF" => Some(Position::LeftCenter),
            "RC" | "RCF" => Some(Position::RightCenter),
            _ => None,
        }
    }

    /// Scorecard abbreviation.
    pub fn display_str(&self) -> &'static str {
        match self {
            Position::Pitcher => "P",
            Position::Catcher => "C",
            Position::FirstBase => "1B",
            Position::SecondBase => "2B",
            Position::ThirdBase => "3B",
            Position::ShortStop => "SS",
            Position::PitchersHelper => "PH",
            Position::LeftField => "LF",
            Position::RightField => "RF",
            Position::CenterField => "CF",
            Position::LeftCenter => "LC",
            Position::RightCenter => "RC",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_str())
    }
}
