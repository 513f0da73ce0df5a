// Age tiers and skill categories.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProfileError;

// ---------------------------------------------------------------------------
// Age tiers
// ---------------------------------------------------------------------------

/// An age bracket with its own test battery and scoring constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgeTier {
    #[serde(rename = "6U")]
    U6,
    #[serde(rename = "7U")]
    U7,
    #[serde(rename = "8U")]
    U8,
    #[serde(rename = "9U")]
    U9,
    #[serde(rename = "10U")]
    U10,
    #[serde(rename = "11U")]
    U11,
    #[serde(rename = "12U")]
    U12,
    #[serde(rename = "13U")]
    U13,
    #[serde(rename = "14U")]
    U14,
    #[serde(rename = "15U")]
    U15,
    #[serde(rename = "16U")]
    U16,
    #[serde(rename = "High School")]
    HighSchool,
}

/// Groups of tiers that share a category layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierFamily {
    /// 6U-8U: coach-pitch, five general categories.
    CoachPitch,
    /// 9U-12U: kid-pitch, five general categories with pitching models.
    KidPitch,
    /// 13U and up: categories subdivided by defensive position.
    Positional,
}

impl AgeTier {
    /// All tiers, youngest first.
    pub const ALL: [AgeTier; 12] = [
        AgeTier::U6,
        AgeTier::U7,
        AgeTier::U8,
        AgeTier::U9,
        AgeTier::U10,
        AgeTier::U11,
        AgeTier::U12,
        AgeTier::U13,
        AgeTier::U14,
        AgeTier::U15,
        AgeTier::U16,
        AgeTier::HighSchool,
    ];

    /// Age-group label as used in template names.
    pub fn label(&self) -> &'static str {
        match self {
            AgeTier::U6 => "6U",
            AgeTier::U7 => "7U",
            AgeTier::U8 => "8U",
            AgeTier::U9 => "9U",
            AgeTier::U10 => "10U",
            AgeTier::U11 => "11U",
            AgeTier::U12 => "12U",
            AgeTier::U13 => "13U",
            AgeTier::U14 => "14U",
            AgeTier::U15 => "15U",
            AgeTier::U16 => "16U",
            AgeTier::HighSchool => "High School",
        }
    }

    pub fn family(&self) -> TierFamily {
        match self {
            AgeTier::U6 | AgeTier::U7 | AgeTier::U8 => TierFamily::CoachPitch,
            AgeTier::U9 | AgeTier::U10 | AgeTier::U11 | AgeTier::U12 => TierFamily::KidPitch,
            _ => TierFamily::Positional,
        }
    }

    /// Resolve an age-group label. Matching ignores case, surrounding
    /// whitespace and inner spaces, and accepts `U10` as well as `10U`.
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized: String = label
            .trim()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();

        if matches!(normalized.as_str(), "hs" | "highschool") {
            return Some(AgeTier::HighSchool);
        }

        let digits = normalized
            .strip_suffix('u')
            .or_else(|| normalized.strip_prefix('u'))?;
        match digits.parse::<u8>().ok()? {
            6 => Some(AgeTier::U6),
            7 => Some(AgeTier::U7),
            8 => Some(AgeTier::U8),
            9 => Some(AgeTier::U9),
            10 => Some(AgeTier::U10),
            11 => Some(AgeTier::U11),
            12 => Some(AgeTier::U12),
            13 => Some(AgeTier::U13),
            14 => Some(AgeTier::U14),
            15 => Some(AgeTier::U15),
            16 => Some(AgeTier::U16),
            _ => None,
        }
    }

    /// Template label for one of this tier's categories, e.g. `"10U Fielding Skills"`.
    pub fn template_label(&self, category: CategoryKind) -> String {
        format!("{} {}", self.label(), category.label())
    }
}

impl fmt::Display for AgeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AgeTier {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AgeTier::from_label(s).ok_or_else(|| ProfileError::UnknownTier(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// A skill group scored independently, then rolled up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    Athletic,
    Hitting,
    Throwing,
    Pitching,
    Catching,
    Catcher,
    Fielding,
    FirstBase,
    Infield,
    Outfield,
}

impl CategoryKind {
    /// Label used in template names.
    pub fn label(&self) -> &'static str {
        match self {
            CategoryKind::Athletic => "Athletic Skills",
            CategoryKind::Hitting => "Hitting Skills",
            CategoryKind::Throwing => "Throwing Skills",
            CategoryKind::Pitching => "Pitching Skills",
            CategoryKind::Catching => "Catching Skills",
            CategoryKind::Catcher => "Catcher Skills",
            CategoryKind::Fielding => "Fielding Skills",
            CategoryKind::FirstBase => "First Base Skills",
            CategoryKind::Infield => "Infield Skills",
            CategoryKind::Outfield => "Outfield Skills",
        }
    }

    /// Short machine name, matching the serialized form.
    pub fn key(&self) -> &'static str {
        match self {
            CategoryKind::Athletic => "athletic",
            CategoryKind::Hitting => "hitting",
            CategoryKind::Throwing => "throwing",
            CategoryKind::Pitching => "pitching",
            CategoryKind::Catching => "catching",
            CategoryKind::Catcher => "catcher",
            CategoryKind::Fielding => "fielding",
            CategoryKind::FirstBase => "first_base",
            CategoryKind::Infield => "infield",
            CategoryKind::Outfield => "outfield",
        }
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip_through_from_label() {
        for tier in AgeTier::ALL {
            assert_eq!(AgeTier::from_label(tier.label()), Some(tier));
        }
    }

    #[test]
    fn from_label_is_lenient() {
        assert_eq!(AgeTier::from_label(" 10u "), Some(AgeTier::U10));
        assert_eq!(AgeTier::from_label("U12"), Some(AgeTier::U12));
        assert_eq!(AgeTier::from_label("HS"), Some(AgeTier::HighSchool));
        assert_eq!(AgeTier::from_label("highschool"), Some(AgeTier::HighSchool));
        assert_eq!(AgeTier::from_label("HIGH SCHOOL"), Some(AgeTier::HighSchool));
        assert_eq!(AgeTier::from_label("5U"), None);
        assert_eq!(AgeTier::from_label("17U"), None);
        assert_eq!(AgeTier::from_label("varsity"), None);
        assert_eq!(AgeTier::from_label(""), None);
    }

    #[test]
    fn from_str_reports_unknown_tier() {
        let err = "adult".parse::<AgeTier>().unwrap_err();
        assert!(matches!(err, ProfileError::UnknownTier(ref s) if s == "adult"));
        assert_eq!("8U".parse::<AgeTier>().unwrap(), AgeTier::U8);
    }

    #[test]
    fn families() {
        assert_eq!(AgeTier::U8.family(), TierFamily::CoachPitch);
        assert_eq!(AgeTier::U9.family(), TierFamily::KidPitch);
        assert_eq!(AgeTier::U12.family(), TierFamily::KidPitch);
        assert_eq!(AgeTier::U13.family(), TierFamily::Positional);
        assert_eq!(AgeTier::HighSchool.family(), TierFamily::Positional);
    }

    #[test]
    fn template_labels() {
        assert_eq!(
            AgeTier::U10.template_label(CategoryKind::Fielding),
            "10U Fielding Skills"
        );
        assert_eq!(
            AgeTier::HighSchool.template_label(CategoryKind::FirstBase),
            "High School First Base Skills"
        );
    }

    #[test]
    fn serde_uses_labels() {
        assert_eq!(serde_json::to_string(&AgeTier::HighSchool).unwrap(), "\"High School\"");
        assert_eq!(
            serde_json::to_string(&CategoryKind::FirstBase).unwrap(),
            "\"first_base\""
        );
    }
}
