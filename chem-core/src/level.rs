//! Curriculum levels and their explanation directives.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The depth at which a compound should be explained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurriculumLevel {
    /// Middle school foundation (grades 9-10).
    Foundation,
    /// Senior secondary board examinations (grades 11-12).
    #[default]
    Board,
    /// Competitive entrance examinations.
    Competitive,
    /// First-year university chemistry.
    Undergraduate,
}

impl CurriculumLevel {
    /// Every level, in the order they are offered to the student.
    pub const ALL: [Self; 4] = [
        Self::Foundation,
        Self::Board,
        Self::Competitive,
        Self::Undergraduate,
    ];

    /// Display label shown in the level picker.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Foundation => "Foundation (Class 9-10)",
            Self::Board => "Board Level (Class 11-12)",
            Self::Competitive => "Competitive Exams (JEE/NEET)",
            Self::Undergraduate => "Undergraduate",
        }
    }

    /// Depth and style instruction embedded in the analysis prompt.
    #[must_use]
    pub fn directive(self) -> &'static str {
        match self {
            Self::Foundation => {
                "Keep the language simple and concrete. Relate the compound to everyday life, \
                 avoid reaction mechanisms, and introduce at most one new technical term per point."
            }
            Self::Board => {
                "Follow a senior secondary board syllabus. Cover structure, IUPAC nomenclature, \
                 preparation and characteristic reactions with balanced equations where relevant."
            }
            Self::Competitive => {
                "Prepare the student for competitive entrance exams. Emphasise reaction mechanisms, \
                 exceptions, stability and reactivity trends, and frequently tested traps."
            }
            Self::Undergraduate => {
                "Explain at first-year university depth. Discuss bonding, hybridisation, \
                 spectroscopic signatures and industrial relevance with precise terminology."
            }
        }
    }
}

impl fmt::Display for CurriculumLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CurriculumLevel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "foundation" => Ok(Self::Foundation),
            "board" => Ok(Self::Board),
            "competitive" => Ok(Self::Competitive),
            "undergraduate" => Ok(Self::Undergraduate),
            other => Err(CoreError::InvalidValue(format!(
                "unknown curriculum level '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directives_are_distinct() {
        for (i, a) in CurriculumLevel::ALL.iter().enumerate() {
            for b in &CurriculumLevel::ALL[i + 1..] {
                assert_ne!(a.directive(), b.directive());
                assert_ne!(a.label(), b.label());
            }
        }
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(
            "Competitive".parse::<CurriculumLevel>().expect("parse"),
            CurriculumLevel::Competitive
        );
        assert_eq!(
            " board ".parse::<CurriculumLevel>().expect("parse"),
            CurriculumLevel::Board
        );
        assert!("olympiad".parse::<CurriculumLevel>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&CurriculumLevel::Undergraduate).expect("serialize");
        assert_eq!(json, "\"undergraduate\"");
    }
}
