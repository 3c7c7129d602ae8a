use std::fmt;

use serde::Serialize;

/// Percentage at or above which a run counts as passed.
pub const PASS_PERCENTAGE: u32 = 70;

//
// ─── GRADE ─────────────────────────────────────────────────────────────────────
//

/// Letter grade derived from a percentage score.
///
/// Thresholds are inclusive lower bounds:
/// - `A`: 90 and above
/// - `B`: 80 and above
/// - `C`: 70 and above
/// - `D`: 60 and above
/// - `F`: everything else
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    #[must_use]
    pub fn from_percentage(percentage: u32) -> Self {
        match percentage {
            90.. => Grade::A,
            80..=89 => Grade::B,
            70..=79 => Grade::C,
            60..=69 => Grade::D,
            _ => Grade::F,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── RESULTS ───────────────────────────────────────────────────────────────────
//

/// Aggregate score for a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Results {
    correct_count: usize,
    answered_count: usize,
    total_questions: usize,
    percentage: u32,
    grade: Grade,
}

impl Results {
    pub(crate) fn new(
        correct_count: usize,
        answered_count: usize,
        total_questions: usize,
        percentage: u32,
    ) -> Self {
        Self {
            correct_count,
            answered_count,
            total_questions,
            percentage,
            grade: Grade::from_percentage(percentage),
        }
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    /// Questions that received an answer, correct or not.
    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answered_count
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.total_questions
    }

    #[must_use]
    pub fn percentage(&self) -> u32 {
        self.percentage
    }

    #[must_use]
    pub fn grade(&self) -> Grade {
        self.grade
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.percentage >= PASS_PERCENTAGE
    }
}
