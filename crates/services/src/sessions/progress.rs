use serde::Serialize;

/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    pub remaining: usize,
    /// Share of questions answered, rounded down.
    pub percent_answered: u32,
}

impl SessionProgress {
    #[must_use]
    pub fn new(total: usize, answered: usize) -> Self {
        let answered = answered.min(total);
        let percent_answered = if total == 0 {
            0
        } else {
            u32::try_from(answered * 100 / total).unwrap_or(100)
        };
        Self {
            total,
            answered,
            remaining: total - answered,
            percent_answered,
        }
    }
}
