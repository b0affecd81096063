/// Aggregated view of attempt progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    pub flagged: usize,
    pub current_index: usize,
    pub remaining_seconds: u32,
    pub is_low_time: bool,
    pub is_complete: bool,
}

impl SessionProgress {
    /// Questions still without an answer.
    #[must_use]
    pub fn unanswered(&self) -> usize {
        self.total.saturating_sub(self.answered)
    }
}
