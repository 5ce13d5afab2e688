use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Answers and review flags for one attempt. Answers lock on first select;
/// review flags toggle freely and never touch answers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct AnswerLedger {
    answers: BTreeMap<String, usize>,
    review: BTreeSet<String>,
}

impl AnswerLedger {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Records an answer unless one is already present. Returns whether the
    /// answer was stored. A successful select clears the review flag.
    pub(crate) fn select(&mut self, question_id: &str, option_index: usize) -> bool {
        if self.answers.contains_key(question_id) {
            return false;
        }
        self.answers.insert(question_id.to_string(), option_index);
        self.review.remove(question_id);
        true
    }

    pub(crate) fn answer(&self, question_id: &str) -> Option<usize> {
        self.answers.get(question_id).copied()
    }

    pub(crate) fn answers(&self) -> &BTreeMap<String, usize> {
        &self.answers
    }

    /// Flips the review flag and returns the new state.
    pub(crate) fn toggle_review(&mut self, question_id: &str) -> bool {
        if self.review.remove(question_id) {
            false
        } else {
            self.review.insert(question_id.to_string());
            true
        }
    }

    pub(crate) fn review_flags(&self) -> &BTreeSet<String> {
        &self.review
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_answer_wins() {
        let mut ledger = AnswerLedger::new();

        assert!(ledger.select("q1", 2));
        assert!(!ledger.select("q1", 3));
        assert_eq!(ledger.answer("q1"), Some(2));
    }

    #[test]
    fn reselecting_same_option_is_still_a_noop() {
        let mut ledger = AnswerLedger::new();

        assert!(ledger.select("q1", 1));
        assert!(!ledger.select("q1", 1));
    }

    #[test]
    fn select_clears_review_flag() {
        let mut ledger = AnswerLedger::new();

        assert!(ledger.toggle_review("q1"));
        assert!(ledger.select("q1", 0));
        assert!(!ledger.review_flags().contains("q1"));
    }

    #[test]
    fn review_toggle_is_an_involution_and_keeps_answers() {
        let mut ledger = AnswerLedger::new();
        ledger.select("q1", 1);

        assert!(ledger.toggle_review("q2"));
        assert!(!ledger.toggle_review("q2"));
        assert_eq!(ledger.answer("q1"), Some(1));
        assert!(ledger.review_flags().is_empty());
    }

    #[test]
    fn locked_answer_keeps_its_review_flag() {
        let mut ledger = AnswerLedger::new();
        ledger.select("q1", 0);
        ledger.toggle_review("q1");

        assert!(!ledger.select("q1", 1));
        assert!(ledger.review_flags().contains("q1"));
    }
}
