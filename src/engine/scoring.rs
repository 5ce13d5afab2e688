use serde::Serialize;

use crate::engine::ledger::AnswerLedger;
use crate::engine::question::Question;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub(crate) struct AttemptScore {
    pub(crate) total: u32,
    pub(crate) correct: u32,
    pub(crate) wrong: u32,
    pub(crate) unattempted: u32,
    pub(crate) score: f64,
}

/// Scores an attempt. No ledger entry counts as unattempted; a question with
/// an unparsable answer key scores literally, so an answer to it is wrong.
/// The score is not clamped and may be negative.
pub(crate) fn score(
    questions: &[Question],
    ledger: &AnswerLedger,
    marks_per_question: f64,
    negative_marks_per_wrong: f64,
) -> AttemptScore {
    let mut correct = 0u32;
    let mut wrong = 0u32;
    let mut unattempted = 0u32;

    for question in questions {
        match ledger.answer(&question.id) {
            None => unattempted += 1,
            Some(selected) if question.correct_index >= 0
                && selected == question.correct_index as usize =>
            {
                correct += 1;
            }
            Some(_) => wrong += 1,
        }
    }

    AttemptScore {
        total: questions.len() as u32,
        correct,
        wrong,
        unattempted,
        score: f64::from(correct) * marks_per_question
            - f64::from(wrong) * negative_marks_per_wrong,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: &str, correct_index: i32) -> Question {
        Question {
            id: id.to_string(),
            text: format!("question {id}"),
            options: vec!["a".to_string(), "b".to_string(), "c".to_string(), "d".to_string()],
            correct_index,
            section: None,
            explanation: None,
        }
    }

    #[test]
    fn negative_marking_example() {
        // Ten questions, six correct, two wrong, marks 1, negative 0.25.
        let questions: Vec<Question> =
            (1..=10).map(|n| question(&format!("q{n}"), 0)).collect();
        let mut ledger = AnswerLedger::new();
        for n in 1..=6 {
            ledger.select(&format!("q{n}"), 0);
        }
        for n in 7..=8 {
            ledger.select(&format!("q{n}"), 1);
        }

        let result = score(&questions, &ledger, 1.0, 0.25);
        assert_eq!(result.correct, 6);
        assert_eq!(result.wrong, 2);
        assert_eq!(result.unattempted, 2);
        assert!((result.score - 5.5).abs() < f64::EPSILON);
    }

    #[test]
    fn counts_always_sum_to_total() {
        let questions: Vec<Question> =
            (1..=7).map(|n| question(&format!("q{n}"), -1)).collect();
        let mut ledger = AnswerLedger::new();
        ledger.select("q1", 0);
        ledger.select("q2", 3);

        let result = score(&questions, &ledger, 2.0, 0.5);
        assert_eq!(result.correct + result.wrong + result.unattempted, result.total);
        // Unparsable keys score literally: both answers count as wrong.
        assert_eq!(result.wrong, 2);
        assert_eq!(result.unattempted, 5);
        assert!((result.score + 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn scoring_is_pure() {
        let questions = vec![question("q1", 1)];
        let mut ledger = AnswerLedger::new();
        ledger.select("q1", 1);

        let first = score(&questions, &ledger, 4.0, 1.0);
        let second = score(&questions, &ledger, 4.0, 1.0);
        assert_eq!(first, second);
        assert!((first.score - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn score_may_go_negative() {
        let questions = vec![question("q1", 0), question("q2", 0)];
        let mut ledger = AnswerLedger::new();
        ledger.select("q1", 1);
        ledger.select("q2", 1);

        let result = score(&questions, &ledger, 1.0, 1.0);
        assert!((result.score + 2.0).abs() < f64::EPSILON);
    }
}
