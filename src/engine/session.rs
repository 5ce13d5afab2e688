use std::time::{Duration, Instant};

use rand::Rng;
use serde::Serialize;
use time::PrimitiveDateTime;

use crate::engine::countdown::{Countdown, CountdownEvent};
use crate::engine::ledger::AnswerLedger;
use crate::engine::question::Question;
use crate::engine::scoring::{self, AttemptScore};
use crate::engine::sections::filter_by_sections;
use crate::engine::shuffle::{self, ShuffleMode};
use crate::engine::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum SessionPhase {
    Running,
    Submitting,
    Submitted,
}

/// Everything needed to start an attempt. Questions arrive already
/// normalized; the section list is already validated for custom exams.
pub(crate) struct SessionSpec {
    pub(crate) session_id: String,
    pub(crate) student_id: String,
    pub(crate) exam_id: String,
    pub(crate) is_custom: bool,
    pub(crate) questions: Vec<Question>,
    pub(crate) sections: Vec<String>,
    pub(crate) duration_seconds: Option<u64>,
    pub(crate) shuffle: ShuffleMode,
    pub(crate) marks_per_question: f64,
    pub(crate) negative_marks_per_wrong: f64,
}

/// Checks the availability window for a live exam. Practice exams are always
/// open.
pub(crate) fn ensure_available(
    start_at: Option<PrimitiveDateTime>,
    end_at: Option<PrimitiveDateTime>,
    is_practice: bool,
    now: PrimitiveDateTime,
) -> Result<(), EngineError> {
    if is_practice {
        return Ok(());
    }
    if start_at.is_some_and(|start| now < start) || end_at.is_some_and(|end| now > end) {
        return Err(EngineError::NotAvailable);
    }
    Ok(())
}

/// One in-flight attempt: the frozen question set, the ledger, the countdown
/// and the submission phase. Lives in the in-process registry behind a mutex
/// and is dropped after submission.
#[derive(Debug)]
pub(crate) struct ExamSession {
    pub(crate) id: String,
    pub(crate) student_id: String,
    pub(crate) exam_id: String,
    pub(crate) is_custom: bool,
    pub(crate) sections: Vec<String>,
    pub(crate) marks_per_question: f64,
    pub(crate) negative_marks_per_wrong: f64,
    questions: Vec<Question>,
    ledger: AnswerLedger,
    countdown: Countdown,
    phase: SessionPhase,
    last_activity: Instant,
}

impl ExamSession {
    /// Builds the working set (filter, then shuffle) and starts the clock.
    /// An empty working set blocks the start.
    pub(crate) fn start(spec: SessionSpec, rng: &mut impl Rng) -> Result<Self, EngineError> {
        let filtered = filter_by_sections(&spec.questions, &spec.sections);
        if filtered.is_empty() {
            return Err(EngineError::EmptyWorkingSet);
        }
        let questions = shuffle::apply(spec.shuffle, filtered, rng);

        let countdown = match spec.duration_seconds {
            Some(seconds) => Countdown::timed(seconds),
            None => Countdown::untimed(),
        };

        Ok(Self {
            id: spec.session_id,
            student_id: spec.student_id,
            exam_id: spec.exam_id,
            is_custom: spec.is_custom,
            sections: spec.sections,
            marks_per_question: spec.marks_per_question,
            negative_marks_per_wrong: spec.negative_marks_per_wrong,
            questions,
            ledger: AnswerLedger::new(),
            countdown,
            phase: SessionPhase::Running,
            last_activity: Instant::now(),
        })
    }

    pub(crate) fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub(crate) fn ledger(&self) -> &AnswerLedger {
        &self.ledger
    }

    pub(crate) fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub(crate) fn remaining_seconds(&self) -> Option<u64> {
        self.countdown.remaining_seconds()
    }

    pub(crate) fn is_timed(&self) -> bool {
        self.countdown.is_timed()
    }

    pub(crate) fn is_expired(&self) -> bool {
        self.countdown.is_expired()
    }

    pub(crate) fn idle_for(&self) -> Duration {
        self.last_activity.elapsed()
    }

    /// Locks in an answer. Returns whether the answer was stored (`false`
    /// when the question is already answered).
    pub(crate) fn select_answer(
        &mut self,
        question_id: &str,
        option_index: usize,
    ) -> Result<bool, EngineError> {
        if self.phase != SessionPhase::Running {
            return Err(EngineError::SessionClosed);
        }

        let question = self
            .questions
            .iter()
            .find(|question| question.id == question_id)
            .ok_or_else(|| EngineError::UnknownQuestion(question_id.to_string()))?;
        if option_index >= question.options.len() {
            return Err(EngineError::InvalidOption {
                question_id: question_id.to_string(),
                index: option_index,
            });
        }

        self.last_activity = Instant::now();
        Ok(self.ledger.select(question_id, option_index))
    }

    /// Flips the review flag; returns the new state.
    pub(crate) fn toggle_review(&mut self, question_id: &str) -> Result<bool, EngineError> {
        if self.phase != SessionPhase::Running {
            return Err(EngineError::SessionClosed);
        }
        if !self.questions.iter().any(|question| question.id == question_id) {
            return Err(EngineError::UnknownQuestion(question_id.to_string()));
        }

        self.last_activity = Instant::now();
        Ok(self.ledger.toggle_review(question_id))
    }

    /// Advances the countdown by one second. Ticks outside the running phase
    /// are no-ops so submission and timing never interleave.
    pub(crate) fn tick(&mut self) -> Vec<CountdownEvent> {
        if self.phase != SessionPhase::Running {
            return Vec::new();
        }
        self.countdown.tick()
    }

    /// Claims the submission. The first caller (manual submit or expiry)
    /// moves the phase to `Submitting` and gets a freshly computed score; any
    /// later caller gets `None` and must treat the submission as settled.
    pub(crate) fn begin_submit(&mut self) -> Option<AttemptScore> {
        if self.phase != SessionPhase::Running {
            return None;
        }
        self.phase = SessionPhase::Submitting;
        Some(scoring::score(
            &self.questions,
            &self.ledger,
            self.marks_per_question,
            self.negative_marks_per_wrong,
        ))
    }

    /// Marks the attempt as persisted.
    pub(crate) fn complete_submit(&mut self) {
        self.phase = SessionPhase::Submitted;
    }

    /// Releases the submission claim after a transport failure so the
    /// attempt stays retryable. The score is recomputed on the next claim.
    pub(crate) fn abort_submit(&mut self) {
        if self.phase == SessionPhase::Submitting {
            self.phase = SessionPhase::Running;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use time::macros::datetime;

    fn question(id: &str, section: Option<&str>) -> Question {
        Question {
            id: id.to_string(),
            text: format!("question {id}"),
            options: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            correct_index: 0,
            section: section.map(|s| s.to_string()),
            explanation: None,
        }
    }

    fn spec(questions: Vec<Question>, sections: Vec<String>) -> SessionSpec {
        SessionSpec {
            session_id: "s1".to_string(),
            student_id: "student".to_string(),
            exam_id: "exam".to_string(),
            is_custom: false,
            questions,
            sections,
            duration_seconds: Some(120),
            shuffle: ShuffleMode::None,
            marks_per_question: 1.0,
            negative_marks_per_wrong: 0.25,
        }
    }

    fn start(questions: Vec<Question>, sections: Vec<String>) -> ExamSession {
        let mut rng = StdRng::seed_from_u64(1);
        ExamSession::start(spec(questions, sections), &mut rng).expect("session")
    }

    #[test]
    fn start_rejects_empty_working_set() {
        let questions = vec![question("q1", Some("physics"))];
        let mut rng = StdRng::seed_from_u64(1);

        let err = ExamSession::start(spec(questions, vec!["history".to_string()]), &mut rng)
            .unwrap_err();
        assert!(matches!(err, EngineError::EmptyWorkingSet));
    }

    #[test]
    fn availability_window_blocks_early_and_late_starts() {
        let start_at = Some(datetime!(2025-06-01 10:00:00));
        let end_at = Some(datetime!(2025-06-01 12:00:00));

        assert!(ensure_available(start_at, end_at, false, datetime!(2025-06-01 09:59:59)).is_err());
        assert!(ensure_available(start_at, end_at, false, datetime!(2025-06-01 11:00:00)).is_ok());
        assert!(ensure_available(start_at, end_at, false, datetime!(2025-06-01 12:00:01)).is_err());
        // Practice ignores the window entirely.
        assert!(ensure_available(start_at, end_at, true, datetime!(2025-06-01 09:00:00)).is_ok());
    }

    #[test]
    fn answers_lock_and_validate() {
        let mut session = start(vec![question("q1", None), question("q2", None)], vec![]);

        assert!(session.select_answer("q1", 1).expect("select"));
        assert!(!session.select_answer("q1", 2).expect("locked"));
        assert!(matches!(
            session.select_answer("q1", 9),
            Err(EngineError::InvalidOption { .. })
        ));
        assert!(matches!(
            session.select_answer("nope", 0),
            Err(EngineError::UnknownQuestion(_))
        ));
    }

    #[test]
    fn first_submit_claim_wins() {
        let mut session = start(vec![question("q1", None)], vec![]);
        session.select_answer("q1", 0).expect("select");

        let first = session.begin_submit().expect("first claim");
        assert_eq!(first.correct, 1);
        assert_eq!(session.phase(), SessionPhase::Submitting);

        assert!(session.begin_submit().is_none());

        session.complete_submit();
        assert_eq!(session.phase(), SessionPhase::Submitted);
        assert!(session.begin_submit().is_none());
    }

    #[test]
    fn aborted_submit_is_retryable() {
        let mut session = start(vec![question("q1", None)], vec![]);

        assert!(session.begin_submit().is_some());
        session.abort_submit();
        assert_eq!(session.phase(), SessionPhase::Running);
        assert!(session.begin_submit().is_some());
    }

    #[test]
    fn input_is_rejected_once_submission_starts() {
        let mut session = start(vec![question("q1", None)], vec![]);
        session.begin_submit();

        assert!(matches!(session.select_answer("q1", 0), Err(EngineError::SessionClosed)));
        assert!(matches!(session.toggle_review("q1"), Err(EngineError::SessionClosed)));
        assert!(session.tick().is_empty());
    }

    #[test]
    fn expiry_fires_once_through_the_session() {
        let questions = vec![question("q1", None)];
        let mut rng = StdRng::seed_from_u64(1);
        let mut spec = spec(questions, vec![]);
        spec.duration_seconds = Some(2);
        let mut session = ExamSession::start(spec, &mut rng).expect("session");

        // 2s total: the first tick lands at 1s remaining, inside the
        // under-a-minute window.
        assert_eq!(session.tick(), vec![CountdownEvent::CriticalWarning]);
        assert_eq!(session.tick(), vec![CountdownEvent::Expired]);
        assert!(session.tick().is_empty());
    }

    #[test]
    fn section_filter_applies_before_shuffle() {
        let questions = vec![
            question("p1", Some("physics")),
            question("c1", Some("chemistry")),
            question("p2", Some("physics")),
        ];
        let session = start(questions, vec!["physics".to_string()]);

        let ids: Vec<&str> = session.questions().iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2"]);
    }
}
