use time::PrimitiveDateTime;

/// One row of a leaderboard or review projection, recomputed from stored
/// counts and the exam's current rates rather than the frozen score.
#[derive(Debug, Clone)]
pub(crate) struct ProjectedAttempt {
    pub(crate) student_id: String,
    pub(crate) student_name: String,
    pub(crate) correct_count: i32,
    pub(crate) wrong_count: i32,
    pub(crate) unattempted_count: i32,
    pub(crate) score: f64,
    pub(crate) submitted_at: PrimitiveDateTime,
}

pub(crate) fn project_score(
    correct_count: i32,
    wrong_count: i32,
    marks_per_question: f64,
    negative_marks_per_wrong: f64,
) -> f64 {
    f64::from(correct_count) * marks_per_question
        - f64::from(wrong_count) * negative_marks_per_wrong
}

/// Orders standings deterministically: score descending, earliest submission
/// first among ties, student id as the final tiebreak.
pub(crate) fn sort_standings(entries: &mut [ProjectedAttempt]) {
    entries.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.submitted_at.cmp(&b.submitted_at))
            .then_with(|| a.student_id.cmp(&b.student_id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn entry(student_id: &str, score: f64, submitted_at: PrimitiveDateTime) -> ProjectedAttempt {
        ProjectedAttempt {
            student_id: student_id.to_string(),
            student_name: student_id.to_string(),
            correct_count: 0,
            wrong_count: 0,
            unattempted_count: 0,
            score,
            submitted_at,
        }
    }

    #[test]
    fn project_score_uses_exam_rates() {
        assert!((project_score(6, 2, 1.0, 0.25) - 5.5).abs() < f64::EPSILON);
        assert!((project_score(3, 4, 2.0, 1.0) - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn standings_order_by_score_then_time_then_id() {
        let early = datetime!(2025-06-01 10:00:00);
        let late = datetime!(2025-06-01 11:00:00);
        let mut entries = vec![
            entry("charlie", 8.0, late),
            entry("bravo", 8.0, early),
            entry("alpha", 9.0, late),
            entry("delta", 8.0, early),
        ];

        sort_standings(&mut entries);

        let order: Vec<&str> = entries.iter().map(|e| e.student_id.as_str()).collect();
        assert_eq!(order, vec!["alpha", "bravo", "delta", "charlie"]);
    }

    #[test]
    fn negative_scores_sort_last() {
        let at = datetime!(2025-06-01 10:00:00);
        let mut entries = vec![entry("a", -1.5, at), entry("b", 0.0, at)];

        sort_standings(&mut entries);
        assert_eq!(entries[0].student_id, "b");
    }
}
