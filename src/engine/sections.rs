use crate::engine::question::Question;
use crate::engine::EngineError;

/// Subject-selection rules for a custom exam: the student must pick exactly
/// `total_subjects` codes, every mandatory subject stays selected, and the
/// remainder comes from the optional pool.
#[derive(Debug, Clone)]
pub(crate) struct SubjectRules {
    pub(crate) total_subjects: usize,
    pub(crate) mandatory: Vec<String>,
    pub(crate) optional: Vec<String>,
}

/// Keeps questions whose section matches one of `codes`, case-insensitively.
/// An empty code list means no filtering. Questions without a section are
/// excluded once filtering is in effect.
pub(crate) fn filter_by_sections(questions: &[Question], codes: &[String]) -> Vec<Question> {
    if codes.is_empty() {
        return questions.to_vec();
    }

    let wanted: Vec<String> = codes.iter().map(|code| code.trim().to_lowercase()).collect();

    questions
        .iter()
        .filter(|question| {
            question.section.as_deref().is_some_and(|section| {
                wanted.iter().any(|code| code == &section.to_lowercase())
            })
        })
        .cloned()
        .collect()
}

/// Distinct section codes in order of first appearance.
pub(crate) fn distinct_sections(questions: &[Question]) -> Vec<String> {
    let mut seen = Vec::new();
    for question in questions {
        if let Some(section) = &question.section {
            if !seen.contains(section) {
                seen.push(section.clone());
            }
        }
    }
    seen
}

/// Validates a student's subject selection against the exam's rules and
/// returns the normalized (lowercased, trimmed) codes.
pub(crate) fn validate_selection(
    rules: &SubjectRules,
    chosen: &[String],
) -> Result<Vec<String>, EngineError> {
    let mut normalized: Vec<String> = Vec::with_capacity(chosen.len());
    for code in chosen {
        let code = code.trim().to_lowercase();
        if normalized.contains(&code) {
            return Err(EngineError::SubjectSelection(format!(
                "subject {code} is selected more than once"
            )));
        }
        normalized.push(code);
    }
    let mandatory: Vec<String> =
        rules.mandatory.iter().map(|code| code.trim().to_lowercase()).collect();
    let optional: Vec<String> =
        rules.optional.iter().map(|code| code.trim().to_lowercase()).collect();

    if normalized.len() != rules.total_subjects {
        return Err(EngineError::SubjectSelection(format!(
            "expected {} subjects, got {}",
            rules.total_subjects,
            normalized.len()
        )));
    }

    for code in &mandatory {
        if !normalized.contains(code) {
            return Err(EngineError::SubjectSelection(format!(
                "mandatory subject {code} is missing"
            )));
        }
    }

    for code in &normalized {
        if !mandatory.contains(code) && !optional.contains(code) {
            return Err(EngineError::SubjectSelection(format!(
                "subject {code} is not offered by this exam"
            )));
        }
    }

    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: &str, section: Option<&str>) -> Question {
        Question {
            id: id.to_string(),
            text: format!("question {id}"),
            options: vec!["a".to_string(), "b".to_string()],
            correct_index: 0,
            section: section.map(|s| s.to_string()),
            explanation: None,
        }
    }

    fn rules() -> SubjectRules {
        SubjectRules {
            total_subjects: 3,
            mandatory: vec!["p".to_string(), "c".to_string()],
            optional: vec!["b".to_string(), "m".to_string()],
        }
    }

    #[test]
    fn filter_matches_case_insensitively() {
        let questions =
            vec![question("1", Some("physics")), question("2", Some("chemistry")), question("3", None)];

        let filtered = filter_by_sections(&questions, &["PHYSICS".to_string()]);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "1");
    }

    #[test]
    fn empty_code_list_keeps_everything() {
        let questions = vec![question("1", Some("physics")), question("2", None)];
        assert_eq!(filter_by_sections(&questions, &[]).len(), 2);
    }

    #[test]
    fn selection_accepts_mandatory_plus_one_optional() {
        let chosen = vec!["p".to_string(), "c".to_string(), "b".to_string()];
        let normalized = validate_selection(&rules(), &chosen).expect("valid");
        assert_eq!(normalized, chosen);
    }

    #[test]
    fn selection_rejects_wrong_count() {
        let err = validate_selection(&rules(), &["p".to_string(), "c".to_string()]).unwrap_err();
        assert!(matches!(err, EngineError::SubjectSelection(_)));
    }

    #[test]
    fn selection_rejects_missing_mandatory() {
        let chosen = vec!["p".to_string(), "b".to_string(), "m".to_string()];
        let err = validate_selection(&rules(), &chosen).unwrap_err();
        assert!(matches!(err, EngineError::SubjectSelection(_)));
    }

    #[test]
    fn selection_rejects_duplicate_codes() {
        // "c" twice passes the count check but covers only two subjects.
        let chosen = vec!["p".to_string(), "c".to_string(), "C".to_string()];
        let err = validate_selection(&rules(), &chosen).unwrap_err();
        assert!(matches!(err, EngineError::SubjectSelection(_)));
    }

    #[test]
    fn selection_rejects_unknown_subject() {
        let chosen = vec!["p".to_string(), "c".to_string(), "history".to_string()];
        let err = validate_selection(&rules(), &chosen).unwrap_err();
        assert!(matches!(err, EngineError::SubjectSelection(_)));
    }

    #[test]
    fn distinct_sections_preserves_first_appearance_order() {
        let questions = vec![
            question("1", Some("chemistry")),
            question("2", Some("physics")),
            question("3", Some("chemistry")),
            question("4", None),
        ];
        assert_eq!(distinct_sections(&questions), vec!["chemistry", "physics"]);
    }
}
