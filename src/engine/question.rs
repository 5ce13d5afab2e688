use serde::{Deserialize, Serialize};

use crate::engine::EngineError;

/// A normalized multiple-choice question, immutable for the lifetime of a
/// session. `correct_index` is zero-based, or `-1` when the source answer key
/// could not be parsed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct Question {
    pub(crate) id: String,
    pub(crate) text: String,
    pub(crate) options: Vec<String>,
    pub(crate) correct_index: i32,
    pub(crate) section: Option<String>,
    pub(crate) explanation: Option<String>,
}

/// One record as the question bank serves it. Source sheets are inconsistent:
/// some carry an `options` array, some spread choices over `option1..option5`,
/// and the answer key may be a 1-based number or a letter.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RawQuestion {
    #[serde(default)]
    pub(crate) id: Option<serde_json::Value>,
    #[serde(default, alias = "question_text")]
    pub(crate) question: Option<String>,
    #[serde(default)]
    pub(crate) options: Option<Vec<String>>,
    #[serde(default)]
    pub(crate) option1: Option<String>,
    #[serde(default)]
    pub(crate) option2: Option<String>,
    #[serde(default)]
    pub(crate) option3: Option<String>,
    #[serde(default)]
    pub(crate) option4: Option<String>,
    #[serde(default)]
    pub(crate) option5: Option<String>,
    #[serde(default, alias = "correct")]
    pub(crate) answer: Option<serde_json::Value>,
    #[serde(default, alias = "subject")]
    pub(crate) section: Option<String>,
    #[serde(default)]
    pub(crate) explanation: Option<String>,
}

/// Resolves an answer key to a zero-based option index. A 1-based integer
/// (numeric or string) maps to `value - 1`; a single letter maps to its
/// alphabet position; anything else yields `-1`.
pub(crate) fn resolve_answer_index(answer: Option<&serde_json::Value>) -> i32 {
    let Some(answer) = answer else {
        return -1;
    };

    if let Some(number) = answer.as_i64() {
        return if number >= 1 { (number - 1) as i32 } else { -1 };
    }

    let Some(text) = answer.as_str() else {
        return -1;
    };
    let text = text.trim();

    if let Ok(number) = text.parse::<i64>() {
        return if number >= 1 { (number - 1) as i32 } else { -1 };
    }

    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(letter), None) if letter.is_ascii_alphabetic() => {
            letter.to_ascii_uppercase() as i32 - 'A' as i32
        }
        _ => -1,
    }
}

/// Normalizes raw records into canonical questions, preserving input order.
/// A record with neither text nor options is rejected, and an empty input is
/// a load failure rather than a silently-empty exam.
pub(crate) fn normalize(raw: Vec<RawQuestion>) -> Result<Vec<Question>, EngineError> {
    if raw.is_empty() {
        return Err(EngineError::Normalization("question set is empty".to_string()));
    }

    let mut questions = Vec::with_capacity(raw.len());

    for (position, record) in raw.into_iter().enumerate() {
        let text = record.question.as_deref().unwrap_or("").trim().to_string();
        let options = collect_options(&record);

        if text.is_empty() && options.is_empty() {
            return Err(EngineError::Normalization(format!(
                "record {} has neither question text nor options",
                position + 1
            )));
        }
        if options.len() < 2 {
            return Err(EngineError::Normalization(format!(
                "record {} has fewer than two options",
                position + 1
            )));
        }

        let mut correct_index = resolve_answer_index(record.answer.as_ref());
        if correct_index >= options.len() as i32 {
            correct_index = -1;
        }

        let id = match record.id {
            Some(serde_json::Value::String(value)) if !value.trim().is_empty() => {
                value.trim().to_string()
            }
            Some(serde_json::Value::Number(value)) => value.to_string(),
            _ => format!("q{}", position + 1),
        };

        let section = record
            .section
            .as_deref()
            .map(|value| value.trim().to_lowercase())
            .filter(|value| !value.is_empty());

        let explanation =
            record.explanation.map(|value| value.trim().to_string()).filter(|v| !v.is_empty());

        questions.push(Question { id, text, options, correct_index, section, explanation });
    }

    Ok(questions)
}

fn collect_options(record: &RawQuestion) -> Vec<String> {
    if let Some(options) = &record.options {
        let cleaned: Vec<String> = options
            .iter()
            .map(|option| option.trim().to_string())
            .filter(|option| !option.is_empty())
            .collect();
        if !cleaned.is_empty() {
            return cleaned;
        }
    }

    [&record.option1, &record.option2, &record.option3, &record.option4, &record.option5]
        .into_iter()
        .filter_map(|option| option.as_deref())
        .map(|option| option.trim().to_string())
        .filter(|option| !option.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(question: &str, options: &[&str], answer: serde_json::Value) -> RawQuestion {
        RawQuestion {
            question: Some(question.to_string()),
            options: Some(options.iter().map(|o| o.to_string()).collect()),
            answer: Some(answer),
            ..RawQuestion::default()
        }
    }

    #[test]
    fn answer_key_numeric_string_is_one_based() {
        assert_eq!(resolve_answer_index(Some(&json!("3"))), 2);
    }

    #[test]
    fn answer_key_letter_maps_to_alphabet_position() {
        assert_eq!(resolve_answer_index(Some(&json!("C"))), 2);
        assert_eq!(resolve_answer_index(Some(&json!("a"))), 0);
    }

    #[test]
    fn answer_key_garbage_yields_minus_one() {
        assert_eq!(resolve_answer_index(Some(&json!("?"))), -1);
        assert_eq!(resolve_answer_index(Some(&json!("AB"))), -1);
        assert_eq!(resolve_answer_index(Some(&json!("0"))), -1);
        assert_eq!(resolve_answer_index(None), -1);
    }

    #[test]
    fn answer_key_json_number_is_one_based() {
        assert_eq!(resolve_answer_index(Some(&json!(2))), 1);
    }

    #[test]
    fn normalize_prefers_options_array() {
        let mut record = raw("What is 2+2?", &["3", "4", "5"], json!("2"));
        record.option1 = Some("ignored".to_string());

        let questions = normalize(vec![record]).expect("normalize");
        assert_eq!(questions[0].options, vec!["3", "4", "5"]);
        assert_eq!(questions[0].correct_index, 1);
    }

    #[test]
    fn normalize_assembles_discrete_option_fields() {
        let record = RawQuestion {
            question: Some("Pick one".to_string()),
            option1: Some("first".to_string()),
            option2: Some(" ".to_string()),
            option3: Some("third".to_string()),
            answer: Some(json!("B")),
            ..RawQuestion::default()
        };

        let questions = normalize(vec![record]).expect("normalize");
        assert_eq!(questions[0].options, vec!["first", "third"]);
        assert_eq!(questions[0].correct_index, 1);
    }

    #[test]
    fn normalize_out_of_range_answer_becomes_unparsable() {
        let questions =
            normalize(vec![raw("Pick", &["a", "b"], json!("5"))]).expect("normalize");
        assert_eq!(questions[0].correct_index, -1);
    }

    #[test]
    fn normalize_rejects_record_without_text_or_options() {
        let err = normalize(vec![RawQuestion::default()]).unwrap_err();
        assert!(matches!(err, EngineError::Normalization(_)));
    }

    #[test]
    fn normalize_rejects_empty_input() {
        assert!(matches!(normalize(vec![]), Err(EngineError::Normalization(_))));
    }

    #[test]
    fn normalize_lowercases_sections_and_keeps_order() {
        let mut first = raw("One", &["a", "b"], json!("1"));
        first.section = Some(" Physics ".to_string());
        let mut second = raw("Two", &["a", "b"], json!("1"));
        second.section = Some("".to_string());

        let questions = normalize(vec![first, second]).expect("normalize");
        assert_eq!(questions[0].section.as_deref(), Some("physics"));
        assert_eq!(questions[1].section, None);
        assert_eq!(questions[0].id, "q1");
        assert_eq!(questions[1].id, "q2");
    }
}
