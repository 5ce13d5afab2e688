use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

use crate::core::config::Settings;
use crate::engine::question::{self, Question, RawQuestion};
use crate::engine::EngineError;

#[derive(Debug, Error)]
pub(crate) enum QuestionBankError {
    #[error("question bank request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("question bank returned status {0}")]
    Status(StatusCode),
    #[error("question bank payload not recognized")]
    Payload,
    #[error(transparent)]
    Invalid(#[from] EngineError),
}

/// Client for the upstream question-bank service. Question sets are
/// addressed by the `file_id` stored on the exam row.
#[derive(Clone)]
pub(crate) struct QuestionBankClient {
    http: reqwest::Client,
    base_url: String,
}

impl QuestionBankClient {
    pub(crate) fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.question_bank().timeout_seconds))
            .build()?;
        let base_url =
            settings.question_bank().base_url.trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    /// Fetches and normalizes a question set. Any failure (transport, bad
    /// status, unrecognized payload, empty set) blocks the exam from
    /// starting.
    pub(crate) async fn fetch_questions(
        &self,
        file_id: &str,
    ) -> Result<Vec<Question>, QuestionBankError> {
        let url = format!("{}/questions", self.base_url);
        let response =
            self.http.get(&url).query(&[("file_id", file_id)]).send().await?;

        if !response.status().is_success() {
            return Err(QuestionBankError::Status(response.status()));
        }

        let payload: serde_json::Value = response.json().await?;
        let raw = extract_questions(payload)?;
        Ok(question::normalize(raw)?)
    }
}

/// Accepts the payload shapes the bank has served over time: a bare array,
/// `{questions: [...]}` or `{data: {questions: [...]}}`.
fn extract_questions(payload: serde_json::Value) -> Result<Vec<RawQuestion>, QuestionBankError> {
    let list = if payload.is_array() {
        payload
    } else if let Some(questions) = payload.get("questions") {
        questions.clone()
    } else if let Some(questions) = payload.pointer("/data/questions") {
        questions.clone()
    } else {
        return Err(QuestionBankError::Payload);
    };

    serde_json::from_value::<Vec<RawQuestion>>(list).map_err(|_| QuestionBankError::Payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> serde_json::Value {
        json!({"question": "Pick", "options": ["a", "b"], "answer": "1"})
    }

    #[test]
    fn extract_accepts_bare_array() {
        let raw = extract_questions(json!([record()])).expect("extract");
        assert_eq!(raw.len(), 1);
    }

    #[test]
    fn extract_accepts_questions_envelope() {
        let raw = extract_questions(json!({"success": true, "questions": [record()]}))
            .expect("extract");
        assert_eq!(raw.len(), 1);
    }

    #[test]
    fn extract_accepts_nested_data_envelope() {
        let raw = extract_questions(
            json!({"success": true, "data": {"questions": [record(), record()]}}),
        )
        .expect("extract");
        assert_eq!(raw.len(), 2);
    }

    #[test]
    fn extract_rejects_unknown_shape() {
        assert!(matches!(
            extract_questions(json!({"success": true, "rows": []})),
            Err(QuestionBankError::Payload)
        ));
    }
}
