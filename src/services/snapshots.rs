use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::redis::RedisHandle;

/// Advisory copy of the ledger written at submit time. Feeds the review
/// screen; losing it degrades review to score-only, never to an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct LedgerSnapshot {
    pub(crate) answers: BTreeMap<String, usize>,
    #[serde(default)]
    pub(crate) sections: Vec<String>,
}

pub(crate) fn snapshot_key(student_id: &str, exam_id: &str, is_custom: bool) -> String {
    if is_custom {
        format!("exam_answers:{student_id}_{exam_id}_custom")
    } else {
        format!("exam_answers:{student_id}_{exam_id}")
    }
}

/// Best-effort write; a Redis failure is logged and swallowed.
pub(crate) async fn write_snapshot(
    redis: &RedisHandle,
    ttl_seconds: u64,
    student_id: &str,
    exam_id: &str,
    is_custom: bool,
    snapshot: &LedgerSnapshot,
) {
    let key = snapshot_key(student_id, exam_id, is_custom);
    let payload = match serde_json::to_string(snapshot) {
        Ok(payload) => payload,
        Err(err) => {
            tracing::warn!(error = %err, key = %key, "Failed to serialize ledger snapshot");
            return;
        }
    };

    if let Err(err) = redis.set_ex(&key, &payload, ttl_seconds).await {
        tracing::warn!(error = %err, key = %key, "Failed to write ledger snapshot");
    }
}

pub(crate) async fn read_snapshot(
    redis: &RedisHandle,
    student_id: &str,
    exam_id: &str,
    is_custom: bool,
) -> Option<LedgerSnapshot> {
    let key = snapshot_key(student_id, exam_id, is_custom);
    let payload = match redis.get(&key).await {
        Ok(payload) => payload?,
        Err(err) => {
            tracing::warn!(error = %err, key = %key, "Failed to read ledger snapshot");
            return None;
        }
    };

    match serde_json::from_str(&payload) {
        Ok(snapshot) => Some(snapshot),
        Err(err) => {
            tracing::warn!(error = %err, key = %key, "Discarding malformed ledger snapshot");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_carries_custom_suffix() {
        assert_eq!(snapshot_key("u1", "e1", false), "exam_answers:u1_e1");
        assert_eq!(snapshot_key("u1", "e1", true), "exam_answers:u1_e1_custom");
    }

    #[test]
    fn snapshot_serde_roundtrip() {
        let mut answers = BTreeMap::new();
        answers.insert("q1".to_string(), 2usize);
        let snapshot =
            LedgerSnapshot { answers, sections: vec!["physics".to_string()] };

        let payload = serde_json::to_string(&snapshot).expect("serialize");
        let parsed: LedgerSnapshot = serde_json::from_str(&payload).expect("parse");
        assert_eq!(parsed.answers.get("q1"), Some(&2));
        assert_eq!(parsed.sections, vec!["physics"]);
    }

    #[test]
    fn snapshot_without_sections_still_parses() {
        let parsed: LedgerSnapshot =
            serde_json::from_str(r#"{"answers":{"q1":0}}"#).expect("parse");
        assert!(parsed.sections.is_empty());
    }
}
