use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::Json;

use crate::api::errors::ApiError;
use crate::api::guards::{require_batch_access, CurrentStudent};
use crate::core::state::AppState;
use crate::engine::projection;
use crate::repositories;
use crate::schemas::leaderboard::{BatchLeaderboardEntry, BatchLeaderboardResponse};

/// Per-student totals across every exam in the batch, each attempt projected
/// with its own exam's rates.
pub(in crate::api::batches) async fn batch_leaderboard(
    CurrentStudent(student): CurrentStudent,
    Path(batch_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<BatchLeaderboardResponse>, ApiError> {
    let batch = require_batch_access(&state, &student, &batch_id).await?;

    let exams = repositories::exams::list_for_batch(state.db(), &batch_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list batch exams"))?;
    let rates: HashMap<String, (f64, f64)> = exams
        .into_iter()
        .map(|exam| (exam.id, (exam.marks_per_question, exam.negative_marks_per_wrong)))
        .collect();

    let standings = repositories::attempts::list_standings_for_batch(state.db(), &batch_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch batch standings"))?;

    let mut totals: HashMap<String, (String, f64, usize)> = HashMap::new();
    for row in standings {
        let Some((marks, negative)) = rates.get(&row.exam_id) else {
            continue;
        };
        let score =
            projection::project_score(row.correct_count, row.wrong_count, *marks, *negative);
        let entry = totals
            .entry(row.student_id.clone())
            .or_insert_with(|| (row.full_name.clone(), 0.0, 0));
        entry.1 += score;
        entry.2 += 1;
    }

    let mut aggregated: Vec<(String, String, f64, usize)> = totals
        .into_iter()
        .map(|(student_id, (name, total, count))| (student_id, name, total, count))
        .collect();
    aggregated.sort_by(|a, b| b.2.total_cmp(&a.2).then_with(|| a.0.cmp(&b.0)));

    let entries = aggregated
        .into_iter()
        .enumerate()
        .map(|(index, (student_id, student_name, total_score, exams_counted))| {
            BatchLeaderboardEntry {
                rank: index + 1,
                student_id,
                student_name,
                total_score,
                exams_counted,
            }
        })
        .collect();

    Ok(Json(BatchLeaderboardResponse { batch_id, batch_name: batch.name, entries }))
}
