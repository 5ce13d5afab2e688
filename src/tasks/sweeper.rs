use std::time::Duration as StdDuration;

use tokio::sync::watch;
use tokio::time::{interval, Duration};

use crate::core::state::AppState;
use crate::engine::countdown::CountdownEvent;
use crate::engine::session::SessionPhase;
use crate::services::attempts;

/// Ticks every live session once per second: records countdown warnings,
/// auto-submits expired attempts and evicts idle untimed sessions. Shares
/// the in-process registry with the HTTP handlers.
pub(crate) async fn run(state: AppState, mut shutdown: watch::Receiver<bool>) {
    let mut tick = interval(Duration::from_secs(1));
    let idle_ttl = StdDuration::from_secs(
        state.settings().exam().untimed_session_ttl_minutes * 60,
    );

    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            _ = tick.tick() => {
                sweep_once(&state, idle_ttl).await;
            }
        }
    }

    tracing::info!("Session sweeper stopped");
}

async fn sweep_once(state: &AppState, idle_ttl: StdDuration) {
    for handle in state.sessions().handles().await {
        let mut session = handle.lock().await;

        if !session.is_timed() {
            // Abandoned practice sessions are dropped, never auto-submitted.
            if session.idle_for() >= idle_ttl {
                let session_id = session.id.clone();
                tracing::info!(session_id = %session_id, "Evicting idle untimed session");
                drop(session);
                state.sessions().remove(&session_id).await;
            }
            continue;
        }

        for event in session.tick() {
            match event {
                CountdownEvent::TimeWarning => {
                    tracing::info!(session_id = %session.id, "Session entered low-time window");
                }
                CountdownEvent::CriticalWarning => {
                    tracing::info!(session_id = %session.id, "Session under one minute remaining");
                }
                CountdownEvent::Expired => {}
            }
        }

        // Covers both a fresh expiry and a retry after a failed auto-submit.
        if !(session.is_expired() && session.phase() == SessionPhase::Running) {
            continue;
        }

        let session_id = session.id.clone();
        match attempts::finalize(state, &mut session).await {
            Ok(outcome) => {
                metrics::counter!("exam_auto_submits_total").increment(1);
                tracing::info!(
                    session_id = %session_id,
                    duplicate = outcome.is_duplicate(),
                    score = outcome.attempt().score,
                    "Auto-submitted expired session"
                );
                drop(session);
                state.sessions().remove(&session_id).await;
            }
            Err(err) => {
                // finalize released the claim; the next pass retries.
                tracing::error!(
                    session_id = %session_id,
                    error = %err,
                    "Failed to auto-submit expired session"
                );
            }
        }
    }
}
