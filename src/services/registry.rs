use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::engine::session::ExamSession;

pub(crate) type SessionHandle = Arc<Mutex<ExamSession>>;

/// In-process registry of live attempts, shared between the HTTP handlers
/// and the sweeper task. Each session sits behind its own mutex so ticks and
/// student input serialize per attempt.
#[derive(Clone)]
pub(crate) struct SessionRegistry {
    inner: Arc<RwLock<HashMap<String, SessionHandle>>>,
}

impl SessionRegistry {
    pub(crate) fn new() -> Self {
        Self { inner: Arc::new(RwLock::new(HashMap::new())) }
    }

    pub(crate) async fn insert(&self, session: ExamSession) -> SessionHandle {
        let id = session.id.clone();
        let handle = Arc::new(Mutex::new(session));
        self.inner.write().await.insert(id, handle.clone());
        handle
    }

    pub(crate) async fn get(&self, session_id: &str) -> Option<SessionHandle> {
        self.inner.read().await.get(session_id).cloned()
    }

    /// Finds the student's live session for an exam, so a second start
    /// request resumes instead of forking a parallel attempt.
    pub(crate) async fn find_for_attempt(
        &self,
        student_id: &str,
        exam_id: &str,
    ) -> Option<SessionHandle> {
        let guard = self.inner.read().await;
        for handle in guard.values() {
            let session = handle.lock().await;
            if session.student_id == student_id && session.exam_id == exam_id {
                drop(session);
                return Some(handle.clone());
            }
        }
        None
    }

    pub(crate) async fn remove(&self, session_id: &str) {
        self.inner.write().await.remove(session_id);
    }

    pub(crate) async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Handles to every live session, for the sweeper's tick pass.
    pub(crate) async fn handles(&self) -> Vec<SessionHandle> {
        self.inner.read().await.values().cloned().collect()
    }
}
