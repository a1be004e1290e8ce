// In-flight export bookkeeping so running jobs can be cancelled as a group.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use super::backend::ExportSession;

/// Opaque key of one registered export job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

struct Entry {
    /// `None` while the job is still resolving its asset.
    session: Option<Arc<dyn ExportSession>>,
    cancel_requested: bool,
}

pub struct ExportSessionRegistry {
    entries: RwLock<HashMap<SessionId, Entry>>,
    next_id: AtomicU64,
}

impl ExportSessionRegistry {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Claim a slot for a job whose backend session does not exist yet.
    ///
    /// A `cancel_all` that arrives before `attach` is remembered and applied
    /// to the session as soon as it is attached.
    pub fn reserve(&self) -> SessionId {
        let id = SessionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries.write().insert(
            id,
            Entry {
                session: None,
                cancel_requested: false,
            },
        );
        id
    }

    /// Bind a backend session to a reserved slot. Returns `false` when the job
    /// was cancelled while pending, in which case the session is cancelled now.
    pub fn attach(&self, id: SessionId, session: Arc<dyn ExportSession>) -> bool {
        let cancel_requested = {
            let mut entries = self.entries.write();
            let entry = entries.entry(id).or_insert(Entry {
                session: None,
                cancel_requested: false,
            });
            entry.session = Some(session.clone());
            entry.cancel_requested
        };
        if cancel_requested {
            debug!("export {:?} was cancelled while pending, cancelling session", id);
            session.cancel();
        }
        !cancel_requested
    }

    pub fn register(&self, session: Arc<dyn ExportSession>) -> SessionId {
        let id = self.reserve();
        self.attach(id, session);
        id
    }

    /// Remove a job. Absent ids are ignored; returns whether anything was removed.
    pub fn unregister(&self, id: SessionId) -> bool {
        self.entries.write().remove(&id).is_some()
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.entries.read().contains_key(&id)
    }

    pub fn is_cancel_requested(&self, id: SessionId) -> bool {
        self.entries
            .read()
            .get(&id)
            .map_or(false, |e| e.cancel_requested)
    }

    /// Snapshot of the attached sessions.
    pub fn all_sessions(&self) -> Vec<Arc<dyn ExportSession>> {
        self.entries
            .read()
            .values()
            .filter_map(|e| e.session.clone())
            .collect()
    }

    /// Number of registered jobs, pending ones included.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Ask every job to stop without waiting for acknowledgement.
    /// Returns how many jobs were signalled.
    pub fn cancel_all(&self) -> usize {
        let (signalled, sessions) = {
            let mut entries = self.entries.write();
            let sessions: Vec<Arc<dyn ExportSession>> = entries
                .values_mut()
                .filter_map(|e| {
                    e.cancel_requested = true;
                    e.session.clone()
                })
                .collect();
            (entries.len(), sessions)
        };
        for session in &sessions {
            session.cancel();
        }
        debug!(
            "cancel requested for {} export jobs ({} running)",
            signalled,
            sessions.len()
        );
        signalled
    }
}

impl Default for ExportSessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
