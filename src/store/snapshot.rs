use std::{
    path::{Path, PathBuf},
    sync::{Arc, Condvar, Mutex, mpsc},
    thread,
    time::Duration,
};

use anyhow::Context;

use crate::{
    foundation::error::{RelensError, RelensResult},
    store::model::AppSnapshot,
};

/// Read the durable snapshot at `path`.
///
/// An absent or undecodable file yields empty collections: both cases are
/// treated as a first run, never surfaced as an error.
#[tracing::instrument]
pub fn load_snapshot(path: &Path) -> AppSnapshot {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(_) => return AppSnapshot::default(),
    };
    match serde_json::from_slice(&bytes) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "snapshot undecodable, starting empty");
            AppSnapshot::default()
        }
    }
}

/// Serialize and durably replace the snapshot file.
///
/// Writes to a sibling temp file first and renames over the target, so a
/// partial write is never visible.
pub fn write_snapshot(path: &Path, snapshot: &AppSnapshot) -> RelensResult<()> {
    let bytes = serde_json::to_vec_pretty(snapshot)
        .map_err(|e| RelensError::serde(format!("encode snapshot: {e}")))?;

    let tmp = path.with_extension("tmp");
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create snapshot directory '{}'", parent.display()))?;
    }
    std::fs::write(&tmp, &bytes)
        .with_context(|| format!("write snapshot '{}'", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("commit snapshot '{}'", path.display()))?;
    Ok(())
}

#[derive(Default)]
struct WriterState {
    submitted: u64,
    completed: u64,
    last_error: Option<String>,
}

struct Shared {
    state: Mutex<WriterState>,
    cond: Condvar,
}

/// Background persistence for the store's snapshot.
///
/// A single writer thread drains a channel, coalescing queued snapshots to
/// the most recent one so writes are strictly ordered and last-mutation-wins.
/// Mutating calls return before the write lands; [`SnapshotWriter::flush`]
/// waits for durability with a timeout.
pub struct SnapshotWriter {
    tx: Option<mpsc::Sender<(u64, AppSnapshot)>>,
    handle: Option<thread::JoinHandle<()>>,
    shared: Arc<Shared>,
    next_generation: u64,
}

impl SnapshotWriter {
    /// Spawn the writer thread targeting `path`.
    pub fn spawn(path: PathBuf) -> Self {
        let (tx, rx) = mpsc::channel::<(u64, AppSnapshot)>();
        let shared = Arc::new(Shared {
            state: Mutex::new(WriterState::default()),
            cond: Condvar::new(),
        });

        let worker_shared = Arc::clone(&shared);
        let handle = thread::spawn(move || {
            while let Ok(mut next) = rx.recv() {
                // Coalesce: only the latest queued snapshot needs to land.
                while let Ok(newer) = rx.try_recv() {
                    next = newer;
                }
                let (generation, snapshot) = next;
                let result = write_snapshot(&path, &snapshot);

                let mut state = worker_shared
                    .state
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
                state.completed = generation;
                if let Err(e) = &result {
                    tracing::error!(error = %e, "snapshot write failed");
                    state.last_error = Some(e.to_string());
                } else {
                    state.last_error = None;
                }
                worker_shared.cond.notify_all();
            }
        });

        Self {
            tx: Some(tx),
            handle: Some(handle),
            shared,
            next_generation: 0,
        }
    }

    /// Queue a snapshot for asynchronous persistence.
    pub fn submit(&mut self, snapshot: AppSnapshot) {
        self.next_generation += 1;
        if let Ok(mut state) = self.shared.state.lock() {
            state.submitted = self.next_generation;
        }
        if let Some(tx) = &self.tx {
            // A disconnected channel only happens during teardown.
            let _ = tx.send((self.next_generation, snapshot));
        }
    }

    /// Block until everything submitted so far is durable.
    ///
    /// Returns [`RelensError::Timeout`] when the budget elapses first; the
    /// writer keeps running and in-memory state is unaffected either way.
    pub fn flush(&self, timeout: Duration) -> RelensResult<()> {
        let deadline = std::time::Instant::now() + timeout;
        let mut state = self
            .shared
            .state
            .lock()
            .map_err(|_| RelensError::io("snapshot writer state poisoned"))?;

        while state.completed < state.submitted {
            let remaining = deadline.saturating_duration_since(std::time::Instant::now());
            if remaining.is_zero() {
                return Err(RelensError::timeout("snapshot flush exceeded time budget"));
            }
            let (next, wait) = self
                .shared
                .cond
                .wait_timeout(state, remaining)
                .map_err(|_| RelensError::io("snapshot writer state poisoned"))?;
            state = next;
            if wait.timed_out() && state.completed < state.submitted {
                return Err(RelensError::timeout("snapshot flush exceeded time budget"));
            }
        }

        match &state.last_error {
            Some(e) => Err(RelensError::io(format!("snapshot write failed: {e}"))),
            None => Ok(()),
        }
    }
}

impl Drop for SnapshotWriter {
    fn drop(&mut self) {
        drop(self.tx.take());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/store/snapshot.rs"]
mod tests;
