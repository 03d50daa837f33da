//! In-memory collaborator fakes shared by the unit tests.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::{HostError, StoreError};
use crate::host::{ProcessHost, SpawnSpec, SpawnedSession};
use crate::session::SessionId;
use crate::snapshot::{LayoutSnapshot, LayoutStore};

/// Records every host call and can be told to fail specific ones.
#[derive(Default)]
pub struct FakeHost {
    pub spawns: Mutex<Vec<(SessionId, SpawnSpec)>>,
    pub writes: Mutex<Vec<(SessionId, Vec<u8>)>>,
    pub resizes: Mutex<Vec<(SessionId, u16, u16)>>,
    pub kills: Mutex<Vec<SessionId>>,
    spawn_calls: AtomicUsize,
    fail_spawn_at: Mutex<HashSet<usize>>,
    fail_kill_for: Mutex<HashSet<SessionId>>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the nth spawn call (0-based), regardless of session id.
    pub fn fail_spawn_call(&self, index: usize) {
        self.fail_spawn_at.lock().unwrap().insert(index);
    }

    pub fn fail_kill_for(&self, id: SessionId) {
        self.fail_kill_for.lock().unwrap().insert(id);
    }

    pub fn written_to(&self, id: SessionId) -> Vec<u8> {
        self.writes
            .lock()
            .unwrap()
            .iter()
            .filter(|(other, _)| *other == id)
            .flat_map(|(_, data)| data.iter().copied())
            .collect()
    }
}

impl ProcessHost for FakeHost {
    fn spawn(&self, id: SessionId, spec: &SpawnSpec) -> Result<SpawnedSession, HostError> {
        let call = self.spawn_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_spawn_at.lock().unwrap().contains(&call) {
            return Err(HostError::Spawn("simulated spawn failure".to_string()));
        }
        self.spawns.lock().unwrap().push((id, spec.clone()));
        Ok(SpawnedSession {
            shell: spec
                .shell
                .clone()
                .unwrap_or_else(|| "/bin/sh".to_string()),
            cwd: spec.cwd.clone().unwrap_or_else(|| PathBuf::from("/tmp")),
        })
    }

    fn write(&self, id: SessionId, data: &[u8]) -> Result<(), HostError> {
        self.writes.lock().unwrap().push((id, data.to_vec()));
        Ok(())
    }

    fn resize(&self, id: SessionId, rows: u16, cols: u16) -> Result<(), HostError> {
        self.resizes.lock().unwrap().push((id, rows, cols));
        Ok(())
    }

    fn kill(&self, id: SessionId) -> Result<(), HostError> {
        if self.fail_kill_for.lock().unwrap().contains(&id) {
            return Err(HostError::Io("simulated kill failure".to_string()));
        }
        self.kills.lock().unwrap().push(id);
        Ok(())
    }
}

/// Cloneable in-memory layout store; clones share the same snapshot slot.
#[derive(Clone, Default)]
pub struct MemoryStore {
    snapshot: Arc<Mutex<Option<LayoutSnapshot>>>,
    fail_saves: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: LayoutSnapshot) -> Self {
        let store = Self::default();
        *store.snapshot.lock().unwrap() = Some(snapshot);
        store
    }

    pub fn saved(&self) -> Option<LayoutSnapshot> {
        self.snapshot.lock().unwrap().clone()
    }

    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

impl LayoutStore for MemoryStore {
    fn save(&self, snapshot: &LayoutSnapshot) -> Result<(), StoreError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("simulated save failure".to_string()));
        }
        *self.snapshot.lock().unwrap() = Some(snapshot.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<LayoutSnapshot>, StoreError> {
        Ok(self.snapshot.lock().unwrap().clone())
    }
}
