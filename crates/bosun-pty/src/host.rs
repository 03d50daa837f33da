//! The production process host: real shells over portable-pty.
//!
//! Each spawned session gets a dedicated OS reader thread, because PTY
//! reads are blocking. The reader is extracted from the handle before it
//! goes behind the table mutex, so blocking reads never hold a lock;
//! output and exit notifications are forwarded into the core's shared
//! event channel and demultiplexed there.

use std::collections::HashMap;
use std::io::Read;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use bosun_core::{
    HostError, HostEvent, HostEventSender, ProcessHost, SessionId, SpawnSpec, SpawnedSession,
};

use crate::pty::{PtyError, PtyHandle};

impl From<PtyError> for HostError {
    fn from(err: PtyError) -> Self {
        match err {
            PtyError::SpawnFailed(msg) => HostError::Spawn(msg),
            PtyError::IoError(e) => HostError::Io(e.to_string()),
            PtyError::ResizeFailed(msg) => HostError::Io(msg),
        }
    }
}

type SharedHandles = Arc<Mutex<HashMap<SessionId, PtyHandle>>>;

pub struct PtyHost {
    handles: SharedHandles,
    events: HostEventSender,
}

impl PtyHost {
    /// Create a host that reports output and exits on `events`.
    pub fn new(events: HostEventSender) -> Self {
        Self {
            handles: Arc::new(Mutex::new(HashMap::new())),
            events,
        }
    }

    fn start_reader(&self, id: SessionId, reader: Box<dyn Read + Send>) {
        let events = self.events.clone();
        let handles = Arc::clone(&self.handles);
        std::thread::Builder::new()
            .name(format!("pty-io-{id}"))
            .spawn(move || read_loop(id, reader, &events, &handles))
            .expect("failed to spawn I/O thread");
    }
}

impl ProcessHost for PtyHost {
    fn spawn(&self, id: SessionId, spec: &SpawnSpec) -> Result<SpawnedSession, HostError> {
        let mut handle = PtyHandle::spawn(
            spec.shell.as_deref(),
            spec.cwd.as_deref(),
            spec.rows,
            spec.cols,
        )?;
        let spawned = SpawnedSession {
            shell: handle.shell().to_string(),
            cwd: handle.cwd().to_path_buf(),
        };

        // The reader is owned by the I/O thread directly; the handle goes
        // into the table first so an immediate EOF can still find it.
        let reader = handle.take_reader();
        match self.handles.lock() {
            Ok(mut handles) => {
                handles.insert(id, handle);
            }
            Err(_) => return Err(HostError::Io("handle table lock poisoned".to_string())),
        }
        self.start_reader(id, reader);

        log::info!("spawned session {id} ({})", spawned.shell);
        Ok(spawned)
    }

    fn write(&self, id: SessionId, data: &[u8]) -> Result<(), HostError> {
        let mut handles = self
            .handles
            .lock()
            .map_err(|_| HostError::Io("handle table lock poisoned".to_string()))?;
        let handle = handles
            .get_mut(&id)
            .ok_or(HostError::SessionNotFound(id))?;
        handle.write(data).map_err(HostError::from)
    }

    fn resize(&self, id: SessionId, rows: u16, cols: u16) -> Result<(), HostError> {
        let handles = self
            .handles
            .lock()
            .map_err(|_| HostError::Io("handle table lock poisoned".to_string()))?;
        let handle = handles.get(&id).ok_or(HostError::SessionNotFound(id))?;
        handle.resize(rows, cols).map_err(HostError::from)
    }

    fn kill(&self, id: SessionId) -> Result<(), HostError> {
        // Removing the handle drops the PTY master once the kill lands;
        // the reader thread then sees EOF and emits the exit event.
        if let Ok(mut handles) = self.handles.lock() {
            if let Some(mut handle) = handles.remove(&id) {
                if let Err(e) = handle.kill() {
                    log::debug!("kill for session {id}: {e}");
                }
            }
        }
        Ok(())
    }
}

fn read_loop(
    id: SessionId,
    mut reader: Box<dyn Read + Send>,
    events: &HostEventSender,
    handles: &SharedHandles,
) {
    let mut buf = [0u8; 4096];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => break, // EOF — the process side closed
            Ok(n) => {
                let event = HostEvent::Output {
                    id,
                    data: buf[..n].to_vec(),
                };
                if events.send(event).is_err() {
                    return; // Core side gone; nothing left to deliver to.
                }
            }
            Err(e) => {
                log::debug!("read error for session {id}: {e}");
                break;
            }
        }
    }

    let code = wait_for_exit_code(id, handles);
    let _ = events.send(HostEvent::Exit { id, code });
}

/// After EOF, poll briefly for the child's exit status. Returns `None`
/// when the status never materializes or the session was already killed
/// and removed.
fn wait_for_exit_code(id: SessionId, handles: &SharedHandles) -> Option<u32> {
    let deadline = Instant::now() + Duration::from_secs(2);
    loop {
        let code = match handles.lock() {
            Ok(mut map) => match map.get_mut(&id) {
                Some(handle) => handle.try_wait(),
                None => return None,
            },
            Err(_) => return None,
        };
        if code.is_some() || Instant::now() > deadline {
            return code;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
}
