//! End-to-end: real shells through the workspace, bridge, and event pump.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use bosun_core::pump::start_event_pump;
use bosun_core::{CreateParams, SessionStatus, Workspace};
use bosun_pty::PtyHost;

fn sh_params(name: &str) -> CreateParams {
    CreateParams {
        name: name.to_string(),
        shell: Some("/bin/sh".to_string()),
        cwd: Some(PathBuf::from("/tmp")),
        ..CreateParams::default()
    }
}

/// Collect from the output sink until `marker` shows up or the deadline
/// passes. Returns everything received.
async fn collect_until(
    output: &mut bosun_core::OutputReceiver,
    marker: &str,
    deadline: Duration,
) -> Vec<u8> {
    let mut collected = Vec::new();
    let end = Instant::now() + deadline;
    while Instant::now() < end {
        match tokio::time::timeout(Duration::from_millis(250), output.recv()).await {
            Ok(Some(chunk)) => {
                collected.extend_from_slice(&chunk);
                if String::from_utf8_lossy(&collected).contains(marker) {
                    break;
                }
            }
            Ok(None) => break,
            Err(_) => {}
        }
    }
    collected
}

#[tokio::test(flavor = "multi_thread")]
async fn test_shell_output_reaches_session_sink() {
    let (tx, rx) = mpsc::unbounded_channel();
    let host = Arc::new(PtyHost::new(tx));
    let mut ws = Workspace::new(host);

    let id = ws.create_session(sh_params("sh")).unwrap();
    let mut output = ws.subscribe_output(id).unwrap();

    let workspace = Arc::new(Mutex::new(ws));
    let _pump = start_event_pump(Arc::clone(&workspace), rx);

    workspace
        .lock()
        .unwrap()
        .write(id, b"echo BOSUN_ROUNDTRIP_OK\n");

    let collected = collect_until(&mut output, "BOSUN_ROUNDTRIP_OK", Duration::from_secs(5)).await;
    let text = String::from_utf8_lossy(&collected);
    assert!(
        text.contains("BOSUN_ROUNDTRIP_OK"),
        "Expected shell output to reach the sink, got: {text}"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_shell_exit_stops_session_and_appends_notice() {
    let (tx, rx) = mpsc::unbounded_channel();
    let host = Arc::new(PtyHost::new(tx));
    let mut ws = Workspace::new(host);

    let id = ws.create_session(sh_params("sh")).unwrap();
    let mut output = ws.subscribe_output(id).unwrap();

    let workspace = Arc::new(Mutex::new(ws));
    let _pump = start_event_pump(Arc::clone(&workspace), rx);

    workspace.lock().unwrap().write(id, b"exit 0\n");

    // Wait for the exit event to mark the session stopped.
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        let status = workspace
            .lock()
            .unwrap()
            .get_session(id)
            .map(|s| s.status.clone());
        if status == Some(SessionStatus::Stopped) {
            break;
        }
        assert!(
            Instant::now() < deadline,
            "session never reached Stopped, status: {status:?}"
        );
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    // The synthetic notice trails all prior output for the session.
    let collected = collect_until(&mut output, "[process exited", Duration::from_secs(5)).await;
    let text = String::from_utf8_lossy(&collected);
    assert!(
        text.contains("[process exited"),
        "Expected trailing exit notice, got: {text}"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_session_through_real_host() {
    let (tx, rx) = mpsc::unbounded_channel();
    let host = Arc::new(PtyHost::new(tx));
    let mut ws = Workspace::new(host);

    let keep = ws.create_session(sh_params("keep")).unwrap();
    let kill = ws.create_session(sh_params("kill")).unwrap();

    let workspace = Arc::new(Mutex::new(ws));
    let _pump = start_event_pump(Arc::clone(&workspace), rx);

    {
        let mut ws = workspace.lock().unwrap();
        ws.delete_session(kill).unwrap();
        assert!(ws.get_session(kill).is_none());
        assert_eq!(ws.active_session_id(), Some(keep));
    }

    // The surviving session still answers.
    let mut output = workspace.lock().unwrap().subscribe_output(keep).unwrap();
    workspace.lock().unwrap().write(keep, b"echo STILL_ALIVE\n");
    let collected = collect_until(&mut output, "STILL_ALIVE", Duration::from_secs(5)).await;
    assert!(String::from_utf8_lossy(&collected).contains("STILL_ALIVE"));
}
