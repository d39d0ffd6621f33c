mod common;
use crate::common::fakes::FakeProber;
use crate::common::init_tracing;
use crate::common::mirror::tree_listing;

use std::fs;
use std::path::PathBuf;
use std::process::Command;

use mountmirror::dispatch::{Dispatcher, SyncStatus};
use mountmirror::sync::{MirrorCommand, RsyncExecutor, SyncError, SyncExecutor};

fn rsync_available() -> bool {
    Command::new("rsync")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

#[tokio::test]
async fn rsync_mirrors_with_delete() {
    init_tracing();
    if !rsync_available() {
        eprintln!("rsync not installed; skipping");
        return;
    }

    let src = tempfile::tempdir().unwrap();
    let dst = tempfile::tempdir().unwrap();
    fs::write(src.path().join("a.txt"), "a").unwrap();
    fs::write(src.path().join("b.txt"), "b").unwrap();
    fs::write(dst.path().join("extra.txt"), "stale").unwrap();

    let dst_path = dst.path().to_path_buf();
    let mut dispatcher = Dispatcher::new(
        FakeProber::with_mounted([dst_path.clone()]),
        RsyncExecutor::default(),
    );

    let summary = dispatcher.dispatch_all(src.path(), &[dst_path.clone()]).await;
    assert_eq!(summary.outcomes[0].status, SyncStatus::Synced);
    assert_eq!(
        tree_listing(&dst_path).unwrap(),
        vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")]
    );

    fs::remove_file(src.path().join("a.txt")).unwrap();
    dispatcher.dispatch_all(src.path(), &[dst_path.clone()]).await;
    assert_eq!(tree_listing(&dst_path).unwrap(), vec![PathBuf::from("b.txt")]);
}

#[tokio::test]
async fn non_zero_exit_is_a_failure() {
    init_tracing();

    let dir = tempfile::tempdir().unwrap();
    let mut executor = RsyncExecutor::new(MirrorCommand::new("false", Vec::new()));

    let err = executor
        .sync(dir.path(), dir.path())
        .await
        .expect_err("`false` must fail");
    match err {
        SyncError::Exited { program, code } => {
            assert_eq!(program, "false");
            assert_eq!(code, Some(1));
        }
        other => panic!("expected Exited, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_program_is_a_spawn_failure() {
    init_tracing();

    let dir = tempfile::tempdir().unwrap();
    let mut executor =
        RsyncExecutor::new(MirrorCommand::new("mountmirror-no-such-tool", Vec::new()));

    let err = executor.sync(dir.path(), dir.path()).await.unwrap_err();
    assert!(matches!(err, SyncError::Spawn { .. }));
    assert!(err.to_string().contains("mountmirror-no-such-tool"));
}

/// `io::Write` sink shared with a scoped subscriber.
#[derive(Clone, Default)]
struct CapturedLogs(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl CapturedLogs {
    fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.0.lock().unwrap())
            .lines()
            .map(str::to_string)
            .collect()
    }
}

#[tokio::test]
async fn child_output_is_drained_and_logged_by_stream() {
    if Command::new("sh").arg("-c").arg("true").status().is_err() {
        eprintln!("sh not available; skipping");
        return;
    }

    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    // Far more than a pipe buffer on each stream, then one marker line each.
    let script = "head -c 300000 /dev/zero | tr '\\0' 'o'; echo; echo out-marker; \
                  head -c 300000 /dev/zero | tr '\\0' 'e' >&2; echo >&2; echo err-marker >&2";
    let dir = tempfile::tempdir().unwrap();
    let mut executor = RsyncExecutor::new(MirrorCommand::new(
        "sh",
        vec!["-c".to_string(), script.to_string(), "mirror".to_string()],
    ));

    executor.sync(dir.path(), dir.path()).await.unwrap();

    let lines = logs.lines();
    let out = lines.iter().find(|l| l.contains("mirror: out-marker")).unwrap();
    let err = lines.iter().find(|l| l.contains("mirror: err-marker")).unwrap();
    assert!(out.contains("DEBUG"), "{out}");
    assert!(err.contains("WARN"), "{err}");
}
