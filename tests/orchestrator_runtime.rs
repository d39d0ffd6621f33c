mod common;
use crate::common::fakes::{channel_source, FakeExecutor, FakeProber, Journal, ScriptedChangeSource, Step};
use crate::common::mirror::{tree_listing, DirMirrorExecutor};
use crate::common::{batch_of, init_tracing, with_timeout};

use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::oneshot;

use mountmirror::dispatch::Dispatcher;
use mountmirror::engine::{Orchestrator, RunExit};
use mountmirror::errors::MirrorError;
use mountmirror::monitor::{ChangeKind, ChangeMonitor, ReadError};

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn initial_dispatch_happens_before_first_read() -> TestResult {
    init_tracing();

    let journal = Journal::new();
    let prober = FakeProber::with_mounted(["/mnt/d"]).with_journal(journal.clone());
    let executor = FakeExecutor::new().with_journal(journal.clone());
    let source = ScriptedChangeSource::empty().with_journal(journal.clone());

    let mut orchestrator = Orchestrator::new(
        "/src",
        vec![PathBuf::from("/mnt/d")],
        ChangeMonitor::new(source),
        Dispatcher::new(prober, executor),
    )?;

    let exit = with_timeout(orchestrator.run(std::future::pending())).await;

    assert_eq!(exit, RunExit::ReadFailed(ReadError::Closed));
    assert_eq!(
        journal.steps(),
        vec![
            Step::Probe(PathBuf::from("/mnt/d")),
            Step::Sync(PathBuf::from("/mnt/d")),
            Step::Read,
        ]
    );
    Ok(())
}

#[tokio::test]
async fn each_qualifying_batch_triggers_exactly_one_dispatch() -> TestResult {
    init_tracing();

    let executor = FakeExecutor::new();
    let source = ScriptedChangeSource::from_batches([
        batch_of(&[ChangeKind::Create; 200]),
        batch_of(&[ChangeKind::Other]),
        batch_of(&[ChangeKind::Delete, ChangeKind::Modify]),
    ]);

    let mut orchestrator = Orchestrator::new(
        "/src",
        vec![PathBuf::from("/mnt/a"), PathBuf::from("/mnt/b")],
        ChangeMonitor::new(source),
        Dispatcher::new(FakeProber::with_mounted(["/mnt/a"]), executor.clone()),
    )?;

    with_timeout(orchestrator.run(std::future::pending())).await;

    // initial + two qualifying batches
    assert_eq!(orchestrator.dispatch_count(), 3);
    assert_eq!(executor.calls().len(), 3);
    assert!(executor.synced_destinations().iter().all(|d| d == &PathBuf::from("/mnt/a")));
    Ok(())
}

#[tokio::test]
async fn no_read_happens_while_a_dispatch_is_running() -> TestResult {
    init_tracing();

    let journal = Journal::new();
    let executor = FakeExecutor::new()
        .with_latency(Duration::from_millis(20))
        .with_journal(journal.clone());
    let source = ScriptedChangeSource::from_batches([
        batch_of(&[ChangeKind::Create]),
        batch_of(&[ChangeKind::Modify]),
    ])
    .with_journal(journal.clone());

    let mut orchestrator = Orchestrator::new(
        "/src",
        vec![PathBuf::from("/mnt/a"), PathBuf::from("/mnt/b")],
        ChangeMonitor::new(source),
        Dispatcher::new(FakeProber::with_mounted(["/mnt/a", "/mnt/b"]), executor),
    )?;

    with_timeout(orchestrator.run(std::future::pending())).await;

    let a = || Step::Sync(PathBuf::from("/mnt/a"));
    let b = || Step::Sync(PathBuf::from("/mnt/b"));
    assert_eq!(
        journal.steps(),
        vec![a(), b(), Step::Read, a(), b(), Step::Read, a(), b(), Step::Read]
    );
    Ok(())
}

#[tokio::test]
async fn sync_failure_does_not_stop_the_loop() -> TestResult {
    init_tracing();

    let executor = FakeExecutor::new();
    executor.fail_for("/mnt/d1");
    let source = ScriptedChangeSource::from_batches([batch_of(&[ChangeKind::Create])]);

    let mut orchestrator = Orchestrator::new(
        "/src",
        vec![PathBuf::from("/mnt/d1"), PathBuf::from("/mnt/d2")],
        ChangeMonitor::new(source),
        Dispatcher::new(FakeProber::with_mounted(["/mnt/d1", "/mnt/d2"]), executor.clone()),
    )?;

    let exit = with_timeout(orchestrator.run(std::future::pending())).await;

    assert_eq!(exit, RunExit::ReadFailed(ReadError::Closed));
    assert_eq!(executor.calls().len(), 4);
    Ok(())
}

#[tokio::test]
async fn shutdown_while_waiting_ends_the_run() -> TestResult {
    init_tracing();

    let (batch_tx, source) = channel_source();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let executor = FakeExecutor::new();

    let mut orchestrator = Orchestrator::new(
        "/src",
        vec![PathBuf::from("/mnt/d")],
        ChangeMonitor::new(source),
        Dispatcher::new(FakeProber::with_mounted(["/mnt/d"]), executor.clone()),
    )?;

    batch_tx.send(Ok(batch_of(&[ChangeKind::Modify])))?;

    let shutdown = async move {
        let _ = stop_rx.await;
    };
    let run = orchestrator.run(shutdown);
    tokio::pin!(run);

    // Let the loop reach the idle wait after the follow-up dispatch.
    tokio::select! {
        _ = &mut run => panic!("run ended before shutdown"),
        _ = tokio::time::sleep(Duration::from_millis(100)) => {}
    }
    stop_tx.send(()).map_err(|_| "run dropped the shutdown receiver")?;

    let exit = with_timeout(run).await;
    assert_eq!(exit, RunExit::Shutdown);
    assert_eq!(executor.calls().len(), 2);
    drop(batch_tx);
    Ok(())
}

#[test]
fn read_failure_exit_code_follows_config() {
    let exit = RunExit::ReadFailed(ReadError::Watch("gone".to_string()));
    assert_eq!(exit.exit_code(true), 1);
    assert_eq!(exit.exit_code(false), 0);
    assert_eq!(RunExit::Shutdown.exit_code(true), 0);
}

#[test]
fn orchestrator_requires_a_destination() {
    let result = Orchestrator::new(
        "/src",
        Vec::new(),
        ChangeMonitor::new(ScriptedChangeSource::empty()),
        Dispatcher::new(FakeProber::new(), FakeExecutor::new()),
    );
    assert!(matches!(result, Err(MirrorError::NoDestinations)));
}

#[tokio::test]
async fn deleted_source_file_disappears_from_mounted_mirror() -> TestResult {
    init_tracing();

    let src = tempfile::tempdir()?;
    let dst = tempfile::tempdir()?;
    fs::write(src.path().join("a.txt"), "alpha")?;
    fs::write(src.path().join("b.txt"), "beta")?;

    let dst_path = dst.path().to_path_buf();
    let prober = FakeProber::with_mounted([dst_path.clone()]);
    let (batch_tx, source) = channel_source();

    let mut orchestrator = Orchestrator::new(
        src.path(),
        vec![dst_path.clone()],
        ChangeMonitor::new(source),
        Dispatcher::new(prober, DirMirrorExecutor),
    )?;

    // Initial dispatch only: the orchestrator blocks on the empty channel.
    let run = orchestrator.run(std::future::pending());
    tokio::pin!(run);
    tokio::select! {
        _ = &mut run => panic!("run ended early"),
        _ = tokio::time::sleep(Duration::from_millis(100)) => {}
    }
    assert_eq!(
        tree_listing(&dst_path)?,
        vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")]
    );

    fs::remove_file(src.path().join("a.txt"))?;
    batch_tx.send(Ok(vec![mountmirror::monitor::ChangeEvent::new(
        ChangeKind::Delete,
        "a.txt",
    )]
    .into()))?;
    drop(batch_tx);

    let exit = with_timeout(run).await;
    assert_eq!(exit, RunExit::ReadFailed(ReadError::Closed));
    assert_eq!(tree_listing(&dst_path)?, vec![PathBuf::from("b.txt")]);
    assert_eq!(fs::read_to_string(dst_path.join("b.txt"))?, "beta");
    Ok(())
}

#[tokio::test]
async fn repeated_sync_without_changes_converges() -> TestResult {
    let src = tempfile::tempdir()?;
    let dst = tempfile::tempdir()?;
    fs::create_dir(src.path().join("nested"))?;
    fs::write(src.path().join("nested/deep.bin"), [1u8, 2, 3])?;
    fs::write(dst.path().join("stale.txt"), "old")?;

    let dst_path = dst.path().to_path_buf();
    let mut dispatcher =
        Dispatcher::new(FakeProber::with_mounted([dst_path.clone()]), DirMirrorExecutor);

    dispatcher.dispatch_all(src.path(), &[dst_path.clone()]).await;
    let once = tree_listing(&dst_path)?;
    dispatcher.dispatch_all(src.path(), &[dst_path.clone()]).await;
    let twice = tree_listing(&dst_path)?;

    assert_eq!(once, twice);
    assert_eq!(once, vec![PathBuf::from("nested"), PathBuf::from("nested/deep.bin")]);
    Ok(())
}
