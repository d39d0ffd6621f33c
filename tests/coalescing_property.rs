mod common;
use crate::common::fakes::{FakeExecutor, FakeProber, ScriptedChangeSource};

use std::path::PathBuf;

use proptest::prelude::*;

use mountmirror::dispatch::Dispatcher;
use mountmirror::engine::{Orchestrator, RunExit};
use mountmirror::monitor::{ChangeBatch, ChangeEvent, ChangeKind, ChangeMonitor, ReadError};

fn kind_strategy() -> impl Strategy<Value = ChangeKind> {
    prop_oneof![
        Just(ChangeKind::Create),
        Just(ChangeKind::Delete),
        Just(ChangeKind::Modify),
        Just(ChangeKind::MovedFrom),
        Just(ChangeKind::MovedTo),
        Just(ChangeKind::Other),
    ]
}

fn event_strategy() -> impl Strategy<Value = ChangeEvent> {
    (kind_strategy(), any::<bool>()).prop_map(|(kind, named)| {
        if named {
            ChangeEvent::new(kind, "entry")
        } else {
            ChangeEvent::unnamed(kind)
        }
    })
}

fn batches_strategy() -> impl Strategy<Value = Vec<ChangeBatch>> {
    proptest::collection::vec(
        proptest::collection::vec(event_strategy(), 0..40).prop_map(ChangeBatch::from),
        0..12,
    )
}

proptest! {
    #[test]
    fn one_dispatch_per_qualifying_batch(batches in batches_strategy()) {
        let expected_follow_ups = batches
            .iter()
            .filter(|b| b.iter().any(|e| e.qualifies()))
            .count();

        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let executor = FakeExecutor::new();
        let prober = FakeProber::with_mounted(["/mnt/d"]);
        let source = ScriptedChangeSource::from_batches(batches);

        let mut orchestrator = Orchestrator::new(
            PathBuf::from("/src"),
            vec![PathBuf::from("/mnt/d")],
            ChangeMonitor::new(source),
            Dispatcher::new(prober, executor.clone()),
        )
        .unwrap();

        let exit = rt.block_on(orchestrator.run(std::future::pending()));

        prop_assert_eq!(exit, RunExit::ReadFailed(ReadError::Closed));
        prop_assert_eq!(orchestrator.dispatch_count() as usize, 1 + expected_follow_ups);
        prop_assert_eq!(executor.calls().len(), 1 + expected_follow_ups);
    }
}
