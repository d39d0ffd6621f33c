#![allow(dead_code, unused_imports)]

pub use mountmirror_test_utils::builders;
pub use mountmirror_test_utils::fakes;
pub use mountmirror_test_utils::mirror;
pub use mountmirror_test_utils::{init_tracing, with_timeout};

use mountmirror::monitor::{ChangeBatch, ChangeEvent, ChangeKind};

/// Batch of named events of the given kinds, in order.
pub fn batch_of(kinds: &[ChangeKind]) -> ChangeBatch {
    kinds
        .iter()
        .enumerate()
        .map(|(i, kind)| ChangeEvent::new(*kind, format!("file_{i}.txt")))
        .collect::<Vec<_>>()
        .into()
}
