//! Shared test support for mountmirror: fakes for every seam, an in-process
//! mirror, config builders and tracing setup.

pub mod builders;
pub mod fakes;
pub mod mirror;

use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Install a per-test tracing subscriber (output shown only for failing
/// tests unless run with `--nocapture`). Honours `RUST_LOG`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Await `f`, failing the test if it takes longer than [`TEST_TIMEOUT`].
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(TEST_TIMEOUT, f)
        .await
        .expect("test future did not finish in time")
}
