pub mod builders;
pub mod tasks;

use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

static INIT: Once = Once::new();

/// Filter used when `RUST_LOG` is unset: devpipe's own events at debug, so
/// a failing run shows the batches and completions that led up to it.
const DEFAULT_TEST_FILTER: &str = "warn,devpipe=debug";

/// Upper bound for a single test run before it is declared hung.
pub const RUN_TIMEOUT: Duration = Duration::from_secs(5);

/// Initialise tracing for tests.
///
/// Logs go through `with_test_writer()`, so the harness only prints them for
/// failing tests. Thread names are included, which separates the
/// `devpipe-resolver` thread from the blocking pool running task bodies.
/// `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_TEST_FILTER));

        // another test binary helper may already have installed one
        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_names(true)
            .try_init();
    });
}

/// Await `f`, failing the test if it takes longer than [`RUN_TIMEOUT`].
///
/// A resolver that never closes its stream or a worker pool that never drains
/// shows up as a failure instead of a stuck test binary.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(RUN_TIMEOUT, f)
        .await
        .unwrap_or_else(|_| panic!("run did not finish within {RUN_TIMEOUT:?}"))
}
