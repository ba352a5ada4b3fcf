use tracing_subscriber::EnvFilter;

/// Default directive used when `RUST_LOG` is not set.
const DEFAULT_FILTER: &str = "storage_ports_core=debug";

/// Install a pretty, test-captured subscriber.
///
/// Safe to call from every test: only the first call installs anything.
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .pretty()
        .try_init();

    tracing::trace!("test logging initialised");
}
