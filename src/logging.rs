use tracing_subscriber::EnvFilter;

/// Install the stderr diagnostics subscriber.
///
/// `RUST_LOG` wins when set; otherwise `warn`, or `debug` with `verbose`.
/// Stdout is reserved for the simulation transcript.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // A second init (e.g. from tests) is harmless; keep the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
