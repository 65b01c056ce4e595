//! Process-wide tracing setup shared by both binaries.

/// Installs the `fmt` subscriber. Later calls are no-ops.
pub fn init(level: tracing::Level) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(true)
        .try_init();
}
