//! Logging setup shared by the arm-solver binaries and tests.

use tracing::Level;

/// Initialize the tracing subscriber at the INFO default level.
///
/// The level can be overridden through `RUST_LOG`, e.g.
/// `RUST_LOG=arm_solver=trace cargo run --bin solve_pose`.
pub fn init_logger() {
    init_logger_with_level(Level::INFO)
}

/// Initialize the tracing subscriber with a custom default level, still
/// overrideable through `RUST_LOG`.
pub fn init_logger_with_level(default_level: Level) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy(),
        )
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .init();
}
