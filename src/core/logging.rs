//! Logging initialization and utilities

/// Initialize the logging system
///
/// Uses env_logger with a default filter level of `info`.
/// Override with the RUST_LOG environment variable.
///
/// # Example
/// ```
/// voxmesh::core::logging::init();
/// log::info!("extracting surfaces");
/// ```
pub fn init() {
    init_with_filter("info");
}

/// Initialize with an explicit default filter, e.g. `"voxmesh=trace"`
pub fn init_with_filter(filter: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();
}
