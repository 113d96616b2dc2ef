use graphmem_memory::OperationError;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

pub(crate) const EXIT_APPLICATION_FAILURE: u8 = 1;
pub(crate) const EXIT_CONNECTIVITY_FAILURE: u8 = 2;

pub(crate) fn init_tracing() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

/// Connectivity failures exit with 2 so wrappers can queue the work for later.
pub(crate) fn exit_status_for(error: &anyhow::Error) -> u8 {
    match error.downcast_ref::<OperationError>() {
        Some(operation) if operation.is_connectivity() => EXIT_CONNECTIVITY_FAILURE,
        _ => EXIT_APPLICATION_FAILURE,
    }
}
