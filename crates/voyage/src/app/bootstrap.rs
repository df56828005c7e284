use tracing::info;
use tracing_subscriber::EnvFilter;

pub(crate) fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
    info!(version = env!("CARGO_PKG_VERSION"), "voyage_startup");
}
