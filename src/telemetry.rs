use tracing_subscriber::EnvFilter;

/// Install the global `fmt` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `<crate_name>=<log_level>` plus the
/// shared framework crate at the same level.
pub fn init_tracing(crate_name: &str, log_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directives(crate_name, log_level).into()),
        )
        .init();
}

fn default_directives(crate_name: &str, log_level: &str) -> String {
    format!(
        "{crate}={level},sync_connector={level},tower_http={level}",
        crate = crate_name.replace('-', "_"),
        level = log_level
    )
}
