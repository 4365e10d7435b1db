use super::ConfigOverrides;
use std::str::FromStr;

/// Build overrides from environment variables.
///
/// Unset or unparseable values are ignored so the file/default value wins.
pub fn overrides_from_env() -> ConfigOverrides {
    overrides_from(|key| std::env::var(key).ok())
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|v| v.trim().parse().ok())
}

pub(crate) fn overrides_from(lookup: impl Fn(&str) -> Option<String>) -> ConfigOverrides {
    ConfigOverrides {
        port: parsed(&lookup, "PORT"),
        log_level: lookup("LOG_LEVEL").filter(|v| !v.trim().is_empty()),
        page_size: parsed(&lookup, "PAGE_SIZE"),
        max_concurrent_connections: parsed(&lookup, "MAX_CONCURRENT_CONNECTIONS"),
        api_version: parsed(&lookup, "API_VERSION"),
        wait_before_server_close_secs: parsed(&lookup, "WAIT_BEFORE_SERVER_CLOSE"),
        body_limit_bytes: parsed(&lookup, "BODY_LIMIT_BYTES"),
    }
}
