//! Logging setup for the `credhash` binary. Output goes to stderr so hashes
//! printed on stdout stay easy to capture.

use tracing_subscriber::EnvFilter;

const LEVEL_ENV: &str = "CREDHASH_LOG";
const ALT_LEVEL_ENV: &str = "RUST_LOG";
const DEFAULT_LEVEL: &str = "warn";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LEVEL_ENV)
        .or_else(|_| EnvFilter::try_from_env(ALT_LEVEL_ENV))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL))
}

/// Installs the global subscriber. Calling it twice is harmless.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::init;

    #[test]
    fn init_is_idempotent() {
        init();
        init();
        tracing::debug!("logging initialized twice without panicking");
    }
}
