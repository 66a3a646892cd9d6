//! Tracing subscriber setup
//!
//! Events go to stderr. `RUST_LOG` overrides the default filter when set,
//! using the usual `EnvFilter` directive syntax, e.g.
//! `RUST_LOG=point_wallet=debug`.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber. Returns `false` if one was already set,
/// which makes repeated calls from tests harmless.
pub fn init_logging(default_level: &str) -> bool {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_rejected_without_panicking() {
        init_logging("warn");
        assert!(!init_logging("debug"));
    }
}
