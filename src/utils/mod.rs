use std::{env, sync::Once};

use tracing_subscriber::{fmt, EnvFilter};

static TRACING_INIT: Once = Once::new();

const DEFAULT_DIRECTIVE: &str = "cashflow_core=info";

/// Installs the global `fmt` subscriber once. `RUST_LOG` replaces the default
/// directive when it is set and parses.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let filter = env_filter(env::var(EnvFilter::DEFAULT_ENV).ok().as_deref());
        // A subscriber installed by an embedding application wins.
        let _ = fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
    });
}

fn env_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|raw| !raw.trim().is_empty())
        .and_then(|raw| EnvFilter::try_new(raw).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE))
}
