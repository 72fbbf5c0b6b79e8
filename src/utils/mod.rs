use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

static TRACING_INIT: Once = Once::new();

pub const DEFAULT_LOG_FILTER: &str = "recurra=info";

/// Installs the global subscriber. `RUST_LOG` is honoured; the comma-separated
/// `default_filter` directives are layered on top. Output goes to stderr so
/// command results on stdout stay machine-readable.
pub fn init_tracing(default_filter: &str) {
    TRACING_INIT.call_once(|| {
        let mut filter = EnvFilter::from_default_env();
        for directive in default_filter.split(',').map(str::trim).filter(|d| !d.is_empty()) {
            match directive.parse() {
                Ok(parsed) => filter = filter.add_directive(parsed),
                Err(err) => eprintln!("ignoring log directive `{directive}`: {err}"),
            }
        }

        fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
    });
}
