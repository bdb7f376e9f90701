//! Logging for phpvm.
//!
//! Installs a `tracing` subscriber filtered by `RUST_LOG` (or the verbose
//! flag) and offers a guard that records how long an operation took.

use phpvm_core::EnvVars;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    prelude::*,
};

/// Default filter directive for a run with the given verbosity.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "phpvm=debug,phpvm_toolchain=debug,phpvm_core=debug"
    } else {
        "phpvm=warn,phpvm_toolchain=warn"
    }
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins over the verbose flag when set. Set `PHPVM_LOG_JSON` to
/// get one JSON object per event on stderr.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let subscriber = tracing_subscriber::registry().with(filter);

    if std::env::var(EnvVars::PHPVM_LOG_JSON).is_ok() {
        let json_layer = fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_span_events(FmtSpan::CLOSE)
            .with_target(true)
            .with_file(true)
            .with_line_number(true);

        let _ = subscriber.with(json_layer).try_init();
    } else {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time();

        let _ = subscriber.with(fmt_layer).try_init();
    }
}

/// Logs the elapsed time of an operation when dropped.
pub struct TimingGuard {
    name: String,
    start: std::time::Instant,
}

impl TimingGuard {
    /// Start timing an operation.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for TimingGuard {
    fn drop(&mut self) {
        tracing::debug!(
            operation = %self.name,
            duration_ms = self.start.elapsed().as_millis() as u64,
            "Operation completed"
        );
    }
}
