// file: src/logging/logger.rs
// version: 2.1.0
// guid: j0k1l2m3-n4o5-6789-0123-456789jklmno

//! Diagnostic logger initialization
//!
//! Diagnostics go to stderr so they never interleave with the journal lines
//! and rendered output written to stdout.

use crate::Result;
use std::io;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the filter for the requested verbosity; valid `RUST_LOG` directives win
fn build_filter(directives: Option<&str>, verbose: bool, quiet: bool) -> EnvFilter {
    if let Some(Ok(filter)) = directives.map(EnvFilter::try_new) {
        return filter;
    }

    if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    }
}

/// Initialize the logging system
pub fn init_logger(verbose: bool, quiet: bool) -> Result<()> {
    tracing_subscriber::registry()
        .with(build_filter(
            std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref(),
            verbose,
            quiet,
        ))
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .try_init()
        .map_err(|e| {
            crate::error::ProvisionError::ConfigError(format!(
                "Failed to initialize logger: {}",
                e
            ))
        })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn test_second_init_is_rejected() {
        // The global subscriber can only be set once per process
        let _ = init_logger(false, false);
        assert!(matches!(
            init_logger(false, false),
            Err(crate::error::ProvisionError::ConfigError(_))
        ));
    }

    #[test]
    fn test_build_filter_levels() {
        assert_eq!(build_filter(None, false, true).max_level_hint(), Some(LevelFilter::ERROR));
        assert_eq!(build_filter(None, true, false).max_level_hint(), Some(LevelFilter::DEBUG));
        assert_eq!(build_filter(None, false, false).max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn test_rust_log_overrides_flags() {
        assert_eq!(
            build_filter(Some("trace"), false, true).max_level_hint(),
            Some(LevelFilter::TRACE)
        );
    }
}
