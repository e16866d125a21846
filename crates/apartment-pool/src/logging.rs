//! Logging setup for apartment-pool.
//!
//! Diagnostics go to stderr through `tracing`, so command output on stdout
//! stays clean for piping.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// How much diagnostic output to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    /// Warnings and errors.
    #[default]
    Normal,
    /// Info and above.
    Verbose,
    /// Everything, including debug output.
    Trace,
}

impl Verbosity {
    /// Pick a verbosity from `-v` count and `-q`.
    #[must_use]
    pub fn from_flags(verbose: u8, quiet: bool) -> Self {
        if quiet {
            return Self::Quiet;
        }
        match verbose {
            0 => Self::Normal,
            1 => Self::Verbose,
            _ => Self::Trace,
        }
    }

    /// Tracing level for this verbosity.
    #[must_use]
    pub fn level(self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::WARN,
            Self::Verbose => Level::INFO,
            Self::Trace => Level::DEBUG,
        }
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG`, when set, replaces the filter derived from `verbosity`.
/// Calling this more than once is harmless.
pub fn init_logging(verbosity: Verbosity) {
    let default_filter = format!("apartment_pool={}", verbosity.level());
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_file(false)
            .with_line_number(false),
    );

    let _ = subscriber.try_init();
}

/// Quiet subscriber for tests; shows warnings through the test writer.
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(Verbosity::Quiet.level(), Level::ERROR);
        assert_eq!(Verbosity::Normal.level(), Level::WARN);
        assert_eq!(Verbosity::Verbose.level(), Level::INFO);
        assert_eq!(Verbosity::Trace.level(), Level::DEBUG);
    }

    #[test]
    fn test_from_flags() {
        assert_eq!(Verbosity::from_flags(0, false), Verbosity::Normal);
        assert_eq!(Verbosity::from_flags(1, false), Verbosity::Verbose);
        assert_eq!(Verbosity::from_flags(5, false), Verbosity::Trace);
        assert_eq!(Verbosity::from_flags(2, true), Verbosity::Quiet);
    }

    #[test]
    fn test_init_logging_twice() {
        init_test_logging();
        init_logging(Verbosity::Verbose);
        init_logging(Verbosity::Quiet);
    }
}
