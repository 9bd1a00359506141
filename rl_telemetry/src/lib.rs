//! Logging setup shared by hosts of the `rl_model` tables.
//!
//! Library crates only emit `tracing` events; a binary or test harness
//! calls [`initialize_logging`] once to route them to stderr.

use std::io::IsTerminal;
use std::io::Write;
use std::str::FromStr;
use std::sync::Arc;

use lazy_static::lazy_static;
pub use tracing::Level;
use tracing_appender::non_blocking::NonBlocking;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::Layer;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;

use crate::env::Env;

/// Environment variable to disable the stderr logging layer.
/// Set to "1" to disable logging output.
pub const DISABLE_FMT_TRACING: &str = "DISABLE_FMT_TRACING";

/// Environment variable holding the maximum level to log, e.g. "debug".
pub const RUST_LOG: &str = "RUST_LOG";

// Need to keep this around so that the tracing subscriber doesn't drop the writer.
lazy_static! {
    static ref WRITER_GUARD: Arc<(NonBlocking, WorkerGuard)> = {
        let writer: Box<dyn Write + Send> = Box::new(std::io::stderr());
        Arc::new(
            tracing_appender::non_blocking::NonBlockingBuilder::default()
                .lossy(false)
                .finish(writer),
        )
    };
}

/// The level used when `RUST_LOG` is unset or unparseable.
pub fn default_level(env: Env) -> Level {
    match env {
        Env::Local => Level::INFO,
        Env::Test => Level::DEBUG,
    }
}

/// Parse a level as accepted in `RUST_LOG`, falling back to the
/// environment's default.
pub fn parse_level(value: Option<&str>, env: Env) -> Level {
    value
        .and_then(|value| Level::from_str(value.trim()).ok())
        .unwrap_or_else(|| default_level(env))
}

/// Install the global tracing subscriber. Safe to call more than once;
/// later calls leave the first subscriber in place.
pub fn initialize_logging() {
    let env = Env::current();
    let requested = std::env::var(RUST_LOG).ok();
    let level = parse_level(requested.as_deref(), env);

    let writer: &NonBlocking = &WRITER_GUARD.0;
    let layer = fmt::Layer::default()
        .with_writer(writer.clone())
        .with_target(true)
        .with_ansi(std::io::stderr().is_terminal())
        .with_filter(LevelFilter::from_level(level));

    use tracing_subscriber::Registry;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    if let Err(err) = Registry::default()
        .with(if std::env::var(DISABLE_FMT_TRACING).unwrap_or_default() != "1" {
            Some(layer)
        } else {
            None
        })
        .try_init()
    {
        tracing::debug!("logging already initialized for this process: {}", err);
        return;
    }

    if let Some(requested) = requested.filter(|value| Level::from_str(value.trim()).is_err()) {
        tracing::warn!(
            "ignoring invalid {} value `{}`, logging at {}",
            RUST_LOG,
            requested,
            level
        );
    }
    tracing::debug!(environment = %env, %level, "logging_initialized");
}

pub mod env {
    use std::fmt;

    /// Set (to any value) to treat the process as a test run.
    pub const RL_TEST_ENV: &str = "RL_TEST_ENV";

    /// The kind of process the library is running in.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Env {
        Local,
        Test,
    }

    impl fmt::Display for Env {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Self::Local => write!(f, "local"),
                Self::Test => write!(f, "test"),
            }
        }
    }

    impl Env {
        #[cfg(test)]
        pub fn current() -> Self {
            Self::Test
        }

        #[cfg(not(test))]
        pub fn current() -> Self {
            match std::env::var(RL_TEST_ENV) {
                Ok(_) => Self::Test,
                Err(_) => Self::Local,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_under_test() {
        assert_eq!(Env::current(), Env::Test);
        assert_eq!(Env::Test.to_string(), "test");
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level(Some("warn"), Env::Local), Level::WARN);
        assert_eq!(parse_level(Some(" TRACE "), Env::Local), Level::TRACE);
        assert_eq!(parse_level(Some("loud"), Env::Local), Level::INFO);
        assert_eq!(parse_level(None, Env::Test), Level::DEBUG);
    }

    #[test]
    fn test_initialize_twice() {
        initialize_logging();
        initialize_logging();
        tracing::info!("still logging");
    }
}
