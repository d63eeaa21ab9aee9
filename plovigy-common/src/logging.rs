//! Tracing subscriber bootstrap
//!
//! The interactive screen owns the terminal while a session runs, so a
//! configured log file is preferred. Without one, events go to stderr and
//! the returned [`LogHandle`] narrows them to warnings while the screen is
//! up.

use crate::config::LoggingConfig;
use crate::{Error, Result};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing::Subscriber;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{reload, EnvFilter, Registry};

/// Level left on stderr while the terminal is taken over
const QUIET_LEVEL: &str = "warn";

/// Build the event filter: `RUST_LOG` wins over the configured level
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| {
            Error::Config(format!("Invalid log level '{}': {}", config.level, e))
        }),
    }
}

/// Adjusts stderr logging around the interactive screen
pub struct LogHandle {
    stderr: Option<reload::Handle<EnvFilter, Registry>>,
    config: LoggingConfig,
}

impl LogHandle {
    /// Limit stderr to warnings and errors; no effect when logging to a file
    pub fn quiet_stderr(&self) -> Result<()> {
        self.swap(EnvFilter::new(QUIET_LEVEL))
    }

    /// Put back the filter chosen at startup
    pub fn restore(&self) -> Result<()> {
        self.swap(env_filter(&self.config)?)
    }

    fn swap(&self, filter: EnvFilter) -> Result<()> {
        match &self.stderr {
            Some(handle) => handle
                .reload(filter)
                .map_err(|e| Error::Config(format!("Failed to change log filter: {}", e))),
            None => Ok(()),
        }
    }
}

fn reloadable_subscriber<W>(
    config: &LoggingConfig,
    writer: W,
) -> Result<(impl Subscriber + Send + Sync + 'static, LogHandle)>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let (filter, handle) = reload::Layer::new(env_filter(config)?);
    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer));
    let handle = LogHandle {
        stderr: Some(handle),
        config: config.clone(),
    };
    Ok((subscriber, handle))
}

/// Install the global tracing subscriber
///
/// Must be called at most once per process.
pub fn init_logging(config: &LoggingConfig) -> Result<LogHandle> {
    match &config.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| {
                    Error::Config(format!("Failed to open log file {}: {}", path.display(), e))
                })?;
            tracing_subscriber::registry()
                .with(env_filter(config)?)
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .init();
            Ok(LogHandle {
                stderr: None,
                config: config.clone(),
            })
        }
        None => {
            let (subscriber, handle) = reloadable_subscriber(config, std::io::stderr)?;
            subscriber.init();
            Ok(handle)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CliOverrides, Settings, TomlConfig};
    use std::io::Write;
    use std::sync::Arc;

    /// In-memory log sink
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_bad_level_is_config_error() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let config = LoggingConfig {
            level: "plovigy=bogus".to_string(),
            file: None,
        };
        assert!(matches!(env_filter(&config), Err(Error::Config(_))));
    }

    #[test]
    fn test_default_level_parses() {
        assert!(env_filter(&LoggingConfig::default()).is_ok());
    }

    /// Given stderr logging at the default level
    /// When the screen is up between quiet_stderr and restore
    /// Then only warnings get through, and info returns afterwards
    #[test]
    fn test_quiet_stderr_keeps_only_warnings() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let captured = Captured::default();
        let writer = captured.clone();
        let (subscriber, handle) =
            reloadable_subscriber(&LoggingConfig::default(), move || writer.clone()).unwrap();

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("before screen");
            handle.quiet_stderr().unwrap();
            tracing::info!("while screen");
            tracing::warn!("warned on screen");
            handle.restore().unwrap();
            tracing::info!("after screen");
        });

        let text = captured.text();
        assert!(text.contains("before screen"));
        assert!(!text.contains("while screen"));
        assert!(text.contains("warned on screen"));
        assert!(text.contains("after screen"));
    }

    #[test]
    fn test_file_logging_handle_is_noop() {
        let handle = LogHandle {
            stderr: None,
            config: LoggingConfig::default(),
        };
        assert!(handle.quiet_stderr().is_ok());
        assert!(handle.restore().is_ok());
    }

    #[test]
    fn test_missing_config_file_warning_is_emitted() {
        let settings =
            Settings::resolve(&CliOverrides::default(), &TomlConfig::default(), None, None).unwrap();
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || settings.log_source());

        let text = captured.text();
        assert!(text.contains("WARN"));
        assert!(text.contains("No configuration file found"));
    }
}
