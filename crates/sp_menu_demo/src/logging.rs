//! Subscriber setup for the demo binary.
//!
//! Events always go to the console. When a log directory is in effect they
//! are also written, without colors, to a daily `sp-menu-demo.*.log` file.

use std::error::Error;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter directives for the demo, e.g. `SP_MENU_LOG=sp_menu=trace`.
pub const FILTER_ENV: &str = "SP_MENU_LOG";
/// Directory for the log file; forces file output on interactive runs.
pub const DIR_ENV: &str = "SP_MENU_LOG_DIR";

#[cfg(debug_assertions)]
const DEFAULT_FILTER: &str = "info,sp_menu=trace,sp_menu_core=trace,sp_menu_demo=debug";
#[cfg(not(debug_assertions))]
const DEFAULT_FILTER: &str = "warn,sp_menu=info,sp_menu_demo=info";

/// Resolved logging settings.
#[derive(Debug, Clone, PartialEq)]
pub struct LogSettings {
    /// `EnvFilter` directives
    pub filter: String,
    /// Directory of the rolling log file, if any
    pub file_dir: Option<PathBuf>,
    /// Colored console output
    pub ansi: bool,
}

impl LogSettings {
    /// Settings from `SP_MENU_LOG`, `RUST_LOG`, `SP_MENU_LOG_DIR` and the terminal.
    pub fn from_env() -> Self {
        Self::resolve(
            std::env::var(FILTER_ENV).ok(),
            std::env::var("RUST_LOG").ok(),
            std::env::var_os(DIR_ENV).map(PathBuf::from),
            atty::is(atty::Stream::Stdout),
        )
    }

    fn resolve(
        menu_filter: Option<String>,
        rust_log: Option<String>,
        dir: Option<PathBuf>,
        interactive: bool,
    ) -> Self {
        let filter = [menu_filter, rust_log]
            .into_iter()
            .flatten()
            .find(|directives| EnvFilter::try_new(directives).is_ok())
            .unwrap_or_else(|| DEFAULT_FILTER.to_string());

        // Interactive sessions only write a file when asked to.
        let file_dir = dir.or_else(|| (!interactive).then(default_log_dir));

        Self { filter, file_dir, ansi: interactive }
    }
}

/// Flushes the file writer on drop. Hold it until `main` returns.
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

/// Install the global subscriber.
///
/// A log file that cannot be opened is reported on stderr and skipped.
pub fn init(settings: &LogSettings) -> LogGuard {
    let (file_layer, guard) = match settings.file_dir.as_deref().map(file_writer) {
        Some(Ok((writer, guard))) => {
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        Some(Err(e)) => {
            eprintln!("Warning: log file disabled: {e}");
            (None, None)
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(&settings.filter))
        .with(fmt::layer().with_ansi(settings.ansi).with_target(false))
        .with(file_layer)
        .init();

    LogGuard { _file: guard }
}

fn file_writer(dir: &Path) -> Result<(NonBlocking, WorkerGuard), Box<dyn Error>> {
    std::fs::create_dir_all(dir)?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("sp-menu-demo")
        .filename_suffix("log")
        .build(dir)?;
    Ok(tracing_appender::non_blocking(appender))
}

/// Per-user log directory, `./sp_menu_data/logs` when none is known.
pub fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("sp-menu"))
        .unwrap_or_else(|| PathBuf::from("sp_menu_data"))
        .join("logs")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_filter_wins_over_rust_log() {
        let settings = LogSettings::resolve(
            Some("sp_menu=trace".into()),
            Some("error".into()),
            None,
            true,
        );
        assert_eq!(settings.filter, "sp_menu=trace");
    }

    #[test]
    fn test_invalid_filter_falls_through() {
        let settings =
            LogSettings::resolve(Some("sp_menu=loud".into()), Some("error".into()), None, true);
        assert_eq!(settings.filter, "error");

        let settings = LogSettings::resolve(Some("sp_menu=loud".into()), None, None, true);
        assert_eq!(settings.filter, DEFAULT_FILTER);
    }

    #[test]
    fn test_file_output_selection() {
        let interactive = LogSettings::resolve(None, None, None, true);
        assert_eq!(interactive.file_dir, None);
        assert!(interactive.ansi);

        let piped = LogSettings::resolve(None, None, None, false);
        assert_eq!(piped.file_dir, Some(default_log_dir()));
        assert!(!piped.ansi);

        let explicit = LogSettings::resolve(None, None, Some(PathBuf::from("/tmp/menu")), true);
        assert_eq!(explicit.file_dir, Some(PathBuf::from("/tmp/menu")));
    }

    #[test]
    fn test_file_writer_creates_directory() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("nested").join("logs");
        let (_writer, _guard) = file_writer(&dir).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn test_default_log_dir_ends_in_logs() {
        assert!(default_log_dir().ends_with("logs"));
    }
}
