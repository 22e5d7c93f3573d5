use anyhow::{Context, Result};
use log::{LevelFilter, Log, Metadata, Record};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing_appender::rolling::{RollingFileAppender, Rotation};

/// Logger that writes to a rotating file and echoes important lines to stderr
struct ClipstackLogger {
    file_writer: Arc<Mutex<RollingFileAppender>>,
    file_level: LevelFilter,
    console_level: LevelFilter,
}

impl ClipstackLogger {
    fn format(record: &Record) -> String {
        format!(
            "{} [{}] {}: {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            record.level(),
            record.target(),
            record.args()
        )
    }
}

impl Log for ClipstackLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.file_level || metadata.level() <= self.console_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = Self::format(record);
        let level = record.level();

        if level <= self.file_level {
            if let Ok(mut writer) = self.file_writer.lock() {
                let _ = writeln!(writer, "{}", line);
            }
        }

        if level <= self.console_level {
            eprintln!("{}", line);
        }
    }

    fn flush(&self) {
        // RollingFileAppender handles flushing automatically
    }
}

/// Parse log level string to LevelFilter
pub fn parse_level(level_str: &str) -> LevelFilter {
    match level_str.to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info, // Default to info
    }
}

/// Initialize the file logger
///
/// Lines at `file_level` or above go to a daily-rotated file next to
/// `log_file_path` (3 files kept); lines at `console_level` or above are
/// also echoed to stderr.
pub fn init_logger(log_file_path: PathBuf, file_level: &str, console_level: &str) -> Result<()> {
    // Ensure parent directory exists
    if let Some(parent) = log_file_path.parent() {
        fs::create_dir_all(parent).context("Failed to create log directory")?;
    }

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .max_log_files(3)
        .filename_prefix(
            log_file_path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("clipstack"),
        )
        .filename_suffix(
            log_file_path
                .extension()
                .and_then(|s| s.to_str())
                .unwrap_or("log"),
        )
        .build(
            log_file_path
                .parent()
                .ok_or_else(|| anyhow::anyhow!("Invalid log file path"))?,
        )
        .context("Failed to create rotating file appender")?;

    let file_level = parse_level(file_level);
    let console_level = parse_level(console_level);

    let logger = ClipstackLogger {
        file_writer: Arc::new(Mutex::new(file_appender)),
        file_level,
        console_level,
    };

    // Set as global logger
    log::set_boxed_logger(Box::new(logger)).context("Failed to set global logger")?;
    log::set_max_level(file_level.max(console_level));

    Ok(())
}
