//! FILENAME: app/src/logging.rs
// PURPOSE: Unified logging system for the dashboard service.

use std::fs::File;
use std::fs::OpenOptions;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use once_cell::sync::Lazy;

// ============================================================================
// UNIFIED LOGGING SYSTEM
// ============================================================================

pub const LOG_FILE_NAME: &str = "dashboard.log";

/// Global sequence counter shared by the macros and the `log` bridge
static LOG_SEQ: AtomicU64 = AtomicU64::new(0);

/// Global log file handle
pub static LOG_FILE: Lazy<Mutex<Option<File>>> = Lazy::new(|| Mutex::new(None));

/// Cached log path
static LOG_PATH: Lazy<Mutex<Option<PathBuf>>> = Lazy::new(|| Mutex::new(None));

/// Get next sequence number
pub fn next_seq() -> u64 {
    LOG_SEQ.fetch_add(1, Ordering::SeqCst) + 1
}

/// Resolve the log file path. Without a configured directory the log lands in
/// `<cwd>/logs`.
pub fn get_log_path(log_dir: Option<&Path>) -> Result<PathBuf, String> {
    if let Ok(guard) = LOG_PATH.lock() {
        if let Some(ref path) = *guard {
            return Ok(path.clone());
        }
    }

    let dir = match log_dir {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir()
            .map_err(|e| format!("Failed to get cwd: {}", e))?
            .join("logs"),
    };

    eprintln!("[LOG_INIT] Log directory target: {:?}", dir);

    if !dir.exists() {
        std::fs::create_dir_all(&dir)
            .map_err(|e| format!("Failed to create log dir at {:?}: {}", dir, e))?;
        eprintln!("[LOG_INIT] Created log directory");
    }

    let log_path = dir.join(LOG_FILE_NAME);

    if let Ok(mut guard) = LOG_PATH.lock() {
        *guard = Some(log_path.clone());
    }

    Ok(log_path)
}

/// Initialize the unified log file. On failure the caller keeps running with
/// console-only output.
pub fn init_log_file(log_dir: Option<&Path>) -> Result<PathBuf, String> {
    let log_path = get_log_path(log_dir)?;

    eprintln!("[LOG_INIT] Creating log file at: {:?}", log_path);

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(&log_path)
        .map_err(|e| format!("Failed to create log file {:?}: {}", log_path, e))?;

    let mut log_file = LOG_FILE.lock()
        .map_err(|e| format!("Lock error: {}", e))?;
    *log_file = Some(file);

    eprintln!("[LOG_INIT] Log file initialized successfully");

    Ok(log_path)
}

/// Format one unified log line.
pub fn format_line(seq: u64, level: &str, category: &str, message: &str) -> String {
    format!("{}|{}|{}|{}", seq, level, category, message)
}

/// Append one line to the log file. Returns false when no file is open.
pub fn append_to_file(line: &str) -> bool {
    if let Ok(mut guard) = LOG_FILE.lock() {
        if let Some(ref mut file) = *guard {
            if let Err(e) = writeln!(file, "{}", line) {
                eprintln!("[LOG_ERROR] Failed to write: {}", e);
            }
            let _ = file.flush();
            return true;
        }
    }
    false
}

/// Write a log line in unified format
pub fn write_log(level: &str, category: &str, message: &str) {
    let line = format_line(next_seq(), level, category, message);
    append_to_file(&line);
    println!("{}", line);
}

/// Write a log line to the file only. Without a log file the line goes to
/// the console instead.
pub fn write_log_file_only(level: &str, category: &str, message: &str) {
    let line = format_line(next_seq(), level, category, message);
    if !append_to_file(&line) {
        println!("{}", line);
    }
}

/// Write an ENTER log line for function entry
pub fn write_log_enter(level: &str, category: &str, func_name: &str, params: &str) {
    let message = if params.is_empty() {
        format!("ENTER {}", func_name)
    } else {
        format!("ENTER {} {}", func_name, params)
    };
    write_log(level, category, &message);
}

/// Write an EXIT log line for function exit
pub fn write_log_exit(level: &str, category: &str, func_name: &str, result: &str) {
    let message = if result.is_empty() {
        format!("EXIT {}", func_name)
    } else {
        format!("EXIT {} {}", func_name, result)
    };
    write_log(level, category, &message);
}

/// Re-order the lines of `content` by their leading sequence number.
/// Lines without a parseable sequence sort last, keeping their relative order.
pub fn sort_lines(content: &str) -> Vec<String> {
    let mut lines: Vec<(u64, String)> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let seq = line
                .split('|')
                .next()
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(u64::MAX);
            (seq, line.to_string())
        })
        .collect();

    lines.sort_by_key(|(seq, _)| *seq);
    lines.into_iter().map(|(_, line)| line).collect()
}

/// Rewrite `file` with its lines ordered by sequence number.
/// Returns the number of lines kept.
pub fn sort_file(file: &mut File) -> io::Result<usize> {
    file.flush()?;
    file.seek(SeekFrom::Start(0))?;

    let mut content = String::new();
    file.read_to_string(&mut content)?;
    let lines = sort_lines(&content);

    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    for line in &lines {
        writeln!(file, "{}", line)?;
    }
    file.flush()?;
    Ok(lines.len())
}

/// Sort the unified log file by sequence number. Returns the number of lines kept.
pub fn sort_log_file() -> Result<usize, String> {
    log_enter_info!("LOG", "sort_log_file");

    let line_count = {
        let mut guard = LOG_FILE.lock().map_err(|e| e.to_string())?;
        let file = guard.as_mut().ok_or("Log file not initialized")?;
        sort_file(file).map_err(|e| format!("Sort error: {}", e))?
    };

    log_exit_info!("LOG", "sort_log_file", "sorted {} lines", line_count);
    Ok(line_count)
}

// ============================================================================
// LOG FACADE BRIDGE
// ============================================================================

/// Routes `log` records from the core crates into the unified log.
/// The category is the first segment of the record target, upper-cased
/// (`cube_engine::cube` -> `CUBE_ENGINE`).
pub struct UnifiedLogger;

static LOGGER: UnifiedLogger = UnifiedLogger;

pub fn level_code(level: log::Level) -> &'static str {
    match level {
        log::Level::Error => "E",
        log::Level::Warn => "W",
        log::Level::Info => "I",
        log::Level::Debug => "D",
        log::Level::Trace => "T",
    }
}

pub fn target_category(target: &str) -> String {
    target.split("::").next().unwrap_or(target).to_uppercase()
}

impl log::Log for UnifiedLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        write_log_file_only(
            level_code(record.level()),
            &target_category(record.target()),
            &record.args().to_string(),
        );
    }

    fn flush(&self) {
        if let Ok(mut guard) = LOG_FILE.lock() {
            if let Some(ref mut file) = *guard {
                let _ = file.flush();
            }
        }
    }
}

/// Install the bridge as the global `log` logger. A second call is a no-op.
pub fn install_logger(level: log::LevelFilter) {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

// ============================================================================
// MACRO DEFINITIONS & EXPORTS
// ============================================================================

#[macro_export]
macro_rules! log_debug {
    ($cat:expr, $($arg:tt)*) => {
        $crate::logging::write_log("D", $cat, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_info {
    ($cat:expr, $($arg:tt)*) => {
        $crate::logging::write_log("I", $cat, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($cat:expr, $($arg:tt)*) => {
        $crate::logging::write_log("W", $cat, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($cat:expr, $($arg:tt)*) => {
        $crate::logging::write_log("E", $cat, &format!($($arg)*))
    };
}

// ENTER/EXIT macros for function tracing

#[macro_export]
macro_rules! log_enter {
    ($cat:expr, $func:expr) => {
        $crate::logging::write_log_enter("D", $cat, $func, "")
    };
    ($cat:expr, $func:expr, $($arg:tt)*) => {
        $crate::logging::write_log_enter("D", $cat, $func, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_exit {
    ($cat:expr, $func:expr) => {
        $crate::logging::write_log_exit("D", $cat, $func, "")
    };
    ($cat:expr, $func:expr, $($arg:tt)*) => {
        $crate::logging::write_log_exit("D", $cat, $func, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_enter_info {
    ($cat:expr, $func:expr) => {
        $crate::logging::write_log_enter("I", $cat, $func, "")
    };
    ($cat:expr, $func:expr, $($arg:tt)*) => {
        $crate::logging::write_log_enter("I", $cat, $func, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_exit_info {
    ($cat:expr, $func:expr) => {
        $crate::logging::write_log_exit("I", $cat, $func, "")
    };
    ($cat:expr, $func:expr, $($arg:tt)*) => {
        $crate::logging::write_log_exit("I", $cat, $func, &format!($($arg)*))
    };
}

pub use log_debug;
pub use log_info;
pub use log_warn;
pub use log_error;
pub use log_enter;
pub use log_exit;
pub use log_enter_info;
pub use log_exit_info;
