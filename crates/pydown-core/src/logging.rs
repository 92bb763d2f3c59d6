//! File logging for pydown runs
//!
//! A conversion can leave a timestamped trace of what it did: the config
//! file it read, every rewrite a rule applied and each formatter run. The
//! log is process-wide and stays off until [`init_logger`] opens a file;
//! until then every logging call is a no-op.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

static RUN_LOG: Mutex<Option<RunLog>> = Mutex::new(None);

/// An open log file
pub struct RunLog {
    out: BufWriter<File>,
    path: PathBuf,
}

impl RunLog {
    /// Create (or truncate) the log file at `path`
    pub fn create(path: &Path) -> std::io::Result<Self> {
        Ok(Self {
            out: BufWriter::new(File::create(path)?),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn line(&mut self, message: &str) {
        let now = chrono::Local::now().format("%H:%M:%S%.3f");
        let _ = writeln!(self.out, "{} {}", now, message);
        let _ = self.out.flush();
    }

    /// Major stage of a run, e.g. `CONVERSION START`
    pub fn heading(&mut self, title: &str, rule: char, width: usize) {
        let bar: String = std::iter::repeat(rule).take(width).collect();
        self.line(&bar);
        self.line(title);
        self.line(&bar);
    }
}

fn with_log(f: impl FnOnce(&mut RunLog)) {
    if let Ok(mut guard) = RUN_LOG.lock() {
        if let Some(log) = guard.as_mut() {
            f(log);
        }
    }
}

/// Start logging to `log_path`, or to `pydown-<timestamp>.log` in the
/// system temp directory when no path is given; returns the file used
pub fn init_logger(log_path: Option<&Path>) -> std::io::Result<PathBuf> {
    let path = match log_path {
        Some(path) => path.to_path_buf(),
        None => std::env::temp_dir().join(format!(
            "pydown-{}.log",
            chrono::Local::now().format("%Y%m%d_%H%M%S")
        )),
    };

    let log = RunLog::create(&path)?;
    if let Ok(mut guard) = RUN_LOG.lock() {
        *guard = Some(log);
    }
    Ok(path)
}

/// Close the log file; later calls log nothing
pub fn shutdown() {
    if let Ok(mut guard) = RUN_LOG.lock() {
        guard.take();
    }
}

pub fn log(message: &str) {
    with_log(|log| log.line(message));
}

pub fn section(title: &str) {
    with_log(|log| log.heading(title, '=', 60));
}

pub fn subsection(title: &str) {
    with_log(|log| log.heading(title, '-', 40));
}

pub fn is_enabled() -> bool {
    RUN_LOG.lock().map(|guard| guard.is_some()).unwrap_or(false)
}

pub fn log_config_load(path: &Path) {
    section("CONFIGURATION LOADING");
    log(&format!("Reading {}", path.display()));
}

pub fn log_conversion_start(input: &Path, output: Option<&Path>) {
    section("CONVERSION START");
    log(&format!("Input: {}", input.display()));
    log(&format!(
        "Output: {}",
        output.map_or_else(|| "<stdout>".to_string(), |p| p.display().to_string())
    ));
}

pub fn log_rewrite(rule: &str, line: usize, message: &str) {
    log(&format!("[{}] line {}: {}", rule, line, message));
}

pub fn log_formatter(command: &[String], success: bool, error: Option<&str>) {
    subsection("FORMATTER");
    log(&format!("Command: {}", command.join(" ")));
    match (success, error) {
        (true, _) => log("Formatter succeeded"),
        (false, Some(err)) => log(&format!("Formatter failed: {}", err)),
        (false, None) => log("Formatter failed"),
    }
}

pub fn log_conversion_complete(rewrites: usize, error: Option<&str>) {
    section("CONVERSION COMPLETE");
    match error {
        None => log(&format!("Rewrites applied: {}", rewrites)),
        Some(err) => log(&format!("Conversion failed: {}", err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_log_headings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.log");

        let mut log = RunLog::create(&path).unwrap();
        log.heading("CONVERSION START", '=', 60);
        log.line("Input: app.py");
        assert_eq!(log.path(), path.as_path());

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].ends_with(&"=".repeat(60)));
        assert!(lines[1].ends_with(" CONVERSION START"));
        assert!(lines[3].ends_with(" Input: app.py"));
    }

    #[test]
    fn test_global_log_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("global.log");

        assert_eq!(init_logger(Some(path.as_path())).unwrap(), path);
        assert!(is_enabled());
        log_rewrite("fstrings", 3, "f-string with 1 field(s) converted to % formatting");
        log_conversion_complete(1, None);
        shutdown();
        assert!(!is_enabled());
        log("dropped");

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[fstrings] line 3: f-string with 1 field(s)"));
        assert!(contents.contains("Rewrites applied: 1"));
        assert!(!contents.contains("dropped"));
    }
}
