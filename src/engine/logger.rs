use log::{LevelFilter, Log, Metadata, Record};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// Append-only file sink behind the `log` facade. The UCI `Log File`
/// option can retarget or disable it at any time, which rules out the
/// usual init-once logger implementations; with no file attached every
/// record is dropped.
struct FileLogger {
    file: Mutex<Option<File>>,
}

static LOGGER: FileLogger = FileLogger {
    file: Mutex::new(None),
};

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= LevelFilter::Info
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Ok(mut guard) = self.file.lock() {
            if let Some(file) = guard.as_mut() {
                let _ = writeln!(file, "[{}] {}", record.level(), record.args());
            }
        }
    }

    fn flush(&self) {
        if let Ok(mut guard) = self.file.lock() {
            if let Some(file) = guard.as_mut() {
                let _ = file.flush();
            }
        }
    }
}

/// Install the logger. Safe to call once per process; the UCI loop does
/// so before reading any input.
pub fn init() {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Info);
    }
}

/// Point the logger at `path` (append, create if missing), or detach it
/// entirely with `None`.
pub fn set_file(path: Option<&Path>) {
    let file = path.and_then(|path| {
        OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)
            .map_err(|err| eprintln!("info string cannot open log file {}: {err}", path.display()))
            .ok()
    });
    if let Ok(mut guard) = LOGGER.file.lock() {
        *guard = file;
    }
}
