#![cfg(feature = "std")]

use std::env;
use std::sync::OnceLock;
use std::time::Instant;

use log::{self, LevelFilter, Metadata, Record};

/// Writes to stderr with milliseconds since boot, so task timing is visible
/// next to the binaries' stdout.
struct KernelLogger {
    boot: OnceLock<Instant>,
}

impl log::Log for KernelLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let elapsed = self.boot.get_or_init(Instant::now).elapsed();
            eprintln!(
                "{:>7}ms {:<5} [{}] {}",
                elapsed.as_millis(),
                record.level(),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {}
}

static LOGGER: KernelLogger = KernelLogger {
    boot: OnceLock::new(),
};

/// Installs the kernel logger and starts its boot clock.
///
/// `BATTLESHIP_LOG` picks the level (`trace` shows every dropped serial
/// byte and suppressed bounce); anything unparsable falls back to `info`.
/// Calling it again keeps the first logger and boot time.
pub fn init_logging() {
    LOGGER.boot.get_or_init(Instant::now);
    let level = match env::var("BATTLESHIP_LOG") {
        Ok(raw) => raw.parse().unwrap_or(LevelFilter::Info),
        Err(_) => LevelFilter::Info,
    };
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}
