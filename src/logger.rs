use std::io::{self, Write};
use log::{
    Level,
    LevelFilter,
    Metadata,
    Record
};

pub const DEFAULT_LEVEL: &str = "info";

static STDERR_LOGGER: StderrLogger = StderrLogger;

/// Writes to stderr so log lines stay out of the rendered panes. Other
/// crates' records are limited to warnings.
struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        if !metadata.target().starts_with(env_target()) && metadata.level() > Level::Warn {
            return false;
        }
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!(
                "[{}] [{}] {}",
                record.target(),
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
    }
}

fn env_target() -> &'static str {
    env!("CARGO_CRATE_NAME")
}

pub fn parse_level(level: &str) -> LevelFilter {
    level.trim().parse().unwrap_or(LevelFilter::Info)
}

/// Safe to call more than once; later calls only change the level.
pub fn setup(level: &str) {
    _ = log::set_logger(&STDERR_LOGGER);
    log::set_max_level(parse_level(level));
}
