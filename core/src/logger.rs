// Global logging backend for the boot path

use core::fmt::Write;
use core::sync::atomic::{AtomicUsize, Ordering};

use heapless::{Deque, String, Vec};
use log::{LevelFilter, Log, Metadata, Record};
use spin::Mutex;

/// Number of records kept; older ones are dropped first
pub const MAX_LOG_ENTRIES: usize = 64;

/// Longest record kept, longer ones are cut
pub const MAX_LOG_LINE: usize = 128;

pub type LogLine = String<MAX_LOG_LINE>;

static LOG_BUFFER: Mutex<Deque<LogLine, MAX_LOG_ENTRIES>> = Mutex::new(Deque::new());
static LOG_COUNT: AtomicUsize = AtomicUsize::new(0);
static LOGGER: RingLogger = RingLogger;

struct RingLogger;

impl Log for RingLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let mut line = LogLine::new();
        // A full line just ends early
        let _ = write!(line, "[{}] {}", record.level(), record.args());

        let mut buffer = LOG_BUFFER.lock();
        if buffer.is_full() {
            buffer.pop_front();
        }
        let _ = buffer.push_back(line);
        LOG_COUNT.fetch_add(1, Ordering::SeqCst);
    }

    fn flush(&self) {}
}

/// Install the ring buffer as the `log` backend.
///
/// Only the first call installs it; later calls just change the level.
pub fn init(level: LevelFilter) {
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level);
}

/// Copy of the records currently held, oldest first
pub fn entries() -> Vec<LogLine, MAX_LOG_ENTRIES> {
    LOG_BUFFER.lock().iter().cloned().collect()
}

/// Number of records logged since start, including dropped ones
pub fn log_count() -> usize {
    LOG_COUNT.load(Ordering::SeqCst)
}
