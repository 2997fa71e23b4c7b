use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing_subscriber::fmt::writer::OptionalWriter;

static TERMINAL_OWNED: AtomicBool = AtomicBool::new(false);

/// Log sink for the subscriber installed in `main`: stderr, except while the
/// rich terminal UI owns the screen, when events are dropped.
pub fn log_writer() -> OptionalWriter<io::Stderr> {
    if TERMINAL_OWNED.load(Ordering::Relaxed) {
        OptionalWriter::none()
    } else {
        OptionalWriter::some(io::stderr())
    }
}

/// Silences `log_writer` until dropped.
#[cfg_attr(coverage, allow(dead_code))]
pub(crate) struct TerminalLogPause;

impl TerminalLogPause {
    #[cfg_attr(coverage, allow(dead_code))]
    pub(crate) fn start() -> Self {
        TERMINAL_OWNED.store(true, Ordering::Relaxed);
        Self
    }
}

impl Drop for TerminalLogPause {
    fn drop(&mut self) {
        TERMINAL_OWNED.store(false, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod logging_tests {
    use super::*;
    use tracing_subscriber::fmt::writer::EitherWriter;

    #[test]
    fn logs_are_dropped_while_the_terminal_is_owned() {
        assert!(matches!(log_writer(), EitherWriter::A(_)));
        {
            let _pause = TerminalLogPause::start();
            assert!(matches!(log_writer(), EitherWriter::B(_)));
        }
        assert!(matches!(log_writer(), EitherWriter::A(_)));
    }
}
