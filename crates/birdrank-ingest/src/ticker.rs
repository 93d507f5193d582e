//! Progress ticker shared by concurrent enrichment tasks
//!
//! Prints one `.` every `print_every` ticks and starts a new line of markers every
//! `print_every * group_size` ticks. Markers follow the counter, not the order in which
//! tasks finish.

use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use tracing::debug;

pub const DEFAULT_PRINT_EVERY: usize = 1;
pub const DEFAULT_GROUP_SIZE: usize = 100;

const MARKER: &[u8] = b".";
const LINE_BREAK: &[u8] = b"\n";

/// Thread-safe progress counter
pub struct Ticker<W: Write + Send = io::Stderr> {
    print_every: usize,
    line_after: usize,
    current: AtomicUsize,
    sink: Mutex<W>,
}

impl Ticker<io::Stderr> {
    /// Ticker printing to stderr
    pub fn new(print_every: usize, group_size: usize) -> Self {
        Self::with_sink(print_every, group_size, io::stderr())
    }
}

impl Default for Ticker<io::Stderr> {
    fn default() -> Self {
        Self::new(DEFAULT_PRINT_EVERY, DEFAULT_GROUP_SIZE)
    }
}

impl<W: Write + Send> Ticker<W> {
    /// Ticker printing to `sink`; zero arguments are raised to one
    pub fn with_sink(print_every: usize, group_size: usize, sink: W) -> Self {
        let print_every = print_every.max(1);
        Self {
            print_every,
            line_after: print_every * group_size.max(1),
            current: AtomicUsize::new(0),
            sink: Mutex::new(sink),
        }
    }

    /// Count one finished item, printing a marker when the counter crosses a threshold
    pub fn tick(&self) {
        let current = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        if current % self.print_every != 0 {
            return;
        }

        let line_break = current > 1 && current % self.line_after == 1;
        let mut sink = match self.sink.lock() {
            Ok(sink) => sink,
            Err(poisoned) => poisoned.into_inner(),
        };
        let written = if line_break {
            sink.write_all(LINE_BREAK)
                .and_then(|_| sink.write_all(MARKER))
        } else {
            sink.write_all(MARKER)
        };
        if let Err(e) = written.and_then(|_| sink.flush()) {
            debug!(error = %e, "Failed to write progress marker");
        }
    }

    /// Ticks counted so far
    pub fn count(&self) -> usize {
        self.current.load(Ordering::SeqCst)
    }

    /// Finish the current line of markers
    pub fn finish(&self) {
        let mut sink = match self.sink.lock() {
            Ok(sink) => sink,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(e) = sink.write_all(LINE_BREAK).and_then(|_| sink.flush()) {
            debug!(error = %e, "Failed to write progress line break");
        }
    }

    /// Take the sink back, e.g. to inspect what was printed
    pub fn into_sink(self) -> W {
        match self.sink.into_inner() {
            Ok(sink) => sink,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
