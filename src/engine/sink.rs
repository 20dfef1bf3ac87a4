//! Output sinks for scan notifications.
//!
//! The pipeline never writes to stdout directly; it is handed a `Sink`
//! at construction so output can be captured in tests.

use std::io::{self, Write};

use crossterm::{
    cursor::MoveTo,
    execute,
    terminal::{Clear, ClearType},
};
use tracing::warn;

/// Destination for human-readable scan output.
pub trait Sink {
    /// Write one chunk of text followed by a newline.
    fn emit(&mut self, text: &str);

    /// Wipe previously emitted output, if the medium supports it.
    fn clear(&mut self) {}
}

/// Terminal sink writing to standard output.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl Sink for StdoutSink {
    fn emit(&mut self, text: &str) {
        let mut out = io::stdout().lock();
        if let Err(e) = writeln!(out, "{text}") {
            warn!(error = %e, "Failed to write to stdout");
        }
    }

    fn clear(&mut self) {
        let mut out = io::stdout().lock();
        if let Err(e) = clear_screen(&mut out) {
            warn!(error = %e, "Failed to clear terminal");
        }
    }
}

/// Erase the screen and move the cursor home. crossterm picks the console
/// API or escape sequences depending on the terminal.
fn clear_screen<W: Write>(out: &mut W) -> io::Result<()> {
    execute!(out, Clear(ClearType::All), MoveTo(0, 0))
}

/// In-memory sink that records everything it is given.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    chunks: Vec<String>,
    clears: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every emitted chunk, in order.
    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    /// Number of times `clear` was requested.
    pub fn clears(&self) -> usize {
        self.clears
    }

    /// Everything emitted, as it would appear on a terminal.
    pub fn text(&self) -> String {
        self.chunks.iter().map(|c| format!("{c}\n")).collect()
    }
}

impl Sink for MemorySink {
    fn emit(&mut self, text: &str) {
        self.chunks.push(text.to_string());
    }

    // Keeps the history so tests can inspect both phases of a sorted scan.
    fn clear(&mut self) {
        self.clears += 1;
    }
}
