//! Per-file copy progress rendered as a single terminal line

use std::io::{self, Stdout, Write};

/// Number of segments in the rendered bar
const BAR_WIDTH: usize = 30;
/// Width of the blank run used to wipe the previous line
const CLEAR_WIDTH: usize = 80;

/// Writer wrapper that counts bytes against a known total and redraws a
/// progress line whenever the whole-number percentage changes.
///
/// Each copied file gets its own instance, so byte counts never mix between
/// concurrent copies. Only the display stream is shared.
pub struct ProgressWriter<W, D = Stdout> {
    inner: W,
    display: D,
    total: u64,
    written: u64,
    last_percent: Option<u8>,
    action: String,
    subject: String,
}

impl<W: Write> ProgressWriter<W> {
    /// Create a progress writer that draws to stdout
    pub fn new(inner: W, total: u64, action: impl Into<String>, subject: impl Into<String>) -> Self {
        Self::with_display(inner, io::stdout(), total, action, subject)
    }
}

impl<W: Write, D: Write> ProgressWriter<W, D> {
    /// Create a progress writer that draws to `display`
    pub fn with_display(
        inner: W,
        display: D,
        total: u64,
        action: impl Into<String>,
        subject: impl Into<String>,
    ) -> Self {
        Self {
            inner,
            display,
            total,
            written: 0,
            // Nothing is drawn until the percentage moves off 0, or at finish
            last_percent: if total > 0 { Some(0) } else { None },
            action: action.into(),
            subject: subject.into(),
        }
    }

    /// Bytes forwarded so far
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Current percentage, 100 for an empty total
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        let percent = (self.written as u128 * 100) / self.total as u128;
        percent.min(100) as u8
    }

    /// Draw the final state if it was never drawn and end the line
    pub fn finish(mut self) -> io::Result<(W, D)> {
        self.inner.flush()?;
        let percent = self.percent();
        if self.last_percent != Some(percent) {
            self.draw(percent)?;
        }
        self.display.write_all(b"\n")?;
        self.display.flush()?;
        Ok((self.inner, self.display))
    }

    fn draw(&mut self, percent: u8) -> io::Result<()> {
        let filled = BAR_WIDTH * percent as usize / 100;
        let bar = format!("{}{}", "=".repeat(filled), "-".repeat(BAR_WIDTH - filled));

        write!(self.display, "\r{}\r", " ".repeat(CLEAR_WIDTH))?;
        write!(
            self.display,
            "\r{} [{}] {}% {}",
            self.action, bar, percent, self.subject
        )?;
        self.display.flush()?;
        self.last_percent = Some(percent);
        Ok(())
    }
}

impl<W: Write, D: Write> Write for ProgressWriter<W, D> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.written += n as u64;

        let percent = self.percent();
        if self.last_percent != Some(percent) {
            self.draw(percent)?;
        }
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
