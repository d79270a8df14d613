use crate::report::{error_write, Error};
use std::fmt::{Arguments, Result, Write};

/// Append-only output buffer that compiled directives are written to.
///
/// Wraps the underlying buffer so that every visitor writes through the same
/// error conversion.
pub struct Pipe<'buffer> {
    buffer: &'buffer mut (dyn Write + 'buffer),
}

impl<'buffer> Pipe<'buffer> {
    /// Create a new Pipe that writes to the given buffer.
    pub fn new(buffer: &'buffer mut String) -> Self {
        Self { buffer }
    }

    /// Append the given text.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the underlying write fails.
    #[inline]
    pub fn push(&mut self, text: &str) -> std::result::Result<(), Error> {
        self.buffer.write_str(text).map_err(|_| error_write())
    }

    /// Append formatted text, as produced by [`format_args!`].
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the underlying write fails.
    #[inline]
    pub fn push_fmt(&mut self, args: Arguments<'_>) -> std::result::Result<(), Error> {
        self.buffer.write_fmt(args).map_err(|_| error_write())
    }

    /// Append a newline followed by two spaces for every level of `depth`.
    pub fn push_indent(&mut self, depth: usize) -> std::result::Result<(), Error> {
        self.push("\n")?;
        for _ in 0..depth {
            self.push("  ")?;
        }

        Ok(())
    }
}

impl Write for Pipe<'_> {
    #[inline]
    fn write_str(&mut self, s: &str) -> Result {
        Write::write_str(self.buffer, s)
    }

    #[inline]
    fn write_char(&mut self, c: char) -> Result {
        Write::write_char(self.buffer, c)
    }

    #[inline]
    fn write_fmt(&mut self, args: Arguments<'_>) -> Result {
        Write::write_fmt(self.buffer, args)
    }
}
