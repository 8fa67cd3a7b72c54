use std::io::Write;

use crossterm::{cursor, queue, style, terminal};

/// Raw-mode terminal with queued ANSI output. Construction switches the
/// terminal into raw mode and requests an underline cursor; dropping the
/// screen restores cooked mode and default attributes no matter how the
/// editor exits.
pub struct Screen {
    out: std::io::Stdout,
}

impl Screen {
    /// # Errors
    ///
    /// Returns an error if raw mode cannot be enabled.
    pub fn new() -> std::io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut out = std::io::stdout();
        queue!(out, cursor::SetCursorStyle::BlinkingUnderScore)?;
        Ok(Self { out })
    }

    /// Current terminal geometry, with one row reserved for the status bar.
    ///
    /// # Errors
    ///
    /// Returns an error if the window-size query fails.
    pub fn size(&self) -> std::io::Result<editor_state::document::ViewSize> {
        let (cols, rows) = terminal::size()?;
        Ok(editor_state::document::ViewSize {
            cols: cols as usize,
            rows: (rows as usize).saturating_sub(1),
        })
    }

    pub fn goto(&mut self, col: usize, row: usize) -> std::io::Result<()> {
        queue!(self.out, cursor::MoveTo(col as u16, row as u16))
    }

    pub fn put(&mut self, text: &str) -> std::io::Result<()> {
        queue!(self.out, style::Print(text))
    }

    /// Raw bytes straight to the terminal; line content is arbitrary bytes,
    /// not necessarily UTF-8.
    pub fn put_bytes(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        self.out.write_all(bytes)
    }

    pub fn clear_to_eol(&mut self) -> std::io::Result<()> {
        queue!(self.out, terminal::Clear(terminal::ClearType::UntilNewLine))
    }

    pub fn clear_below(&mut self) -> std::io::Result<()> {
        queue!(self.out, terminal::Clear(terminal::ClearType::FromCursorDown))
    }

    pub fn text_style(&mut self) -> std::io::Result<()> {
        queue!(self.out, style::SetAttribute(style::Attribute::Reset))
    }

    pub fn select_style(&mut self) -> std::io::Result<()> {
        queue!(
            self.out,
            style::SetAttribute(style::Attribute::Reverse),
            style::SetAttribute(style::Attribute::Bold)
        )
    }

    pub fn status_style(&mut self) -> std::io::Result<()> {
        queue!(
            self.out,
            style::SetAttribute(style::Attribute::Bold),
            style::SetAttribute(style::Attribute::Reverse)
        )
    }

    pub fn bell(&mut self) -> std::io::Result<()> {
        self.out.write_all(b"\x07")
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.out.flush()
    }

    /// Orderly exit: park the cursor below the text area and reset
    /// attributes before raw mode is dropped.
    pub fn shutdown(&mut self, view: editor_state::document::ViewSize) -> std::io::Result<()> {
        self.goto(0, view.rows + 1)?;
        self.text_style()?;
        self.clear_to_eol()?;
        self.flush()
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        // Best effort: leave the terminal usable even on a panic path.
        let _ = queue!(
            self.out,
            style::SetAttribute(style::Attribute::Reset),
            cursor::SetCursorStyle::DefaultUserShape
        );
        let _ = self.out.flush();
        let _ = terminal::disable_raw_mode();
    }
}
