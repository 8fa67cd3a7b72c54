use editor_state::document::{Document, ViewSize};

use crate::input::{self, Input};
use crate::screen::Screen;

/// Line editor on the status row: `msg` followed by the reply being typed,
/// pre-filled from the current selection. Enter confirms, Esc cancels, and
/// an empty reply counts as a cancel.
///
/// # Errors
///
/// Returns an error if terminal I/O fails.
pub fn prompt(
    screen: &mut Screen,
    doc: &Document,
    view: ViewSize,
    msg: &str,
) -> std::io::Result<Option<String>> {
    screen.goto(0, view.rows)?;
    screen.status_style()?;
    screen.put(msg)?;
    screen.clear_to_eol()?;

    let maxlen = view.cols.saturating_sub(msg.len() + 1);
    let mut reply = doc
        .selected_text()
        .map(|text| String::from_utf8_lossy(&text).into_owned())
        .unwrap_or_default();
    reply.truncate(maxlen);
    screen.put(&reply)?;

    loop {
        screen.flush()?;
        match input::read_input()? {
            Input::Key(editor_core::key::Key::Escape) => return Ok(None),
            Input::Key(editor_core::key::Key::Enter) => {
                return Ok(if reply.is_empty() { None } else { Some(reply) });
            }
            Input::Key(editor_core::key::Key::Backspace) => {
                if reply.pop().is_some() {
                    screen.put("\x08 \x08")?;
                }
            }
            Input::Key(editor_core::key::Key::Char(ch)) => {
                if reply.len() < maxlen {
                    reply.push(ch as char);
                    screen.put_bytes(&[ch])?;
                }
            }
            _ => {}
        }
    }
}

/// Yes/no confirmation on the status row; only `y`/`Y` confirms.
///
/// # Errors
///
/// Returns an error if terminal I/O fails.
pub fn ask(screen: &mut Screen, view: ViewSize, msg: &str) -> std::io::Result<bool> {
    message(screen, view, msg)?;
    loop {
        if let Input::Key(key) = input::read_input()? {
            return Ok(matches!(
                key,
                editor_core::key::Key::Char(b'y') | editor_core::key::Key::Char(b'Y')
            ));
        }
    }
}

/// Transient message over the status row; it stays until the next repaint.
///
/// # Errors
///
/// Returns an error if terminal I/O fails.
pub fn message(screen: &mut Screen, view: ViewSize, text: &str) -> std::io::Result<()> {
    screen.goto(0, view.rows)?;
    screen.status_style()?;
    screen.put(text)?;
    screen.clear_to_eol()?;
    screen.text_style()?;
    screen.flush()
}
