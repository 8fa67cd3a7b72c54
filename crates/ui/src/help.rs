use editor_state::document::ViewSize;

use crate::input::{self, Input};
use crate::screen::Screen;

const SUMMARY: &[&str] = &[
    "Editor Command Summary",
    "======================",
    "",
    "<up>         Move one line up (*)         Ctrl+N  New editor",
    "<down>       Move one line down (*)       Ctrl+O  Open file",
    "<left>       Move one character left (*)  Ctrl+S  Save file",
    "<right>      Move one character right (*) Ctrl+W  Close file",
    "<pgup>       Move one page up (*)         Ctrl+Q  Quit",
    "<pgdn>       Move one page down (*)       Ctrl+P  Pipe command",
    "Ctrl+<left>  Move to previous word (*)    Ctrl+A  Select all",
    "Ctrl+<right> Move to next word (*)        Ctrl+C  Copy selection to clipboard",
    "<home>       Move to start of line (*)    Ctrl+X  Cut selection to clipboard",
    "<end>        Move to end of line (*)      Ctrl+V  Paste from clipboard",
    "Ctrl+<home>  Move to start of file (*)    Ctrl+Z  Undo",
    "Ctrl+<end>   Move to end of file (*)      Ctrl+R  Redo",
    "<backspace>  Delete previous character    Ctrl+F  Find text",
    "<delete>     Delete current character     Ctrl+G  Find next",
    "Shift+<tab>  Next editor                  Ctrl+L  Goto line",
    "Ctrl+<tab>   Previous editor              F1      Help",
    "                                          F3      Navigate to file",
    "(*) Extends selection if combined         F5      Redraw screen",
    "    with Shift",
];

/// Replaces the screen with the key summary and waits for any key.
///
/// # Errors
///
/// Returns an error if terminal I/O fails.
pub fn show(screen: &mut Screen, _view: ViewSize) -> std::io::Result<()> {
    screen.goto(0, 0)?;
    screen.text_style()?;
    screen.clear_below()?;

    for line in SUMMARY {
        screen.put(line)?;
        screen.put("\r\n")?;
    }
    screen.put("\r\nPress any key to continue...")?;
    screen.flush()?;

    loop {
        if matches!(input::read_input()?, Input::Key(_)) {
            return Ok(());
        }
    }
}
