use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use editor_core::key::{Key, Mods};

/// What the main loop waits on: a decoded keystroke or a window resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Key(Key),
    Resize,
}

/// Blocks for the next keystroke or resize. Other terminal events (mouse,
/// focus, key release) are swallowed here.
///
/// # Errors
///
/// Returns an error if reading from the terminal fails.
pub fn read_input() -> std::io::Result<Input> {
    loop {
        match crossterm::event::read()? {
            Event::Key(ev) if ev.kind != KeyEventKind::Release => {
                return Ok(Input::Key(translate(ev)));
            }
            Event::Resize(..) => return Ok(Input::Resize),
            _ => {}
        }
    }
}

/// Maps a terminal key event onto the editor's abstract key codes,
/// carrying shift/ctrl through for the navigation keys.
fn translate(ev: KeyEvent) -> Key {
    let mods = Mods {
        shift: ev.modifiers.contains(KeyModifiers::SHIFT),
        ctrl: ev.modifiers.contains(KeyModifiers::CONTROL),
    };

    match ev.code {
        KeyCode::Char(c) => {
            if mods.ctrl {
                let c = c.to_ascii_lowercase();
                if c.is_ascii_lowercase() {
                    Key::Ctrl(c)
                } else {
                    Key::Unknown
                }
            } else if (' '..='\u{7f}').contains(&c) {
                Key::Char(c as u8)
            } else {
                Key::Unknown
            }
        }
        KeyCode::Enter => Key::Enter,
        KeyCode::Tab => {
            if mods.ctrl {
                Key::CtrlTab
            } else {
                Key::Tab
            }
        }
        KeyCode::BackTab => Key::BackTab,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Delete,
        KeyCode::Insert => Key::Insert,
        KeyCode::Esc => Key::Escape,
        KeyCode::Up => Key::Up(mods),
        KeyCode::Down => Key::Down(mods),
        KeyCode::Left => Key::Left(mods),
        KeyCode::Right => Key::Right(mods),
        KeyCode::Home => Key::Home(mods),
        KeyCode::End => Key::End(mods),
        KeyCode::PageUp => Key::PageUp(mods),
        KeyCode::PageDown => Key::PageDown(mods),
        KeyCode::F(n) => Key::F(n),
        _ => Key::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Key {
        translate(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn test_printable_characters_pass_through() {
        assert_eq!(key(KeyCode::Char('x'), KeyModifiers::NONE), Key::Char(b'x'));
        assert_eq!(
            key(KeyCode::Char('X'), KeyModifiers::SHIFT),
            Key::Char(b'X')
        );
        assert_eq!(key(KeyCode::Char(' '), KeyModifiers::NONE), Key::Char(b' '));
    }

    #[test]
    fn test_ctrl_letters_normalize_to_lowercase() {
        assert_eq!(
            key(KeyCode::Char('S'), KeyModifiers::CONTROL),
            Key::Ctrl('s')
        );
        assert_eq!(
            key(KeyCode::Char('q'), KeyModifiers::CONTROL),
            Key::Ctrl('q')
        );
    }

    #[test]
    fn test_arrow_keys_carry_modifiers() {
        assert_eq!(key(KeyCode::Up, KeyModifiers::NONE), Key::Up(Mods::NONE));
        assert_eq!(
            key(KeyCode::Left, KeyModifiers::SHIFT | KeyModifiers::CONTROL),
            Key::Left(Mods { shift: true, ctrl: true })
        );
        assert_eq!(key(KeyCode::End, KeyModifiers::CONTROL), Key::End(Mods::CTRL));
    }

    #[test]
    fn test_tab_variants() {
        assert_eq!(key(KeyCode::Tab, KeyModifiers::NONE), Key::Tab);
        assert_eq!(key(KeyCode::Tab, KeyModifiers::CONTROL), Key::CtrlTab);
        assert_eq!(key(KeyCode::BackTab, KeyModifiers::SHIFT), Key::BackTab);
    }

    #[test]
    fn test_non_ascii_input_is_ignored() {
        assert_eq!(key(KeyCode::Char('é'), KeyModifiers::NONE), Key::Unknown);
    }
}
