/// Shift/ctrl state attached to a navigation key. Shift extends the
/// selection; ctrl upgrades the motion (word step, document top/bottom).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Mods {
    pub shift: bool,
    pub ctrl: bool,
}

impl Mods {
    pub const NONE: Mods = Mods {
        shift: false,
        ctrl: false,
    };
    pub const SHIFT: Mods = Mods {
        shift: true,
        ctrl: false,
    };
    pub const CTRL: Mods = Mods {
        shift: false,
        ctrl: true,
    };
}

/// One decoded keystroke. The terminal backend translates its raw events
/// into these; the dispatch loop consumes nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Printable byte in `0x20..=0x7F`.
    Char(u8),
    /// Ctrl plus a letter, carried as the lowercase letter.
    Ctrl(char),
    Enter,
    Tab,
    BackTab,
    CtrlTab,
    Backspace,
    Delete,
    Insert,
    Escape,
    Up(Mods),
    Down(Mods),
    Left(Mods),
    Right(Mods),
    Home(Mods),
    End(Mods),
    PageUp(Mods),
    PageDown(Mods),
    /// Function key by number.
    F(u8),
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mods_constants() {
        assert_eq!(Mods::default(), Mods::NONE);
        assert!(Mods::SHIFT.shift && !Mods::SHIFT.ctrl);
        assert!(Mods::CTRL.ctrl && !Mods::CTRL.shift);
    }

    #[test]
    fn test_keys_compare_by_modifier() {
        assert_ne!(Key::Up(Mods::NONE), Key::Up(Mods::SHIFT));
        assert_eq!(Key::Ctrl('s'), Key::Ctrl('s'));
    }
}
