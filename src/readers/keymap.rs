/// Meaning of a key-down scancode in the reader's US keyboard layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    /// Shift, control, alt and the like: consumed, never buffered.
    Modifier,
    /// Enter: ends a card uid.
    Enter,
}

/// Scancode of the Enter key.
pub const ENTER: u16 = 28;

/// Looks a scancode up in the layout table. Unknown codes map to None.
pub fn key(code: u16) -> Option<Key> {
    let c = match code {
        1 | 14 | 15 | 29 | 42 | 54 | 56 | 100 => return Some(Key::Modifier),
        ENTER => return Some(Key::Enter),
        2 => '1',
        3 => '2',
        4 => '3',
        5 => '4',
        6 => '5',
        7 => '6',
        8 => '7',
        9 => '8',
        10 => '9',
        11 => '0',
        12 => '-',
        13 => '=',
        16 => 'Q',
        17 => 'W',
        18 => 'E',
        19 => 'R',
        20 => 'T',
        21 => 'Y',
        22 => 'U',
        23 => 'I',
        24 => 'O',
        25 => 'P',
        26 => '[',
        27 => ']',
        30 => 'A',
        31 => 'S',
        32 => 'D',
        33 => 'F',
        34 => 'G',
        35 => 'H',
        36 => 'J',
        37 => 'K',
        38 => 'L',
        39 => ';',
        40 => '"',
        41 => '`',
        43 => '\\',
        44 => 'Z',
        45 => 'X',
        46 => 'C',
        47 => 'V',
        48 => 'B',
        49 => 'N',
        50 => 'M',
        51 => ',',
        52 => '.',
        53 => '/',
        _ => return None,
    };
    Some(Key::Char(c))
}
