use super::*;
use crate::CARD_LENGTH;
use crate::cards::Card;
use byteorder::NativeEndian;
use byteorder::ReadBytesExt;

/// `struct timeval` at the head of every input event (two C longs).
const TIMEVAL: usize = 2 * std::mem::size_of::<usize>();
/// Size of a Linux `struct input_event`: timeval, u16 type, u16 code, i32 value.
pub const EVENT_SIZE: usize = TIMEVAL + 8;
/// Input event type for key presses.
pub const EV_KEY: u16 = 1;
/// Key event value for a key going down (0 is up, 2 is auto-repeat).
pub const KEY_DOWN: i32 = 1;

/// Decoder for HID readers that type the card uid followed by Enter.
///
/// Raw bytes from the event device are reassembled into whole input events;
/// only key-down events are looked up in the keymap. Characters accumulate
/// until Enter, at which point the buffer is flushed: exactly
/// [`CARD_LENGTH`] characters make an NFC card, anything else is reported as
/// unrecognised data.
#[derive(Debug, Default)]
pub struct KeyDecoder {
    buffer: String,
    frame: Vec<u8>,
}

impl KeyDecoder {
    /// Applies one key-down scancode.
    pub fn press(&mut self, code: u16) -> Option<Signal> {
        match key(code)? {
            Key::Char(c) => {
                self.buffer.push(c);
                None
            }
            Key::Modifier => None,
            Key::Enter => Some(self.flush()),
        }
    }
    /// Characters typed since the last Enter.
    pub fn pending(&self) -> &str {
        &self.buffer
    }
    fn flush(&mut self) -> Signal {
        let text = std::mem::take(&mut self.buffer);
        match text.chars().count() == CARD_LENGTH {
            true => Signal::Card(Card::nfc(text)),
            false => Signal::Data(text),
        }
    }
}

impl Decoder for KeyDecoder {
    fn feed(&mut self, bytes: &[u8]) -> Vec<Signal> {
        self.frame.extend_from_slice(bytes);
        let whole = self.frame.len() / EVENT_SIZE * EVENT_SIZE;
        let frames = self.frame.drain(..whole).collect::<Vec<u8>>();
        frames
            .chunks_exact(EVENT_SIZE)
            .filter_map(event)
            .filter(|&(kind, _, value)| kind == EV_KEY && value == KEY_DOWN)
            .filter_map(|(_, code, _)| self.press(code))
            .collect()
    }
}

/// (type, code, value) of one raw input event.
fn event(frame: &[u8]) -> Option<(u16, u16, i32)> {
    let mut cursor = frame.get(TIMEVAL..)?;
    let kind = cursor.read_u16::<NativeEndian>().ok()?;
    let code = cursor.read_u16::<NativeEndian>().ok()?;
    let value = cursor.read_i32::<NativeEndian>().ok()?;
    Some((kind, code, value))
}
