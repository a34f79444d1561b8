use super::*;
use crate::cards::Format;

const TERMINATOR: &[u8] = b"\r\n";
/// Longest line kept waiting for its terminator; beyond it the buffer is
/// flushed as unrecognised data.
pub const MAX_LINE: usize = 64;

/// Decoder for serial readers that write one tagged uid per `\r\n` line.
///
/// A line whose first character is a known format tag is re-encoded into a
/// card; every other line, including a known tag followed by garbage, is
/// reported as unrecognised data. Bytes after the last terminator stay
/// buffered until the rest of their line arrives, up to [`MAX_LINE`].
#[derive(Debug, Default)]
pub struct LineDecoder {
    buffer: Vec<u8>,
}

impl LineDecoder {
    /// Interprets one complete line, terminator excluded.
    pub fn line(line: &str) -> Signal {
        let mut chars = line.chars();
        chars
            .next()
            .and_then(|tag| Format::try_from(tag).ok())
            .and_then(|format| format.decode(chars.as_str()))
            .map(Signal::Card)
            .unwrap_or_else(|| Signal::Data(line.to_string()))
    }
    fn split(&mut self) -> Option<Vec<u8>> {
        let end = self
            .buffer
            .windows(TERMINATOR.len())
            .position(|w| w == TERMINATOR);
        match end {
            Some(end) => Some(self.buffer.drain(..end + TERMINATOR.len()).take(end).collect()),
            None if self.buffer.len() > MAX_LINE => {
                let half = usize::from(self.buffer.ends_with(&TERMINATOR[..1]));
                let end = self.buffer.len() - half;
                Some(self.buffer.drain(..end).collect())
            }
            None => None,
        }
    }
}

impl Decoder for LineDecoder {
    fn feed(&mut self, bytes: &[u8]) -> Vec<Signal> {
        self.buffer.extend_from_slice(bytes);
        std::iter::from_fn(|| self.split())
            .map(|line| Self::line(&String::from_utf8_lossy(&line)))
            .collect()
    }
}
