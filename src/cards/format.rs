use super::*;

/// Single-character tag a serial reader prefixes to every uid line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// `U`: EM4200 and compatible (5551/Q5, 5567) read-only 125 kHz tags.
    /// The uid is 5 bytes (10 hex digits: revision, vendor, 4-byte id).
    Em4200,
}

impl Format {
    pub fn tag(&self) -> char {
        match self {
            Self::Em4200 => 'U',
        }
    }
    pub fn kind(&self) -> Kind {
        match self {
            Self::Em4200 => Kind::Rfid,
        }
    }
    /// Re-encodes the hex digits following the tag into a card.
    /// Returns None when the digits are not hex or overflow 64 bits.
    pub fn decode(&self, digits: &str) -> Option<Card> {
        let swapped = swap_nibbles(digits.trim());
        match swapped.is_empty() {
            true => None,
            false => u64::from_str_radix(&swapped, 16)
                .ok()
                .map(|n| Card::new(self.kind(), n.to_string())),
        }
    }
}

impl TryFrom<char> for Format {
    type Error = char;
    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c {
            'U' => Ok(Self::Em4200),
            other => Err(other),
        }
    }
}

/// Swaps each adjacent pair of hex digits: `0102b0a5fd` → `10200b5adf`.
/// A trailing unpaired digit stays in place.
pub fn swap_nibbles(hex: &str) -> String {
    hex.chars()
        .collect::<Vec<_>>()
        .chunks(2)
        .flat_map(|pair| pair.iter().rev())
        .collect()
}
