use crate::cards::Card;

/// Output of a decoder: a recognised card or a line it could not interpret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    Card(Card),
    Data(String),
}

/// Stateful translation of raw device bytes into signals.
/// One decoder per port; decoders never share state.
pub trait Decoder: Send {
    fn feed(&mut self, bytes: &[u8]) -> Vec<Signal>;
}

/// Wire protocol spoken by a family of readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// HID readers emulating a keyboard through the Linux input subsystem.
    Keystream,
    /// Serial readers writing one tagged uid per `\r\n` terminated line.
    Serial,
}

impl Protocol {
    pub fn decoder(&self) -> Box<dyn Decoder> {
        match self {
            Self::Keystream => Box::new(super::KeyDecoder::default()),
            Self::Serial => Box::new(super::LineDecoder::default()),
        }
    }
}

impl TryFrom<&str> for Protocol {
    type Error = String;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.trim().to_lowercase().as_str() {
            "keystream" | "hid" => Ok(Self::Keystream),
            "serial" => Ok(Self::Serial),
            other => Err(format!("unknown reader protocol {}", other)),
        }
    }
}
