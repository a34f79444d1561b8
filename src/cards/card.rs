use serde::Deserialize;
use serde::Serialize;

/// Radio technology of an identity card.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    /// 13.56 MHz cards read by keyboard-emulating HID readers.
    Nfc,
    /// 125 kHz cards read by serial readers.
    Rfid,
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Nfc => write!(f, "nfc"),
            Self::Rfid => write!(f, "rfid"),
        }
    }
}

impl TryFrom<&str> for Kind {
    type Error = String;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.trim().to_lowercase().as_str() {
            "nfc" => Ok(Self::Nfc),
            "rfid" => Ok(Self::Rfid),
            other => Err(format!("unknown card kind {}", other)),
        }
    }
}

/// An identity card as seen by a reader.
///
/// Two cards are the same card iff both kind and uid match; the same uid
/// string on different radio technologies names different cards.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Card {
    kind: Kind,
    uid: String,
}

impl Card {
    pub fn new(kind: Kind, uid: impl Into<String>) -> Self {
        Self {
            kind,
            uid: uid.into(),
        }
    }
    pub fn nfc(uid: impl Into<String>) -> Self {
        Self::new(Kind::Nfc, uid)
    }
    pub fn rfid(uid: impl Into<String>) -> Self {
        Self::new(Kind::Rfid, uid)
    }
    pub fn kind(&self) -> Kind {
        self.kind
    }
    pub fn uid(&self) -> &str {
        &self.uid
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.uid)
    }
}

/// str isomorphism, `kind:uid`
impl TryFrom<&str> for Card {
    type Error = String;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.trim().split_once(':') {
            Some((_, uid)) if uid.is_empty() => Err("empty uid".into()),
            Some((kind, uid)) => Ok(Self::new(Kind::try_from(kind)?, uid)),
            None => Err("expected kind:uid".into()),
        }
    }
}
