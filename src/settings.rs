//! Station configuration from `OG_*` environment variables.
use crate::engine::Timeouts;
use crate::readers::Protocol;
use crate::session::GameKind;
use crate::session::TeamKey;
use anyhow::Context;
use std::path::PathBuf;
use std::time::Duration;

/// Everything a station needs to run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub kind: GameKind,
    pub timeouts: Timeouts,
    pub vendor: String,
    pub product: String,
    /// Serial number pinning a single reader.
    pub serial: Option<String>,
    pub protocol: Protocol,
    /// Physical label of each reader and the team it plays for.
    pub stations: Vec<(String, TeamKey)>,
    pub ledger: PathBuf,
    pub journal: PathBuf,
    pub sysfs: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            kind: GameKind::Singles,
            timeouts: Timeouts::default(),
            vendor: "0xffff".to_string(),
            product: "0x0035".to_string(),
            serial: None,
            protocol: Protocol::Keystream,
            stations: Vec::new(),
            ledger: PathBuf::from("ledger.json"),
            journal: PathBuf::from("journal"),
            sysfs: PathBuf::from("/sys"),
        }
    }
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
    /// Reads settings through `get`, falling back to defaults for missing keys.
    pub fn from_lookup<F>(get: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let duration = |key: &str, default: Duration| -> anyhow::Result<Duration> {
            match get(key) {
                None => Ok(default),
                Some(s) => parse_duration(&s).with_context(|| format!("{}: bad duration {:?}", key, s)),
            }
        };
        Ok(Self {
            kind: match get("OG_GAME_KIND") {
                Some(s) => GameKind::try_from(s.as_str()).map_err(anyhow::Error::msg)?,
                None => defaults.kind,
            },
            timeouts: Timeouts {
                card_registration: duration(
                    "OG_GAME_CARD_REGISTRATION_TIMEOUT",
                    defaults.timeouts.card_registration,
                )?,
                lobby: duration(
                    "OG_GAME_PLAYER_REGISTRATION_TIMEOUT",
                    defaults.timeouts.lobby,
                )?,
                session: duration("OG_GAME_SESSION_TIME", defaults.timeouts.session)?,
                watchdog: duration("OG_WATCHDOG_INTERVAL", defaults.timeouts.watchdog)?,
            },
            vendor: get("OG_READER_VENDOR_ID").unwrap_or(defaults.vendor),
            product: get("OG_READER_PRODUCT_ID").unwrap_or(defaults.product),
            serial: get("OG_READER_SERIAL").or(defaults.serial),
            protocol: match get("OG_READER_PROTOCOL") {
                Some(s) => Protocol::try_from(s.as_str()).map_err(anyhow::Error::msg)?,
                None => defaults.protocol,
            },
            stations: match get("OG_STATIONS") {
                Some(s) => parse_stations(&s).map_err(anyhow::Error::msg)?,
                None => defaults.stations,
            },
            ledger: get("OG_LEDGER").map(PathBuf::from).unwrap_or(defaults.ledger),
            journal: get("OG_JOURNAL").map(PathBuf::from).unwrap_or(defaults.journal),
            sysfs: get("OG_SYSFS").map(PathBuf::from).unwrap_or(defaults.sysfs),
        })
    }
    pub fn labels(&self) -> Vec<String> {
        self.stations.iter().map(|(label, _)| label.clone()).collect()
    }
    pub fn team(&self, label: &str) -> Option<TeamKey> {
        self.stations
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, team)| *team)
    }
}

/// Parses plain seconds or a number with an `s`, `m`, `h` or `d` suffix.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Ok(secs) = s.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }
    let (num, unit) = s.split_at(s.len().saturating_sub(1));
    let value: u64 = num.parse().ok()?;
    match unit {
        "s" => Some(Duration::from_secs(value)),
        "m" => Some(Duration::from_secs(value * 60)),
        "h" => Some(Duration::from_secs(value * 3600)),
        "d" => Some(Duration::from_secs(value * 86400)),
        _ => None,
    }
}

/// Parses `label=team` pairs separated by commas, e.g. `usb-1/input0=a,usb-2/input0=b`.
pub fn parse_stations(s: &str) -> Result<Vec<(String, TeamKey)>, String> {
    s.split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.rsplit_once('=') {
            Some((label, team)) if !label.trim().is_empty() => {
                Ok((label.trim().to_string(), TeamKey::try_from(team)?))
            }
            _ => Err(format!("expected label=team, got {}", pair)),
        })
        .collect()
}
