//! Station Binary
//!
//! Discovers the card readers, runs the match engine with its watchdog and
//! relays every card read to the team its reader is mapped to. Exits
//! non-zero when a reader fails so a supervisor can restart the station.
use clap::Parser;
use officegames::cards::Card;
use officegames::engine::*;
use officegames::readers::*;
use officegames::settings::Settings;
use std::path::PathBuf;
use std::sync::Arc;

/// Command line overrides for the `OG_*` environment.
#[derive(Debug, Parser)]
#[command(name = "station", about = "Office games reader station")]
struct Args {
    /// singles or doubles
    #[arg(long)]
    kind: Option<String>,
    /// keystream or serial
    #[arg(long)]
    protocol: Option<String>,
    /// Reader USB vendor id, hex
    #[arg(long)]
    vendor: Option<String>,
    /// Reader USB product id, hex
    #[arg(long)]
    product: Option<String>,
    /// Reader serial number, pins a single reader
    #[arg(long)]
    serial: Option<String>,
    /// label=team pairs, comma separated
    #[arg(long)]
    stations: Option<String>,
    #[arg(long)]
    ledger: Option<PathBuf>,
    #[arg(long)]
    journal: Option<PathBuf>,
    #[arg(long)]
    sysfs: Option<PathBuf>,
}

impl Args {
    fn apply(self, mut settings: Settings) -> anyhow::Result<Settings> {
        if let Some(kind) = self.kind {
            settings.kind = kind.as_str().try_into().map_err(anyhow::Error::msg)?;
        }
        if let Some(protocol) = self.protocol {
            settings.protocol = protocol.as_str().try_into().map_err(anyhow::Error::msg)?;
        }
        if let Some(stations) = self.stations {
            settings.stations = officegames::settings::parse_stations(&stations).map_err(anyhow::Error::msg)?;
        }
        settings.vendor = self.vendor.unwrap_or(settings.vendor);
        settings.product = self.product.unwrap_or(settings.product);
        settings.serial = self.serial.or(settings.serial);
        settings.ledger = self.ledger.unwrap_or(settings.ledger);
        settings.journal = self.journal.unwrap_or(settings.journal);
        settings.sysfs = self.sysfs.unwrap_or(settings.sysfs);
        Ok(settings)
    }
}

/// Forwards card reads to the arena on the side their reader plays for.
struct Relay {
    handle: Handle,
    settings: Settings,
}

impl ReaderListener for Relay {
    fn card(&mut self, label: &str, card: &Card) {
        match self.settings.team(label) {
            Some(team) => {
                if let Err(e) = self.handle.read_card(team, card.clone()) {
                    log::warn!("[station] dropped {}: {}", card, e);
                }
            }
            None => log::warn!("[station] reader {} has no team", label),
        }
    }
}

fn discover(settings: &Settings) -> anyhow::Result<Vec<Port>> {
    let ports = match settings.protocol {
        Protocol::Keystream => Port::inputs(&settings.sysfs),
        Protocol::Serial => Port::serials(&settings.sysfs),
    };
    let found = match settings.serial {
        Some(ref serial) => vec![Port::locate(&ports, &settings.vendor, &settings.product, serial)?],
        None => Port::select(&ports, &settings.vendor, &settings.product, &settings.labels())?,
    };
    for port in found.iter() {
        match settings.team(port.label()) {
            Some(team) => log::info!("[station] {} plays for team {}", port, team),
            None => log::warn!("[station] {} is not mapped to a team", port),
        }
    }
    Ok(found)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    officegames::log()?;
    let settings = Args::parse().apply(Settings::from_env()?)?;
    log::info!("[station] {} with {:?}", settings.kind, settings.timeouts);
    let ports = discover(&settings)?;

    let mut audience = Audience::default();
    audience.join(Console);
    let engine = Engine::new(
        settings.kind,
        settings.timeouts,
        Ledger::open(&settings.ledger)?,
        Arc::new(System),
        audience,
        Courier::spawn(Box::new(Journal::new(settings.journal.clone()))),
    );
    let (handle, arena) = Arena::spawn(engine);
    let watchdog = Arena::watchdog(handle.clone(), settings.timeouts.watchdog);

    let mut readers = ReaderSession::new(ports, settings.protocol);
    readers.listen(Relay {
        handle: handle.clone(),
        settings: settings.clone(),
    });
    let (stop, stopped) = tokio::sync::oneshot::channel::<()>();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => log::warn!("[station] interrupt received, shutting down"),
            Err(e) => {
                log::error!("[station] cannot listen for interrupts: {}", e);
                std::future::pending::<()>().await;
            }
        }
        let _ = stop.send(());
    });
    let result = readers
        .connect(async move {
            let _ = stopped.await;
        })
        .await;

    if let Err(e) = handle.stop() {
        log::warn!("[station] {}", e);
    }
    arena.await?;
    watchdog.abort();
    result.map_err(anyhow::Error::from)
}
