use super::*;
use crate::cards::Card;
use crate::session::Snapshot;
use crate::session::TeamKey;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::oneshot;

/// Cloneable entry point into a running arena.
/// Producers (readers, buttons, the watchdog) only ever hold one of these.
#[derive(Debug, Clone)]
pub struct Handle {
    sender: UnboundedSender<Command>,
}

impl Handle {
    pub fn new(sender: UnboundedSender<Command>) -> Self {
        Self { sender }
    }
    pub fn read_card(&self, slot: TeamKey, card: Card) -> anyhow::Result<()> {
        self.send(Command::Read { slot, card })
    }
    pub fn add_point(&self, team: TeamKey) -> anyhow::Result<()> {
        self.send(Command::Point(team))
    }
    pub fn remove_point(&self, team: TeamKey) -> anyhow::Result<()> {
        self.send(Command::Unpoint(team))
    }
    pub fn sweep(&self) -> anyhow::Result<()> {
        self.send(Command::Sweep)
    }
    pub fn stop(&self) -> anyhow::Result<()> {
        self.send(Command::Stop)
    }
    /// Snapshot of the session after every command queued before this call.
    pub async fn current_session(&self) -> anyhow::Result<Snapshot> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Peek(tx))?;
        Ok(rx.await?)
    }
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
    fn send(&self, command: Command) -> anyhow::Result<()> {
        self.sender
            .send(command)
            .map_err(|e| anyhow::anyhow!("arena stopped, dropped {}", e.0))
    }
}
