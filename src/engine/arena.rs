use super::*;
use std::time::Duration;
use tokio::sync::mpsc::*;
use tokio::task::JoinHandle;

/// Async shell around the engine: the single consumer of the command queue.
pub struct Arena {
    engine: Engine,
    getter: UnboundedReceiver<Command>,
}

impl Arena {
    pub fn spawn(engine: Engine) -> (Handle, JoinHandle<()>) {
        let (tx, rx) = unbounded_channel();
        let arena = Self { engine, getter: rx };
        (Handle::new(tx), tokio::spawn(arena.run()))
    }
    async fn run(mut self) {
        log::info!("[arena] open, {}", self.engine.session());
        while let Some(command) = self.getter.recv().await {
            log::trace!("[arena] {}", command);
            match command {
                Command::Read { slot, card } => self.engine.read_card(slot, card).await,
                Command::Point(team) => self.engine.add_point(team).await,
                Command::Unpoint(team) => self.engine.remove_point(team).await,
                Command::Sweep => self.engine.sweep(),
                Command::Peek(reply) => {
                    if reply.send(self.engine.snapshot()).is_err() {
                        log::debug!("[arena] peek abandoned");
                    }
                }
                Command::Stop => break,
            }
        }
        log::info!("[arena] closed");
    }
    /// Queues a sweep every `every` until the arena goes away.
    pub fn watchdog(handle: Handle, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if handle.sweep().is_err() {
                    log::debug!("[watchdog] arena gone");
                    break;
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::Card;
    use crate::session::GameKind;
    use crate::session::TeamKey;
    use std::sync::Arc;
    use std::time::SystemTime;

    fn arena() -> (Handle, JoinHandle<()>, Arc<Manual>, UnboundedReceiver<Mirroring>) {
        let clock = Arc::new(Manual::new(SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000)));
        let ledger = Ledger::default();
        ledger.enroll(Card::nfc("00000001"), "ada".into()).unwrap();
        ledger.enroll(Card::nfc("00000002"), "bob".into()).unwrap();
        let (tx, writes) = unbounded_channel();
        let engine = Engine::new(
            GameKind::Singles,
            Timeouts::default(),
            ledger,
            clock.clone(),
            Audience::default(),
            tx,
        );
        let (handle, task) = Arena::spawn(engine);
        (handle, task, clock, writes)
    }

    #[tokio::test]
    async fn commands_apply_in_order() {
        let (handle, task, _, _) = arena();
        handle.read_card(TeamKey::A, Card::nfc("00000001")).unwrap();
        handle.read_card(TeamKey::B, Card::nfc("00000002")).unwrap();
        handle.add_point(TeamKey::B).unwrap();
        handle.add_point(TeamKey::B).unwrap();
        handle.remove_point(TeamKey::B).unwrap();
        let snapshot = handle.current_session().await.unwrap();
        assert!(snapshot.is_active());
        assert_eq!(snapshot.points(TeamKey::B), 1);
        assert_eq!(snapshot.serve, Some(TeamKey::B));
        assert_eq!(snapshot.players().count(), 2);
        handle.stop().unwrap();
        task.await.unwrap();
        assert!(handle.read_card(TeamKey::A, Card::nfc("00000001")).is_err());
        assert!(handle.current_session().await.is_err());
    }
    #[tokio::test]
    async fn clones_share_the_queue() {
        let (handle, task, _, _) = arena();
        let reader = handle.clone();
        let button = handle.clone();
        tokio::spawn(async move { reader.read_card(TeamKey::A, Card::nfc("00000001")) })
            .await
            .unwrap()
            .unwrap();
        button.add_point(TeamKey::A).unwrap();
        let snapshot = handle.current_session().await.unwrap();
        assert!(!snapshot.is_active());
        assert_eq!(snapshot.players().count(), 1);
        handle.stop().unwrap();
        task.await.unwrap();
    }
    #[tokio::test]
    async fn watchdog_sweeps() {
        let (handle, task, clock, mut writes) = arena();
        handle.read_card(TeamKey::A, Card::nfc("00000001")).unwrap();
        let id = handle.current_session().await.unwrap().id;
        clock.advance(Duration::from_secs(31));
        let watchdog = Arena::watchdog(handle.clone(), Duration::from_millis(5));
        let cleared = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                match writes.recv().await {
                    Some(Mirroring::Clear(cleared)) => break cleared,
                    Some(_) => continue,
                    None => panic!("mirror closed"),
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(cleared, id);
        handle.stop().unwrap();
        task.await.unwrap();
        tokio::time::timeout(Duration::from_secs(5), watchdog)
            .await
            .unwrap()
            .unwrap();
    }
}
