use super::*;
use tokio::sync::mpsc::*;

/// Consumer of lifecycle notifications: a chat channel, a display, a log.
#[async_trait::async_trait]
pub trait Listener: Send {
    async fn notify(&mut self, notification: &Notification);
}

/// Runs a Listener in its own task so a slow consumer never stalls the engine.
pub struct Herald {
    id: usize,
    listener: Box<dyn Listener>,
    getter: UnboundedReceiver<Notification>,
}

impl Herald {
    pub fn spawn(id: usize, listener: Box<dyn Listener>) -> UnboundedSender<Notification> {
        let (tx, rx) = unbounded_channel();
        let herald = Self {
            id,
            listener,
            getter: rx,
        };
        tokio::spawn(herald.run());
        tx
    }
    async fn run(mut self) {
        while let Some(ref notification) = self.getter.recv().await {
            log::trace!("[herald L{}] received {}", self.id, notification);
            self.listener.notify(notification).await;
        }
        log::debug!("[herald L{}] closed", self.id);
    }
}

/// Every party listening to the engine.
#[derive(Debug, Default)]
pub struct Audience {
    senders: Vec<UnboundedSender<Notification>>,
}

impl Audience {
    /// Spawns a herald for the listener.
    pub fn join<L>(&mut self, listener: L)
    where
        L: Listener + 'static,
    {
        self.senders
            .push(Herald::spawn(self.senders.len(), Box::new(listener)));
    }
    /// Raw feed of notifications, for consumers that poll.
    pub fn tap(&mut self) -> UnboundedReceiver<Notification> {
        let (tx, rx) = unbounded_channel();
        self.senders.push(tx);
        rx
    }
    pub fn len(&self) -> usize {
        self.senders.len()
    }
    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }
    pub fn broadcast(&self, notification: Notification) {
        log::debug!("[audience] broadcast: {}", notification);
        self.senders.iter().enumerate().for_each(|(i, inbox)| {
            if let Err(e) = inbox.send(notification.clone()) {
                log::warn!("[audience] broadcast to L{} failed: {:?}", i, e);
            }
        });
    }
}

/// Writes every notification to the log.
#[derive(Debug, Default)]
pub struct Console;

#[async_trait::async_trait]
impl Listener for Console {
    async fn notify(&mut self, notification: &Notification) {
        match notification {
            Notification::UnregisteredCard { .. }
            | Notification::RegistrationConflict { .. }
            | Notification::RegistrationExpired { .. } => log::warn!("[console] {}", notification),
            Notification::PointRefused { .. } => log::debug!("[console] {}", notification),
            _ => log::info!("[console] {}", notification),
        }
    }
}
