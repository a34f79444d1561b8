use super::*;
use crate::cards::Card;
use tokio::sync::mpsc::UnboundedSender;

/// Receiver of decoded reader events.
/// Every call is tagged with the physical label of the originating port.
pub trait ReaderListener: Send {
    /// A card was read.
    fn card(&mut self, label: &str, card: &Card);
    /// A reader produced something that is not a card.
    fn data(&mut self, label: &str, data: &str) {
        log::debug!("[reader {}] unrecognised data {:?}", label, data);
    }
}

/// Forwards every signal into a channel, for consumers living in another task.
impl ReaderListener for UnboundedSender<(String, Signal)> {
    fn card(&mut self, label: &str, card: &Card) {
        if let Err(e) = self.send((label.to_string(), Signal::Card(card.clone()))) {
            log::warn!("[reader {}] card dropped: {}", label, e);
        }
    }
    fn data(&mut self, label: &str, data: &str) {
        if let Err(e) = self.send((label.to_string(), Signal::Data(data.to_string()))) {
            log::warn!("[reader {}] data dropped: {}", label, e);
        }
    }
}
