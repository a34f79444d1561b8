use super::*;
use crate::READ_CHUNK;
use futures::StreamExt;
use futures::stream::BoxStream;
use std::future::Future;
use tokio::io::AsyncRead;
use tokio::io::AsyncReadExt;

/// Byte source behind a port: a [`DeviceFile`] on a live host.
pub type Device = Box<dyn AsyncRead + Unpin + Send>;

/// Bytes read from the device at one port index.
type Chunk = (usize, std::io::Result<Vec<u8>>);

/// A group of readers of the same protocol driven by one task.
///
/// Every port gets its own decoder, so a half-typed uid on one station never
/// bleeds into another. Decoded signals are dispatched to every listener
/// tagged with the port's physical label. Any transport failure ends the
/// whole session; reconnecting is left to whoever restarts it.
pub struct ReaderSession {
    ports: Vec<Port>,
    protocol: Protocol,
    listeners: Vec<Box<dyn ReaderListener>>,
}

impl ReaderSession {
    pub fn new(ports: Vec<Port>, protocol: Protocol) -> Self {
        Self {
            ports,
            protocol,
            listeners: Vec::new(),
        }
    }
    pub fn listen<L>(&mut self, listener: L)
    where
        L: ReaderListener + 'static,
    {
        self.listeners.push(Box::new(listener));
    }
    pub fn ports(&self) -> &[Port] {
        &self.ports
    }
    pub fn protocol(&self) -> Protocol {
        self.protocol
    }
}

impl ReaderSession {
    /// Opens every port and decodes until `stop` resolves or a reader fails.
    /// Devices are closed, and grabs released, before this returns.
    pub async fn connect<F>(self, stop: F) -> Result<(), ReaderError>
    where
        F: Future<Output = ()>,
    {
        let mut devices = Vec::with_capacity(self.ports.len());
        for port in self.ports.iter() {
            log::info!("[reader] opening {}", port);
            devices.push(Box::new(DeviceFile::connect(port, self.protocol)?) as Device);
        }
        self.drive(devices, stop).await
    }
    /// Decode loop over already opened devices, one per port in order.
    pub async fn drive<F>(mut self, devices: Vec<Device>, stop: F) -> Result<(), ReaderError>
    where
        F: Future<Output = ()>,
    {
        let mut decoders = self
            .ports
            .iter()
            .map(|_| self.protocol.decoder())
            .collect::<Vec<_>>();
        let mut chunks = futures::stream::select_all(devices.into_iter().enumerate().map(reads));
        tokio::pin!(stop);
        loop {
            tokio::select! {
                biased;
                _ = &mut stop => {
                    log::info!("[reader] stopping");
                    return Ok(());
                }
                next = chunks.next(), if !chunks.is_empty() => match next {
                    Some((i, Ok(bytes))) if bytes.is_empty() => {
                        return Err(ReaderError::Disconnected { label: self.label(i) });
                    }
                    Some((i, Ok(bytes))) => match decoders.get_mut(i) {
                        Some(decoder) => decoder
                            .feed(&bytes)
                            .into_iter()
                            .for_each(|signal| self.dispatch(i, signal)),
                        None => log::warn!("[reader] no port for device {}", i),
                    },
                    Some((i, Err(source))) => {
                        return Err(ReaderError::Io { label: self.label(i), source });
                    }
                    None => log::debug!("[reader] no devices left"),
                },
            }
        }
    }
    fn label(&self, index: usize) -> String {
        self.ports
            .get(index)
            .map(|port| port.label().to_string())
            .unwrap_or_else(|| format!("#{}", index))
    }
    fn dispatch(&mut self, index: usize, signal: Signal) {
        let label = self.label(index);
        match signal {
            Signal::Card(ref card) => {
                log::info!("[reader {}] card {}", label, card);
                self.listeners.iter_mut().for_each(|l| l.card(&label, card));
            }
            Signal::Data(ref data) => {
                log::warn!("[reader {}] unrecognised data {:?}", label, data);
                self.listeners.iter_mut().for_each(|l| l.data(&label, data));
            }
        }
    }
}

/// Endless stream of reads from one device; ends after the first error.
fn reads((index, device): (usize, Device)) -> BoxStream<'static, Chunk> {
    futures::stream::unfold(Some(device), move |state| async move {
        let mut device = state?;
        let mut buffer = vec![0u8; READ_CHUNK];
        match device.read(&mut buffer).await {
            Ok(n) => {
                buffer.truncate(n);
                Some(((index, Ok(buffer)), Some(device)))
            }
            Err(e) => Some(((index, Err(e)), None)),
        }
    })
    .boxed()
}
