use crate::session::MatchRecord;
use crate::session::Snapshot;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc::*;
use uuid::Uuid;

/// One write to the durable mirror.
#[derive(Debug, Clone, PartialEq)]
pub enum Mirroring {
    /// Replace the stored current session.
    Save(Snapshot),
    /// Remove the stored current session if it is this one.
    Clear(Uuid),
    /// Append a finished match to the history.
    Archive(MatchRecord),
}

impl std::fmt::Display for Mirroring {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Save(s) => write!(f, "save {}", s.id),
            Self::Clear(id) => write!(f, "clear {}", id),
            Self::Archive(r) => write!(f, "archive {}", r.id),
        }
    }
}

/// Best-effort external copy of session state and match history.
/// Never read back as the source of truth.
#[async_trait::async_trait]
pub trait Mirror: Send {
    async fn save(&mut self, snapshot: &Snapshot) -> anyhow::Result<()>;
    async fn clear(&mut self, id: Uuid) -> anyhow::Result<()>;
    async fn archive(&mut self, record: &MatchRecord) -> anyhow::Result<()>;
}

/// Runs a Mirror in its own task. Failures are logged and dropped.
pub struct Courier {
    mirror: Box<dyn Mirror>,
    getter: UnboundedReceiver<Mirroring>,
}

impl Courier {
    pub fn spawn(mirror: Box<dyn Mirror>) -> UnboundedSender<Mirroring> {
        let (tx, rx) = unbounded_channel();
        let courier = Self { mirror, getter: rx };
        tokio::spawn(courier.run());
        tx
    }
    async fn run(mut self) {
        while let Some(write) = self.getter.recv().await {
            log::trace!("[courier] {}", write);
            let result = match write {
                Mirroring::Save(ref snapshot) => self.mirror.save(snapshot).await,
                Mirroring::Clear(id) => self.mirror.clear(id).await,
                Mirroring::Archive(ref record) => self.mirror.archive(record).await,
            };
            if let Err(e) = result {
                log::warn!("[courier] {} failed: {:#}", write, e);
            }
        }
        log::debug!("[courier] closed");
    }
}

/// Mirror on the local filesystem: `current.json` holds the session in
/// progress and `history.jsonl` gets one line per finished match.
#[derive(Debug, Clone)]
pub struct Journal {
    root: PathBuf,
}

impl Journal {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
    pub fn current(&self) -> PathBuf {
        self.root.join("current.json")
    }
    pub fn history(&self) -> PathBuf {
        self.root.join("history.jsonl")
    }
    /// The stored current session, if any.
    pub async fn load(&self) -> anyhow::Result<Option<Snapshot>> {
        match tokio::fs::read_to_string(self.current()).await {
            Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
    /// Every archived match, oldest first.
    pub async fn records(&self) -> anyhow::Result<Vec<MatchRecord>> {
        match tokio::fs::read_to_string(self.history()).await {
            Ok(lines) => lines
                .lines()
                .filter(|l| !l.trim().is_empty())
                .map(|l| serde_json::from_str(l).map_err(anyhow::Error::from))
                .collect(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait::async_trait]
impl Mirror for Journal {
    async fn save(&mut self, snapshot: &Snapshot) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        let temp = self.root.join("current.json.tmp");
        tokio::fs::write(&temp, serde_json::to_vec_pretty(snapshot)?).await?;
        tokio::fs::rename(&temp, self.current()).await?;
        Ok(())
    }
    async fn clear(&mut self, id: Uuid) -> anyhow::Result<()> {
        match self.load().await? {
            Some(snapshot) if snapshot.id == id => {
                tokio::fs::remove_file(self.current()).await?;
                log::debug!("[journal] cleared {}", id);
                Ok(())
            }
            _ => Ok(()),
        }
    }
    async fn archive(&mut self, record: &MatchRecord) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.history())
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::GameKind;
    use crate::session::Session;
    use crate::session::TeamKey;

    fn root() -> PathBuf {
        std::env::temp_dir().join(format!("officegames-journal-{}", Uuid::now_v7()))
    }
    fn record(id: Uuid) -> MatchRecord {
        MatchRecord {
            version: crate::session::SCHEMA_VERSION,
            id,
            kind: GameKind::Singles,
            started: 1_000,
            ended: 61_000,
            versus: "1v1".into(),
            quality: 0.447,
            winner: TeamKey::A,
            points: [11, 3],
            players: Vec::new(),
        }
    }

    #[tokio::test]
    async fn save_and_clear_current() {
        let mut journal = Journal::new(root());
        let session = Session::new(GameKind::Singles);
        let snapshot = Snapshot::from(&session);
        journal.save(&snapshot).await.unwrap();
        assert_eq!(journal.load().await.unwrap(), Some(snapshot.clone()));
        journal.clear(Uuid::now_v7()).await.unwrap();
        assert!(journal.load().await.unwrap().is_some());
        journal.clear(snapshot.id).await.unwrap();
        assert!(journal.load().await.unwrap().is_none());
        journal.clear(snapshot.id).await.unwrap();
        std::fs::remove_dir_all(journal.root).unwrap();
    }
    #[tokio::test]
    async fn archive_appends() {
        let mut journal = Journal::new(root());
        assert!(journal.records().await.unwrap().is_empty());
        let (a, b) = (Uuid::now_v7(), Uuid::now_v7());
        journal.archive(&record(a)).await.unwrap();
        journal.archive(&record(b)).await.unwrap();
        let records = journal.records().await.unwrap();
        assert_eq!(records.iter().map(|r| r.id).collect::<Vec<_>>(), vec![a, b]);
        std::fs::remove_dir_all(journal.root).unwrap();
    }
    #[tokio::test]
    async fn courier_survives_failures() {
        let path = root();
        std::fs::write(&path, b"not a directory").unwrap();
        let courier = Courier::spawn(Box::new(Journal::new(path.join("inner"))));
        courier.send(Mirroring::Archive(record(Uuid::now_v7()))).unwrap();
        courier.send(Mirroring::Clear(Uuid::now_v7())).unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(!courier.is_closed());
        std::fs::remove_file(path).unwrap();
    }
}
