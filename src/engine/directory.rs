use crate::cards::Card;
use crate::session::Identity;
use crate::session::Profile;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::time::SystemTime;

/// A request, made outside the station, to bind the next read of a card to an identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pending {
    pub card: Card,
    pub identity: Identity,
    pub requested: SystemTime,
}

/// Failures of the identity resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// No identity is bound to the card.
    Unregistered(Card),
    /// The card is already bound to someone else.
    Conflict { card: Card, owner: Identity },
    /// The backing store failed.
    Unavailable(String),
}

impl std::fmt::Display for DirectoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Unregistered(card) => write!(f, "card {} is not registered", card),
            Self::Conflict { card, owner } => write!(f, "card {} belongs to {}", card, owner),
            Self::Unavailable(reason) => write!(f, "directory unavailable: {}", reason),
        }
    }
}

impl std::error::Error for DirectoryError {}

/// Identity resolver and player statistics store.
#[async_trait::async_trait]
pub trait Directory: Send {
    /// The profile bound to a card.
    async fn resolve(&self, card: &Card) -> Result<Profile, DirectoryError>;
    /// The outstanding registration request for a card, if any.
    async fn pending(&self, card: &Card) -> Result<Option<Pending>, DirectoryError>;
    /// Drops the registration request for a card.
    async fn dismiss(&mut self, card: &Card) -> Result<(), DirectoryError>;
    /// Binds a card to an identity, creating the profile on first registration.
    async fn bind(&mut self, card: &Card, identity: &Identity) -> Result<Profile, DirectoryError>;
    /// Stores the statistics of a profile after a match. Bound cards are left as stored.
    async fn record(&mut self, profile: &Profile) -> Result<(), DirectoryError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Book {
    profiles: BTreeMap<Identity, Profile>,
    pending: Vec<Pending>,
    /// Modification time and length of the file this book was last synced with.
    #[serde(skip)]
    stamp: Option<(SystemTime, u64)>,
}

impl Book {
    fn owner(&self, card: &Card) -> Option<&Profile> {
        self.profiles.values().find(|p| p.owns(card))
    }
}

/// In-process directory, optionally persisted as one JSON file.
///
/// Clones share the same book. With a file, every operation first reloads
/// the book if the file changed since it was last read or written, so other
/// processes can file registration requests while a station is running.
/// Every change is written back through a temporary file and a rename.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    book: Arc<Mutex<Book>>,
    path: Option<PathBuf>,
}

impl Ledger {
    /// Loads the ledger at `path`, starting empty if the file does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let book = match path.exists() {
            true => Book {
                stamp: stamp(&std::fs::metadata(&path)?).ok(),
                ..serde_json::from_str::<Book>(&std::fs::read_to_string(&path)?)?
            },
            false => Book::default(),
        };
        log::info!("[ledger] opened {}", path.display());
        Ok(Self {
            book: Arc::new(Mutex::new(book)),
            path: Some(path),
        })
    }
    /// Files a registration request for the next read of `card`.
    pub async fn request(
        &self,
        card: Card,
        identity: Identity,
        at: SystemTime,
    ) -> Result<(), DirectoryError> {
        self.refresh().await?;
        {
            let mut book = self.book()?;
            book.pending.retain(|p| p.card != card);
            book.pending.push(Pending {
                card,
                identity,
                requested: at,
            });
        }
        self.save().await
    }
    /// Binds a card in memory, outside of any match. Not written to disk
    /// until the next save.
    pub fn enroll(&self, card: Card, identity: Identity) -> Result<Profile, DirectoryError> {
        let mut book = self.book()?;
        match book.owner(&card).map(|p| p.identity().clone()) {
            Some(owner) if owner != identity => Err(DirectoryError::Conflict { card, owner }),
            _ => {
                let profile = book
                    .profiles
                    .entry(identity.clone())
                    .or_insert_with(|| Profile::new(identity));
                profile.bind(card);
                Ok(profile.clone())
            }
        }
    }
    pub fn profile(&self, identity: &Identity) -> Option<Profile> {
        self.book().ok()?.profiles.get(identity).cloned()
    }
    pub fn profiles(&self) -> Vec<Profile> {
        self.book()
            .map(|book| book.profiles.values().cloned().collect())
            .unwrap_or_default()
    }
    /// Writes the book to disk when the ledger has a file.
    pub async fn save(&self) -> Result<(), DirectoryError> {
        let Some(ref path) = self.path else {
            return Ok(());
        };
        let json = {
            let book = self.book()?;
            serde_json::to_string_pretty(&*book).map_err(unavailable)?
        };
        let temp = path.with_extension("tmp");
        tokio::fs::write(&temp, json).await.map_err(unavailable)?;
        tokio::fs::rename(&temp, path).await.map_err(unavailable)?;
        let written = tokio::fs::metadata(path).await.map_err(unavailable)?;
        self.book()?.stamp = stamp(&written).ok();
        log::debug!("[ledger] saved {}", path.display());
        Ok(())
    }
    /// Reloads the book when its file was changed by someone else.
    pub async fn refresh(&self) -> Result<(), DirectoryError> {
        let Some(ref path) = self.path else {
            return Ok(());
        };
        let current = match tokio::fs::metadata(path).await {
            Ok(meta) => stamp(&meta).map_err(unavailable)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(unavailable(e)),
        };
        if self.book()?.stamp == Some(current) {
            return Ok(());
        }
        let text = tokio::fs::read_to_string(path).await.map_err(unavailable)?;
        let book = Book {
            stamp: Some(current),
            ..serde_json::from_str::<Book>(&text).map_err(unavailable)?
        };
        *self.book()? = book;
        log::debug!("[ledger] reloaded {}", path.display());
        Ok(())
    }
    fn book(&self) -> Result<MutexGuard<'_, Book>, DirectoryError> {
        self.book
            .lock()
            .map_err(|e| DirectoryError::Unavailable(e.to_string()))
    }
}

fn stamp(meta: &std::fs::Metadata) -> std::io::Result<(SystemTime, u64)> {
    Ok((meta.modified()?, meta.len()))
}

fn unavailable(e: impl std::fmt::Display) -> DirectoryError {
    DirectoryError::Unavailable(e.to_string())
}

#[async_trait::async_trait]
impl Directory for Ledger {
    async fn resolve(&self, card: &Card) -> Result<Profile, DirectoryError> {
        self.refresh().await?;
        self.book()?
            .owner(card)
            .cloned()
            .ok_or_else(|| DirectoryError::Unregistered(card.clone()))
    }
    async fn pending(&self, card: &Card) -> Result<Option<Pending>, DirectoryError> {
        self.refresh().await?;
        Ok(self.book()?.pending.iter().find(|p| &p.card == card).cloned())
    }
    async fn dismiss(&mut self, card: &Card) -> Result<(), DirectoryError> {
        self.refresh().await?;
        self.book()?.pending.retain(|p| &p.card != card);
        self.save().await
    }
    async fn bind(&mut self, card: &Card, identity: &Identity) -> Result<Profile, DirectoryError> {
        self.refresh().await?;
        let profile = self.enroll(card.clone(), identity.clone())?;
        self.save().await?;
        Ok(profile)
    }
    async fn record(&mut self, profile: &Profile) -> Result<(), DirectoryError> {
        self.refresh().await?;
        {
            let mut book = self.book()?;
            let stored = book
                .profiles
                .entry(profile.identity().clone())
                .or_insert_with(|| Profile::new(profile.identity().clone()));
            stored.absorb(profile);
        }
        self.save().await
    }
}
