//! Sign storage
//!
//! CRUD over user-created signs with change notifications. Listeners get a
//! `SignEvent` on their channel after every successful mutation.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::{Mutex, RwLock};

use super::record::{normalize_name, SignRecord};

/// Error type for sign storage
#[derive(Debug, thiserror::Error)]
pub enum SignStoreError {
    #[error("A sign with id '{0}' already exists")]
    DuplicateId(String),
    #[error("A sign named '{0}' already exists")]
    DuplicateName(String),
    #[error("Sign has no name")]
    MissingName,
    #[error("No sign with id '{0}'")]
    NotFound(String),
    #[error("Sign store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Sign store is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for sign storage
pub type SignStoreResult<T> = Result<T, SignStoreError>;

/// Change notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignEvent {
    Created { id: String, name: String },
    Deleted { id: String, name: String },
    /// The whole set was replaced
    Reloaded,
}

/// Persistence boundary for custom signs
pub trait SignStore: Send + Sync {
    /// Every record in creation order
    fn list(&self) -> SignStoreResult<Vec<SignRecord>>;

    /// Case-insensitive lookup by name
    fn get_by_name(&self, name: &str) -> SignStoreResult<Option<SignRecord>>;

    /// Store a new record, rejecting duplicate ids and names
    fn create(&self, record: SignRecord) -> SignStoreResult<SignRecord>;

    /// Remove a record by id, returning it
    fn delete(&self, id: &str) -> SignStoreResult<SignRecord>;

    /// Channel that receives every later change
    fn subscribe(&self) -> Receiver<SignEvent>;
}

#[derive(Debug, Default)]
struct Subscribers {
    senders: Mutex<Vec<Sender<SignEvent>>>,
}

impl Subscribers {
    fn subscribe(&self) -> Receiver<SignEvent> {
        let (tx, rx) = channel::unbounded();
        self.senders.lock().push(tx);
        rx
    }

    fn notify(&self, event: SignEvent) {
        // Listeners whose receiver is gone are dropped
        self.senders.lock().retain(|tx| tx.send(event.clone()).is_ok());
    }
}

/// In-process sign store
#[derive(Debug, Default)]
pub struct MemorySignStore {
    records: RwLock<Vec<SignRecord>>,
    subscribers: Subscribers,
}

impl MemorySignStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with `records`, kept as given
    pub fn with_records(records: Vec<SignRecord>) -> Self {
        Self {
            records: RwLock::new(records),
            subscribers: Subscribers::default(),
        }
    }

    /// Replace every record and notify listeners
    pub fn replace_all(&self, records: Vec<SignRecord>) {
        *self.records.write() = records;
        self.subscribers.notify(SignEvent::Reloaded);
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    fn snapshot(&self) -> Vec<SignRecord> {
        self.records.read().clone()
    }

    /// Validate and insert `record`
    ///
    /// `commit` sees the would-be record set first; if it fails nothing
    /// changes and no event is sent.
    fn insert_with<F>(&self, mut record: SignRecord, commit: F) -> SignStoreResult<SignRecord>
    where
        F: FnOnce(&[SignRecord]) -> SignStoreResult<()>,
    {
        let name = record.key().ok_or(SignStoreError::MissingName)?;
        record.name = name.clone();

        let mut records = self.records.write();
        if records.iter().any(|r| r.id == record.id) {
            return Err(SignStoreError::DuplicateId(record.id));
        }
        if records.iter().any(|r| r.key().as_deref() == Some(name.as_str())) {
            return Err(SignStoreError::DuplicateName(name));
        }
        let mut candidate = records.clone();
        candidate.push(record.clone());
        commit(&candidate)?;
        *records = candidate;
        drop(records);

        log::info!("Created sign {} ({})", name, record.id);
        self.subscribers.notify(SignEvent::Created {
            id: record.id.clone(),
            name,
        });
        Ok(record)
    }

    /// Remove the record with `id`, gated on `commit` like `insert_with`
    fn remove_with<F>(&self, id: &str, commit: F) -> SignStoreResult<SignRecord>
    where
        F: FnOnce(&[SignRecord]) -> SignStoreResult<()>,
    {
        let mut records = self.records.write();
        let pos = records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| SignStoreError::NotFound(id.to_string()))?;
        let mut candidate = records.clone();
        let removed = candidate.remove(pos);
        commit(&candidate)?;
        *records = candidate;
        drop(records);

        log::info!("Deleted sign {} ({})", removed.name, removed.id);
        self.subscribers.notify(SignEvent::Deleted {
            id: removed.id.clone(),
            name: removed.name.clone(),
        });
        Ok(removed)
    }
}

impl SignStore for MemorySignStore {
    fn list(&self) -> SignStoreResult<Vec<SignRecord>> {
        Ok(self.snapshot())
    }

    fn get_by_name(&self, name: &str) -> SignStoreResult<Option<SignRecord>> {
        let key = normalize_name(name);
        Ok(self
            .records
            .read()
            .iter()
            .find(|r| r.key().as_deref() == Some(key.as_str()))
            .cloned())
    }

    fn create(&self, record: SignRecord) -> SignStoreResult<SignRecord> {
        self.insert_with(record, |_| Ok(()))
    }

    fn delete(&self, id: &str) -> SignStoreResult<SignRecord> {
        self.remove_with(id, |_| Ok(()))
    }

    fn subscribe(&self) -> Receiver<SignEvent> {
        self.subscribers.subscribe()
    }
}

/// Sign store persisted as a JSON array in one file
///
/// The file is rewritten after every mutation.
#[derive(Debug)]
pub struct JsonFileSignStore {
    path: PathBuf,
    inner: MemorySignStore,
}

impl JsonFileSignStore {
    /// Open the store at `path`; a missing file is an empty store
    pub fn open(path: impl AsRef<Path>) -> SignStoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let records = read_records(&path)?;
        log::debug!("Loaded {} signs from {}", records.len(), path.display());
        Ok(Self {
            path,
            inner: MemorySignStore::with_records(records),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the file, replacing the in-memory records
    pub fn reload(&self) -> SignStoreResult<()> {
        let records = read_records(&self.path)?;
        self.inner.replace_all(records);
        Ok(())
    }

    fn persist(&self, records: &[SignRecord]) -> SignStoreResult<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(records)?;
        let tmp = self.path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(json.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

fn read_records(path: &Path) -> SignStoreResult<Vec<SignRecord>> {
    match fs::read_to_string(path) {
        Ok(text) if text.trim().is_empty() => Ok(Vec::new()),
        Ok(text) => Ok(serde_json::from_str(&text)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

impl SignStore for JsonFileSignStore {
    fn list(&self) -> SignStoreResult<Vec<SignRecord>> {
        self.inner.list()
    }

    fn get_by_name(&self, name: &str) -> SignStoreResult<Option<SignRecord>> {
        self.inner.get_by_name(name)
    }

    fn create(&self, record: SignRecord) -> SignStoreResult<SignRecord> {
        self.inner.insert_with(record, |records| self.persist(records))
    }

    fn delete(&self, id: &str) -> SignStoreResult<SignRecord> {
        self.inner.remove_with(id, |records| self.persist(records))
    }

    fn subscribe(&self) -> Receiver<SignEvent> {
        self.inner.subscribe()
    }
}
