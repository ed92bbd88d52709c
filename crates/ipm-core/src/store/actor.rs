//! Catalog actor - thread-safe access to SQLite
//!
//! SQLite connections are `Send` but not `Sync`, so the catalog database
//! lives on a dedicated thread and request handlers talk to it by message
//! passing. [`CatalogHandle`] is the cheap, cloneable front door.

use std::fmt;
use std::sync::mpsc;
use std::thread;

use async_trait::async_trait;
use ipm_schema::IpRecord;
use tokio::sync::oneshot;
use tracing::debug;

use super::db::{CatalogDb, Upsert};
use super::{CatalogStore, StoreConfig, StoreError, StoreFilter};

type Reply<T> = oneshot::Sender<Result<T, StoreError>>;

/// Events that can be sent to the catalog actor
enum StoreEvent {
    FindByName {
        name: String,
        resp: Reply<Option<IpRecord>>,
    },
    FindMany {
        filter: StoreFilter,
        resp: Reply<Vec<IpRecord>>,
    },
    Upsert {
        ip: Box<IpRecord>,
        resp: Reply<Upsert>,
    },
    Count {
        resp: Reply<usize>,
    },
    Shutdown,
}

impl fmt::Debug for StoreEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FindByName { name, .. } => f
                .debug_struct("FindByName")
                .field("name", name)
                .finish_non_exhaustive(),
            Self::FindMany { filter, .. } => f
                .debug_struct("FindMany")
                .field("filter", filter)
                .finish_non_exhaustive(),
            Self::Upsert { ip, .. } => f
                .debug_struct("Upsert")
                .field("name", &ip.name)
                .finish_non_exhaustive(),
            Self::Count { .. } => write!(f, "Count"),
            Self::Shutdown => write!(f, "Shutdown"),
        }
    }
}

/// A handle to the catalog actor that is Send + Sync and Clone.
#[derive(Clone)]
pub struct CatalogHandle {
    sender: mpsc::Sender<StoreEvent>,
}

impl fmt::Debug for CatalogHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogHandle").finish_non_exhaustive()
    }
}

impl CatalogHandle {
    /// Open the database described by `config` and spawn the actor thread
    pub fn spawn(config: &StoreConfig) -> Result<Self, StoreError> {
        let db = CatalogDb::open(config)?;
        debug!(path = %config.db_path.display(), "catalog store opened");
        Ok(Self::spawn_with(db))
    }

    /// Spawn the actor around an already-open database
    pub fn spawn_with(db: CatalogDb) -> Self {
        let (sender, receiver) = mpsc::channel();
        thread::spawn(move || {
            run_store_event_loop(db, receiver);
        });
        Self { sender }
    }

    /// Helper to send a request and wait for the response
    async fn request<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(Reply<T>) -> StoreEvent,
    {
        let (tx, rx) = oneshot::channel();
        self.sender.send(f(tx)).map_err(|_| StoreError::Closed)?;
        rx.await.map_err(|_| StoreError::Closed)?
    }

    pub async fn upsert(&self, ip: IpRecord) -> Result<Upsert, StoreError> {
        self.request(|resp| StoreEvent::Upsert {
            ip: Box::new(ip),
            resp,
        })
        .await
    }

    /// Stop the actor thread. Later requests fail with [`StoreError::Closed`].
    pub fn shutdown(&self) {
        let _ = self.sender.send(StoreEvent::Shutdown);
    }
}

#[async_trait]
impl CatalogStore for CatalogHandle {
    async fn find_by_name(&self, name: &str) -> Result<Option<IpRecord>, StoreError> {
        let name = name.to_string();
        self.request(|resp| StoreEvent::FindByName { name, resp })
            .await
    }

    async fn find_many(&self, filter: &StoreFilter) -> Result<Vec<IpRecord>, StoreError> {
        let filter = filter.clone();
        self.request(|resp| StoreEvent::FindMany { filter, resp })
            .await
    }

    async fn count(&self) -> Result<usize, StoreError> {
        self.request(|resp| StoreEvent::Count { resp }).await
    }
}

/// The actual event loop running in the background thread
// The db and receiver are moved into this thread so the actor has
// exclusive ownership of the connection.
#[allow(clippy::needless_pass_by_value)]
fn run_store_event_loop(db: CatalogDb, receiver: mpsc::Receiver<StoreEvent>) {
    while let Ok(event) = receiver.recv() {
        match event {
            StoreEvent::FindByName { name, resp } => {
                let _ = resp.send(db.find_by_name(&name));
            }
            StoreEvent::FindMany { filter, resp } => {
                let _ = resp.send(db.find_many(&filter));
            }
            StoreEvent::Upsert { ip, resp } => {
                let _ = resp.send(db.upsert(&ip));
            }
            StoreEvent::Count { resp } => {
                let _ = resp.send(db.count());
            }
            StoreEvent::Shutdown => break,
        }
    }
    debug!("catalog store actor stopped");
}
