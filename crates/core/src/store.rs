//! MongoDB-backed persistence for the session credential blob.
//!
//! One document per session identity, upserted on every authentication.
//! Persistence is strictly best-effort: a failed save costs the next
//! restart its resume, nothing else, so callers log store errors and move
//! on rather than propagating them into the relay.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, bson::doc};
use serde_json::Value;
use tracing::{debug, info};
use warelay_protocol::SessionRecord;

use crate::error::Result;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const COLLECTION: &str = "sessions";
const FALLBACK_DATABASE: &str = "warelay";

/// Write seam between the relay and persistence.
///
/// The relay only ever saves; the one-time load at startup goes through
/// [`SessionStore::load`] directly. Tests substitute a recording sink.
pub trait SessionSink: Send + Sync {
    fn save(&self, blob: &Value) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Session blob store on a MongoDB collection.
pub struct SessionStore {
    sessions: Collection<SessionRecord>,
    session_id: String,
}

impl SessionStore {
    /// Connects and pings the database.
    ///
    /// The database name comes from the URI path when present. Errors here
    /// mean the process runs without durable session resume; the caller
    /// decides that, not this constructor.
    pub async fn connect(uri: &str, session_id: &str) -> Result<Self> {
        let mut options = ClientOptions::parse(uri).await?;
        options.connect_timeout = Some(CONNECT_TIMEOUT);
        options.server_selection_timeout = Some(CONNECT_TIMEOUT);
        options.app_name = Some("warelay".to_string());

        let client = Client::with_options(options)?;
        let database = client
            .default_database()
            .unwrap_or_else(|| client.database(FALLBACK_DATABASE));
        database.run_command(doc! { "ping": 1 }).await?;

        info!(target = "wa.store", db = %database.name(), "session store connected");

        Ok(Self {
            sessions: database.collection(COLLECTION),
            session_id: session_id.to_string(),
        })
    }

    /// Fetches the persisted blob for this session identity, if any.
    pub async fn load(&self) -> Result<Option<Value>> {
        let record = self
            .sessions
            .find_one(doc! { "sessionId": &self.session_id })
            .await?;

        match &record {
            Some(_) => debug!(target = "wa.store", session = %self.session_id, "prior session found"),
            None => debug!(target = "wa.store", session = %self.session_id, "no prior session"),
        }

        Ok(record.map(|r| r.session_data))
    }

    /// Upserts the blob for this session identity.
    ///
    /// Replacing with an identical blob leaves the stored record unchanged,
    /// so repeated saves are idempotent.
    pub async fn save(&self, blob: &Value) -> Result<()> {
        let record = SessionRecord {
            session_id: self.session_id.clone(),
            session_data: blob.clone(),
        };

        self.sessions
            .replace_one(doc! { "sessionId": &self.session_id }, record)
            .upsert(true)
            .await?;

        debug!(target = "wa.store", session = %self.session_id, "session blob saved");
        Ok(())
    }
}

impl SessionSink for SessionStore {
    fn save(&self, blob: &Value) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let blob = blob.clone();
        Box::pin(async move { SessionStore::save(self, &blob).await })
    }
}
