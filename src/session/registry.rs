use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
    time::Duration,
};

use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use super::context::SessionContext;
use super::store::ProfileStore;
use super::user::{generate_session_id, is_banned};
use crate::error::AppError;
use crate::notify::Notifier;

pub type SharedSession = Arc<Mutex<SessionContext>>;

/// All live sessions of this process, keyed by session id, plus the set of
/// registered usernames. Nothing here outlives the process except what the
/// profile store persists.
pub struct SessionRegistry {
    store: Arc<dyn ProfileStore>,
    notification_ttl: Duration,
    sessions: RwLock<HashMap<String, SharedSession>>,
    registered: Mutex<HashSet<String>>,
}

impl SessionRegistry {
    pub fn new(store: Arc<dyn ProfileStore>, notification_ttl: Duration) -> Self {
        Self {
            store,
            notification_ttl,
            sessions: RwLock::new(HashMap::new()),
            registered: Mutex::new(HashSet::new()),
        }
    }

    pub async fn register(&self, username: &str) -> Result<(), AppError> {
        let username = username.trim();
        if username.is_empty() || is_banned(username) {
            warn!(username, "registration rejected");
            return Err(AppError::InvalidUsername);
        }
        let mut registered = self.registered.lock().await;
        if !registered.insert(username.to_string()) {
            return Err(AppError::AlreadyRegistered);
        }
        info!(username, "user registered");
        Ok(())
    }

    /// Logs `username` in on a brand new session and returns its id. A
    /// `previous` session on the same device is ended once the new login
    /// succeeds, so the device keeps a single identity and a single record.
    pub async fn start(
        &self,
        username: &str,
        previous: Option<&str>,
    ) -> Result<(String, SharedSession), AppError> {
        let sid = generate_session_id();
        let mut ctx = SessionContext::new(sid.clone(), self.store.clone(), self.notifier());
        ctx.login(username).await?;

        let session = Arc::new(Mutex::new(ctx));
        self.sessions
            .write()
            .await
            .insert(sid.clone(), session.clone());

        if let Some(previous) = previous {
            self.end(previous).await?;
            info!(previous, sid = %sid, "previous session replaced");
        }
        Ok((sid, session))
    }

    /// Live session for `sid`, restoring it from the profile store when this
    /// process has not seen it yet. `None` when nothing is stored.
    pub async fn open(&self, sid: &str) -> anyhow::Result<Option<SharedSession>> {
        if let Some(session) = self.sessions.read().await.get(sid) {
            return Ok(Some(session.clone()));
        }

        // restore under the write lock so it cannot interleave with `end`
        let mut sessions = self.sessions.write().await;
        if let Some(session) = sessions.get(sid) {
            return Ok(Some(session.clone()));
        }
        let ctx = SessionContext::restore(sid, self.store.clone(), self.notifier()).await?;
        if ctx.user().is_none() {
            return Ok(None);
        }
        info!(sid, "session restored from profile store");

        let session = Arc::new(Mutex::new(ctx));
        sessions.insert(sid.to_string(), session.clone());
        Ok(Some(session))
    }

    /// Logs out and forgets the session. The registry stays write-locked
    /// until the stored record is gone, so `open` cannot restore it meanwhile.
    /// Nothing that holds a session lock waits on the registry.
    pub async fn end(&self, sid: &str) -> anyhow::Result<()> {
        let mut sessions = self.sessions.write().await;
        let Some(session) = sessions.remove(sid) else {
            return self.store.remove(sid).await;
        };
        let mut ctx = session.lock().await;
        ctx.logout().await
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    fn notifier(&self) -> Notifier {
        Notifier::new(self.notification_ttl)
    }
}
