//! Persisted session store
//!
//! The single owner of durable conversation state: history, user identity,
//! and UI flags. Every mutation writes through to disk immediately, so a
//! crash loses at most the most recent change. Persistence failures degrade
//! the store to in-memory operation instead of crashing.

use rand::{distributions::Alphanumeric, Rng};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::models::{Message, Sender, Session};

/// Greeting seeded into a brand-new session.
pub const WELCOME_GREETING: &str =
    "Welcome to FinanceGURU! I'm your personal financial advisor. How can I help you today?";

/// Greeting used when the transcript is cleared mid-session.
pub const CLEAR_GREETING: &str = "Welcome to FinanceGURU! How can I help you today?";

/// Generate a stable user token of the form `user_` + 9 alphanumerics.
/// Called at most once per session lifetime; never regenerated once
/// persisted.
pub fn generate_user_id() -> String {
    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(char::from)
        .collect();

    format!("user_{}", token)
}

fn greeting(text: &str) -> Message {
    Message {
        sender: Sender::Bot,
        text: text.to_string(),
        timestamp: chrono::Utc::now(),
        source: None,
        market_data_included: false,
        sentiment: None,
    }
}

fn fresh_session() -> Session {
    Session {
        user_id: generate_user_id(),
        history: vec![greeting(WELCOME_GREETING)],
        sidebar_open: true,
        welcome_shown: false,
    }
}

pub struct SessionStore {
    session: Session,
    path: Option<PathBuf>,
}

impl SessionStore {
    /// Load the persisted session, or initialize a fresh one.
    ///
    /// A missing file is a first run: a new `user_id` is generated, the
    /// history is seeded with the welcome greeting, and the result is
    /// persisted immediately. An unreadable or unparseable file is logged
    /// and replaced by a fresh session; the next save overwrites it.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();

        let session = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<Session>(&raw) {
                Ok(session) => {
                    info!(user_id = %session.user_id, "Restored persisted session");
                    session
                }
                Err(error) => {
                    warn!(
                        "Persisted session at {:?} is unreadable, starting fresh: {}",
                        path, error
                    );
                    fresh_session()
                }
            },
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                info!("No persisted session at {:?}, initializing", path);
                fresh_session()
            }
            Err(error) => {
                warn!(
                    "Failed to read persisted session at {:?}, starting fresh: {}",
                    path, error
                );
                fresh_session()
            }
        };

        let mut store = Self {
            session,
            path: Some(path),
        };
        // Covers first-run userId assignment; a no-op rewrite otherwise.
        store.save();
        store
    }

    /// A store with no durability, used when persistence is unavailable and
    /// by tests.
    pub fn in_memory() -> Self {
        Self {
            session: fresh_session(),
            path: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn snapshot(&self) -> Session {
        self.session.clone()
    }

    //
    // ================= Mutations (write-through) =================
    //

    pub fn push_message(&mut self, message: Message) {
        self.session.history.push(message);
        self.save();
    }

    pub fn set_sidebar_open(&mut self, open: bool) {
        self.session.sidebar_open = open;
        self.save();
    }

    pub fn mark_welcome_shown(&mut self) {
        self.session.welcome_shown = true;
        self.save();
    }

    /// Reset the transcript to a single fresh greeting. A history reset,
    /// not a session reset: `user_id`, `sidebar_open` and `welcome_shown`
    /// are preserved.
    pub fn clear_history(&mut self) {
        self.session.history = vec![greeting(CLEAR_GREETING)];
        self.save();
    }

    /// Synchronous write-through after every mutation; no batching. Write
    /// failures are logged and the store keeps serving from memory.
    fn save(&mut self) {
        let Some(path) = &self.path else {
            return;
        };

        let result = serde_json::to_string_pretty(&self.session)
            .map_err(|e| e.to_string())
            .and_then(|raw| fs::write(path, raw).map_err(|e| e.to_string()));

        if let Err(error) = result {
            warn!(
                "Failed to persist session to {:?}, continuing in memory: {}",
                path, error
            );
        }
    }
}
