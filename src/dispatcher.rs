//! Send/fallback dispatch pipeline
//!
//! Orchestrates one conversational turn: append the user message, attempt
//! the remote backend when connectivity allows, and absorb any remote
//! failure into a rule-engine fallback reply. Exactly one user message and
//! exactly one bot message are appended per accepted call; the dispatcher
//! never surfaces an error to its caller.

use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::advisor;
use crate::error::AdvisorError;
use crate::models::{ConnectivityState, Message, MessageSource, Session, StatusCell};
use crate::remote::{ChatBackend, ChatRequest};
use crate::session::SessionStore;

#[derive(Debug, Clone)]
pub struct DispatcherOptions {
    /// Deadline for one remote chat call.
    pub chat_timeout: Duration,
    /// Minimum cosmetic latency before a fallback reply, plus up to the
    /// same amount of random jitter. Zero disables the delay entirely.
    pub fallback_delay: Duration,
    /// How many trailing history messages accompany a chat request.
    pub history_window: usize,
}

impl Default for DispatcherOptions {
    fn default() -> Self {
        Self {
            chat_timeout: Duration::from_secs(10),
            fallback_delay: Duration::from_secs(1),
            history_window: 10,
        }
    }
}

pub struct Dispatcher {
    backend: Arc<dyn ChatBackend>,
    status: Arc<StatusCell>,
    store: Arc<RwLock<SessionStore>>,
    options: DispatcherOptions,
    /// Serializes sends per session; correctness must not depend on the UI
    /// disabling its input field.
    send_lock: Mutex<()>,
    loading: AtomicBool,
}

impl Dispatcher {
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        status: Arc<StatusCell>,
        store: Arc<RwLock<SessionStore>>,
        options: DispatcherOptions,
    ) -> Self {
        Self {
            backend,
            status,
            store,
            options,
            send_lock: Mutex::new(()),
            loading: AtomicBool::new(false),
        }
    }

    //
    // ================= UI-facing signals =================
    //

    /// True while a send is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    pub fn connectivity(&self) -> ConnectivityState {
        self.status.get()
    }

    pub async fn session_snapshot(&self) -> Session {
        self.store.read().await.snapshot()
    }

    pub fn store(&self) -> &Arc<RwLock<SessionStore>> {
        &self.store
    }

    //
    // ================= Send Pipeline =================
    //

    /// Dispatch one user turn and return the appended bot message.
    ///
    /// Empty or whitespace-only input is rejected with no state change and
    /// `None` is returned. Otherwise the user message is appended before
    /// any network attempt, and exactly one bot reply follows: remote when
    /// the backend answers well-formed, rule-engine fallback on any failure
    /// or when the shared state is already `Offline`.
    pub async fn send(&self, text: &str) -> Option<Message> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            debug!("Rejecting empty input");
            return None;
        }

        let _turn = self.send_lock.lock().await;
        self.loading.store(true, Ordering::SeqCst);

        // Context is the transcript as it stood before this turn; the
        // current text travels separately in `user_input`.
        let (user_id, context) = {
            let mut store = self.store.write().await;
            let session = store.session();
            let user_id = session.user_id.clone();
            let window = session
                .history
                .len()
                .saturating_sub(self.options.history_window);
            let context = session.history[window..].to_vec();

            store.push_message(Message::user(trimmed));
            (user_id, context)
        };

        let bot = if self.status.get() != ConnectivityState::Offline {
            match self.try_remote(trimmed, &user_id, context).await {
                Ok(message) => message,
                Err(error) => {
                    warn!("Remote chat failed, switching to local advice: {}", error);
                    self.status.set(ConnectivityState::Offline);
                    self.local_fallback(trimmed).await
                }
            }
        } else {
            debug!("Backend offline, answering locally");
            self.local_fallback(trimmed).await
        };

        self.store.write().await.push_message(bot.clone());
        self.loading.store(false, Ordering::SeqCst);

        Some(bot)
    }

    async fn try_remote(
        &self,
        text: &str,
        user_id: &str,
        context: Vec<Message>,
    ) -> crate::Result<Message> {
        let request = ChatRequest {
            user_input: text.to_string(),
            user_id: user_id.to_string(),
            conversation_history: context,
        };

        let reply = tokio::time::timeout(self.options.chat_timeout, self.backend.chat(&request))
            .await
            .map_err(|_| AdvisorError::Timeout(self.options.chat_timeout))??;

        let source = if reply.demo_mode.unwrap_or(false) {
            MessageSource::RemoteDemo
        } else {
            MessageSource::RemoteAi
        };

        info!(source = %source, "Backend answered");

        let mut message = Message::bot(reply.response, source);
        message.market_data_included = reply.market_data_included.unwrap_or(false);
        message.sentiment = reply.sentiment_analysis.map(|s| s.sentiment);
        Ok(message)
    }

    /// Answer from the rule engine, after the cosmetic "thinking" delay.
    /// The delay never applies to the remote path.
    async fn local_fallback(&self, text: &str) -> Message {
        let base = self.options.fallback_delay;
        if !base.is_zero() {
            let jitter_ms = rand::thread_rng().gen_range(0..=base.as_millis() as u64);
            tokio::time::sleep(base + Duration::from_millis(jitter_ms)).await;
        }

        Message::bot(advisor::advise(text), MessageSource::LocalFallback)
    }
}
