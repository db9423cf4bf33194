//! Core data models for the advisor conversation engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

//
// ================= Enums =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// Where a bot reply came from. Wire values match the original frontend
/// so persisted transcripts stay readable by it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MessageSource {
    #[serde(rename = "backend_ai")]
    RemoteAi,
    #[serde(rename = "backend_demo")]
    RemoteDemo,
    #[serde(rename = "offline")]
    LocalFallback,
}

/// Backend reachability as observed by the last probe or send attempt.
///
/// Single writer (the monitor, plus dispatcher demotion on remote failure),
/// many readers. `repr(u8)` so it can live in an atomic cell.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum ConnectivityState {
    Unknown = 0,
    Checking = 1,
    Connected = 2,
    Degraded = 3,
    Offline = 4,
}

impl ConnectivityState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => ConnectivityState::Checking,
            2 => ConnectivityState::Connected,
            3 => ConnectivityState::Degraded,
            4 => ConnectivityState::Offline,
            _ => ConnectivityState::Unknown,
        }
    }
}

//
// ================= Message =================
//

/// A single transcript entry. Immutable once created; history ordering is
/// append order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub source: Option<MessageSource>,
    #[serde(default)]
    pub market_data_included: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sentiment: Option<String>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
            timestamp: Utc::now(),
            source: None,
            market_data_included: false,
            sentiment: None,
        }
    }

    pub fn bot(text: impl Into<String>, source: MessageSource) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.into(),
            timestamp: Utc::now(),
            source: Some(source),
            market_data_included: false,
            sentiment: None,
        }
    }
}

//
// ================= FAQ =================
//

/// One entry of the fixed FAQ catalog. The catalog is static data, identical
/// across rule-engine invocations within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaqEntry {
    pub question: &'static str,
    pub answer: &'static str,
}

//
// ================= Session =================
//

/// The durable per-user conversation aggregate. All mutation goes through
/// the session store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub user_id: String,
    pub history: Vec<Message>,
    pub sidebar_open: bool,
    pub welcome_shown: bool,
}

//
// ================= Status cell =================
//

/// Process-wide holder for the shared [`ConnectivityState`].
///
/// Plain atomic, last writer wins; readers tolerate staleness because the
/// dispatcher re-reads per send.
#[derive(Debug)]
pub struct StatusCell {
    inner: AtomicU8,
}

impl StatusCell {
    pub fn new(initial: ConnectivityState) -> Self {
        Self {
            inner: AtomicU8::new(initial as u8),
        }
    }

    pub fn get(&self) -> ConnectivityState {
        ConnectivityState::from_u8(self.inner.load(Ordering::SeqCst))
    }

    pub fn set(&self, state: ConnectivityState) {
        self.inner.store(state as u8, Ordering::SeqCst);
    }
}

impl Default for StatusCell {
    fn default() -> Self {
        Self::new(ConnectivityState::Unknown)
    }
}

impl fmt::Display for ConnectivityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectivityState::Unknown => "unknown",
            ConnectivityState::Checking => "checking",
            ConnectivityState::Connected => "connected",
            ConnectivityState::Degraded => "degraded",
            ConnectivityState::Offline => "offline",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for MessageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MessageSource::RemoteAi => "AI",
            MessageSource::RemoteDemo => "demo",
            MessageSource::LocalFallback => "offline",
        };
        write!(f, "{}", s)
    }
}
