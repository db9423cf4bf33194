//! FinanceGURU conversation core
//!
//! The orchestration engine behind the FinanceGURU advisor client:
//! - Monitors backend connectivity on a timer and publishes a shared status
//! - Dispatches user messages to the remote advisor with a bounded deadline
//! - Falls back to a deterministic rule engine when the backend is unreachable
//! - Persists the conversation session (history, identity, UI flags) across
//!   restarts
//!
//! PIPELINE:
//! INPUT → APPEND USER TURN → REMOTE ATTEMPT | RULE ENGINE → APPEND REPLY → PERSIST

pub mod advisor;
pub mod config;
pub mod connectivity;
pub mod dispatcher;
pub mod error;
pub mod models;
pub mod remote;
pub mod session;

pub use error::Result;

// Re-export common types
pub use config::Config;
pub use connectivity::ConnectivityMonitor;
pub use dispatcher::{Dispatcher, DispatcherOptions};
pub use models::*;
pub use remote::{BackendClient, ChatBackend};
pub use session::SessionStore;
