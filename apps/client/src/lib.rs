//! Networked side of the word book: repository client, login session,
//! speech seam and the tokio driver for drill sessions.

pub mod api;
pub mod book;
pub mod config;
pub mod driver;
pub mod error;
pub mod repository;
pub mod session;
pub mod speech;

pub use book::BookSession;
pub use config::ClientConfig;
pub use driver::{DriverEvent, SessionDriver};
pub use error::{ClientError, Result};
pub use repository::{HttpWordRepository, WordRepository};
pub use session::{FileSessionStore, MemorySessionStore, SessionStore, UserSession};
pub use speech::{SilentSpeaker, Speaker};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber, filtered by `RUST_LOG` (default `info`).
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
