pub mod app;
pub mod client;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod reports;
pub mod session;
pub mod state;
pub mod storage;
pub mod ui;

pub use app::router;
pub use client::{ApiClient, ClientError, RequestBody};
pub use config::Config;
pub use session::{AuthService, Session};
pub use state::AppState;
pub use storage::{FileStore, MemoryStore, SessionStore};
