//! Infrastructure layer - Framework implementations
//!
//! This layer contains:
//! - HTTP client for the remote catalog (catalog_client)
//! - Key-value store implementations (store)
//! - Configuration loading (config)
//! - HTTP server setup (server)
//! - Application state (state)

pub mod catalog_client;
pub mod config;
pub mod server;
pub mod state;
pub mod store;

pub use catalog_client::HttpCatalogClient;
pub use state::AppState;
pub use store::{FileStore, MemoryStore, open_store};
