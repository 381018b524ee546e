//! Server Module
//!
//! Server initialization, application state, and configuration.
//!
//! - **`config`** - environment-driven `ServerConfig`, store selection
//! - **`state`** - shared `AppState` and `FromRef` extraction
//! - **`init`** - app assembly (router + CORS)

pub mod config;
pub mod init;
pub mod state;

pub use init::{create_app, create_app_with_state};
