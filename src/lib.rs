//! Postbox - Main Library
//!
//! Postbox is the backend for a social "mail" feature: players send and
//! receive letters addressed by username, stored in a document store,
//! with optional delivery through third-party physical-mail providers.
//!
//! # Overview
//!
//! The library is organized around three collaborating responsibilities:
//! - **Caller identity resolution** — bearer tokens to stable ids, with
//!   automatic username provisioning on first use (`auth`, `users`)
//! - **Username directory** — case-insensitive unique handle mapping
//!   (`users::directory`)
//! - **Mail record indexing** — username-addressed letter storage,
//!   listing, and retraction (`mail`)
//!
//! # Module Structure
//!
//! ```text
//! src/
//! ├── server/     - Initialization, state, configuration
//! ├── routes/     - Router assembly
//! ├── middleware/ - Bearer-auth extractor
//! ├── error/      - Request error taxonomy
//! ├── auth/       - JWT tokens, dev login
//! ├── users/      - User records, directory, provisioning
//! ├── mail/       - Mail records, rendering, indexing
//! ├── store/      - Document store trait + memory/Postgres impls
//! └── delivery/   - Physical-mail provider collaborator
//! ```

pub mod auth;
pub mod delivery;
pub mod error;
pub mod mail;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod store;
pub mod users;
