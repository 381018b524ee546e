//! Users Module
//!
//! Identity-side of the backend: the user record model, the username
//! directory (case-insensitive unique handle mapping), automatic
//! username provisioning, and the user-facing HTTP handlers.
//!
//! - **`model`** - `UserRecord`, merge patches, profile types
//! - **`directory`** - normalize / find / claim / exists
//! - **`provision`** - username auto-provisioning for new identities
//! - **`handlers`** - claim, existence, customization endpoints

pub mod directory;
pub mod handlers;
pub mod model;
pub mod provision;
