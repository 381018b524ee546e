//! Auth Module
//!
//! The identity-verification collaborator: JWT minting and
//! verification plus the development-only login shortcut.

pub mod handlers;
pub mod tokens;

pub use tokens::{CallerIdentity, TokenAuthority};
