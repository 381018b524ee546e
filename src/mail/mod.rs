//! Mail Module
//!
//! The mail record indexer and its HTTP surface: how a letter is
//! addressed, rendered, stored, queried, and retracted.
//!
//! - **`model`** - `MailRecord`, status/provider enums, request types
//! - **`render`** - pure text-to-HTML letter rendering
//! - **`indexer`** - send/list/delete orchestration
//! - **`handlers`** - inbox, outbox, send, delete endpoints

pub mod handlers;
pub mod indexer;
pub mod model;
pub mod render;
