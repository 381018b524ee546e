//! Middleware Module
//!
//! Request processing middleware; currently just the bearer-auth
//! extractor.

pub mod auth;
