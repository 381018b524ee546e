//! Backend Error Module
//!
//! Defines the request error taxonomy and its HTTP conversion.
//!
//! - **`types`** - `ApiError` and status-code mapping
//! - **`conversion`** - `IntoResponse` implementation
//!
//! Every handler returns `Result<_, ApiError>`; the conversion layer
//! renders a JSON body with the message and status code.

pub mod conversion;
pub mod types;

pub use types::ApiError;
