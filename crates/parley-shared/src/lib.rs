//! # parley-shared
//!
//! Types shared by every Parley crate: strongly-typed identifiers, the
//! conversation/message enums persisted by the store, and the client-facing
//! view shapes returned by the HTTP API.

pub mod constants;
pub mod error;
pub mod types;
pub mod validation;
pub mod views;

pub use error::ParseKindError;
pub use types::*;
pub use views::*;
