//! # parley-core
//!
//! The conversation and messaging core of Parley.
//!
//! Every conversation-scoped operation goes through the participation
//! [`guard`] first, then one of the managers ([`conversations`],
//! [`messaging`], [`groups`], [`comments`], [`users`]) reads or writes the
//! store, and [`compose`] shapes the resulting rows into client views.
//!
//! Operations are synchronous and take a `&Database`; the HTTP layer runs
//! them on blocking worker threads. No state is cached between calls.

pub mod comments;
pub mod compose;
pub mod conversations;
pub mod groups;
pub mod guard;
pub mod messaging;
pub mod users;

mod error;

pub use error::{CoreError, Result};

#[cfg(test)]
pub(crate) mod testing;
