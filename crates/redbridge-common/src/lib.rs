//! Shared types for Redbridge
//!
//! Provides the error taxonomy and the domain types exchanged between the
//! HTTP gateway and the store client: commands, batch modes, and the
//! `ReplyValue` union covering every reply shape the store can produce.

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{BatchMode, Command, CommandResult, ReplyValue};
