#![warn(clippy::all, missing_docs)]

//! Core domain logic for the WalkQuote prototype.
//!
//! This crate hosts the session state machine, the action reducer, the
//! simulated walker search, configuration handling, and the header quote
//! rotation used by the terminal UI.

pub mod config;
pub mod matchmaker;
pub mod quotes;
pub mod session;

pub use crate::config::AppConfig;
pub use matchmaker::{MatchEvent, Matchmaker};
pub use session::{
    reduce, Action, ActionError, Effect, Message, Role, Session, WalkStatus, CHAT_WINDOW,
};
