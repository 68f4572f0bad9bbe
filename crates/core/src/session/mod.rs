#![allow(missing_docs)]

//! Session state and the action reducer that drives it.

mod models;
mod reducer;

pub use models::{
    Message, Role, Session, WalkStatus, LOCAL_SENDER, WALK_DISTANCE_LABEL, WALK_DURATION_LABEL,
};
pub use reducer::{reduce, Action, ActionError, Effect, CHAT_WINDOW};
